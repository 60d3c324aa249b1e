// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::errors::ExtractError;

/// API 密钥的 SHA-256 摘要
type KeyDigest = [u8; 32];

fn digest_key(api_key: &str) -> KeyDigest {
    Sha256::digest(api_key.as_bytes()).into()
}

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 允许的 API 密钥摘要，不保存明文
    key_digests: Arc<Vec<KeyDigest>>,
}

impl AuthState {
    pub fn new<I>(api_keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut digests: Vec<KeyDigest> = api_keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|k| digest_key(&k))
            .collect();
        digests.sort_unstable();
        digests.dedup();

        Self {
            key_digests: Arc::new(digests),
        }
    }

    /// 比较所有已配置密钥的摘要，耗时与匹配位置无关
    fn accepts(&self, digest: &KeyDigest) -> bool {
        self.key_digests
            .iter()
            .fold(false, |found, candidate| found | constant_time_eq(candidate, digest))
    }
}

fn constant_time_eq(a: &KeyDigest, b: &KeyDigest) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// 已认证的调用方
///
/// `id` 为 API 密钥 SHA-256 摘要的前 12 个十六进制字符，可安全写入日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
}

impl Principal {
    pub fn from_api_key(api_key: &str) -> Self {
        Self::from_digest(&digest_key(api_key))
    }

    fn from_digest(digest: &KeyDigest) -> Self {
        Self {
            id: hex::encode(&digest[..6]),
        }
    }
}

/// 认证中间件
///
/// 验证请求中的 Bearer API 密钥，并将 `Principal` 注入请求扩展
///
/// # 参数
///
/// * `state` - 认证状态
/// * `req` - HTTP请求
/// * `next` - 下一个中间件
///
/// # 返回值
///
/// * `Ok(Response)` - 认证成功的响应
/// * `Err(ExtractError::Unauthorized)` - 认证失败
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ExtractError> {
    debug!("AuthMiddleware processing path: {}", req.uri().path());

    let principal = {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ExtractError::Unauthorized)?;

        let digest = digest_key(token);
        let principal = Principal::from_digest(&digest);
        if !state.accepts(&digest) {
            warn!(principal = %principal.id, "Rejected unknown API key");
            return Err(ExtractError::Unauthorized);
        }
        principal
    };

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
