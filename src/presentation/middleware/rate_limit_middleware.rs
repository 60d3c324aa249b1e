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
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::Quota;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::domain::errors::ExtractError;
use crate::presentation::middleware::auth_middleware::Principal;

/// 未认证请求共享的限流键
const ANONYMOUS_KEY: &str = "anonymous";

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

type KeyedLimiter = governor::RateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    DefaultClock,
    StateInformationMiddleware,
>;

/// 一次检查后的配额状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// 每分钟请求数上限
    pub limit: u32,
    /// 剩余可用请求数
    pub remaining: u32,
    /// 配额完全恢复所需时间
    pub reset_after: Duration,
}

/// 速率限制错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RateLimitError {
    /// 请求过多错误
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests { limit: u32, retry_after: Duration },
}

/// 速率限制器
///
/// 进程内按调用方计数的令牌桶，每分钟补充 `rpm` 个令牌
pub struct RateLimiter {
    limiter: KeyedLimiter,
    clock: DefaultClock,
    limit: NonZeroU32,
}

impl RateLimiter {
    /// 创建新的速率限制器实例
    ///
    /// # 参数
    ///
    /// * `requests_per_minute` - 每分钟请求数限制，0 按 1 处理
    pub fn new(requests_per_minute: u32) -> Self {
        let limit = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: governor::RateLimiter::keyed(Quota::per_minute(limit))
                .with_middleware::<StateInformationMiddleware>(),
            clock: DefaultClock::default(),
            limit,
        }
    }

    /// 检查调用方的请求速率是否超出限制
    ///
    /// # 参数
    ///
    /// * `key` - 调用方标识
    ///
    /// # 返回值
    ///
    /// * `Ok(RateLimitStatus)` - 请求未超出限制，附带剩余配额
    /// * `Err(RateLimitError)` - 请求超出限制，附带建议的等待时间
    pub fn check(&self, key: &str) -> Result<RateLimitStatus, RateLimitError> {
        let limit = self.limit.get();
        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => {
                let remaining = snapshot.remaining_burst_capacity().min(limit);
                Ok(RateLimitStatus {
                    limit,
                    remaining,
                    reset_after: RATE_LIMIT_WINDOW / limit * (limit - remaining),
                })
            }
            Err(not_until) => Err(RateLimitError::TooManyRequests {
                limit,
                retry_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }

    /// 清理长时间未活动的调用方状态
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// 向上取整到秒，至少 1 秒
fn ceil_secs(duration: Duration) -> u64 {
    (duration.as_secs_f64().ceil() as u64).max(1)
}

fn insert_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    let reset_at = Utc::now().timestamp().max(0) as u64 + ceil_secs(reset_after);
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_at));
}

/// 速率限制中间件
///
/// 必须位于认证中间件之内，以便读取 `Principal`。
/// 每个响应都带有 `X-RateLimit-Limit`、`X-RateLimit-Remaining` 和 `X-RateLimit-Reset`（Unix 秒）。
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = req
        .extensions()
        .get::<Principal>()
        .map(|p| p.id.clone())
        .unwrap_or_else(|| ANONYMOUS_KEY.to_string());

    match limiter.check(&key) {
        Ok(status) => {
            let mut response = next.run(req).await;
            insert_quota_headers(
                response.headers_mut(),
                status.limit,
                status.remaining,
                status.reset_after,
            );
            response
        }
        Err(RateLimitError::TooManyRequests { limit, retry_after }) => {
            let seconds = ceil_secs(retry_after);
            warn!(principal = %key, retry_after_secs = seconds, "Rate limit exceeded");

            let mut response = ExtractError::RateLimited.into_response();
            let headers = response.headers_mut();
            insert_quota_headers(headers, limit, 0, retry_after);
            headers.insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            response
        }
    }
}
