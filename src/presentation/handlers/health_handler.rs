// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::settings::Settings;

/// 进程启动时间
#[derive(Debug, Clone, Copy)]
pub struct HealthState {
    pub started_at: Instant,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// 运行时长（秒）
    pub uptime: f64,
    pub version: &'static str,
    pub checks: HealthChecks,
}

/// 各组件状态
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Firecrawl 客户端在启动时已通过密钥校验
    pub firecrawl: &'static str,
    pub rate_limiting: &'static str,
}

/// 根路径
pub async fn root() -> &'static str {
    "OK"
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回服务状态、当前时间、运行时长、版本号和组件状态
pub async fn health_check(
    Extension(state): Extension<HealthState>,
    Extension(settings): Extension<Arc<Settings>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            firecrawl: "configured",
            rate_limiting: if settings.rate_limiting.enabled {
                "enabled"
            } else {
                "disabled"
            },
        },
    })
}

pub async fn liveness() -> Json<Value> {
    Json(json!({ "alive": true }))
}

/// 就绪检查
///
/// 提供方客户端在启动时构造完成，进程能响应即视为就绪
pub async fn readiness() -> Json<Value> {
    Json(json!({ "ready": true }))
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
