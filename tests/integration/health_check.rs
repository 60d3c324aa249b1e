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

use axum::http::StatusCode;
use serde_json::Value;

use super::helpers::{create_test_app, create_test_app_with};

/// 健康检查测试
///
/// 验证健康检查端点无需认证即可访问
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app().await;

    let response = app.server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(body["timestamp"].as_str().is_some());
    assert_eq!(body["checks"]["firecrawl"], "configured");
    assert_eq!(body["checks"]["rate_limiting"], "enabled");
}

#[tokio::test]
async fn liveness_and_readiness() {
    let app = create_test_app().await;

    let body: Value = app.server.get("/health/live").await.json();
    assert_eq!(body["alive"], true);

    let body: Value = app.server.get("/health/ready").await.json();
    assert_eq!(body["ready"], true);

    let response = app.server.get("/v1/version").await;
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    let headers = response.headers();
    assert!(headers.get("x-request-id").is_some());
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-xss-protection").unwrap(), "1; mode=block");
    assert_eq!(
        headers.get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
    assert!(headers.get("permissions-policy").is_some());
    assert!(headers.get("strict-transport-security").is_none());
    // Health routes are not rate limited, so carry no quota headers.
    assert!(headers.get("x-ratelimit-limit").is_none());

    // A caller-supplied request id is echoed back.
    let response = app
        .server
        .get("/health")
        .add_header("x-request-id", "req-123")
        .await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn production_adds_hsts() {
    let app = create_test_app_with(|builder| {
        builder.set_override("environment", "production").unwrap()
    })
    .await;

    let response = app.server.get("/health").await;
    assert!(response.headers().get("strict-transport-security").is_some());
}

#[tokio::test]
async fn cors_origin_is_applied_when_configured() {
    let app = create_test_app_with(|builder| {
        builder
            .set_override("cors.origin", "https://app.example.com")
            .unwrap()
    })
    .await;

    let response = app
        .server
        .get("/health")
        .add_header("origin", "https://app.example.com")
        .await;
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://app.example.com"
    );
}
