// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info_span, warn};

use crate::config::settings::Settings;
use crate::domain::services::extraction_service::ExtractionService;
use crate::presentation::handlers::{extract_handler, health_handler};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use crate::presentation::middleware::rate_limit_middleware::{
    rate_limit_middleware, RateLimiter,
};

/// 创建应用路由
///
/// # 参数
///
/// * `settings` - 应用配置
/// * `service` - 提取服务
/// * `rate_limiter` - 速率限制器，`None` 表示不限流
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(
    settings: Arc<Settings>,
    service: Arc<ExtractionService>,
    rate_limiter: Option<Arc<RateLimiter>>,
) -> Router {
    let public_routes = Router::new()
        .route("/", get(health_handler::root))
        .route("/health", get(health_handler::health_check))
        .route("/health/live", get(health_handler::liveness))
        .route("/health/ready", get(health_handler::readiness))
        .route("/v1/version", get(health_handler::version));

    let mut protected_routes =
        Router::new().route("/v1/extract", post(extract_handler::extract_data));

    if let Some(limiter) = rate_limiter {
        protected_routes =
            protected_routes.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    let auth_state = AuthState::new(settings.auth.api_keys.iter().cloned());
    let protected_routes =
        protected_routes.layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(Extension(service))
        .layer(Extension(settings.clone()))
        .layer(Extension(health_handler::HealthState::new()))
        .layer(RequestBodyLimitLayer::new(settings.server.body_limit_bytes));

    app = with_security_headers(app, settings.is_production());

    if let Some(cors) = cors_layer(&settings) {
        app = app.layer(cors);
    }

    app.layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn with_security_headers(app: Router, production: bool) -> Router {
    let app = app
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ));

    if production {
        app.layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
    } else {
        app
    }
}

fn cors_layer(settings: &Settings) -> Option<CorsLayer> {
    let origin = settings.cors.origin.as_deref()?;
    match origin.parse::<HeaderValue>() {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        ),
        Err(e) => {
            warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
            None
        }
    }
}
