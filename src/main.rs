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

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use verge::config::settings::Settings;
use verge::domain::services::extraction_service::ExtractionService;
use verge::infrastructure::firecrawl_client::FirecrawlClient;
use verge::infrastructure::metrics;
use verge::presentation::middleware::rate_limit_middleware::RateLimiter;
use verge::presentation::routes;
use verge::utils::telemetry;

/// 限流状态清理间隔
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new().context("Failed to load configuration")?);

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(&settings.log);
    info!(environment = %settings.environment, "Starting verge...");
    metrics::init_metrics(&settings.metrics);

    // 3. Build the Firecrawl client; a missing or malformed key stops startup here
    let client = FirecrawlClient::new(&settings.firecrawl)
        .context("Failed to initialize Firecrawl client")?;
    let service = Arc::new(
        ExtractionService::new(Arc::new(client)).with_timeout(settings.firecrawl.timeout()),
    );
    info!("Extraction service initialized");

    if settings.auth.api_keys.is_empty() {
        warn!("No API keys configured; every /v1/extract request will be rejected");
    }

    // 4. Rate limiter
    let rate_limiter = settings.rate_limiting.enabled.then(|| {
        let limiter = Arc::new(RateLimiter::new(settings.rate_limiting.default_rpm));
        let cleanup = limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                cleanup.cleanup();
            }
        });
        limiter
    });

    // 5. Start HTTP server
    let app = routes::routes(settings.clone(), service, rate_limiter);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
