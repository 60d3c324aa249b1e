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

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、Firecrawl、认证、速率限制、CORS、日志和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 运行环境 (development, production, test)
    pub environment: String,
    /// 服务器配置
    pub server: ServerSettings,
    /// Firecrawl 配置
    pub firecrawl: FirecrawlSettings,
    /// 认证配置
    pub auth: AuthSettings,
    /// 速率限制配置
    pub rate_limiting: RateLimitingSettings,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsSettings,
    /// 日志配置
    pub log: LogSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 请求体大小上限（字节）
    pub body_limit_bytes: usize,
}

/// Firecrawl 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FirecrawlSettings {
    /// API 密钥（必须以 `fc-` 开头）
    pub api_key: Option<String>,
    /// API 基础地址
    pub api_url: String,
    /// 单次外部调用的截止时间（秒），未设置则不限制
    pub timeout_secs: Option<u64>,
}

impl FirecrawlSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// 认证配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// 允许访问的 API 密钥列表
    pub api_keys: Vec<String>,
}

/// 速率限制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitingSettings {
    /// 是否启用速率限制
    pub enabled: bool,
    /// 默认每分钟请求数限制
    pub default_rpm: u32,
}

/// CORS 配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsSettings {
    /// 允许的来源，未设置则不添加 CORS 头
    pub origin: Option<String>,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// 过滤指令，RUST_LOG 优先
    pub level: String,
    /// 输出格式 (pretty, json)
    pub format: String,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听端口
    pub port: u16,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和 `VERGE_` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("VERGE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.api_keys")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置构建器
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", "development")?
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.body_limit_bytes", 1024 * 1024)?
            // Firecrawl
            .set_default("firecrawl.api_url", "https://api.firecrawl.dev")?
            // Auth
            .set_default("auth.api_keys", Vec::<String>::new())?
            // Rate limiting
            .set_default("rate_limiting.enabled", true)?
            .set_default("rate_limiting.default_rpm", 100)?
            // Logging
            .set_default("log.level", "info,verge=debug")?
            .set_default("log.format", "pretty")?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9000)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
