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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::settings::FirecrawlSettings;
use crate::domain::models::extraction::{OutputFormat, ScrapeDocument};
use crate::domain::scrape_client::{ProviderError, ScrapeClient};

/// Firecrawl API 密钥前缀
const API_KEY_PREFIX: &str = "fc-";

/// Firecrawl 客户端构造错误
#[derive(Error, Debug)]
pub enum FirecrawlConfigError {
    #[error("FIRECRAWL_API_KEY is not set")]
    MissingApiKey,
    #[error("FIRECRAWL_API_KEY must start with 'fc-'")]
    InvalidApiKey,
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Firecrawl 客户端
///
/// 在启动时显式构造并注入到需要它的组件中；密钥缺失或格式错误在构造时即报告。
pub struct FirecrawlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ScrapeRequestBody<'a> {
    url: &'a str,
    formats: &'a [OutputFormat],
}

#[derive(Deserialize, Debug)]
struct ScrapeResponseBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeDocument>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl FirecrawlClient {
    pub fn new(settings: &FirecrawlSettings) -> Result<Self, FirecrawlConfigError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(FirecrawlConfigError::MissingApiKey)?;

        if !api_key.starts_with(API_KEY_PREFIX) {
            return Err(FirecrawlConfigError::InvalidApiKey);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("verge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: settings.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn scrape_endpoint(&self) -> String {
        format!("{}/v2/scrape", self.base_url)
    }
}

#[async_trait]
impl ScrapeClient for FirecrawlClient {
    async fn scrape(
        &self,
        url: &str,
        formats: &[OutputFormat],
    ) -> Result<ScrapeDocument, ProviderError> {
        let body = ScrapeRequestBody { url, formats };

        let resp = self
            .client
            .post(self.scrape_endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        debug!(status = status.as_u16(), "Firecrawl responded");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.error.or(b.message))
                .filter(|m| !m.is_empty())
                .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ScrapeResponseBody = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if !parsed.success {
            return Err(ProviderError::Api(
                parsed
                    .error
                    .unwrap_or_else(|| "Firecrawl reported an unsuccessful scrape".to_string()),
            ));
        }

        Ok(parsed.data.unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "firecrawl"
    }
}
