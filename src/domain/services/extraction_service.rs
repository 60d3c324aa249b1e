// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::{classify_provider_error, ExtractError};
use crate::domain::models::extraction::{
    ExtractionMetadata, ExtractionRequest, ExtractionResult, OutputFormat, ScrapeDocument,
};
use crate::domain::scrape_client::ScrapeClient;

/// 提取服务
///
/// 将已校验的提取请求转换为一次对提取提供方的调用，规范化返回结果，
/// 并把提供方错误映射为固定的错误分类。不重试；超时仅在配置了截止时间时生效。
#[derive(Clone)]
pub struct ExtractionService {
    client: Arc<dyn ScrapeClient>,
    timeout: Option<Duration>,
}

impl ExtractionService {
    pub fn new(client: Arc<dyn ScrapeClient>) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// 为单次外部调用设置截止时间，超时映射为 `ExtractError::Timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 构造请求的输出格式列表
    ///
    /// 始终包含 markdown；有 schema 时追加带 schema（及可选 prompt）的 JSON 提取，
    /// 仅有 prompt 时追加只带 prompt 的 JSON 提取。
    pub fn build_formats(request: &ExtractionRequest) -> Vec<OutputFormat> {
        let mut formats = vec![OutputFormat::Markdown];

        if let Some(schema) = request.output_schema() {
            formats.push(OutputFormat::Json {
                schema: Some(schema.clone()),
                prompt: request.prompt().map(str::to_string),
            });
        } else if let Some(prompt) = request.prompt() {
            formats.push(OutputFormat::Json {
                schema: None,
                prompt: Some(prompt.to_string()),
            });
        }

        formats
    }

    /// 执行提取
    ///
    /// # 参数
    ///
    /// * `request` - 已校验的提取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractionResult)` - 提取成功
    /// * `Err(ExtractError)` - 已分类的提供方错误
    #[instrument(skip_all, fields(url = %request.url(), client = self.client.name()))]
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractError> {
        let formats = Self::build_formats(request);
        debug!(
            has_schema = request.output_schema().is_some(),
            has_prompt = request.prompt().is_some(),
            formats = ?formats,
            "Calling extraction provider"
        );

        let started = Instant::now();
        let call = self.client.scrape(request.url(), &formats);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(|e| {
                    error!(error = %e, "Extraction provider error");
                    classify_provider_error(e)
                }),
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Extraction provider call exceeded deadline");
                    Err(ExtractError::Timeout)
                }
            },
            None => call.await.map_err(|e| {
                error!(error = %e, "Extraction provider error");
                classify_provider_error(e)
            }),
        };
        histogram!("extract_duration_seconds").record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(document) => {
                let result = normalize(request.url(), document);
                info!(has_data = !result.data.is_null(), "Extraction completed");
                counter!("extract_requests_total", "outcome" => "success").increment(1);
                Ok(result)
            }
            Err(e) => {
                info!(kind = e.kind().as_str(), "Extraction failed");
                counter!("extract_requests_total", "outcome" => e.kind().as_str()).increment(1);
                Err(e)
            }
        }
    }
}

fn normalize(url: &str, document: ScrapeDocument) -> ExtractionResult {
    let data = document
        .json
        .or_else(|| document.markdown.map(Value::String))
        .unwrap_or(Value::Null);

    let metadata = document.metadata.unwrap_or_default();

    ExtractionResult {
        success: true,
        data,
        metadata: Some(ExtractionMetadata {
            title: metadata.title,
            source_url: metadata.source_url.unwrap_or_else(|| url.to_string()),
        }),
    }
}
