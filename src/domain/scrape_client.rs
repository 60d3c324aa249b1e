// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::extraction::{OutputFormat, ScrapeDocument};

/// 提取提供方错误类型
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 提供方返回了非成功的 HTTP 状态
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },
    /// 请求发送失败
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// 提供方在成功响应中报告失败
    #[error("{0}")]
    Api(String),
    /// 响应体无法解析
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// 提供方给出的 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 是否为传输层超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Transport(e) if e.is_timeout())
    }

    /// 用于分类的人类可读消息
    pub fn message(&self) -> String {
        match self {
            ProviderError::Http { message, .. } => message.clone(),
            ProviderError::Api(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// 抓取客户端特质
///
/// 每次调用对应恰好一次对外请求，不做重试。
#[async_trait]
pub trait ScrapeClient: Send + Sync {
    /// 抓取页面并按给定格式返回内容
    async fn scrape(
        &self,
        url: &str,
        formats: &[OutputFormat],
    ) -> Result<ScrapeDocument, ProviderError>;

    /// 客户端名称
    fn name(&self) -> &'static str;
}
