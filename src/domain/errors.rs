// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use thiserror::Error;

use crate::domain::scrape_client::ProviderError;

/// 面向调用方的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    TooManyRequests,
    Timeout,
    NotFound,
    InternalServerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// 提取错误类型
///
/// 显示文本即返回给最终用户的消息，内部错误的原始原因只保留在 `source` 中。
#[derive(Error, Debug)]
pub enum ExtractError {
    /// 输入校验失败，未发起任何外部请求
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("The request timed out. The page may be too large or slow to respond.")]
    Timeout,

    #[error("The URL could not be found or is not accessible.")]
    NotFound,

    #[error("An error occurred while scraping the URL")]
    Internal(#[source] ProviderError),
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::BadRequest(_) => ErrorKind::BadRequest,
            ExtractError::Unauthorized => ErrorKind::Unauthorized,
            ExtractError::RateLimited => ErrorKind::TooManyRequests,
            ExtractError::Timeout => ErrorKind::Timeout,
            ExtractError::NotFound => ErrorKind::NotFound,
            ExtractError::Internal(_) => ErrorKind::InternalServerError,
        }
    }
}

/// 将提供方错误映射为调用方错误分类
///
/// 优先使用结构化的 HTTP 状态码；没有可用状态码时，退回到对错误消息的
/// 子串匹配。子串匹配依赖提供方的人类可读文本，比较脆弱，但顺序固定：
/// "rate limit" → "timeout" → "not found"/"404" → 内部错误。
pub fn classify_provider_error(error: ProviderError) -> ExtractError {
    match error.status() {
        Some(429) => return ExtractError::RateLimited,
        Some(408) | Some(504) => return ExtractError::Timeout,
        Some(404) => return ExtractError::NotFound,
        _ => {}
    }

    if error.is_timeout() {
        return ExtractError::Timeout;
    }

    let message = error.message().to_lowercase();
    if message.contains("rate limit") {
        ExtractError::RateLimited
    } else if message.contains("timeout") {
        ExtractError::Timeout
    } else if message.contains("not found") || message.contains("404") {
        ExtractError::NotFound
    } else {
        ExtractError::Internal(error)
    }
}
