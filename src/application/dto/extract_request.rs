// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::errors::ExtractError;
use crate::domain::models::extraction::ExtractionRequest;
use crate::utils::validators::validate_url;

/// 提取请求数据传输对象
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_prompt_or_schema", skip_on_field_errors = false))]
pub struct ExtractRequestDto {
    /// 目标URL，需通过 SSRF 检查
    #[validate(custom(function = "validate_safe_url"))]
    pub url: String,
    /// 自然语言提取提示
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Prompt must be between 1 and 2000 characters"
    ))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// JSON schema 形式的输出结构
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Map<String, Value>>,
}

fn validate_safe_url(url: &str) -> Result<(), ValidationError> {
    validate_url(url).map(|_| ()).map_err(|rejection| {
        ValidationError::new("unsafe_url").with_message(Cow::Owned(rejection.to_string()))
    })
}

fn validate_prompt_or_schema(dto: &ExtractRequestDto) -> Result<(), ValidationError> {
    if dto.prompt.is_none() && dto.output_schema.is_none() {
        return Err(ValidationError::new("prompt_or_schema").with_message(Cow::Borrowed(
            "Either prompt or outputSchema must be provided",
        )));
    }
    Ok(())
}

/// 将校验错误整理为单行消息（按字段名排序）
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                if field == "__all__" {
                    message
                } else {
                    format!("{}: {}", field, message)
                }
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl TryFrom<ExtractRequestDto> for ExtractionRequest {
    type Error = ExtractError;

    fn try_from(dto: ExtractRequestDto) -> Result<Self, Self::Error> {
        dto.validate()
            .map_err(|errors| ExtractError::BadRequest(describe_validation_errors(&errors)))?;

        Ok(ExtractionRequest::from_validated(
            dto.url,
            dto.prompt,
            dto.output_schema,
        ))
    }
}
