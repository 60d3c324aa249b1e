// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::rejection::JsonRejection, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::dto::extract_request::ExtractRequestDto;
use crate::domain::errors::ExtractError;
use crate::domain::models::extraction::{ExtractionRequest, ExtractionResult};
use crate::domain::services::extraction_service::ExtractionService;
use crate::presentation::middleware::auth_middleware::Principal;

/// 提取处理器
///
/// 校验请求体后执行一次提取；校验失败时不会发起任何外部请求
///
/// # 参数
///
/// * `service` - 提取服务
/// * `principal` - 认证中间件注入的调用方
/// * `payload` - 请求体
///
/// # 返回值
///
/// * `Ok(Json<ExtractionResult>)` - 提取结果
/// * `Err(ExtractError)` - 已分类的错误
#[instrument(skip_all, fields(user_id = %principal.id))]
pub async fn extract_data(
    Extension(service): Extension<Arc<ExtractionService>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ExtractRequestDto>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ExtractError> {
    let Json(payload) = payload.map_err(|rejection| ExtractError::BadRequest(rejection.body_text()))?;

    info!(
        url = %payload.url,
        has_schema = payload.output_schema.is_some(),
        has_prompt = payload.prompt.is_some(),
        "Extracting data from URL"
    );

    let request = ExtractionRequest::try_from(payload)?;
    let result = service.extract(&request).await?;

    info!(has_data = !result.data.is_null(), "Data extracted successfully");
    Ok(Json(result))
}
