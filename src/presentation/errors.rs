// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::errors::{ErrorKind, ExtractError};

/// 错误分类对应的 HTTP 状态码
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 统一错误响应
///
/// 响应体只包含错误码和面向用户的消息，内部原因不会输出给调用方
impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let body = Json(json!({
            "success": false,
            "error": {
                "code": kind.as_str(),
                "message": self.to_string(),
            }
        }));
        (status_for(kind), body).into_response()
    }
}
