//! API 处理器
//!
//! 所有端点都返回结构完整的 JSON，上游错误不会让请求失败

pub mod detect;
pub mod generate;
pub mod translation;

pub use detect::*;
pub use generate::*;
pub use translation::*;

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::Json};
use serde_json::Value;

/// 处理器错误响应
pub type ApiError = (StatusCode, Json<Value>);

/// 构造 `{ "error": ... }` 错误响应
pub fn error_response(status: StatusCode, error: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": error })))
}

/// 解析请求体，格式错误时返回 400 JSON
pub fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            tracing::warn!("请求体解析失败: {}", rejection.body_text());
            Err(error_response(StatusCode::BAD_REQUEST, "invalid request body"))
        }
    }
}
