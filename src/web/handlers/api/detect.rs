//! 语言检测API处理器

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::web::types::{non_empty, AppState, DetectRequest, DetectResponse};

/// 语言检测处理器
///
/// 任何失败（包括请求体错误）都返回空语言，不向调用方报错
pub async fn detect_language(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DetectRequest>, JsonRejection>,
) -> Json<DetectResponse> {
    let text = body.ok().and_then(|Json(request)| non_empty(request.text));

    let Some(text) = text else {
        return Json(DetectResponse {
            language: String::new(),
        });
    };

    let language = match state.engine.recognize_locale(&text).await {
        Ok(locale) => locale,
        Err(e) => {
            tracing::error!("Detect error: {}", e);
            String::new()
        }
    };

    tracing::debug!("检测到语言: {:?}", language);
    Json(DetectResponse { language })
}
