//! 文本生成API处理器

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

use super::{error_response, parse_body, ApiError};
use crate::translation::{generate_with_mood, Mood};
use crate::web::types::{non_empty, AppState, GenerateRequest, GenerateResponse};

/// 按情绪改写文本
pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request = parse_body(body)?;

    let Some(text) = non_empty(request.text) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "no text"));
    };
    let mood = Mood::from_lenient(request.mood.as_deref());

    tracing::info!("开始生成文本，情绪: {}，长度: {}", mood, text.chars().count());

    match generate_with_mood(state.completion.as_ref(), &text, mood).await {
        Ok(generated) => Ok(Json(GenerateResponse { generated })),
        Err(e) => {
            tracing::error!("Generate error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "generation failed",
            ))
        }
    }
}
