//! Web 路由定义

use std::sync::Arc;

use axum::{routing::post, Router};

use crate::web::{handlers::*, types::AppState};

/// 创建中继服务路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/detect", post(detect_language))
        .route("/translateText", post(translate_text))
        .route("/translateHtml", post(translate_html))
        // 弹窗使用的兼容端点
        .route("/translate", post(translate_legacy))
        .route("/api/generate", post(generate_text))
}
