//! Web 服务器模块
//!
//! 中继服务：校验输入，把请求转发给外部本地化和文本生成服务，再整理响应

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::CorsLayer;

use crate::translation::{LingoEngine, OpenRouterClient, TranslationError, TranslationResult};

/// 中继服务器
pub struct RelayServer {
    config: WebConfig,
    state: Arc<AppState>,
}

impl RelayServer {
    /// 使用真实的上游客户端创建服务器
    pub fn new(config: WebConfig) -> TranslationResult<Self> {
        let engine = LingoEngine::new(config.lingo.clone())?;
        let completion = OpenRouterClient::new(config.openrouter.clone())?;
        let state = Arc::new(AppState::new(Arc::new(engine), Arc::new(completion)));
        Ok(Self { config, state })
    }

    /// 使用自定义上游创建服务器
    pub fn with_state(config: WebConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建路由器
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.config.body_limit)
    }

    /// 启动中继服务器
    pub async fn start(&self) -> TranslationResult<()> {
        let app = self.router();
        let address = self.config.listen_address();

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| TranslationError::ConfigError(format!("Failed to bind server: {}", e)))?;

        tracing::info!("Backend running on http://{}", address);

        axum::serve(listener, app)
            .await
            .map_err(|e| TranslationError::ServiceError(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>, body_limit: usize) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
}
