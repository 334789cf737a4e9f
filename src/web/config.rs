//! Web 服务器配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use crate::env::{EnvError, EnvResult, EnvVar};
use crate::translation::{LingoConfig, OpenRouterConfig};

/// 请求体大小上限（整页 HTML 可能很大）
pub const DEFAULT_BODY_LIMIT: usize = 15 * 1024 * 1024;

/// Web 服务器配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// 请求体大小上限（字节）
    pub body_limit: usize,
    /// 本地化服务配置
    pub lingo: LingoConfig,
    /// chat-completion 服务配置
    pub openrouter: OpenRouterConfig,
}

impl WebConfig {
    /// 从环境变量创建配置
    ///
    /// 缺少本地化 API 密钥时返回错误
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::{lingo, openrouter, web};

        let mut lingo_config = LingoConfig::new(lingo::ApiKey::get()?);
        lingo_config.api_url = lingo::ApiUrl::get()?;

        let openrouter_config = OpenRouterConfig {
            api_key: openrouter::ApiKey::get()?,
            api_url: openrouter::ApiUrl::get()?,
            model: openrouter::Model::get()?,
            referer: openrouter::FrontendUrl::get()?,
        };

        Ok(Self {
            bind_addr: web::BindAddress::get()?,
            port: web::Port::get()?,
            body_limit: DEFAULT_BODY_LIMIT,
            lingo: lingo_config,
            openrouter: openrouter_config,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.is_empty() {
            return Err(EnvError {
                variable: "RELAY_BIND_ADDRESS".to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: "PORT".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.lingo.api_key.trim().is_empty() {
            return Err(EnvError {
                variable: "LINGODOTDEV_API_KEY".to_string(),
                message: "API key cannot be empty".to_string(),
            });
        }

        if self.openrouter.api_key.is_empty() {
            tracing::warn!("OPENROUTER_API_KEY 未设置，/api/generate 将返回 500");
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
