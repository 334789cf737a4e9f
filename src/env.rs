//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，`.env` 文件由 `dotenv` 加载

use std::env;
use std::fmt;
use std::path::Path;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

impl EnvError {
    /// 启动失败时展示给用户的提示
    pub fn startup_message(&self) -> String {
        if self.variable == lingo::ApiKey::NAME {
            format!("Error: {} is not set in environment variables.", self.variable)
        } else {
            format!("Error: {}", self)
        }
    }
}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 按优先级加载 .env 文件，找到第一个即停止
pub fn load_dotenv() {
    let env_files = [".env.local", ".env.development", ".env"];

    for env_file in &env_files {
        if Path::new(env_file).exists() {
            match dotenv::from_filename(env_file) {
                Ok(_) => {
                    tracing::info!("已加载环境变量文件: {}", env_file);
                    return;
                }
                Err(e) => tracing::warn!("无法加载环境变量文件 {}: {}", env_file, e),
            }
        }
    }

    if let Err(e) = dotenv::dotenv() {
        tracing::debug!("未找到 .env 文件或加载失败: {}", e);
    }
}

/// 初始化日志订阅器
#[cfg(any(feature = "cli", feature = "web"))]
pub fn init_tracing() {
    let level = core::LogLevel::get_or_default("info".to_string());
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let no_color = core::NoColor::get_or_default(false);

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 应用运行模式
    pub struct Mode;
    impl EnvVar<String> for Mode {
        const NAME: &'static str = "RELAY_MODE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Application mode: development, production";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("production".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "development" | "dev" => Ok("development".to_string()),
                "production" | "prod" => Ok("production".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid mode '{}'. Use: development, production", value),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "RELAY_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            Ok(!value.is_empty())
        }
    }
}

/// 本地化服务相关环境变量
pub mod lingo {
    use super::*;

    /// API 密钥，启动时必须提供
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "LINGODOTDEV_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key for the localization engine (required)";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// API 地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "LINGODOTDEV_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Localization engine base URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::engine::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }
}

/// chat-completion 服务相关环境变量
pub mod openrouter {
    use super::*;
    use crate::translation::generate;

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "OPENROUTER_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key for the chat-completion endpoint";

        fn get() -> EnvResult<String> {
            Ok(env::var(Self::NAME).unwrap_or_default())
        }

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// chat-completion 地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "OPENROUTER_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Chat-completion endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(generate::DEFAULT_COMPLETION_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 模型名称
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "OPENROUTER_MODEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Model used for mood rewriting";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(generate::DEFAULT_MODEL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let model = value.trim();
            if model.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Model cannot be empty".to_string(),
                });
            }
            Ok(model.to_string())
        }
    }

    /// 来源页面（HTTP-Referer）
    pub struct FrontendUrl;
    impl EnvVar<String> for FrontendUrl {
        const NAME: &'static str = "FRONTEND_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Referer reported to the chat-completion endpoint";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(generate::DEFAULT_REFERER.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }
}

/// Web 服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "RELAY_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Relay server bind address";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "PORT";
        const DEFAULT: Option<u16> = Some(5001);
        const DESCRIPTION: &'static str = "Relay server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }
}

/// 扩展端（CLI）相关环境变量
pub mod extension {
    use super::*;

    /// 中继服务地址
    pub struct RelayUrl;
    impl EnvVar<String> for RelayUrl {
        const NAME: &'static str = "AI_TRANSLATOR_RELAY_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Relay service base URL used by the extension side";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("http://localhost:5001".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 偏好设置数据库路径
    pub struct StorePath;
    impl EnvVar<String> for StorePath {
        const NAME: &'static str = "AI_TRANSLATOR_STORE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the preference and history database";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("ai-translator.redb".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let value = value.trim();
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {
            Ok(value.to_string())
        }
        Ok(parsed) => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Unsupported URL scheme '{}'", parsed.scheme()),
        }),
        Err(e) => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid URL '{}': {}", value, e),
        }),
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub mode: String,
    pub log_level: String,

    pub lingo_api_key: Option<String>,
    pub lingo_api_url: String,

    pub openrouter_api_key: String,
    pub openrouter_api_url: String,
    pub openrouter_model: String,
    pub frontend_url: String,

    pub bind_address: String,
    pub port: u16,

    pub relay_url: String,
    pub store_path: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            mode: core::Mode::get()?,
            log_level: core::LogLevel::get()?,

            lingo_api_key: lingo::ApiKey::get().ok(),
            lingo_api_url: lingo::ApiUrl::get()?,

            openrouter_api_key: openrouter::ApiKey::get()?,
            openrouter_api_url: openrouter::ApiUrl::get()?,
            openrouter_model: openrouter::Model::get()?,
            frontend_url: openrouter::FrontendUrl::get()?,

            bind_address: web::BindAddress::get()?,
            port: web::Port::get()?,

            relay_url: extension::RelayUrl::get()?,
            store_path: extension::StorePath::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Mode: {}", self.mode);
        println!("  Log Level: {}", self.log_level);
        println!("  Relay Server: {}:{}", self.bind_address, self.port);
        println!("  Localization API: {}", self.lingo_api_url);
        println!(
            "  Localization Key: {}",
            if self.lingo_api_key.is_some() { "[configured]" } else { "[missing]" }
        );
        println!("  Completion API: {} ({})", self.openrouter_api_url, self.openrouter_model);
        if !self.openrouter_api_key.is_empty() {
            println!("  Completion Key: [configured]");
        }
    }
}

fn doc_line<T: fmt::Debug>(name: &str, description: &str, default: Option<T>) -> String {
    format!("- `{}`: {} (default: {:?})\n", name, description, default)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&doc_line(core::Mode::NAME, core::Mode::DESCRIPTION, core::Mode::DEFAULT));
    docs.push_str(&doc_line(
        core::LogLevel::NAME,
        core::LogLevel::DESCRIPTION,
        core::LogLevel::DEFAULT,
    ));
    docs.push_str(&doc_line(
        core::NoColor::NAME,
        core::NoColor::DESCRIPTION,
        core::NoColor::DEFAULT,
    ));

    docs.push_str("\n## Localization\n\n");
    docs.push_str(&doc_line(
        lingo::ApiKey::NAME,
        lingo::ApiKey::DESCRIPTION,
        lingo::ApiKey::DEFAULT,
    ));
    docs.push_str(&doc_line(
        lingo::ApiUrl::NAME,
        lingo::ApiUrl::DESCRIPTION,
        Some(crate::translation::engine::DEFAULT_API_URL),
    ));

    docs.push_str("\n## Text Generation\n\n");
    docs.push_str(&doc_line(
        openrouter::ApiKey::NAME,
        openrouter::ApiKey::DESCRIPTION,
        openrouter::ApiKey::DEFAULT,
    ));
    docs.push_str(&doc_line(
        openrouter::ApiUrl::NAME,
        openrouter::ApiUrl::DESCRIPTION,
        Some(crate::translation::generate::DEFAULT_COMPLETION_URL),
    ));
    docs.push_str(&doc_line(
        openrouter::Model::NAME,
        openrouter::Model::DESCRIPTION,
        Some(crate::translation::generate::DEFAULT_MODEL),
    ));
    docs.push_str(&doc_line(
        openrouter::FrontendUrl::NAME,
        openrouter::FrontendUrl::DESCRIPTION,
        Some(crate::translation::generate::DEFAULT_REFERER),
    ));

    docs.push_str("\n## Relay Server\n\n");
    docs.push_str(&doc_line(
        web::BindAddress::NAME,
        web::BindAddress::DESCRIPTION,
        Some("127.0.0.1"),
    ));
    docs.push_str(&doc_line(web::Port::NAME, web::Port::DESCRIPTION, web::Port::DEFAULT));

    docs.push_str("\n## Extension\n\n");
    docs.push_str(&doc_line(
        extension::RelayUrl::NAME,
        extension::RelayUrl::DESCRIPTION,
        Some("http://localhost:5001"),
    ));
    docs.push_str(&doc_line(
        extension::StorePath::NAME,
        extension::StorePath::DESCRIPTION,
        Some("ai-translator.redb"),
    ));

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_mode_parsing() {
        assert_eq!(core::Mode::parse("development").unwrap(), "development");
        assert_eq!(core::Mode::parse("PROD").unwrap(), "production");
        assert!(core::Mode::parse("invalid").is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(lingo::ApiUrl::parse("http://localhost:9000").is_ok());
        assert!(openrouter::ApiUrl::parse("https://openrouter.ai/api/v1/chat/completions").is_ok());

        assert!(lingo::ApiUrl::parse("ftp://example.com").is_err());
        assert!(lingo::ApiUrl::parse("not-a-url").is_err());
    }

    #[test]
    fn test_port_validation() {
        assert_eq!(web::Port::parse("5001").unwrap(), 5001);
        assert!(web::Port::parse("0").is_err());
        assert!(web::Port::parse("70000").is_err());
        assert!(web::Port::parse("abc").is_err());
    }

    #[test]
    fn test_api_key_rejects_blank() {
        assert!(lingo::ApiKey::parse("   ").is_err());
        assert_eq!(lingo::ApiKey::parse(" key ").unwrap(), "key");
    }

    #[test]
    fn test_startup_message_names_the_failing_variable() {
        let missing_key = EnvError {
            variable: lingo::ApiKey::NAME.to_string(),
            message: "Required environment variable not set".to_string(),
        };
        assert_eq!(
            missing_key.startup_message(),
            "Error: LINGODOTDEV_API_KEY is not set in environment variables."
        );

        let bad_port = web::Port::parse("abc").unwrap_err();
        let message = bad_port.startup_message();
        assert!(message.contains("PORT"), "{}", message);
        assert!(!message.contains("LINGODOTDEV_API_KEY"));
    }

    #[test]
    fn test_env_docs_mention_every_variable() {
        let docs = generate_env_docs();
        for name in [
            "LINGODOTDEV_API_KEY",
            "OPENROUTER_API_KEY",
            "FRONTEND_URL",
            "PORT",
            "AI_TRANSLATOR_RELAY_URL",
        ] {
            assert!(docs.contains(name), "missing {}", name);
        }
    }
}
