//! 中继服务主程序入口

use clap::Parser;

use ai_translator::env::{init_tracing, load_dotenv, EnvConfig};
use ai_translator::web::{RelayServer, WebConfig};

#[derive(Parser, Debug)]
#[command(
    name = "ai-translator-relay",
    version,
    about = "Relay between the AI Translator extension and the localization/generation services"
)]
struct Args {
    /// Bind address (overrides RELAY_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the environment configuration and exit
    #[arg(long)]
    show_config: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    load_dotenv();
    init_tracing();

    if args.show_config {
        match EnvConfig::from_env() {
            Ok(config) => config.print_summary(),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }

    let mut config = match WebConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.startup_message());
            std::process::exit(1);
        }
    };

    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let server = match RelayServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        tracing::error!("中继服务异常退出: {}", e);
        std::process::exit(1);
    }
}
