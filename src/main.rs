//! 命令行入口：弹窗功能与整页翻译

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use tokio::task::LocalSet;

use ai_translator::content::{HttpRelayClient, LiveDocument, PageTranslator, RelayApi, UserNotifier};
use ai_translator::env::{extension, generate_env_docs, init_tracing, load_dotenv, EnvVar};
use ai_translator::shell::{ExtensionMessage, Popup, PreferenceStore, RedbStore};
use ai_translator::translation::Mood;
use ai_translator::{locale_code, TranslationError};

#[derive(Parser, Debug)]
#[command(name = "ai-translator", version, about = "AI Translator from the command line")]
struct Cli {
    /// Relay base URL (overrides AI_TRANSLATOR_RELAY_URL)
    #[arg(long, global = true)]
    relay: Option<String>,

    /// Preference database path (overrides AI_TRANSLATOR_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate text into the saved target language
    Translate { text: String },
    /// Detect the language of text
    Detect { text: String },
    /// Rephrase text in a mood
    Generate {
        text: String,
        #[arg(short, long, default_value = "neutral")]
        mood: String,
    },
    /// Translate an HTML file as the page script would
    Page {
        file: PathBuf,
        /// Target locale code, defaults to the saved target language
        #[arg(short, long)]
        target: Option<String>,
        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or clear the translation history
    History {
        #[arg(long)]
        clear: bool,
    },
    /// Show or set the target language by name, e.g. "French"
    Target { language: Option<String> },
    /// Toggle automatic caption translation
    Youtube,
    /// Print the environment variable reference
    EnvDocs,
}

struct StderrNotifier;

impl UserNotifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    load_dotenv();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::EnvDocs = cli.command {
        print!("{}", generate_env_docs());
        return Ok(());
    }

    let relay_url = match cli.relay {
        Some(url) => extension::RelayUrl::parse(&url)?,
        None => extension::RelayUrl::get()?,
    };
    let store_path = match cli.store {
        Some(path) => path,
        None => PathBuf::from(extension::StorePath::get()?),
    };

    let relay: Rc<dyn RelayApi> = Rc::new(HttpRelayClient::new(relay_url)?);
    let store: Rc<dyn PreferenceStore> = Rc::new(RedbStore::open(&store_path)?);
    let popup = Popup::new(store.clone(), relay.clone());

    match cli.command {
        Command::Translate { text } => {
            let outcome = popup.translate(&text).await?;
            println!("Detected: {}", outcome.detected);
            println!("{}", outcome.translated);
        }
        Command::Detect { text } => {
            let language = relay.detect(&text).await;
            println!("{}", if language.is_empty() { "unknown" } else { language.as_str() });
        }
        Command::Generate { text, mood } => {
            let generated = popup.generate(&text, Mood::from_lenient(Some(mood.as_str()))).await?;
            println!("{}", generated);
        }
        Command::Page {
            file,
            target,
            output,
        } => {
            let markup = fs::read_to_string(&file)?;
            let target = match target {
                Some(code) => code,
                None => locale_code(&store.target_language()?),
            };
            let translated = translate_page(&markup, &target, relay).await?;
            match output {
                Some(path) => fs::write(path, translated)?,
                None => io::stdout().write_all(translated.as_bytes())?,
            }
        }
        Command::History { clear } => {
            if clear {
                popup.clear_history()?;
                println!("History cleared.");
            } else {
                let history = popup.history()?;
                if history.is_empty() {
                    println!("No history yet.");
                }
                for entry in history.entries() {
                    println!(
                        "[{}] {} → {}: {} => {}",
                        entry.at.format("%Y-%m-%d %H:%M:%S"),
                        entry.detected,
                        entry.target,
                        entry.text,
                        entry.translated
                    );
                }
            }
        }
        Command::Target { language } => match language {
            Some(language) => {
                popup.set_target(&language)?;
                println!("Target language: {} ({})", language, locale_code(&language));
            }
            None => {
                let language = popup.target_language()?;
                println!("Target language: {} ({})", language, locale_code(&language));
            }
        },
        Command::Youtube => {
            if let ExtensionMessage::ToggleYoutube { enabled } = popup.toggle_youtube()? {
                println!(
                    "Caption translation {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
        }
        Command::EnvDocs => {}
    }

    Ok(())
}

async fn translate_page(
    markup: &str,
    target: &str,
    relay: Rc<dyn RelayApi>,
) -> Result<String, TranslationError> {
    let local = LocalSet::new();
    local
        .run_until(async move {
            let document = Rc::new(LiveDocument::parse(markup));
            let translator =
                PageTranslator::new(document.clone(), relay, Rc::new(StderrNotifier));
            let session = translator.translate_full_page(target).await?;
            session.stop();
            Ok(document.markup())
        })
        .await
}
