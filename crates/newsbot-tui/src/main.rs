//! NewsBot terminal client.
//!
//! Chat with the RAG NewsBot assistant from the terminal: an interactive TUI
//! by default, plus one-shot subcommands for scripting.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsbot_client::{HttpClient, NewsService};
use newsbot_session::config::{default_data_dir, DEFAULT_BASE_URL};
use newsbot_session::{EngineConfig, SessionStore};

mod app;
mod backend;
mod commands;
mod event;
mod state;
mod ui;

use app::App;
use event::{BackendCommand, UiEvent};

/// Log file name inside the data directory.
const LOG_FILE: &str = "newsbot.log";

#[derive(Parser, Debug)]
#[command(name = "newsbot")]
#[command(about = "Chat with the RAG NewsBot from your terminal")]
#[command(version)]
struct Cli {
    /// Base URL of the assistant service
    #[arg(long, env = "NEWSBOT_API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_base_url: String,

    /// Seconds to wait for any request before giving up
    #[arg(long, env = "NEWSBOT_TIMEOUT_SECS", default_value_t = 60, global = true)]
    timeout_secs: u64,

    /// Directory for the session id, history and log file
    #[arg(long, env = "NEWSBOT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Topic suggested in an empty history (repeatable)
    #[arg(
        long = "seed-topic",
        env = "NEWSBOT_SEED_TOPICS",
        value_delimiter = ',',
        global = true
    )]
    seed_topics: Vec<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Interactive chat (default)
    Chat,

    /// Send one message and print the reply
    Ask {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print the conversation of the current session
    History,

    /// Start the current conversation over
    Reset,

    /// Show the current session id
    Session,

    /// Remove the stored session and history
    Forget,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let data_dir = if self.ephemeral {
            None
        } else {
            self.data_dir.clone().or_else(default_data_dir)
        };
        EngineConfig::default()
            .with_base_url(&self.api_base_url)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_data_dir(data_dir)
            .with_seed_topics(self.seed_topics.clone())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.engine_config();
    let command = cli.command.unwrap_or(Commands::Chat);

    // The TUI owns the terminal, so it logs to a file.
    if command == Commands::Chat {
        let log_dir = config.data_dir.clone().unwrap_or_else(std::env::temp_dir);
        init_tracing(Some(&log_dir.join(LOG_FILE)), cli.verbose);
    } else {
        init_tracing(None, cli.verbose);
    }

    let store = SessionStore::open(config.data_dir.as_deref());
    let service: Arc<dyn NewsService> = Arc::new(HttpClient::with_timeout(
        &config.base_url,
        config.request_timeout,
    )?);

    match command {
        Commands::Chat => run_chat_tui(config, service, store),
        Commands::Ask { text } => {
            let rt = tokio::runtime::Runtime::new()?;
            let answered = rt.block_on(commands::ask(&config, service, store, &text.join(" ")))?;
            if !answered {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::History => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::history(&config, service, store))
        }
        Commands::Reset => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::reset(&config, service, store))
        }
        Commands::Session => {
            commands::session(store);
            Ok(())
        }
        Commands::Forget => commands::forget(&config, service, store),
    }
}

/// Install the global subscriber: `RUST_LOG`, else `newsbot=info`.
fn init_tracing(log_path: Option<&Path>, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("newsbot=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsbot=info"))
    };

    match log_path {
        Some(path) => {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            // Without a log file the TUI runs silently.
            if let Ok(file) = std::fs::File::create(path) {
                tracing_subscriber::fmt()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .init();
            }
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
}

fn run_chat_tui(
    config: EngineConfig,
    service: Arc<dyn NewsService>,
    store: SessionStore,
) -> Result<(), Box<dyn Error>> {
    info!(base_url = %config.base_url, "Starting chat TUI");

    // Create channels for UI <-> backend communication
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(100);
    let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(100);

    // Background thread with its own tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    let bg_handle = std::thread::spawn(move || {
        rt.block_on(backend::run_backend(config, service, store, ui_tx, cmd_rx));
    });

    // Initialize terminal (enters alternate screen, enables raw mode)
    let terminal = ratatui::init();

    // Run UI loop on main thread
    let mut app = App::new(ui_rx, cmd_tx);
    let result = app.run(terminal);

    // Restore terminal (exits alternate screen, disables raw mode)
    ratatui::restore();

    // Wait for background thread to finish
    let _ = bg_handle.join();

    info!("TUI shutdown complete");

    result.map_err(|e| e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_chat() {
        let cli = Cli::try_parse_from(["newsbot"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.ephemeral);
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["newsbot", "ask", "what", "happened?", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Some(Commands::Ask {
                text: vec!["what".to_string(), "happened?".to_string()]
            })
        );
    }

    #[test]
    fn test_ask_requires_text() {
        assert!(Cli::try_parse_from(["newsbot", "ask"]).is_err());
    }

    #[test]
    fn test_engine_config_from_args() {
        let cli = Cli::try_parse_from([
            "newsbot",
            "--api-base-url",
            "http://news.local:9000/",
            "--timeout-secs",
            "5",
            "--data-dir",
            "/tmp/newsbot-test",
            "session",
        ])
        .unwrap();
        let config = cli.engine_config();

        assert_eq!(config.base_url, "http://news.local:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/newsbot-test")));
    }

    #[test]
    fn test_ephemeral_drops_data_dir() {
        let cli =
            Cli::try_parse_from(["newsbot", "--ephemeral", "--data-dir", "/tmp/x", "reset"]).unwrap();
        assert_eq!(cli.engine_config().data_dir, None);
    }

    #[test]
    fn test_seed_topics_flag() {
        let cli = Cli::try_parse_from([
            "newsbot",
            "--seed-topic",
            "Markets,Elections",
            "--seed-topic",
            "Weather",
        ])
        .unwrap();
        assert_eq!(
            cli.engine_config().seed_topics,
            vec!["Markets", "Elections", "Weather"]
        );
    }
}
