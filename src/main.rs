use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use todo_client::app::App;
use todo_client::command::{self, Command, HELP};
use todo_client::config::{AppConfig, ConfigError, DotEnv};
use todo_client::provider::{Provider, ProviderError, SupabaseClient};
use todo_client::session_store::{FileSessionStore, MemorySessionStore, SessionStore};
use todo_client::view;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("terminal io failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Todo list backed by a Supabase project")]
struct Cli {
    /// Where the signed-in session is kept between runs.
    #[arg(long, env = "TODO_SESSION_FILE", default_value = ".todo-session.json")]
    session_file: PathBuf,

    /// Keep the session in memory only.
    #[arg(long, default_value_t = false)]
    no_persist: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Loaded before the subscriber so RUST_LOG can come from .env.
    let dotenv = DotEnv::load();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    match dotenv {
        DotEnv::Loaded(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        DotEnv::Absent => {}
        DotEnv::Invalid(e) => tracing::warn!(error = %e, ".env could not be loaded"),
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    tracing::info!(url = %config.supabase_url, "provider configured");

    let provider: Arc<dyn Provider> = Arc::new(SupabaseClient::from_config(&config)?);
    let store: Arc<dyn SessionStore> = if cli.no_persist {
        Arc::new(MemorySessionStore::new())
    } else {
        let file = FileSessionStore::new(cli.session_file);
        tracing::debug!(path = %file.path().display(), "session file");
        Arc::new(file)
    };

    let mut app = App::new(provider, store);
    app.start().await;
    run(&mut app).await
}

/// Render, read a line, dispatch, repeat until `quit` or end of input.
async fn run(app: &mut App) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("\n{}", view::render(app));
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match command::parse(&line, app) {
            Ok(Command::Dispatch(intents)) => {
                for intent in intents {
                    app.dispatch(intent).await;
                }
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Nothing) => {}
            Err(e) => app.set_status(e.to_string()),
        }
    }
}
