use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glazing_core::ServiceType;
use tokio::io::BufReader;
use tracing::{debug, info};

use glazing_app::app::{self, LeadRecorder};
use glazing_app::commands::{self, QuoteArgs};
use glazing_app::config::{self, Settings};
use glazing_app::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Quote estimator for A406 Windows.
///
/// Prices windows and doors, records each estimate as a quote request, and
/// hosts the glazing chat assistant.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Settings file. Defaults to `glazing.toml` in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection string, overriding the settings file.
    /// For SQLite this is a file path (e.g. `glazing.db`) or `:memory:`.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Log level or filter directive, overriding the settings file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price one selection and record it.
    Quote(QuoteArgs),
    /// Step through the estimator interactively.
    Wizard,
    /// Talk to the glazing assistant.
    Chat,
    /// List recorded quote requests, newest first.
    Requests {
        #[arg(long, value_parser = commands::parse_service)]
        service: Option<ServiceType>,
    },
    /// Show the unit prices in effect.
    Prices,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load_or_default(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        settings.database.connection_string = database.clone();
    }
    Ok(settings)
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    // --log-level, then RUST_LOG, then the settings file.
    logging::init_logging(&settings.logging.level);
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &settings.logging.file {
        logging::enable_file_logging(path)?;
    }
    debug!(database = ?settings.database, "settings loaded");

    let result = run(cli.command, &settings).await;
    logging::disable_file_logging();
    result
}

async fn run(
    command: Command,
    settings: &Settings,
) -> Result<()> {
    let mut out = std::io::stdout();

    match command {
        Command::Chat => {
            let chat_config = config::chat_api_key().map(|key| settings.chat.to_chat_config(key));
            let backend = commands::chat_backend(chat_config)?;
            info!(model = %backend.config().model, "chat session started");
            let mut session = commands::chat_session(backend);
            commands::run_chat(&mut session, BufReader::new(tokio::io::stdin()), &mut out).await
        }
        Command::Requests { service } => {
            let repo = app::open_repository(settings).await?;
            commands::run_requests(repo.as_ref(), service, &mut out).await
        }
        Command::Prices => {
            let repo = app::open_repository(settings).await?;
            let pricing = app::pricing_service(settings, repo.as_ref()).await?;
            commands::run_prices(&pricing, &mut out)
        }
        Command::Quote(args) => {
            let repo = app::open_repository(settings).await?;
            let pricing = app::pricing_service(settings, repo.as_ref()).await?;
            let recorder = LeadRecorder::new(repo);
            commands::run_quote(&args, &pricing, &recorder, &mut out)
                .await
                .context("Quote failed")
        }
        Command::Wizard => {
            let repo = app::open_repository(settings).await?;
            let pricing = app::pricing_service(settings, repo.as_ref()).await?;
            let recorder = LeadRecorder::new(repo);
            commands::run_wizard(
                &pricing,
                &recorder,
                BufReader::new(tokio::io::stdin()),
                &mut out,
            )
            .await
        }
    }
}
