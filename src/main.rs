use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skazka::config::StorageBackend;
use skazka::quiz::QuestionKind;
use skazka::story::{CefrLevel, LengthBucket};
use skazka::{App, Config, Tutor, cli};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skazka")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keep the story and answers in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a story and print it
    Story {
        /// Story theme, e.g. "Travel"
        #[arg(short, long)]
        theme: String,
        /// CEFR level (A1-C2)
        #[arg(short, long)]
        level: Option<CefrLevel>,
        /// short, medium or long
        #[arg(long)]
        length: Option<LengthBucket>,
    },
    /// Answer questions about the stored story on the command line
    Quiz {
        /// comprehension or grammar
        #[arg(default_value = "comprehension")]
        kind: QuestionKind,
    },
    /// Show file locations and the effective configuration
    Config,
    /// Manage the Azure OpenAI API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Delete the stored story and answers
    Reset,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a key in the system keyring (prompts when omitted)
    Set { key: Option<String> },
    /// Remove the stored key
    Clear,
    /// Show which key is in use
    Status,
}

/// Log to a file while the TUI owns the terminal, to stderr otherwise
fn init_logging(tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "skazka=info".into());

    let file_layer = if tui {
        let path = Config::log_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        Some(tracing_subscriber::fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
    } else {
        None
    };
    let stderr_layer = (!tui)
        .then(|| tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr));

    tracing_subscriber::registry().with(filter).with(file_layer).with(stderr_layer).init();
    Ok(())
}

fn prompt_for_key() -> Result<String> {
    print!("Azure OpenAI API key: ");
    io::stdout().flush()?;
    let mut key = String::new();
    io::stdin().lock().read_line(&mut key).context("Failed to read API key")?;
    Ok(key.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none())?;

    let mut config = Config::load()?;
    if cli.ephemeral {
        config.storage = StorageBackend::Memory;
    }
    let mut out = io::stdout();

    match cli.command {
        Some(Commands::Story { theme, level, length }) => {
            let gateway = config.build_gateway()?;
            let mut tutor = Tutor::restore(config.open_store()?, config.tutor_options()).await;
            cli::story(&mut tutor, gateway.as_ref(), theme, level, length, &mut out).await?;
        }
        Some(Commands::Quiz { kind }) => {
            let gateway = config.build_gateway()?;
            let mut tutor = Tutor::restore(config.open_store()?, config.tutor_options()).await;
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            cli::quiz(&mut tutor, gateway.as_ref(), kind, input, &mut out).await?;
        }
        Some(Commands::Config) => cli::show_config(&config, &mut out)?,
        Some(Commands::Key { action }) => match action {
            KeyAction::Set { key } => {
                let key = match key {
                    Some(key) => key,
                    None => prompt_for_key()?,
                };
                cli::key_set(&key, &mut out)?;
            }
            KeyAction::Clear => cli::key_clear(&mut out)?,
            KeyAction::Status => cli::key_status(&config, &mut out)?,
        },
        Some(Commands::Reset) => {
            let mut tutor = Tutor::restore(config.open_store()?, config.tutor_options()).await;
            cli::reset(&mut tutor, &mut out).await?;
        }
        None => {
            let tutor = Tutor::restore(config.open_store()?, config.tutor_options()).await;
            let gateway = config.build_gateway().map_err(|e| format!("{:#}", e));
            let gateway_name = gateway.as_ref().map(|g| g.name()).unwrap_or("unconfigured");
            tracing::info!(gateway = gateway_name, "Starting TUI");
            let mut app = App::new(config, tutor, gateway)?;
            app.run().await?;
        }
    }

    Ok(())
}
