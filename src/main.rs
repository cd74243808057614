//! # Admissions Assist CLI (`admissions-assist`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `admissions-assist serve` | Start the HTTP server |
//! | `admissions-assist scan <folder>` | Print the file report for a folder (no AI call) |
//! | `admissions-assist analyse <folder>` | Run the full extraction once and print the JSON |
//!
//! ## Examples
//!
//! ```bash
//! OPENAI_API_KEY=sk-... admissions-assist serve --bind 0.0.0.0:5000
//! admissions-assist scan ./students/jane-doe
//! RUST_LOG=admissions_assist=debug admissions-assist analyse ./students/jane-doe
//! ```

use admissions_assist::{assist, collector, config, llm::OpenAIClient, server};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Admissions Assist — pre-fill university application forms from a folder
/// of CVs and certificates.
#[derive(Parser)]
#[command(name = "admissions-assist", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when missing.
    #[arg(long, global = true, default_value = "./config/assist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Scan a folder and print what would be sent to the AI service.
    ///
    /// Prints the per-file report and total character count as JSON.
    Scan {
        /// Folder containing PDF, DOCX and TXT files.
        folder: PathBuf,
    },

    /// Run the full folder extraction once and print the response JSON.
    Analyse {
        /// Folder containing PDF, DOCX and TXT files.
        folder: PathBuf,
    },
}

#[derive(Serialize)]
struct ScanSummary {
    folder: String,
    total_chars: usize,
    files: Vec<admissions_assist::models::FileReport>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,admissions_assist=debug,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            let client = OpenAIClient::from_env(&cfg.llm)?;
            tracing::info!(model = client.model(), "LLM client ready");
            server::run_server(&cfg, Arc::new(client)).await?;
        }
        Commands::Scan { folder } => {
            let collected = collector::collect_text_from_folder(&folder)?;
            let summary = ScanSummary {
                folder: folder.display().to_string(),
                total_chars: collected.combined_text.chars().count(),
                files: collected.files,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Analyse { folder } => {
            let client = OpenAIClient::from_env(&cfg.llm)?;
            let folder_str = folder
                .to_str()
                .with_context(|| format!("folder path is not valid UTF-8: {}", folder.display()))?;
            let response =
                assist::assist_folder(&client, folder_str, cfg.extraction.max_chars).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
