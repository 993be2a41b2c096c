//! Fetal Health Classification CLI
//!
//! A command-line tool for checking service health, listing models and
//! classifying CTG exams through the Fetal Health API.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{demo, predict, status};
use std::path::PathBuf;
use std::process::ExitCode;

/// Fetal Health Classification CLI
#[derive(Parser)]
#[command(name = "ctg")]
#[command(author, version, about = "CLI for the Fetal Health Classification API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CTG_API_URL env var)
    #[arg(long, env = "CTG_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show service health
    Health,

    /// List registered models
    Models,

    /// Classify a single CTG exam
    Predict {
        /// JSON file with one feature vector (uses a built-in normal exam if omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Model to use (decision_tree, gradient_boosting)
        #[arg(long, short)]
        model: Option<String>,
    },

    /// Classify every CTG exam in a file
    Batch {
        /// JSON file with a list of feature vectors
        #[arg(long)]
        file: PathBuf,

        /// Model to use (decision_tree, gradient_boosting)
        #[arg(long, short)]
        model: Option<String>,
    },

    /// Exercise every endpoint with built-in exams
    Demo,
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let client = client::ApiClient::new(&config.api_url(cli.api_url))?;

    match cli.command {
        Commands::Health => status::show_health(&client, cli.format).await?,
        Commands::Models => status::show_models(&client, cli.format).await?,
        Commands::Predict { file, model } => {
            predict::predict_one(&client, file.as_deref(), config.model(model), cli.format)
                .await?;
        }
        Commands::Batch { file, model } => {
            predict::predict_batch(&client, &file, config.model(model), cli.format).await?;
        }
        Commands::Demo => demo::run(&client, cli.format).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
