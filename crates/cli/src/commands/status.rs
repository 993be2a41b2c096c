//! Service health and model listing commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_json, print_warning, OutputFormat};

/// Row for models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    model_type: String,
    #[tabled(rename = "Loaded")]
    loaded: String,
    #[tabled(rename = "File")]
    file_path: String,
}

/// Show service health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("{}", "Service Health".bold());
            println!("{}", "=".repeat(50));
            println!("Status:         {}", color_status(health.status.as_str()));
            println!("Message:        {}", health.message);

            if health.models_loaded.is_empty() {
                print_warning("No models loaded");
            } else {
                let names: Vec<&str> = health.models_loaded.iter().map(|m| m.as_str()).collect();
                println!("Models loaded:  {}", names.join(", ").cyan());
            }
        }
    }

    Ok(())
}

/// List registered models
pub async fn show_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let models = client.models().await?;

    match format {
        OutputFormat::Json => print_json(&models)?,
        OutputFormat::Table => {
            if models.is_empty() {
                print_warning("No models registered");
                return Ok(());
            }

            let rows: Vec<ModelRow> = models
                .iter()
                .map(|m| ModelRow {
                    name: m.name.to_string(),
                    model_type: m.model_type.clone(),
                    loaded: if m.loaded {
                        "yes".green().to_string()
                    } else {
                        "no".red().to_string()
                    },
                    file_path: m.file_path.clone(),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
