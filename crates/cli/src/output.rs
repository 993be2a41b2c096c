//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use ctg_core::HealthStatus;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a section title
pub fn print_section(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!(" {}", title.bold());
    println!("{}", "=".repeat(60));
}

/// Format confidence as percentage
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) => format!("{:.1}%", c * 100.0),
        None => "n/a".to_string(),
    }
}

/// Color service status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color a fetal health label by severity
pub fn color_health_status(status: HealthStatus) -> String {
    let label = status.as_str();
    match status {
        HealthStatus::Normal => label.green().to_string(),
        HealthStatus::Suspect => label.yellow().to_string(),
        HealthStatus::Pathological => label.red().bold().to_string(),
        HealthStatus::Unknown => label.dimmed().to_string(),
    }
}

/// Color confidence based on value
pub fn color_confidence(confidence: Option<f64>) -> String {
    let formatted = format_confidence(confidence);
    match confidence {
        Some(c) if c >= 0.8 => formatted.green().to_string(),
        Some(c) if c >= 0.6 => formatted.yellow().to_string(),
        Some(_) => formatted.red().to_string(),
        None => formatted.dimmed().to_string(),
    }
}
