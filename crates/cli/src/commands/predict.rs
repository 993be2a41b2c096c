//! Prediction commands

use anyhow::{Context, Result};
use colored::Colorize;
use ctg_core::predictor::{summarize, NORMAL_EXEMPLAR};
use ctg_core::{FeatureVector, PredictionResult};
use serde::Deserialize;
use std::path::Path;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_confidence, color_health_status, print_info, print_json, OutputFormat,
};

/// Row for predictions table
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Model")]
    model: String,
}

/// Batch input file: either a bare array or a `{"features_list": [...]}` body
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchFile {
    List(Vec<FeatureVector>),
    Request { features_list: Vec<FeatureVector> },
}

/// Single input file: either a bare feature object or a `{"features": {...}}` body
#[derive(Deserialize)]
#[serde(untagged)]
enum SingleFile {
    Features(FeatureVector),
    Request { features: FeatureVector },
}

pub fn read_features(path: &Path) -> Result<FeatureVector> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let parsed: SingleFile = serde_json::from_str(&content)
        .with_context(|| format!("{:?} is not a valid feature vector", path))?;
    Ok(match parsed {
        SingleFile::Features(features) | SingleFile::Request { features } => features,
    })
}

pub fn read_batch(path: &Path) -> Result<Vec<FeatureVector>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let parsed: BatchFile = serde_json::from_str(&content)
        .with_context(|| format!("{:?} is not a valid feature vector list", path))?;
    Ok(match parsed {
        BatchFile::List(features_list) | BatchFile::Request { features_list } => features_list,
    })
}

/// Classify one exam, from a file or the built-in normal exemplar
pub async fn predict_one(
    client: &ApiClient,
    file: Option<&Path>,
    model: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let features = match file {
        Some(path) => read_features(path)?,
        None => {
            if matches!(format, OutputFormat::Table) {
                print_info("No --file given, using the built-in normal exemplar");
            }
            NORMAL_EXEMPLAR
        }
    };

    let result = client.predict(features, model).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_result(&result),
    }

    Ok(())
}

/// Classify every exam in a file
pub async fn predict_batch(
    client: &ApiClient,
    file: &Path,
    model: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let features_list = read_batch(file)?;
    let predictions = client.predict_batch(features_list, model).await?;

    match format {
        OutputFormat::Json => print_json(&predictions)?,
        OutputFormat::Table => print_batch(&predictions),
    }

    Ok(())
}

pub fn print_result(result: &PredictionResult) {
    println!("{}", "Prediction".bold());
    println!("{}", "=".repeat(50));
    println!("Health status:  {}", color_health_status(result.health_status));
    println!("Code:           {}", result.prediction_code);
    println!("Confidence:     {}", color_confidence(result.confidence));
    println!("Model:          {}", result.model_used.as_str().cyan());
}

pub fn print_batch(predictions: &[PredictionResult]) {
    let rows: Vec<PredictionRow> = predictions
        .iter()
        .enumerate()
        .map(|(index, p)| PredictionRow {
            index,
            code: p.prediction_code.to_string(),
            status: color_health_status(p.health_status),
            confidence: color_confidence(p.confidence),
            model: p.model_used.to_string(),
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    println!("\n{}", "Summary".bold());
    for entry in summarize(predictions) {
        println!(
            "  {}: {} samples ({:.1}%)",
            color_health_status(entry.health_status),
            entry.count,
            entry.percentage
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_features_accepts_both_shapes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        let bare = serde_json::to_string(&NORMAL_EXEMPLAR).unwrap();
        let wrapped = serde_json::json!({ "features": NORMAL_EXEMPLAR }).to_string();

        let a = read_features(&write(dir, "bare.json", &bare)).unwrap();
        let b = read_features(&write(dir, "wrapped.json", &wrapped)).unwrap();
        assert_eq!(a, NORMAL_EXEMPLAR);
        assert_eq!(b, NORMAL_EXEMPLAR);

        let list = serde_json::json!([NORMAL_EXEMPLAR, NORMAL_EXEMPLAR]).to_string();
        let body = serde_json::json!({ "features_list": [NORMAL_EXEMPLAR] }).to_string();
        assert_eq!(read_batch(&write(dir, "list.json", &list)).unwrap().len(), 2);
        assert_eq!(read_batch(&write(dir, "body.json", &body)).unwrap().len(), 1);

        assert!(read_features(&write(dir, "bad.json", "{\"baseline_value\": 1}")).is_err());
    }
}
