//! CLI integration tests

use ctg_core::predictor::{ACTIVE_EXEMPLAR, NORMAL_EXEMPLAR};
use mockito::Matcher;
use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Empty HOME so no user config leaks into the tests
fn scratch_home() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn ctg(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ctg"))
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("CTG_API_URL")
        .output()
        .expect("Failed to execute command")
}

fn prediction(status: &str, code: f64, model: &str) -> serde_json::Value {
    json!({
        "prediction_code": code,
        "health_status": status,
        "model_used": model,
        "confidence": 0.91
    })
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = scratch_home();
    let output = ctg(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Fetal Health"), "Should show app name");
    for command in ["health", "models", "predict", "batch", "demo"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("CTG_API_URL"), "Should show env var");
    assert!(stdout.contains("--format"), "Should show format option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = scratch_home();
    let output = ctg(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("ctg"), "Should show binary name");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let home = scratch_home();
    let output = ctg(home.path(), &["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should show error message");
}

/// Test missing required argument error handling
#[test]
fn test_batch_requires_file() {
    let home = scratch_home();
    let output = ctg(home.path(), &["batch"]);

    assert!(!output.status.success(), "Missing argument should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--file"), "Should name the missing argument");
}

#[test]
fn test_health_json() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "healthy",
                "message": "All systems operational",
                "models_loaded": ["decision_tree", "gradient_boosting"]
            })
            .to_string(),
        )
        .create();

    let home = scratch_home();
    let output = ctg(home.path(), &["--api-url", &server.url(), "--format", "json", "health"]);
    mock.assert();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_loaded"][1], "gradient_boosting");
}

#[test]
fn test_unhealthy_service_is_reported_not_failed() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/health")
        .with_status(503)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "unhealthy",
                "message": "No models loaded",
                "models_loaded": []
            })
            .to_string(),
        )
        .create();

    let home = scratch_home();
    let output = ctg(home.path(), &["--api-url", &server.url(), "health"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("unhealthy"));
    assert!(stdout.contains("No models loaded"));
}

#[test]
fn test_models_table() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/models")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"name": "decision_tree", "type": "DecisionTreeClassifier", "loaded": false, "file_path": "models/decision_tree_model.onnx"},
                {"name": "gradient_boosting", "type": "GradientBoostingClassifier", "loaded": true, "file_path": "models/gradient_boosting_model.onnx"}
            ])
            .to_string(),
        )
        .create();

    let home = scratch_home();
    let output = ctg(home.path(), &["--api-url", &server.url(), "models"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("GradientBoostingClassifier"));
    assert!(stdout.contains("decision_tree"));
}

#[test]
fn test_predict_sends_model_and_exemplar() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/predict")
        .match_body(Matcher::PartialJson(json!({
            "features": NORMAL_EXEMPLAR,
            "model_name": "decision_tree"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(prediction("Normal", 1.0, "decision_tree").to_string())
        .create();

    let home = scratch_home();
    let output = ctg(
        home.path(),
        &[
            "--api-url",
            &server.url(),
            "--format",
            "json",
            "predict",
            "--model",
            "decision_tree",
        ],
    );
    mock.assert();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["health_status"], "Normal");
    assert_eq!(body["model_used"], "decision_tree");
}

#[test]
fn test_batch_from_file_prints_summary() {
    let home = scratch_home();
    let file = home.path().join("exams.json");
    std::fs::write(
        &file,
        serde_json::to_string(&[NORMAL_EXEMPLAR, ACTIVE_EXEMPLAR]).unwrap(),
    )
    .unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/predict/batch")
        .match_body(Matcher::PartialJson(json!({
            "features_list": [NORMAL_EXEMPLAR, ACTIVE_EXEMPLAR]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "predictions": [
                    prediction("Normal", 1.0, "gradient_boosting"),
                    prediction("Suspect", 2.0, "gradient_boosting")
                ]
            })
            .to_string(),
        )
        .create();

    let output = ctg(
        home.path(),
        &[
            "--api-url",
            &server.url(),
            "batch",
            "--file",
            file.to_str().unwrap(),
        ],
    );
    mock.assert();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Summary"));
    assert!(stdout.contains("Normal: 1 samples (50.0%)"));
    assert!(stdout.contains("Suspect: 1 samples (50.0%)"));
}

#[test]
fn test_api_error_is_reported() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/predict")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": "validation_error",
                "detail": "model_name must be one of [decision_tree, gradient_boosting], got 'svm'"
            })
            .to_string(),
        )
        .create();

    let home = scratch_home();
    let output = ctg(
        home.path(),
        &["--api-url", &server.url(), "predict", "--model", "svm"],
    );
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("422"));
    assert!(stderr.contains("validation_error"));
}

#[test]
fn test_api_url_from_config_file() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/models")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();

    let home = scratch_home();
    let config_dir = home.path().join(".config").join("ctg");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        json!({ "api_url": server.url() }).to_string(),
    )
    .unwrap();

    let output = ctg(home.path(), &["models"]);
    mock.assert();
    assert!(output.status.success());
}
