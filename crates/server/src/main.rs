//! Fetal health API - CTG classification service
//!
//! Serves decision tree and gradient boosting classifiers over HTTP.

use anyhow::{Context, Result};
use ctg_core::{predictor::OnnxLoader, ModelRegistry, PredictionService};
use fetal_health_api::{api, config::ServiceConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting fetal-health-api");

    let config = ServiceConfig::load()?;
    info!(
        models_dir = ?config.models_dir,
        standardization = config.standardization.as_str(),
        eager_load = config.eager_load,
        "Service configured"
    );

    let preprocessor = config
        .build_preprocessor()
        .context("Failed to initialize standardization")?;
    let registry = Arc::new(ModelRegistry::new(
        config.model_specs(),
        Arc::new(OnnxLoader::new()),
    ));
    let service = PredictionService::new(registry, preprocessor);

    if config.eager_load {
        for (model, e) in service.preload() {
            warn!(model = %model, error = %e, "Model unavailable at startup");
        }
    }

    let logger = service.logger().clone();
    logger.log_startup(
        SERVICE_VERSION,
        config.api_port,
        service.registry().list_loaded().len(),
    );

    let app_state = Arc::new(api::AppState::new(service));

    api::serve(config.api_port, app_state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
