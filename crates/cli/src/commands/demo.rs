//! End-to-end walkthrough of every endpoint with the built-in exemplars

use anyhow::Result;
use ctg_core::predictor::{ACTIVE_EXEMPLAR, NORMAL_EXEMPLAR};
use ctg_core::ModelName;

use crate::client::ApiClient;
use crate::commands::{predict, status};
use crate::output::{
    color_confidence, color_health_status, print_section, print_success, OutputFormat,
};

pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    print_section("Health Check");
    status::show_health(client, format).await?;

    print_section("Registered Models");
    status::show_models(client, format).await?;

    print_section("Single Prediction");
    let result = client
        .predict(NORMAL_EXEMPLAR, Some(ModelName::GradientBoosting.to_string()))
        .await?;
    predict::print_result(&result);

    print_section("Batch Prediction");
    let predictions = client
        .predict_batch(
            vec![NORMAL_EXEMPLAR, ACTIVE_EXEMPLAR],
            Some(ModelName::GradientBoosting.to_string()),
        )
        .await?;
    predict::print_batch(&predictions);

    print_section("Model Comparison");
    for model in ModelName::ALL {
        let result = client.predict(NORMAL_EXEMPLAR, Some(model.to_string())).await?;
        println!(
            "  {:<18} {:<14} {}",
            model.as_str(),
            color_health_status(result.health_status),
            color_confidence(result.confidence)
        );
    }

    println!();
    print_success("Demo completed");
    Ok(())
}
