//! API client for communicating with the Fetal Health API

use anyhow::{Context, Result};
use ctg_core::{
    BatchPredictionRequest, BatchPredictionResponse, ErrorResponse, FeatureVector,
    HealthResponse, ModelInfo, PredictionRequest, PredictionResult,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// API client for the Fetal Health API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;

        parse_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;

        parse_response(response).await
    }

    /// Service health. An unhealthy service answers 503 with a regular body,
    /// which is returned rather than treated as an error.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.base_url.join("health").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return response.json().await.context("Failed to parse response");
        }
        parse_response(response).await
    }

    pub async fn models(&self) -> Result<Vec<ModelInfo>> {
        self.get("models").await
    }

    pub async fn predict(
        &self,
        features: FeatureVector,
        model_name: Option<String>,
    ) -> Result<PredictionResult> {
        let request = PredictionRequest {
            features,
            model_name,
        };
        self.post("predict", &request).await
    }

    pub async fn predict_batch(
        &self,
        features_list: Vec<FeatureVector>,
        model_name: Option<String>,
    ) -> Result<Vec<PredictionResult>> {
        let request = BatchPredictionRequest {
            features_list,
            model_name,
        };
        let response: BatchPredictionResponse = self.post("predict/batch", &request).await?;
        Ok(response.predictions)
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => format!("{}: {}", error.error, error.detail),
            Err(_) => body,
        };
        anyhow::bail!("API error ({}): {}", status, detail);
    }

    response.json().await.context("Failed to parse response")
}
