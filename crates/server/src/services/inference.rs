//! Crop disease inference proxy.
//!
//! The model runs in a separate service; this client forwards the uploaded
//! image and relays the prediction. When no service URL is configured the
//! routes answer 501 without constructing a client at all.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long to wait for the model before giving up.
const INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the inference proxy.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The inference service could not be reached or timed out.
    #[error("inference service request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The inference service answered with a non-success status. The
    /// status and body are relayed to the client as-is.
    #[error("inference service returned {status}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// A prediction as relayed from the model service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Predicted class label.
    pub result: String,
    pub confidence: f64,
    /// Per-class probabilities, when the model reports them.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub probs: HashMap<String, f64>,
    /// Where the service stored the uploaded image, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Client for the external model service.
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl InferenceClient {
    /// Create a new inference client.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Forward an uploaded image to the model and return its prediction.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Upstream` if the service is unreachable or
    /// times out, and `InferenceError::UpstreamStatus` for a non-success
    /// response.
    pub async fn predict(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<Prediction, InferenceError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/predict", self.base_url))
            .timeout(INFERENCE_TIMEOUT)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::UpstreamStatus { status, body });
        }

        Ok(response.json().await?)
    }
}
