//! Async client for the remote classification service

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::ClassifierConfig;
use crate::core::errors::{ClassifierError, Result};
use crate::core::models::{
    CorrectionRequest, CorrectionResult, IssueLabel, PredictionRequest, PredictionResult,
};

/// Single-exchange client for `/api/predict` and `/api/correct`
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    config: Arc<ClassifierConfig>,
}

impl PredictionClient {
    /// Create a new prediction client
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;

        // the whole exchange, connect included, is bounded in `bounded`
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = ClassifierConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Request a label for already-gated issue text
    pub async fn predict(&self, issue_body: &str) -> Result<PredictionResult> {
        if issue_body.is_empty() {
            return Err(ClassifierError::IncompleteIssue);
        }

        let url = self.config.predict_url();
        debug!("Requesting prediction from {} ({} bytes)", url, issue_body.len());

        let result: PredictionResult = self
            .bounded(self.post_json(&url, &PredictionRequest { issue_body }))
            .await?;
        result.validate()?;

        info!(
            "Predicted '{}' with confidence {:.3}",
            result.predicted_label, result.confidence_score
        );
        Ok(result)
    }

    /// Same as [`predict`](Self::predict), aborted when `cancel` fires
    pub async fn predict_with_cancel(
        &self,
        issue_body: &str,
        cancel: &CancellationToken,
    ) -> Result<PredictionResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Prediction request cancelled");
                Err(ClassifierError::Cancelled)
            }
            result = self.predict(issue_body) => result,
        }
    }

    /// Report the correct label for a stored prediction
    pub async fn correct(&self, id: &str, label: IssueLabel) -> Result<CorrectionResult> {
        let url = self.config.correct_url();
        debug!("Sending correction for {} -> {}", id, label);

        let request = CorrectionRequest {
            id,
            corrected_label: label,
        };

        match self.bounded(self.post_json(&url, &request)).await {
            Ok(result) => {
                info!("Correction recorded for {}", id);
                Ok(result)
            }
            Err(ClassifierError::TransportFailure {
                status: Some(404), ..
            }) => Err(ClassifierError::PredictionNotFound { id: id.to_string() }),
            Err(e) => Err(e),
        }
    }

    /// Apply the configured timeout to a whole exchange
    async fn bounded<T>(&self, exchange: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.timeout(), exchange)
            .await
            .map_err(|_| {
                warn!("Request timed out after {} ms", self.config.timeout_ms);
                ClassifierError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                }
            })?
    }

    /// POST a JSON body and decode a JSON reply
    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                ClassifierError::TransportFailure {
                    status: None,
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Service returned {}: {}", status_code, error_text);
            return Err(ClassifierError::TransportFailure {
                status: Some(status_code),
                detail: error_text,
            });
        }

        let bytes = response.bytes().await.map_err(|e| ClassifierError::TransportFailure {
            status: Some(status.as_u16()),
            detail: e.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Unexpected response body from {}: {}", url, e);
            ClassifierError::MalformedResponse {
                message: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PredictionClient::new(ClassifierConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClassifierConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            PredictionClient::new(config),
            Err(ClassifierError::ConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_refused_locally() {
        let client = PredictionClient::new(ClassifierConfig::default()).unwrap();
        let result = client.predict("").await;
        assert!(matches!(result, Err(ClassifierError::IncompleteIssue)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let client = PredictionClient::new(ClassifierConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = client.predict_with_cancel("the bug", &token).await;
        assert!(matches!(result, Err(ClassifierError::Cancelled)));
    }

    #[tokio::test]
    async fn test_stalled_service_times_out() {
        // accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ClassifierConfig {
            base_url: format!("http://{}", addr),
            timeout_ms: 200,
            ..Default::default()
        };
        let client = PredictionClient::new(config).unwrap();

        let result = client.predict("the bug is in the code").await;
        assert!(matches!(result, Err(ClassifierError::Timeout { timeout_ms: 200 })));
    }
}
