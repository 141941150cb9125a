//! HTTP client for the recommendation proxy.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use jams_proto::api::{ApiResponse, ContractError, ErrorBody, RecommendationRequest, RECOMMENDATIONS_PATH};

use crate::view_state::{
    GENERIC_FAILURE_MESSAGE, INVALID_RESPONSE_MESSAGE, TIMEOUT_MESSAGE, UNREACHABLE_MESSAGE,
};

/// Why a recommendation request did not produce a usable envelope.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("proxy unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("request timed out")]
    TimedOut,
    #[error("proxy answered {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("backend declined the playlist")]
    Declined { message: Option<String> },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Text shown in the error view.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            FetchError::TimedOut => TIMEOUT_MESSAGE.to_string(),
            FetchError::Rejected { message, .. } | FetchError::Declined { message } => message
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            FetchError::Malformed(_) => INVALID_RESPONSE_MESSAGE.to_string(),
        }
    }

    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::TimedOut
        } else {
            FetchError::Unreachable(e)
        }
    }
}

impl From<ContractError> for FetchError {
    fn from(e: ContractError) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    endpoint: String,
}

impl ProxyClient {
    pub fn new(proxy_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;
        let endpoint = format!("{}{}", proxy_url.trim_end_matches('/'), RECOMMENDATIONS_PATH);
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one request for `playlist_url` and classify the outcome.
    pub async fn recommend(&self, playlist_url: &str) -> Result<ApiResponse, FetchError> {
        debug!("POST {} playlist_url={}", self.endpoint, playlist_url);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&RecommendationRequest::new(playlist_url))
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(FetchError::from_transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .map(|b| b.error)
                .filter(|e| !e.trim().is_empty());
            warn!("proxy answered {}: {:?}", status, message);
            return Err(FetchError::Rejected { status, message });
        }

        let envelope: ApiResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if !envelope.success {
            return Err(FetchError::Declined {
                message: envelope.error_message().map(str::to_string),
            });
        }
        envelope.validate()?;
        Ok(envelope)
    }
}
