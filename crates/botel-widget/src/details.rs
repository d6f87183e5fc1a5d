//! Sources of connection details for a new session.

use crate::config::WidgetConfig;
use crate::error::ConnectionError;
use async_trait::async_trait;
use botel_types::ConnectionDetails;
use std::time::Duration;
use url::Url;

/// Timeout for the connection-details request.
const DETAILS_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
pub trait ConnectionDetailsSource: Send + Sync {
    /// Obtains the server URL and participant token for a session.
    ///
    /// Any failure is reported as a [`ConnectionError`]; the session does
    /// not start.
    async fn fetch(&self) -> Result<ConnectionDetails, ConnectionError>;
}

/// Details fixed up front, typically from the embed config.
#[derive(Debug, Clone)]
pub struct StaticDetails {
    details: ConnectionDetails,
}

impl StaticDetails {
    pub fn new(details: ConnectionDetails) -> Self {
        Self { details }
    }

    /// Uses `serverUrl` and `token` from the embed config when both are set.
    pub fn from_config(config: &WidgetConfig) -> Option<Self> {
        config.static_details().map(Self::new)
    }
}

#[async_trait]
impl ConnectionDetailsSource for StaticDetails {
    async fn fetch(&self) -> Result<ConnectionDetails, ConnectionError> {
        if !self.details.is_complete() {
            return Err(ConnectionError::missing_details());
        }
        Ok(self.details.clone())
    }
}

/// Requests fresh details from the connection-details endpoint.
#[derive(Debug, Clone)]
pub struct HttpDetailsSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpDetailsSource {
    pub fn new(endpoint: Url) -> Result<Self, ConnectionError> {
        let client = reqwest::Client::builder()
            .timeout(DETAILS_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConnectionError::new("FetchError", e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ConnectionDetailsSource for HttpDetailsSource {
    async fn fetch(&self) -> Result<ConnectionDetails, ConnectionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| ConnectionError::new("FetchError", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectionError::new(
                "HttpError",
                format!("connection details request failed with status {}", status),
            ));
        }

        let details: ConnectionDetails = response
            .json()
            .await
            .map_err(|e| ConnectionError::new("InvalidResponse", e.to_string()))?;

        if !details.is_complete() {
            return Err(ConnectionError::missing_details());
        }

        tracing::info!(
            server_url = %details.server_url,
            room = %details.room_name,
            "received connection details"
        );
        Ok(details)
    }
}
