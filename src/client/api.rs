use crate::error::{ApiErrorResponse, GeolensError};
use crate::types::{LoginRequest, LoginResponse, MeResponse, PingResponse};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Client for the geolens HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, GeolensError> {
        let resp = self
            .client
            .post(self.base.join("login")?)
            .json(&LoginRequest::new(email, password))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn ping(&self) -> Result<PingResponse, GeolensError> {
        let resp = self.client.get(self.base.join("ping")?).send().await?;
        Self::decode(resp).await
    }

    pub async fn me(&self, token: &str) -> Result<MeResponse, GeolensError> {
        let resp = self
            .client
            .get(self.base.join("me")?)
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Parse a success body, or turn the server's error envelope into [`GeolensError::Api`].
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GeolensError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let body = resp.bytes().await?;
        let message = serde_json::from_slice::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Request failed with status {status}"));
        debug!(%status, %message, "API call failed");
        Err(GeolensError::Api { status, message })
    }
}
