// HTTP status client for the periodic pull channel
use crate::application::channels::StatusSource;
use crate::application::error::ChannelError;
use crate::domain::health::ProtocolStatus;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusClient {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, url })
    }
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChannelError::Timeout
        } else if err.is_connect() {
            ChannelError::Connection(err.to_string())
        } else if err.is_decode() {
            ChannelError::Decode(err.to_string())
        } else {
            ChannelError::Http(err.to_string())
        }
    }
}

fn decode_status(body: &str) -> Result<ProtocolStatus, ChannelError> {
    serde_json::from_str(body).map_err(|e| ChannelError::Decode(e.to_string()))
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self) -> Result<ProtocolStatus, ChannelError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChannelError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        decode_status(&body)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
