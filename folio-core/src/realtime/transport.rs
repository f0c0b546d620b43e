//! Server-push transport seam

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, stream};
use reqwest::Url;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::debug;

use super::error::TransportError;
use super::sse::{SseDecoder, SseMessage};
use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::token::SessionToken;

/// Messages from one open connection; ends when the server closes it
pub type EventStream = Pin<Box<dyn Stream<Item = Result<SseMessage, TransportError>> + Send>>;

/// Opens authenticated server-push connections
///
/// Dropping the returned stream closes the connection.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn open(&self, token: &SessionToken) -> Result<EventStream, TransportError>;
}

/// Server-Sent Events over HTTP
///
/// The token travels as a `token` query parameter because the stream is
/// opened without custom headers.
pub struct SseTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl SseTransport {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(client: reqwest::Client, config: &SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(client, config.endpoint(&config.realtime_path)?))
    }

    /// Endpoint URL carrying `token`
    pub fn url_for(&self, token: &SessionToken) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", token.as_str());
        url
    }
}

#[async_trait]
impl EventTransport for SseTransport {
    async fn open(&self, token: &SessionToken) -> Result<EventStream, TransportError> {
        debug!(endpoint = %self.endpoint, "Opening realtime stream");
        let response = self
            .client
            .get(self.url_for(token))
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let mut decoder = SseDecoder::new();
        let messages = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => decoder.push(&bytes).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(TransportError::Stream(e.to_string()))],
            })
            .flat_map(stream::iter);
        Ok(Box::pin(messages))
    }
}
