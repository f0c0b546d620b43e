//! Request hook for ordinary page requests

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::session::PageEvent;
use crate::token::TokenStore;

/// HTTP client that injects the bearer token and reports authorization failures
///
/// A 401 from any request is queued on the session controller's event
/// channel, which forces a logout. The queue is unbounded so no 401 is lost
/// while the host is busy.
pub struct AuthorizedClient {
    client: reqwest::Client,
    config: SessionConfig,
    store: Arc<TokenStore>,
    events: mpsc::UnboundedSender<PageEvent>,
}

impl AuthorizedClient {
    pub fn new(
        client: reqwest::Client,
        config: SessionConfig,
        store: Arc<TokenStore>,
        events: mpsc::UnboundedSender<PageEvent>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            store,
            events,
        })
    }

    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.config.endpoint(path)?;
        let builder = self.authorize(self.client.get(url.clone()));
        self.execute(builder, url).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.config.endpoint(path)?;
        let builder = self.authorize(self.client.post(url.clone()).json(body));
        self.execute(builder, url).await
    }

    /// Full-page style navigation: no bearer header, only the mirrored cookie
    pub async fn navigate_page(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.config.endpoint(path)?;
        let builder = self.client.get(url.clone());
        self.execute(builder, url).await
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder, url: Url) -> Result<Response, ApiError> {
        let response = builder
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        debug!(%url, status, "Request completed");
        self.report(status, &url);
        Ok(response)
    }

    fn report(&self, status: u16, url: &Url) {
        if status != StatusCode::UNAUTHORIZED.as_u16() {
            return;
        }
        let event = PageEvent::Response {
            status,
            url: url.to_string(),
        };
        if self.events.send(event).is_err() {
            warn!(%url, "Session controller gone, unauthorized response not reported");
        }
    }
}
