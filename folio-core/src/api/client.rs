//! Auth endpoints of the reader server

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use super::types::{LoginRequest, LoginResponse, UserRecord};
use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::token::SessionToken;

pub const TOKEN_PATH: &str = "/auth/v1/token";
pub const LOGOUT_PATH: &str = "/auth/v1/logout";
pub const USER_PATH: &str = "/auth/v1/user";

/// Server calls the session controller makes
#[async_trait]
pub trait ReaderApi: Send + Sync {
    /// Exchange credentials for a session token
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Tell the server the session is over
    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError>;

    async fn current_user(&self, token: &SessionToken) -> Result<UserRecord, ApiError>;
}

/// [`ReaderApi`] over HTTP
pub struct HttpReaderApi {
    client: reqwest::Client,
    config: SessionConfig,
}

impl HttpReaderApi {
    pub fn new(client: reqwest::Client, config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.timeout(self.config.request_timeout())
    }
}

/// Map non-success statuses to errors; 401 becomes [`ApiError::Unauthorized`]
pub(crate) async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn request_error(e: reqwest::Error) -> ApiError {
    ApiError::Request(e.to_string())
}

#[async_trait]
impl ReaderApi for HttpReaderApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.config.endpoint(TOKEN_PATH)?;
        debug!(%url, "Logging in");
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(self.client.post(url).json(&body))
            .send()
            .await
            .map_err(request_error)?;
        decode(check_status(response).await?).await
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError> {
        let url = self.config.endpoint(LOGOUT_PATH)?;
        let response = self
            .request(
                self.client
                    .post(url)
                    .bearer_auth(token.as_str())
                    .header(reqwest::header::CONTENT_TYPE, "application/json"),
            )
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await?;
        Ok(())
    }

    async fn current_user(&self, token: &SessionToken) -> Result<UserRecord, ApiError> {
        let url = self.config.endpoint(USER_PATH)?;
        let response = self
            .request(self.client.get(url).bearer_auth(token.as_str()))
            .send()
            .await
            .map_err(request_error)?;
        decode(check_status(response).await?).await
    }
}
