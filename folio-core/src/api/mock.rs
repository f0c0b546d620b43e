//! Mock reader API for testing

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::ReaderApi;
use super::error::ApiError;
use super::types::{LoginResponse, UserRecord};
use crate::token::SessionToken;

/// A recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Login { email: String },
    Logout { token: String },
    CurrentUser { token: String },
}

type Probe = Box<dyn Fn() + Send + Sync>;

/// Mock API that returns preconfigured results and records calls
pub struct MockReaderApi {
    login: Mutex<Result<LoginResponse, ApiError>>,
    logout: Mutex<Result<(), ApiError>>,
    user: Mutex<Result<UserRecord, ApiError>>,
    user_delay: Mutex<Option<Duration>>,
    logout_probe: Mutex<Option<Probe>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl Default for MockReaderApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReaderApi {
    /// Logout succeeds; login and user lookups are unauthorized until set
    pub fn new() -> Self {
        Self {
            login: Mutex::new(Err(ApiError::Unauthorized)),
            logout: Mutex::new(Ok(())),
            user: Mutex::new(Err(ApiError::Unauthorized)),
            user_delay: Mutex::new(None),
            logout_probe: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_login(&self, result: Result<LoginResponse, ApiError>) {
        *lock(&self.login) = result;
    }

    pub fn set_logout(&self, result: Result<(), ApiError>) {
        *lock(&self.logout) = result;
    }

    pub fn set_user(&self, result: Result<UserRecord, ApiError>) {
        *lock(&self.user) = result;
    }

    /// Delay user lookups, to exercise stale responses
    pub fn set_user_delay(&self, delay: Duration) {
        *lock(&self.user_delay) = Some(delay);
    }

    /// Run `probe` while a logout call is in flight
    pub fn on_logout(&self, probe: impl Fn() + Send + Sync + 'static) {
        *lock(&self.logout_probe) = Some(Box::new(probe));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: ApiCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

#[async_trait]
impl ReaderApi for MockReaderApi {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        self.record(ApiCall::Login {
            email: email.to_string(),
        });
        lock(&self.login).clone()
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError> {
        self.record(ApiCall::Logout {
            token: token.as_str().to_string(),
        });
        if let Some(probe) = lock(&self.logout_probe).as_ref() {
            probe();
        }
        lock(&self.logout).clone()
    }

    async fn current_user(&self, token: &SessionToken) -> Result<UserRecord, ApiError> {
        self.record(ApiCall::CurrentUser {
            token: token.as_str().to_string(),
        });
        let delay = *lock(&self.user_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.user).clone()
    }
}
