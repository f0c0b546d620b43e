//! Where the session is running

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SessionConfig;

/// The current page location plus the alternate-dashboard mode flag
///
/// The alternate dashboard runs its own channel and logout. Every session
/// component stands down while [`PageContext::is_alternate_dashboard`] holds.
#[derive(Debug)]
pub struct PageContext {
    path: RwLock<String>,
    dashboard_flag: AtomicBool,
    dashboard_prefix: String,
}

impl PageContext {
    pub fn new(path: impl Into<String>, dashboard_prefix: impl Into<String>) -> Self {
        Self {
            path: RwLock::new(path.into()),
            dashboard_flag: AtomicBool::new(false),
            dashboard_prefix: dashboard_prefix.into(),
        }
    }

    pub fn from_config(path: impl Into<String>, config: &SessionConfig) -> Self {
        Self::new(path, config.dashboard_prefix.as_str())
    }

    pub fn path(&self) -> String {
        self.path
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Record an in-page navigation
    pub fn set_path(&self, path: impl Into<String>) {
        *self
            .path
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = path.into();
    }

    /// Mark the page as the alternate dashboard regardless of path
    pub fn set_dashboard_flag(&self, on: bool) {
        self.dashboard_flag.store(on, Ordering::Release);
    }

    pub fn is_alternate_dashboard(&self) -> bool {
        self.dashboard_flag.load(Ordering::Acquire)
            || (!self.dashboard_prefix.is_empty() && self.path().starts_with(&self.dashboard_prefix))
    }
}
