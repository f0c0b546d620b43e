//! Cookie reconciliation against the tab-local token
//!
//! A cookie write is not always visible to a read on the same page right
//! away. [`CookieSync::ensure_synced`] compares the jar against the stored
//! token, writes when they disagree, and re-reads once after a short delay,
//! rewriting at most one more time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::timer::Timer;
use crate::token::{SessionToken, TokenStore};

/// What a reconciliation pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No token stored; nothing to mirror
    NoToken,
    /// The jar already holds the token
    AlreadySynced,
    /// The cookie was (re)written
    Written,
    /// Another pass ran within the guard window
    InFlight,
}

/// Keeps the mirrored cookie consistent with [`TokenStore`]
pub struct CookieSync {
    store: Arc<TokenStore>,
    in_flight: Arc<AtomicBool>,
    guard_window: Duration,
    verify_delay: Option<Duration>,
    pending: Mutex<Vec<Timer>>,
}

impl CookieSync {
    pub fn new(store: Arc<TokenStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
            guard_window: config.cookie_guard_window(),
            verify_delay: config
                .verify_cookie
                .then(|| config.cookie_verify_delay()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Write the cookie for `token` unconditionally
    pub fn sync(&self, token: &SessionToken) {
        self.store.mirror().write(token);
    }

    /// Reconcile the cookie with the stored token
    ///
    /// Must be called from within a Tokio runtime: the guard reset and the
    /// verification pass run on timers.
    pub fn ensure_synced(&self) -> SyncOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Cookie sync already in flight");
            return SyncOutcome::InFlight;
        }
        let guard = self.in_flight.clone();
        self.track(Timer::after(self.guard_window, async move {
            guard.store(false, Ordering::Release);
        }));

        let Some(token) = self.store.get() else {
            return SyncOutcome::NoToken;
        };

        let mirror = self.store.mirror();
        if mirror.matches(&token) {
            return SyncOutcome::AlreadySynced;
        }

        debug!("Cookie missing or stale, writing mirror");
        self.sync(&token);

        if let Some(delay) = self.verify_delay {
            let store = self.store.clone();
            self.track(Timer::after(delay, async move {
                // The token may have been cleared or replaced meanwhile.
                if store.get().as_ref() != Some(&token) {
                    return;
                }
                if !store.mirror().matches(&token) {
                    warn!("Cookie sync may have failed, retrying once");
                    store.mirror().write(&token);
                }
            }));
        }

        SyncOutcome::Written
    }

    /// Cancel the guard reset and any verification still scheduled
    pub fn cancel_pending(&self) {
        let timers = std::mem::take(
            &mut *self
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for timer in &timers {
            timer.cancel();
        }
        self.in_flight.store(false, Ordering::Release);
    }

    fn track(&self, timer: Timer) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.retain(|t| !t.is_finished());
        pending.push(timer);
    }
}
