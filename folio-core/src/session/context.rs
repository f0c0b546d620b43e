//! The one owned session context of a page

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::page::PageContext;
use crate::config::SessionConfig;
use crate::cookie::{CookieJar, CookieSync, SyncOutcome};
use crate::realtime::{EventDispatcher, EventTransport, RealtimeChannel};
use crate::token::{TokenStorage, TokenStore};

/// Token store, cookie sync, dispatcher, channel and page, with an explicit
/// lifecycle
///
/// `init` runs cookie reconciliation once for the lifetime of the context;
/// `teardown` closes the channel and cancels pending cookie timers.
pub struct SessionContext {
    config: SessionConfig,
    store: Arc<TokenStore>,
    cookie_sync: CookieSync,
    dispatcher: Arc<EventDispatcher>,
    channel: RealtimeChannel,
    page: Arc<PageContext>,
    synced: AtomicBool,
}

impl SessionContext {
    pub fn new(
        config: SessionConfig,
        storage: Arc<dyn TokenStorage>,
        jar: Arc<dyn CookieJar>,
        transport: Arc<dyn EventTransport>,
        page: Arc<PageContext>,
    ) -> Self {
        let store = Arc::new(TokenStore::from_config(storage, jar, &config));
        let cookie_sync = CookieSync::new(store.clone(), &config);
        let dispatcher = Arc::new(EventDispatcher::default());
        let channel = RealtimeChannel::new(
            store.clone(),
            transport,
            dispatcher.clone(),
            page.clone(),
            config.reconnect_delay(),
        );
        Self {
            config,
            store,
            cookie_sync,
            dispatcher,
            channel,
            page,
            synced: AtomicBool::new(false),
        }
    }

    /// Reconcile the cookie once; `None` on every later call
    pub fn init(&self) -> Option<SyncOutcome> {
        if self.synced.swap(true, Ordering::AcqRel) {
            debug!("Cookie sync already ran for this page");
            return None;
        }
        let outcome = self.cookie_sync.ensure_synced();
        debug!(?outcome, "Initial cookie sync");
        Some(outcome)
    }

    pub async fn teardown(&self) {
        self.channel.disconnect().await;
        self.cookie_sync.cancel_pending();
        debug!("Session context torn down");
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn cookie_sync(&self) -> &CookieSync {
        &self.cookie_sync
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn channel(&self) -> &RealtimeChannel {
        &self.channel
    }

    pub fn page(&self) -> &Arc<PageContext> {
        &self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MemoryCookieJar;
    use crate::realtime::mock::{Fallback, MockTransport};
    use crate::realtime::{ChannelState, ConnectOutcome};
    use crate::token::MemoryTokenStorage;

    fn context(token: Option<&str>) -> (Arc<MemoryCookieJar>, Arc<MockTransport>, SessionContext) {
        let config = SessionConfig::default();
        let storage = match token {
            Some(token) => MemoryTokenStorage::with_item("auth_token", token),
            None => MemoryTokenStorage::new(),
        };
        let jar = Arc::new(MemoryCookieJar::new());
        let transport = Arc::new(MockTransport::new(Fallback::Silent));
        let page = Arc::new(PageContext::from_config("/reader/books", &config));
        let ctx = SessionContext::new(config, Arc::new(storage), jar.clone(), transport.clone(), page);
        (jar, transport, ctx)
    }

    #[tokio::test(start_paused = true)]
    async fn init_syncs_exactly_once() {
        let (jar, _transport, ctx) = context(Some("tok123"));
        assert_eq!(ctx.init(), Some(SyncOutcome::Written));
        assert_eq!(ctx.init(), None);
        assert_eq!(jar.write_count(), 1);
        assert_eq!(ctx.store().mirror().decoded().as_deref(), Some("tok123"));
    }

    #[tokio::test(start_paused = true)]
    async fn init_without_token() {
        let (jar, _transport, ctx) = context(None);
        assert_eq!(ctx.init(), Some(SyncOutcome::NoToken));
        assert_eq!(jar.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_closes_channel() {
        let (_jar, transport, ctx) = context(Some("tok123"));
        assert!(matches!(
            ctx.channel().connect().await,
            ConnectOutcome::Started { .. }
        ));
        ctx.channel()
            .watch_state()
            .wait_for(|s| *s == ChannelState::Connected)
            .await
            .unwrap();

        ctx.teardown().await;
        assert_eq!(ctx.channel().state(), ChannelState::Disconnected);
        assert_eq!(transport.live_connections(), 0);
    }
}
