//! The page's single realtime connection
//!
//! [`RealtimeChannel`] owns at most one live connection. Every `connect`
//! closes and awaits the previous connection task before spawning a new one,
//! so two connections are never open at once. Transport failures stay
//! inside the task, which waits a fixed delay and tries again while a token
//! is stored.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::dispatch::EventDispatcher;
use super::error::TransportError;
use super::event::RealtimeEvent;
use super::sse::SseMessage;
use super::transport::EventTransport;
use crate::session::PageContext;
use crate::token::{SessionToken, TokenStore};

/// Connection state, observable through [`RealtimeChannel::watch_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    /// Last attempt failed; a retry is scheduled
    Error,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

/// What a `connect` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new connection task was started
    Started { handle: u64 },
    /// No token stored
    NoToken,
    /// The page runs its own channel
    StoodDown,
}

struct ChannelHandle {
    id: u64,
    token: SessionToken,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(handle = self.id, error = %e, "Realtime task ended abnormally");
        }
        debug!(handle = self.id, "Realtime connection closed");
    }
}

struct Shared {
    store: Arc<TokenStore>,
    transport: Arc<dyn EventTransport>,
    dispatcher: Arc<EventDispatcher>,
    page: Arc<PageContext>,
    reconnect_delay: Duration,
    state: watch::Sender<ChannelState>,
}

/// Manages one persistent server-push connection keyed by the stored token
pub struct RealtimeChannel {
    shared: Arc<Shared>,
    handle: Mutex<Option<ChannelHandle>>,
    next_id: AtomicU64,
}

impl RealtimeChannel {
    pub fn new(
        store: Arc<TokenStore>,
        transport: Arc<dyn EventTransport>,
        dispatcher: Arc<EventDispatcher>,
        page: Arc<PageContext>,
        reconnect_delay: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ChannelState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                store,
                transport,
                dispatcher,
                page,
                reconnect_delay,
                state,
            }),
            handle: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.shared.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.shared.state.subscribe()
    }

    /// Whether a connection task is running
    pub async fn is_live(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }

    /// Token the current connection was opened with
    pub async fn connected_token(&self) -> Option<SessionToken> {
        self.handle.lock().await.as_ref().map(|h| h.token.clone())
    }

    /// Open the connection, replacing any existing one
    ///
    /// Does nothing on the alternate dashboard or without a stored token.
    pub async fn connect(&self) -> ConnectOutcome {
        if self.shared.page.is_alternate_dashboard() {
            debug!("Alternate dashboard manages its own channel");
            return ConnectOutcome::StoodDown;
        }
        let Some(token) = self.shared.store.get() else {
            debug!("No session token, not connecting");
            return ConnectOutcome::NoToken;
        };

        let mut slot = self.handle.lock().await;
        if let Some(previous) = slot.take() {
            previous.close().await;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        self.shared.set_state(ChannelState::Connecting);
        let task = tokio::spawn(run(self.shared.clone(), id, token.clone(), cancel.clone()));
        *slot = Some(ChannelHandle {
            id,
            token,
            cancel,
            task,
        });
        debug!(handle = id, "Realtime connection started");
        ConnectOutcome::Started { handle: id }
    }

    /// Close the connection; returns false if none was open
    pub async fn disconnect(&self) -> bool {
        let previous = self.handle.lock().await.take();
        let Some(previous) = previous else {
            return false;
        };
        previous.close().await;
        self.shared.set_state(ChannelState::Disconnected);
        info!("Realtime channel disconnected");
        true
    }
}

impl Shared {
    fn set_state(&self, state: ChannelState) {
        self.state.send_replace(state);
    }

    /// Pump one connection until it fails; `None` once cancelled
    async fn pump(
        &self,
        id: u64,
        token: &SessionToken,
        cancel: &CancellationToken,
    ) -> Option<TransportError> {
        let mut stream = match self.transport.open(token).await {
            Ok(stream) => stream,
            Err(e) => return Some(e),
        };
        if cancel.is_cancelled() {
            return None;
        }
        self.set_state(ChannelState::Connected);
        info!(handle = id, "Realtime channel connected");

        loop {
            match stream.next().await {
                Some(Ok(message)) => {
                    // A cancelled handle never delivers
                    if cancel.is_cancelled() {
                        return None;
                    }
                    self.handle_message(id, message);
                }
                Some(Err(e)) => return Some(e),
                None => return Some(TransportError::Closed),
            }
        }
    }

    fn handle_message(&self, id: u64, message: SseMessage) {
        let event = match RealtimeEvent::parse(&message.data) {
            Ok(event) => event,
            Err(e) => {
                warn!(handle = id, error = %e, "Ignoring malformed realtime event");
                return;
            }
        };
        match &event {
            RealtimeEvent::Connected(_) => debug!(handle = id, "Server acknowledged connection"),
            RealtimeEvent::Heartbeat => trace!(handle = id, "Heartbeat"),
            other => debug!(handle = id, event_type = other.type_name(), "Realtime event"),
        }
        self.dispatcher.dispatch(&event);
    }

    fn log_failure(&self, id: u64, error: &TransportError) {
        let delay_ms = self.reconnect_delay.as_millis() as u64;
        if self.page.is_alternate_dashboard() {
            debug!(handle = id, %error, delay_ms, "Realtime connection error");
        } else {
            warn!(handle = id, %error, delay_ms, "Realtime connection error, reconnecting");
        }
    }

    /// Token to retry with, if the session still wants a channel
    fn retry_token(&self) -> Option<SessionToken> {
        if self.page.is_alternate_dashboard() {
            debug!("Page switched to alternate dashboard, not reconnecting");
            return None;
        }
        let token = self.store.get();
        if token.is_none() {
            debug!("Session token gone, not reconnecting");
        }
        token
    }
}

async fn run(shared: Arc<Shared>, id: u64, mut token: SessionToken, cancel: CancellationToken) {
    loop {
        shared.set_state(ChannelState::Connecting);
        let error = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            error = shared.pump(id, &token, &cancel) => match error {
                Some(error) => error,
                None => return,
            },
        };

        shared.set_state(ChannelState::Error);
        shared.log_failure(id, &error);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(shared.reconnect_delay) => {}
        }

        match shared.retry_token() {
            Some(current) => token = current,
            None => {
                shared.set_state(ChannelState::Disconnected);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::cookie::MemoryCookieJar;
    use crate::realtime::mock::{Fallback, MockTransport, TransportEvent};
    use crate::token::MemoryTokenStorage;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct Harness {
        transport: Arc<MockTransport>,
        store: Arc<TokenStore>,
        dispatcher: Arc<EventDispatcher>,
        page: Arc<PageContext>,
        channel: RealtimeChannel,
    }

    fn harness(fallback: Fallback, token: Option<&str>) -> Harness {
        let config = SessionConfig::default();
        let storage = match token {
            Some(token) => MemoryTokenStorage::with_item("auth_token", token),
            None => MemoryTokenStorage::new(),
        };
        let store = Arc::new(TokenStore::from_config(
            Arc::new(storage),
            Arc::new(MemoryCookieJar::new()),
            &config,
        ));
        let transport = Arc::new(MockTransport::new(fallback));
        let dispatcher = Arc::new(EventDispatcher::default());
        let page = Arc::new(PageContext::from_config("/reader/books", &config));
        let channel = RealtimeChannel::new(
            store.clone(),
            transport.clone(),
            dispatcher.clone(),
            page.clone(),
            config.reconnect_delay(),
        );
        Harness {
            transport,
            store,
            dispatcher,
            page,
            channel,
        }
    }

    async fn wait_for(channel: &RealtimeChannel, state: ChannelState) {
        channel
            .watch_state()
            .wait_for(|s| *s == state)
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn no_token_is_a_noop() {
        let h = harness(Fallback::Silent, None);
        assert_eq!(h.channel.connect().await, ConnectOutcome::NoToken);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.transport.attempt_count(), 0);
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn alternate_dashboard_stands_down() {
        let h = harness(Fallback::Silent, Some("tok123"));
        h.page.set_path("/consultant/dashboard");
        assert_eq!(h.channel.connect().await, ConnectOutcome::StoodDown);
        assert!(!h.channel.is_live().await);
        assert_eq!(h.transport.attempt_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_opens_with_stored_token() {
        let h = harness(Fallback::Silent, Some("tok123"));
        assert!(matches!(
            h.channel.connect().await,
            ConnectOutcome::Started { handle: 1 }
        ));
        wait_for(&h.channel, ChannelState::Connected).await;

        assert!(h.channel.is_live().await);
        assert_eq!(
            h.channel.connected_token().await,
            Some(SessionToken::from("tok123"))
        );
        assert!(matches!(
            h.transport.events().as_slice(),
            [TransportEvent::Opened { connection: 1, token, .. }] if token == "tok123"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_connect_closes_first_before_opening() {
        let h = harness(Fallback::Silent, Some("tok123"));
        let first = h.transport.queue_stream();
        let _second = h.transport.queue_stream();

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Connected).await;
        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Connected).await;

        let events = h.transport.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], TransportEvent::Opened { connection: 1, .. }));
        assert_eq!(events[1], TransportEvent::Closed { connection: 1 });
        assert!(matches!(events[2], TransportEvent::Opened { connection: 2, .. }));
        assert_eq!(h.transport.live_connections(), 1);
        assert!(!first.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn events_reach_registered_callbacks() {
        let h = harness(Fallback::Silent, Some("tok123"));
        let feed = h.transport.queue_stream();
        let help = Arc::new(AtomicUsize::new(0));
        let h2 = help.clone();
        h.dispatcher.on_help_requests(move || {
            h2.fetch_add(1, Ordering::SeqCst);
        });
        let mut events = h.dispatcher.subscribe();

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Connected).await;

        feed.send_event("connected", json!({"user_id": "u1"}));
        feed.send_raw("{not json");
        feed.send_event("help_request", json!({"id": "r1"}));

        assert!(matches!(events.recv().await.unwrap(), RealtimeEvent::Connected(_)));
        assert!(matches!(
            events.recv().await.unwrap(),
            RealtimeEvent::HelpRequest(_)
        ));
        assert_eq!(help.load(Ordering::SeqCst), 1);
        // Malformed message did not break the connection
        assert_eq!(h.channel.state(), ChannelState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_at_fixed_interval() {
        let h = harness(Fallback::Fail, Some("tok123"));
        let start = tokio::time::Instant::now();

        h.channel.connect().await;
        tokio::time::sleep(Duration::from_millis(15_500)).await;

        let times = h.transport.attempt_times();
        assert_eq!(times.len(), 4);
        assert!(times[0] - start < Duration::from_millis(1));
        for pair in times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_secs(5), "gap {gap:?}");
            assert!(gap < Duration::from_millis(5_010), "gap {gap:?}");
        }
        assert_eq!(h.channel.state(), ChannelState::Error);
        assert!(h.channel.is_live().await);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_error_reconnects_with_current_token() {
        let h = harness(Fallback::Silent, Some("tok123"));
        let feed = h.transport.queue_stream();

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Connected).await;

        h.store.set(&SessionToken::from("rotated"));
        feed.fail(TransportError::Stream("connection reset".to_string()));
        wait_for(&h.channel, ChannelState::Error).await;
        assert_eq!(h.transport.open_count(), 1);

        wait_for(&h.channel, ChannelState::Connected).await;
        let tokens: Vec<_> = h
            .transport
            .events()
            .into_iter()
            .filter_map(|e| match e {
                TransportEvent::Opened { token, .. } => Some(token),
                _ => None,
            })
            .collect();
        assert_eq!(tokens, vec!["tok123".to_string(), "rotated".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn server_close_triggers_reconnect() {
        let h = harness(Fallback::Silent, Some("tok123"));
        let feed = h.transport.queue_stream();

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Connected).await;
        feed.close();

        wait_for(&h.channel, ChannelState::Error).await;
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(h.transport.open_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_token_stops_retrying() {
        let h = harness(Fallback::Fail, Some("tok123"));

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Error).await;
        h.store.clear();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.transport.attempt_count(), 1);
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
        assert!(!h.channel.is_live().await);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_closes_and_is_idempotent() {
        let h = harness(Fallback::Silent, Some("tok123"));
        let feed = h.transport.queue_stream();

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Connected).await;

        assert!(h.channel.disconnect().await);
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
        assert_eq!(h.transport.live_connections(), 0);
        assert!(!feed.is_open());

        assert!(!h.channel.disconnect().await);
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_cancels_pending_retry() {
        let h = harness(Fallback::Fail, Some("tok123"));

        h.channel.connect().await;
        wait_for(&h.channel, ChannelState::Error).await;
        h.channel.disconnect().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.transport.attempt_count(), 1);
    }

    #[test]
    fn state_names() {
        assert_eq!(ChannelState::Error.as_str(), "error");
        assert_eq!(
            serde_json::to_string(&ChannelState::Connected).unwrap(),
            "\"connected\""
        );
    }
}
