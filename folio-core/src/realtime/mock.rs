//! Scripted transport for tests and offline runs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::error::TransportError;
use super::sse::SseMessage;
use super::transport::{EventStream, EventTransport};
use crate::token::SessionToken;

/// Connection lifecycle as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened {
        connection: usize,
        token: String,
        at: Instant,
    },
    OpenFailed {
        attempt: usize,
        at: Instant,
    },
    Closed {
        connection: usize,
    },
}

enum Script {
    Fail(TransportError),
    Stream(mpsc::UnboundedReceiver<Result<SseMessage, TransportError>>),
}

/// What an open does once the script runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Refuse to connect
    Fail,
    /// Connect and stay silent
    Silent,
}

#[derive(Default)]
struct State {
    scripts: VecDeque<Script>,
    attempts: usize,
    connections: usize,
    silent: Vec<mpsc::UnboundedSender<Result<SseMessage, TransportError>>>,
}

/// Transport driven by a queue of scripted connections
///
/// Every open attempt and every close is recorded in order, which makes the
/// close-before-open and retry-timing properties of a channel observable.
pub struct MockTransport {
    state: Mutex<State>,
    log: Arc<Mutex<Vec<TransportEvent>>>,
    fallback: Fallback,
}

impl MockTransport {
    pub fn new(fallback: Fallback) -> Self {
        Self {
            state: Mutex::new(State::default()),
            log: Arc::new(Mutex::new(Vec::new())),
            fallback,
        }
    }

    /// Queue a connection that fails to open
    pub fn queue_failure(&self, error: TransportError) {
        self.lock_state().scripts.push_back(Script::Fail(error));
    }

    /// Queue a connection that opens; the returned handle feeds it
    pub fn queue_stream(&self) -> MockStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_state().scripts.push_back(Script::Stream(rx));
        MockStream { tx }
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.lock_log().clone()
    }

    /// Successful opens so far
    pub fn open_count(&self) -> usize {
        self.lock_log()
            .iter()
            .filter(|e| matches!(e, TransportEvent::Opened { .. }))
            .count()
    }

    /// Open attempts so far, failed ones included
    pub fn attempt_count(&self) -> usize {
        self.lock_state().attempts
    }

    /// Instants of every open attempt, failed ones included
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.lock_log()
            .iter()
            .filter_map(|e| match e {
                TransportEvent::Opened { at, .. } | TransportEvent::OpenFailed { at, .. } => {
                    Some(*at)
                }
                TransportEvent::Closed { .. } => None,
            })
            .collect()
    }

    /// Connections opened and not yet closed
    pub fn live_connections(&self) -> usize {
        let log = self.lock_log();
        let closed = log
            .iter()
            .filter(|e| matches!(e, TransportEvent::Closed { .. }))
            .count();
        log.iter()
            .filter(|e| matches!(e, TransportEvent::Opened { .. }))
            .count()
            - closed
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<TransportEvent>> {
        self.log.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, event: TransportEvent) {
        self.lock_log().push(event);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new(Fallback::Fail)
    }
}

#[async_trait]
impl EventTransport for MockTransport {
    async fn open(&self, token: &SessionToken) -> Result<EventStream, TransportError> {
        let (attempt, script) = {
            let mut state = self.lock_state();
            state.attempts += 1;
            (state.attempts, state.scripts.pop_front())
        };

        let rx = match script {
            Some(Script::Stream(rx)) => rx,
            Some(Script::Fail(error)) => {
                self.record(TransportEvent::OpenFailed {
                    attempt,
                    at: Instant::now(),
                });
                return Err(error);
            }
            None => match self.fallback {
                Fallback::Fail => {
                    self.record(TransportEvent::OpenFailed {
                        attempt,
                        at: Instant::now(),
                    });
                    return Err(TransportError::Connect("connection refused".to_string()));
                }
                Fallback::Silent => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    self.lock_state().silent.push(tx);
                    rx
                }
            },
        };

        let connection = {
            let mut state = self.lock_state();
            state.connections += 1;
            state.connections
        };
        self.record(TransportEvent::Opened {
            connection,
            token: token.as_str().to_string(),
            at: Instant::now(),
        });

        let guard = CloseGuard {
            connection,
            log: self.log.clone(),
        };
        let messages = stream::unfold((rx, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|item| (item, (rx, guard)))
        });
        Ok(Box::pin(messages))
    }
}

/// Records the close when the connection's stream is dropped or ends
struct CloseGuard {
    connection: usize,
    log: Arc<Mutex<Vec<TransportEvent>>>,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.log
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(TransportEvent::Closed {
                connection: self.connection,
            });
    }
}

/// Feeds one scripted connection
pub struct MockStream {
    tx: mpsc::UnboundedSender<Result<SseMessage, TransportError>>,
}

impl MockStream {
    /// Send a `{type, data}` event
    pub fn send_event(&self, kind: &str, data: Value) -> bool {
        let body = serde_json::json!({ "type": kind, "data": data });
        self.send_raw(body.to_string())
    }

    /// Send a message body verbatim
    pub fn send_raw(&self, data: impl Into<String>) -> bool {
        self.tx.send(Ok(SseMessage::data(data))).is_ok()
    }

    /// Break the connection with `error`
    pub fn fail(&self, error: TransportError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// End the connection from the server side
    pub fn close(self) {}

    /// Whether the consumer still holds the connection
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
