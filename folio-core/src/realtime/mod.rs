//! Realtime server-push channel

mod channel;
mod dispatch;
mod error;
mod event;
pub mod mock;
mod sse;
mod transport;

pub use channel::{ChannelState, ConnectOutcome, RealtimeChannel};
pub use dispatch::{EventCategory, EventDispatcher};
pub use error::TransportError;
pub use event::{EventEnvelope, EventKind, Presence, RealtimeEvent};
pub use mock::MockTransport;
pub use sse::{SseDecoder, SseMessage};
pub use transport::{EventStream, EventTransport, SseTransport};
