//! Realtime event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire envelope of one server-push message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Known event type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    HelpRequest,
    HelpRequestUpdate,
    Activity,
    OnlineUsers,
    Login,
    Logout,
    /// Sent once by the server when the stream opens
    Connected,
    /// Keep-alive
    Heartbeat,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HelpRequest => "help_request",
            Self::HelpRequestUpdate => "help_request_update",
            Self::Activity => "activity",
            Self::OnlineUsers => "online_users",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Connected => "connected",
            Self::Heartbeat => "heartbeat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "help_request" => Some(Self::HelpRequest),
            "help_request_update" => Some(Self::HelpRequestUpdate),
            "activity" => Some(Self::Activity),
            "online_users" => Some(Self::OnlineUsers),
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            "connected" => Some(Self::Connected),
            "heartbeat" => Some(Self::Heartbeat),
            _ => None,
        }
    }
}

/// Who logged in or out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A parsed realtime event; consumed immediately, never stored
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    HelpRequest(Value),
    HelpRequestUpdate(Value),
    Activity(Value),
    OnlineUsers(Value),
    Login(Presence),
    Logout(Presence),
    Connected(Value),
    Heartbeat,
    /// A type this client does not know
    Other { kind: String, data: Value },
}

impl RealtimeEvent {
    /// Parse the JSON body of a server-push message
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let envelope: EventEnvelope = serde_json::from_str(json)?;
        Ok(Self::from_envelope(envelope))
    }

    pub fn from_envelope(envelope: EventEnvelope) -> Self {
        let Some(kind) = EventKind::parse(&envelope.kind) else {
            return Self::Other {
                kind: envelope.kind,
                data: envelope.data,
            };
        };
        match kind {
            EventKind::HelpRequest => Self::HelpRequest(envelope.data),
            EventKind::HelpRequestUpdate => Self::HelpRequestUpdate(envelope.data),
            EventKind::Activity => Self::Activity(envelope.data),
            EventKind::OnlineUsers => Self::OnlineUsers(envelope.data),
            EventKind::Login => Self::Login(presence(envelope.data)),
            EventKind::Logout => Self::Logout(presence(envelope.data)),
            EventKind::Connected => Self::Connected(envelope.data),
            EventKind::Heartbeat => Self::Heartbeat,
        }
    }

    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Self::HelpRequest(_) => Some(EventKind::HelpRequest),
            Self::HelpRequestUpdate(_) => Some(EventKind::HelpRequestUpdate),
            Self::Activity(_) => Some(EventKind::Activity),
            Self::OnlineUsers(_) => Some(EventKind::OnlineUsers),
            Self::Login(_) => Some(EventKind::Login),
            Self::Logout(_) => Some(EventKind::Logout),
            Self::Connected(_) => Some(EventKind::Connected),
            Self::Heartbeat => Some(EventKind::Heartbeat),
            Self::Other { .. } => None,
        }
    }

    /// Wire type tag
    pub fn type_name(&self) -> &str {
        match self {
            Self::Other { kind, .. } => kind,
            known => known.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }
}

fn presence(data: Value) -> Presence {
    serde_json::from_value(data).unwrap_or_default()
}
