//! Shared types for the Botel widget workspace.
//!
//! This crate holds the small vocabulary every other crate speaks: the
//! session lifecycle states, message roles, interaction modes, widget
//! placement, and the connection details handed from the server to the
//! widget before a session starts.
//!
//! Nothing in here performs I/O. Crates depend on `botel-types` for
//! cross-cutting definitions so the dependency graph stays acyclic.

use serde::{Deserialize, Serialize};

mod message;
mod ui;

pub use message::{Message, MessageSource};
pub use ui::{InteractionMode, WidgetPosition, WidgetUiState};

/// Lifecycle state of a real-time session.
///
/// The only legal path is `Idle → Connecting → Connected → Disconnected →
/// Idle`, with `Connecting → Disconnected` for failed or aborted attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session exists.
    #[default]
    Idle,
    /// A connect request is in flight.
    Connecting,
    /// The external client reported a live connection.
    Connected,
    /// The session ended or failed; the next step is `Idle`.
    Disconnected,
}

impl SessionState {
    /// Returns the canonical label for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }

    /// Returns `true` if moving from `self` to `next` follows the lifecycle.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Connecting)
                | (Self::Connecting, Self::Connected)
                | (Self::Connecting, Self::Disconnected)
                | (Self::Connected, Self::Disconnected)
                | (Self::Disconnected, Self::Idle)
        )
    }

    /// Returns `true` while a connection is in flight or established.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Status line shown in the widget header.
    pub fn status_label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            _ => "Connecting...",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who produced a message in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person using the widget.
    User,
    /// The voice agent on the other side of the session.
    Agent,
}

impl Role {
    /// Maps a participant identity to a role.
    ///
    /// Only the configured agent identity is treated as the agent; every
    /// other participant, including the local one, is the user.
    pub fn from_identity(identity: &str, agent_identity: &str) -> Self {
        if identity == agent_identity {
            Self::Agent
        } else {
            Self::User
        }
    }

    /// Avatar initials rendered next to a message bubble.
    pub fn initials(self) -> &'static str {
        match self {
            Self::User => "U",
            Self::Agent => "AI",
        }
    }
}

/// Connection parameters for one session, as issued by the
/// connection-details endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    /// WebSocket URL of the real-time server.
    pub server_url: String,
    /// Room the participant will join.
    #[serde(default)]
    pub room_name: String,
    /// Display name of the participant.
    #[serde(default)]
    pub participant_name: String,
    /// Signed join token.
    pub participant_token: String,
}

impl ConnectionDetails {
    /// Builds details from a bare URL and token pair.
    pub fn new(server_url: impl Into<String>, participant_token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            room_name: String::new(),
            participant_name: String::new(),
            participant_token: participant_token.into(),
        }
    }

    /// Returns `true` when both the URL and the token are present.
    pub fn is_complete(&self) -> bool {
        !self.server_url.trim().is_empty() && !self.participant_token.trim().is_empty()
    }
}

impl std::fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("server_url", &self.server_url)
            .field("room_name", &self.room_name)
            .field("participant_name", &self.participant_name)
            .field("participant_token", &"[REDACTED]")
            .finish()
    }
}

/// Error returned when parsing an unknown enum label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseLabelError {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}
