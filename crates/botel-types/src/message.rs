//! Timeline message definitions.

use crate::Role;
use serde::{Deserialize, Serialize};

/// Where a message entered the timeline from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    /// A finalized speech-to-text segment.
    Transcription,
    /// A text message sent over the data channel.
    Chat,
}

/// A single entry in the conversation timeline.
///
/// Messages are immutable once created. The timeline orders them by
/// `timestamp` (milliseconds on the session clock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier, unique within a session.
    pub id: String,
    /// Author of the message.
    pub role: Role,
    /// Message body.
    pub text: String,
    /// Milliseconds on the session clock.
    pub timestamp: i64,
    /// Stream the message arrived on.
    pub source: MessageSource,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        text: impl Into<String>,
        timestamp: i64,
        source: MessageSource,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            timestamp,
            source,
        }
    }

    /// Shorthand for a chat message.
    pub fn chat(id: impl Into<String>, role: Role, text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(id, role, text, timestamp, MessageSource::Chat)
    }

    /// Shorthand for a transcription-derived message.
    pub fn transcription(
        id: impl Into<String>,
        role: Role,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self::new(id, role, text, timestamp, MessageSource::Transcription)
    }
}
