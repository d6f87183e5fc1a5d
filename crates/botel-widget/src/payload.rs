//! Decoding of inbound data-channel payloads into timeline entries.

use crate::client::{CHAT_TOPIC, TRANSCRIPTION_TOPIC};
use crate::error::PayloadError;
use botel_types::{Message, Role};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity the voice agent joins rooms with.
pub const DEFAULT_AGENT_IDENTITY: &str = "agent";

#[derive(Debug, Deserialize)]
struct ChatPayload {
    id: String,
    message: String,
    timestamp: i64,
}

fn default_final() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptionPayload {
    id: String,
    text: String,
    #[serde(default = "default_final")]
    r#final: bool,
    first_received_time: i64,
}

/// A decoded data-channel item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A message ready for the timeline.
    Final(Message),
    /// A transcription segment that is still being spoken.
    Interim(Message),
}

/// Decodes a payload received on `topic` from participant `sender`.
pub fn decode(
    topic: &str,
    sender: &str,
    payload: &[u8],
    agent_identity: &str,
) -> Result<Inbound, PayloadError> {
    let role = Role::from_identity(sender, agent_identity);
    match topic {
        CHAT_TOPIC => {
            let chat: ChatPayload =
                serde_json::from_slice(payload).map_err(|source| PayloadError::Malformed {
                    topic: topic.to_string(),
                    source,
                })?;
            if chat.id.is_empty() || chat.message.trim().is_empty() {
                return Err(PayloadError::Empty(topic.to_string()));
            }
            Ok(Inbound::Final(Message::chat(
                chat.id,
                role,
                chat.message,
                chat.timestamp,
            )))
        }
        TRANSCRIPTION_TOPIC => {
            let segment: TranscriptionPayload =
                serde_json::from_slice(payload).map_err(|source| PayloadError::Malformed {
                    topic: topic.to_string(),
                    source,
                })?;
            if segment.id.is_empty() {
                return Err(PayloadError::Empty(topic.to_string()));
            }
            let message = Message::transcription(
                segment.id,
                role,
                segment.text,
                segment.first_received_time,
            );
            if segment.r#final {
                Ok(Inbound::Final(message))
            } else {
                Ok(Inbound::Interim(message))
            }
        }
        other => Err(PayloadError::UnknownTopic(other.to_string())),
    }
}

/// Counters for inbound data-channel traffic.
#[derive(Debug, Default)]
pub struct PayloadStats {
    accepted: AtomicU64,
    malformed: AtomicU64,
    unknown_topic: AtomicU64,
    duplicate: AtomicU64,
}

/// Point-in-time copy of [`PayloadStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadStatsSnapshot {
    pub accepted: u64,
    pub malformed: u64,
    pub unknown_topic: u64,
    pub duplicate: u64,
}

impl PayloadStats {
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicate.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a rejected payload under the matching bucket.
    pub fn record_error(&self, err: &PayloadError) {
        match err {
            PayloadError::UnknownTopic(_) => self.unknown_topic.fetch_add(1, Ordering::Relaxed),
            PayloadError::Malformed { .. } | PayloadError::Empty(_) => {
                self.malformed.fetch_add(1, Ordering::Relaxed)
            }
        };
    }

    pub fn snapshot(&self) -> PayloadStatsSnapshot {
        PayloadStatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unknown_topic: self.unknown_topic.load(Ordering::Relaxed),
            duplicate: self.duplicate.load(Ordering::Relaxed),
        }
    }
}
