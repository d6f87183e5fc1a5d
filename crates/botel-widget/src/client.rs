//! Capability interface onto the external real-time client.
//!
//! The widget never touches media transport. It asks the client to
//! connect, disconnect, toggle the microphone and send chat text, and it
//! listens to the events the client broadcasts.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Data topic carrying chat messages.
pub const CHAT_TOPIC: &str = "lk.chat";

/// Data topic carrying live transcription segments.
pub const TRANSCRIPTION_TOPIC: &str = "lk.transcription";

/// An error reported by the external client, identified by the platform
/// error name (e.g. `NetworkError`, `NotAllowedError`) and its message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct ClientError {
    pub name: String,
    pub message: String,
}

impl ClientError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Events broadcast by the external client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The room connection is up.
    Connected,
    /// The room connection went away, locally or remotely.
    Disconnected { reason: Option<String> },
    /// A capture device failed after the session started.
    MediaDeviceError(ClientError),
    /// Bytes arrived on a data topic from another participant.
    DataReceived {
        topic: String,
        sender: String,
        payload: Vec<u8>,
    },
}

/// Acknowledgement returned for a sent chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReceipt {
    pub id: String,
}

#[async_trait]
pub trait RealtimeClient: Send + Sync {
    async fn connect(&self, server_url: &str, token: &str) -> Result<(), ClientError>;

    async fn disconnect(&self) -> Result<(), ClientError>;

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), ClientError>;

    async fn send_chat_message(&self, text: &str) -> Result<ChatReceipt, ClientError>;

    /// Returns a fresh receiver for client events.
    fn events(&self) -> broadcast::Receiver<ClientEvent>;
}

/// A registered listener on the client's event stream.
///
/// Dropping the subscription deregisters it, so listeners cannot leak
/// across open/close cycles regardless of how the owner exits.
pub struct EventSubscription {
    receiver: broadcast::Receiver<ClientEvent>,
    live: Arc<AtomicUsize>,
}

impl EventSubscription {
    pub(crate) fn new(receiver: broadcast::Receiver<ClientEvent>, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self { receiver, live }
    }

    /// Waits for the next event. Returns `None` once the client is gone.
    pub async fn recv(&mut self) -> Option<ClientEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "client event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ClientEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "client event subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("released client event subscription");
    }
}

impl std::fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscription")
            .field("live", &self.live.load(Ordering::SeqCst))
            .finish()
    }
}
