//! Error types surfaced by the widget core.
//!
//! Every failure coming back from the real-time client is converted into
//! one of these at the session boundary; UI code never sees a raw
//! [`ClientError`].

use crate::client::ClientError;

/// The session could not be established.
///
/// Raised when connection details are missing or cannot be fetched, or
/// when the external client rejects the connect call. Carries the
/// underlying error's name and message so the alert can show both.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ConnectionError: {name}: {message}")]
pub struct ConnectionError {
    pub name: String,
    pub message: String,
}

impl ConnectionError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The widget was asked to connect without a server URL or token.
    pub fn missing_details() -> Self {
        Self::new(
            "MissingConnectionDetails",
            "serverUrl and participantToken are required",
        )
    }

    /// An operation needed a live session and there was none.
    pub fn not_connected() -> Self {
        Self::new("NotConnected", "no active session")
    }
}

impl From<ClientError> for ConnectionError {
    fn from(e: ClientError) -> Self {
        Self::new(e.name, e.message)
    }
}

/// Microphone or camera access was denied or is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("MediaDeviceError: {name}: {message}")]
pub struct MediaDeviceError {
    pub name: String,
    pub message: String,
}

impl From<ClientError> for MediaDeviceError {
    fn from(e: ClientError) -> Self {
        Self {
            name: e.name,
            message: e.message,
        }
    }
}

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    MediaDevice(#[from] MediaDeviceError),
}

/// Errors from the timeline merger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    /// A message with this id is already in the timeline.
    #[error("duplicate message id: {0}")]
    DuplicateId(String),
}

/// Errors decoding an inbound data-channel payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("unknown data topic: {0}")]
    UnknownTopic(String),

    #[error("malformed {topic} payload: {source}")]
    Malformed {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty {0} payload")]
    Empty(String),
}

/// Errors on the cross-frame channel.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid widget origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),

    #[error("message from untrusted origin: {0}")]
    UntrustedOrigin(String),

    #[error("unrecognized frame message: {0}")]
    Unrecognized(#[from] serde_json::Error),
}

/// Errors reading or parsing the embed configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid embed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("script URL does not end in {0}")]
    UnexpectedScriptPath(&'static str),
}

/// Errors loading or saving persisted UI state.
#[derive(Debug, thiserror::Error)]
pub enum UiStateError {
    #[error("ui state I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ui state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
