//! Core of the Botel chat/voice widget.
//!
//! The widget embeds in a host page (through an iframe) and connects the
//! visitor to a voice agent over an external real-time client. This crate
//! holds everything that is not rendering:
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`session`] | Session lifecycle: idle, connecting, connected, disconnected |
//! | [`mode`] | Chat/voice mode switch |
//! | [`timeline`] | Ordered merge of transcriptions and chat messages |
//! | [`payload`] | Decoding of data-channel payloads |
//! | [`client`] | Capability trait onto the real-time client |
//! | [`details`] | Fetching connection details before a session |
//! | [`config`] | Host-page embed configuration |
//! | [`frame`] | iframe ↔ host message protocol |
//! | [`ui_state`] | Persisted open/mode/mute state |
//! | [`widget`] | The facade the UI layer drives |
//!
//! # Usage
//!
//! ```rust,ignore
//! use botel_widget::{StaticDetails, Widget, WidgetConfig};
//!
//! let config = WidgetConfig::from_json(r#"{"serverUrl": "wss://x", "token": "t1"}"#)?;
//! let details = StaticDetails::from_config(&config).expect("static details");
//! let mut widget = Widget::new(config, client, Arc::new(details));
//! widget.mount().await;
//! widget.open().await?;
//! widget.wait_for_session().await.transpose()?;
//! widget.send_message("Do you have a room for Friday?").await?;
//! ```

pub mod client;
pub mod config;
pub mod details;
pub mod error;
pub mod frame;
pub mod mode;
pub mod payload;
pub mod session;
pub mod timeline;
pub mod ui_state;
pub mod widget;

pub use client::{
    ChatReceipt, ClientError, ClientEvent, EventSubscription, RealtimeClient, CHAT_TOPIC,
    TRANSCRIPTION_TOPIC,
};
pub use config::{embed_base_url, WidgetConfig};
pub use details::{ConnectionDetailsSource, HttpDetailsSource, StaticDetails};
pub use error::{
    ConfigError, ConnectionError, FrameError, MediaDeviceError, PayloadError, SessionError,
    TimelineError, UiStateError,
};
pub use frame::{FrameBridge, FrameMessage, IframeStyle, PointerEvents};
pub use mode::ModeSwitch;
pub use payload::{Inbound, PayloadStats, PayloadStatsSnapshot, DEFAULT_AGENT_IDENTITY};
pub use session::{Alert, SessionController, SessionNotification, StartOutcome};
pub use timeline::{SessionClock, TimelineMerger};
pub use ui_state::{JsonFileUiStateStore, MemoryUiStateStore, UiStateStore};
pub use widget::Widget;

#[cfg(test)]
mod tests;
