//! LiveKit integration for the Botel widget backend.
//!
//! The widget never talks to LiveKit's server APIs directly. Before a
//! session starts it asks the backend for connection details: the LiveKit
//! URL plus a short-lived join token scoped to a freshly named room. This
//! crate owns that exchange.

pub mod config;
pub mod error;
pub mod service;

pub use config::LiveKitConfig;
pub use error::VoiceError;
pub use service::VoiceService;
