//! Cross-frame messaging between the widget iframe and its host page.
//!
//! The widget posts [`FrameMessage`]s to the parent window; the embed
//! script resizes the iframe and toggles pointer-event passthrough in
//! response. The host only acts on messages whose origin matches the
//! widget's own origin.

use crate::error::FrameError;
use botel_types::WidgetUiState;
use serde::{Deserialize, Serialize};
use url::{Origin, Url};

/// Iframe size while only the launcher button is showing.
pub const LAUNCHER_SIZE: (u32, u32) = (96, 96);

/// Iframe size while the chat panel is open.
pub const PANEL_SIZE: (u32, u32) = (424, 700);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FrameMessage {
    /// The widget changed size or interactivity.
    #[serde(rename = "botel-widget-resize")]
    Resize {
        width: u32,
        height: u32,
        interactive: bool,
    },
    /// The widget finished loading inside the iframe.
    #[serde(rename = "botel-widget-ready")]
    Ready,
}

impl FrameMessage {
    /// The resize message matching the widget's visible state.
    pub fn for_ui_state(state: &WidgetUiState) -> Self {
        let (width, height) = if state.is_open {
            PANEL_SIZE
        } else {
            LAUNCHER_SIZE
        };
        Self::Resize {
            width,
            height,
            interactive: true,
        }
    }

    pub fn to_json(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Host-side receiver that validates and decodes inbound frame messages.
#[derive(Debug, Clone)]
pub struct FrameBridge {
    widget_origin: Origin,
}

impl FrameBridge {
    /// Creates a bridge trusting the origin of `widget_url`.
    pub fn new(widget_url: &str) -> Result<Self, FrameError> {
        let url = Url::parse(widget_url)?;
        Ok(Self {
            widget_origin: url.origin(),
        })
    }

    pub fn widget_origin(&self) -> String {
        self.widget_origin.ascii_serialization()
    }

    /// Returns `true` if `origin` is exactly the widget's origin.
    pub fn is_trusted(&self, origin: &str) -> bool {
        match Url::parse(origin) {
            Ok(url) => {
                let candidate = url.origin();
                candidate.is_tuple() && candidate == self.widget_origin
            }
            Err(_) => false,
        }
    }

    /// Validates the sender and decodes a message event's data.
    pub fn accept(&self, origin: &str, data: &str) -> Result<FrameMessage, FrameError> {
        self.check_origin(origin)?;
        Ok(serde_json::from_str(data)?)
    }

    /// Same as [`accept`](Self::accept) for already-parsed data.
    pub fn accept_value(
        &self,
        origin: &str,
        data: serde_json::Value,
    ) -> Result<FrameMessage, FrameError> {
        self.check_origin(origin)?;
        Ok(serde_json::from_value(data)?)
    }

    fn check_origin(&self, origin: &str) -> Result<(), FrameError> {
        if self.is_trusted(origin) {
            Ok(())
        } else {
            tracing::warn!(
                origin,
                expected = %self.widget_origin(),
                "ignoring frame message from untrusted origin"
            );
            Err(FrameError::UntrustedOrigin(origin.to_string()))
        }
    }
}

/// Pointer-event passthrough of the hosting iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerEvents {
    All,
    #[default]
    None,
}

impl PointerEvents {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::None => "none",
        }
    }
}

/// Geometry the embed script applies to the hosting iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IframeStyle {
    pub width: u32,
    pub height: u32,
    pub pointer_events: PointerEvents,
}

impl Default for IframeStyle {
    fn default() -> Self {
        Self {
            width: LAUNCHER_SIZE.0,
            height: LAUNCHER_SIZE.1,
            pointer_events: PointerEvents::None,
        }
    }
}

impl IframeStyle {
    /// Applies a frame message, returning `true` if the style changed.
    pub fn apply(&mut self, message: &FrameMessage) -> bool {
        let FrameMessage::Resize {
            width,
            height,
            interactive,
        } = message
        else {
            return false;
        };
        let next = Self {
            width: *width,
            height: *height,
            pointer_events: if *interactive {
                PointerEvents::All
            } else {
                PointerEvents::None
            },
        };
        let changed = next != *self;
        *self = next;
        changed
    }

    pub fn to_css(&self) -> String {
        format!(
            "width: {}px; height: {}px; pointer-events: {};",
            self.width,
            self.height,
            self.pointer_events.as_css()
        )
    }
}
