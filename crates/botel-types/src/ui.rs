//! Widget presentation state shared between the widget core and its host.

use crate::ParseLabelError;
use serde::{Deserialize, Serialize};

/// How the user is interacting with the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Typed messages.
    #[default]
    Chat,
    /// Live speech.
    Voice,
}

impl InteractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Voice => "voice",
        }
    }

    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Chat => Self::Voice,
            Self::Voice => Self::Chat,
        }
    }
}

impl std::str::FromStr for InteractionMode {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "voice" => Ok(Self::Voice),
            _ => Err(ParseLabelError {
                kind: "interaction mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Screen corner the widget is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
}

impl WidgetPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
        }
    }

    /// Lenient parse used for embed parameters: anything that is not
    /// `bottom-left` anchors to the bottom-right corner.
    pub fn from_param(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for WidgetPosition {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-right" => Ok(Self::BottomRight),
            "bottom-left" => Ok(Self::BottomLeft),
            _ => Err(ParseLabelError {
                kind: "widget position",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for WidgetPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visible widget state owned by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetUiState {
    /// Whether the panel is expanded.
    #[serde(default)]
    pub is_open: bool,
    /// Current interaction mode.
    #[serde(default)]
    pub mode: InteractionMode,
    /// Whether the local microphone is muted.
    #[serde(default)]
    pub is_muted: bool,
}
