use serde::{Deserialize, Serialize};
use std::fmt;

fn default_token_ttl_seconds() -> u64 {
    900
}

fn default_room_prefix() -> String {
    "voice_assistant_room".to_string()
}

fn default_participant_prefix() -> String {
    "voice_assistant_user".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    /// Browser-facing WebSocket URL handed to the widget.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for join tokens. Default: 900 (15 minutes).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    #[serde(default = "default_room_prefix")]
    pub room_prefix: String,
    #[serde(default = "default_participant_prefix")]
    pub participant_prefix: String,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
            room_prefix: default_room_prefix(),
            participant_prefix: default_participant_prefix(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("room_prefix", &self.room_prefix)
            .field("participant_prefix", &self.participant_prefix)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Returns `true` when every value needed to mint tokens is present.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}
