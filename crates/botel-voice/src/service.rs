use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use botel_types::ConnectionDetails;
use livekit_api::access_token::{AccessToken, VideoGrants};
use rand::Rng;
use std::time::Duration;

/// Upper bound (exclusive) of the numeric suffix on generated room and
/// participant names.
const NAME_SUFFIX_RANGE: u32 = 10_000;

#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_complete()
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    pub fn generate_join_token(
        &self,
        room_name: &str,
        participant_identity: &str,
        participant_name: &str,
    ) -> Result<String, VoiceError> {
        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }

    /// Creates a fresh room/participant pair and returns everything the
    /// widget needs to join it.
    pub fn issue_connection_details(&self) -> Result<ConnectionDetails, VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::NotConfigured);
        }

        let mut rng = rand::thread_rng();
        let room_name = format!(
            "{}_{}",
            self.config.room_prefix,
            rng.gen_range(0..NAME_SUFFIX_RANGE)
        );
        let participant_name = format!(
            "{}_{}",
            self.config.participant_prefix,
            rng.gen_range(0..NAME_SUFFIX_RANGE)
        );

        let participant_token =
            self.generate_join_token(&room_name, &participant_name, &participant_name)?;

        tracing::info!(
            room = %room_name,
            participant = %participant_name,
            "issued connection details"
        );

        Ok(ConnectionDetails {
            server_url: self.config.url.clone(),
            room_name,
            participant_name,
            participant_token,
        })
    }
}
