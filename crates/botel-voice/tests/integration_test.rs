use botel_voice::{LiveKitConfig, VoiceError, VoiceService};

const DEFAULT_URL: &str = "ws://localhost:7880";
const DEFAULT_KEY: &str = "devkey";
const DEFAULT_SECRET: &str = "secret";

#[derive(serde::Deserialize)]
struct Claims {
    sub: String,
    name: String,
    exp: u64,
    nbf: u64,
    video: VideoClaims,
}

#[derive(serde::Deserialize)]
struct VideoClaims {
    #[serde(rename = "canPublish")]
    can_publish: bool,
    #[serde(rename = "canSubscribe")]
    can_subscribe: bool,
    #[serde(rename = "canPublishData")]
    can_publish_data: bool,
    #[serde(rename = "roomJoin")]
    room_join: bool,
    room: String,
}

fn decode(token: &str) -> Claims {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(DEFAULT_SECRET.as_bytes());
    decode::<Claims>(token, &key, &validation)
        .expect("Failed to decode token")
        .claims
}

#[test]
fn test_generate_join_token() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    let service = VoiceService::new(config);

    let token = service
        .generate_join_token("test-room", "user-123", "Test User")
        .expect("Failed to generate token");

    assert!(!token.is_empty());
    let claims = decode(&token);
    assert_eq!(claims.sub, "user-123");
    assert_eq!(claims.name, "Test User");
    assert_eq!(claims.video.room, "test-room");
}

#[test]
fn test_token_permissions() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    let service = VoiceService::new(config);

    let token = service
        .generate_join_token("perm-room", "user-perm", "Perm User")
        .expect("Failed to generate token");
    let claims = decode(&token);

    assert!(claims.video.can_publish, "canPublish should be true");
    assert!(claims.video.can_subscribe, "canSubscribe should be true");
    assert!(claims.video.can_publish_data, "canPublishData should be true");
    assert!(claims.video.room_join, "roomJoin should be true");
}

#[test]
fn test_token_ttl_defaults_to_fifteen_minutes() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    assert_eq!(config.token_ttl_seconds, 900);

    let service = VoiceService::new(config);
    let token = service
        .generate_join_token("ttl-room", "user-ttl", "TTL User")
        .expect("Failed to generate token");
    let claims = decode(&token);

    assert_eq!(claims.exp - claims.nbf, 900);
}

#[test]
fn test_issue_connection_details() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    let service = VoiceService::new(config);

    let details = service
        .issue_connection_details()
        .expect("details should be issued");

    assert_eq!(details.server_url, DEFAULT_URL);
    assert!(details.room_name.starts_with("voice_assistant_room_"));
    assert!(details.participant_name.starts_with("voice_assistant_user_"));
    assert!(details.is_complete());

    let claims = decode(&details.participant_token);
    assert_eq!(claims.video.room, details.room_name);
    assert_eq!(claims.sub, details.participant_name);
}

#[test]
fn test_issue_connection_details_requires_configuration() {
    let service = VoiceService::new(LiveKitConfig::default());
    assert!(!service.is_enabled());
    assert!(matches!(
        service.issue_connection_details(),
        Err(VoiceError::NotConfigured)
    ));
}

#[test]
fn test_livekit_config_toml_defaults() {
    let toml_str = r#"
        url = "ws://localhost:7880"
        api_key = "key"
        api_secret = "secret"
    "#;

    let config: LiveKitConfig = toml::from_str(toml_str).expect("parse TOML");
    assert_eq!(config.token_ttl_seconds, 900);
    assert_eq!(config.room_prefix, "voice_assistant_room");
    assert!(config.is_complete());
}

#[test]
fn test_livekit_config_debug_redacts_secret() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, "super-secret");
    let debug = format!("{:?}", config);
    assert!(!debug.contains("super-secret"));
}

#[test]
fn test_livekit_config_never_serializes_secret() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, "super-secret");
    let json = serde_json::to_value(&config).expect("serialize");
    assert!(json.get("api_secret").is_none());
    assert_eq!(json["api_key"], DEFAULT_KEY);
}
