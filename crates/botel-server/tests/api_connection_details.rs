use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use botel_server::{app, config::Config, AppState};
use botel_voice::LiveKitConfig;
use serde_json::Value;
use tower::ServiceExt; // for oneshot

const SECRET: &str = "botel-test-secret";

#[derive(serde::Deserialize)]
struct Claims {
    sub: String,
    video: VideoClaims,
}

#[derive(serde::Deserialize)]
struct VideoClaims {
    room: String,
    #[serde(rename = "roomJoin")]
    room_join: bool,
}

fn configured_app() -> Router {
    let config = Config {
        livekit: LiveKitConfig::new("wss://botel.livekit.cloud", "devkey", SECRET),
        ..Config::default()
    };
    app(AppState::new(&config))
}

fn unconfigured_app() -> Router {
    app(AppState::new(&Config::default()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_details() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/connection-details")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap()
}

#[tokio::test]
async fn test_health_check_returns_ok() {
    let response = unconfigured_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_connection_details_issues_token() {
    let response = configured_app().oneshot(post_details()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );

    let json = body_json(response).await;
    assert_eq!(json["serverUrl"], "wss://botel.livekit.cloud");
    let room = json["roomName"].as_str().unwrap();
    let participant = json["participantName"].as_str().unwrap();
    assert!(room.starts_with("voice_assistant_room_"));
    assert!(participant.starts_with("voice_assistant_user_"));

    let token = json["participantToken"].as_str().unwrap();
    let claims = jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(SECRET.as_bytes()),
        &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.sub, participant);
    assert_eq!(claims.video.room, room);
    assert!(claims.video.room_join);
}

#[tokio::test]
async fn test_connection_details_accepts_empty_body() {
    let response = configured_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/connection-details")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_connection_details_unconfigured_returns_503() {
    let response = unconfigured_app().oneshot(post_details()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("LiveKit is not configured"));
}

#[tokio::test]
async fn test_connection_details_rejects_get() {
    let response = configured_app()
        .oneshot(
            Request::builder()
                .uri("/api/connection-details")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let response = configured_app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/connection-details")
                .header(header::ORIGIN, "https://hotel.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
