//! Unit tests for the widget core's pure components.

use crate::client::{CHAT_TOPIC, TRANSCRIPTION_TOPIC};
use crate::config::{embed_base_url, WidgetConfig};
use crate::error::{FrameError, PayloadError, TimelineError};
use crate::frame::{FrameBridge, FrameMessage, IframeStyle, PointerEvents, LAUNCHER_SIZE, PANEL_SIZE};
use crate::mode::ModeSwitch;
use crate::payload::{decode, Inbound, PayloadStats, DEFAULT_AGENT_IDENTITY};
use crate::timeline::{SessionClock, TimelineMerger};
use botel_types::{InteractionMode, Message, MessageSource, Role, WidgetPosition, WidgetUiState};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

fn chat(id: &str, ts: i64) -> Message {
    Message::chat(id, Role::User, format!("chat {}", id), ts)
}

fn speech(id: &str, ts: i64) -> Message {
    Message::transcription(id, Role::Agent, format!("speech {}", id), ts)
}

fn assert_sorted(timeline: &TimelineMerger) {
    let stamps: Vec<i64> = timeline.messages().iter().map(|m| m.timestamp).collect();
    let mut sorted = stamps.clone();
    sorted.sort();
    assert_eq!(stamps, sorted, "timeline must be sorted by timestamp");
}

// ── TimelineMerger ───────────────────────────────────────────────────

#[test]
fn timeline_orders_out_of_order_arrivals() {
    let mut timeline = TimelineMerger::new();
    timeline.push(chat("c2", 300)).unwrap();
    timeline.push(speech("t1", 100)).unwrap();
    timeline.push(chat("c1", 200)).unwrap();

    let ids: Vec<&str> = timeline.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "c1", "c2"]);
}

#[test]
fn timeline_breaks_ties_by_arrival_order() {
    let mut timeline = TimelineMerger::new();
    timeline.push(chat("a", 100)).unwrap();
    timeline.push(speech("b", 100)).unwrap();
    timeline.push(chat("c", 50)).unwrap();
    timeline.push(chat("d", 100)).unwrap();

    let ids: Vec<&str> = timeline.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b", "d"]);
}

#[test]
fn timeline_interleavings_keep_every_item_sorted() {
    // Two streams with deliberately colliding and decreasing timestamps,
    // interleaved under several arrival patterns.
    let transcriptions: Vec<Message> = [5, 1, 9, 3, 3, 12, 7]
        .iter()
        .enumerate()
        .map(|(i, ts)| speech(&format!("t{}", i), *ts))
        .collect();
    let chats: Vec<Message> = [2, 2, 8, 0, 11]
        .iter()
        .enumerate()
        .map(|(i, ts)| chat(&format!("c{}", i), *ts))
        .collect();

    for pattern in 0..8u32 {
        let mut timeline = TimelineMerger::new();
        let mut t = transcriptions.iter();
        let mut c = chats.iter();
        let mut step = 0u32;
        loop {
            let take_chat = (pattern >> (step % 3)) & 1 == 1;
            step += 1;
            let next = if take_chat {
                c.next().or_else(|| t.next())
            } else {
                t.next().or_else(|| c.next())
            };
            match next {
                Some(m) => {
                    timeline.push(m.clone()).unwrap();
                    assert_sorted(&timeline);
                }
                None => break,
            }
        }
        assert_eq!(timeline.len(), transcriptions.len() + chats.len());
    }
}

#[test]
fn timeline_rejects_duplicate_ids_without_mutation() {
    let mut timeline = TimelineMerger::new();
    timeline.push(chat("same", 10)).unwrap();
    let before = timeline.messages().to_vec();

    let err = timeline.push(speech("same", 5)).unwrap_err();
    assert_eq!(err, TimelineError::DuplicateId("same".to_string()));
    assert_eq!(timeline.messages(), before.as_slice());
}

#[test]
fn timeline_reset_clears_everything() {
    let mut timeline = TimelineMerger::new();
    timeline.push(chat("a", 1)).unwrap();
    timeline.update_interim(speech("live", 2));
    timeline.reset();

    assert!(timeline.is_empty());
    assert!(timeline.interim().is_empty());
    assert!(!timeline.contains("a"));
    timeline.push(chat("a", 1)).expect("ids may be reused after reset");
}

#[test]
fn interim_caption_is_retired_when_segment_finalizes() {
    let mut timeline = TimelineMerger::new();
    timeline.update_interim(speech("seg", 10));
    timeline.update_interim(Message::transcription("seg", Role::Agent, "hello there", 10));
    assert_eq!(timeline.interim().len(), 1);
    assert_eq!(timeline.interim()[0].text, "hello there");
    assert!(timeline.is_empty());

    timeline.push(speech("seg", 10)).unwrap();
    assert!(timeline.interim().is_empty());
    assert_eq!(timeline.len(), 1);

    // A late interim update for a finalized segment is ignored.
    timeline.update_interim(speech("seg", 10));
    assert!(timeline.interim().is_empty());
}

// ── SessionClock ─────────────────────────────────────────────────────

#[test]
fn session_clock_never_goes_backwards() {
    let wall = Arc::new(AtomicI64::new(1_000));
    let source = wall.clone();
    let mut clock = SessionClock::from_fn(move || source.load(Ordering::SeqCst));

    assert_eq!(clock.now(), 1_000);
    wall.store(900, Ordering::SeqCst);
    assert_eq!(clock.now(), 1_000);

    clock.observe(1_500);
    assert_eq!(clock.now(), 1_500);

    clock.reset();
    assert_eq!(clock.now(), 900);
}

// ── ModeSwitch ───────────────────────────────────────────────────────

#[test]
fn mode_switch_returns_previous_mode() {
    let mut mode = ModeSwitch::default();
    assert_eq!(mode.mode(), InteractionMode::Chat);
    assert_eq!(mode.switch_mode(InteractionMode::Voice), InteractionMode::Chat);
    assert_eq!(mode.switch_mode(InteractionMode::Voice), InteractionMode::Voice);
    assert_eq!(mode.toggle(), InteractionMode::Chat);
}

// ── Payload decoding ─────────────────────────────────────────────────

#[test]
fn decode_chat_from_agent() {
    let payload = br#"{"id": "m1", "message": "Welcome!", "timestamp": 42}"#;
    let inbound = decode(CHAT_TOPIC, "agent", payload, DEFAULT_AGENT_IDENTITY).unwrap();
    let Inbound::Final(message) = inbound else {
        panic!("chat messages are always final");
    };
    assert_eq!(message.role, Role::Agent);
    assert_eq!(message.text, "Welcome!");
    assert_eq!(message.timestamp, 42);
    assert_eq!(message.source, MessageSource::Chat);
}

#[test]
fn decode_transcription_final_and_interim() {
    let done = br#"{"id": "s1", "text": "hi", "final": true, "firstReceivedTime": 7}"#;
    let partial = br#"{"id": "s2", "text": "hel", "final": false, "firstReceivedTime": 8}"#;
    let implicit = br#"{"id": "s3", "text": "ok", "firstReceivedTime": 9}"#;

    let user = "voice_assistant_user_1";
    assert!(matches!(
        decode(TRANSCRIPTION_TOPIC, user, done, DEFAULT_AGENT_IDENTITY).unwrap(),
        Inbound::Final(Message { role: Role::User, timestamp: 7, .. })
    ));
    assert!(matches!(
        decode(TRANSCRIPTION_TOPIC, user, partial, DEFAULT_AGENT_IDENTITY).unwrap(),
        Inbound::Interim(_)
    ));
    assert!(matches!(
        decode(TRANSCRIPTION_TOPIC, user, implicit, DEFAULT_AGENT_IDENTITY).unwrap(),
        Inbound::Final(_)
    ));
}

#[test]
fn decode_rejects_malformed_and_unknown_payloads() {
    let stats = PayloadStats::default();

    let cases: Vec<(&str, &[u8])> = vec![
        (CHAT_TOPIC, &b"not json"[..]),
        (CHAT_TOPIC, &br#"{"id": "x", "timestamp": 1}"#[..]),
        (CHAT_TOPIC, &br#"{"id": "x", "message": "   ", "timestamp": 1}"#[..]),
        (TRANSCRIPTION_TOPIC, &br#"{"id": "", "text": "a", "firstReceivedTime": 1}"#[..]),
        ("lk.agent.state", &br#"{"state": "listening"}"#[..]),
    ];
    for (topic, payload) in cases {
        let err = decode(topic, "agent", payload, DEFAULT_AGENT_IDENTITY).unwrap_err();
        stats.record_error(&err);
    }

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.malformed, 4);
    assert_eq!(snapshot.unknown_topic, 1);
    assert_eq!(snapshot.accepted, 0);
}

#[test]
fn decode_unknown_topic_names_the_topic() {
    let err = decode("custom", "agent", b"{}", DEFAULT_AGENT_IDENTITY).unwrap_err();
    assert!(matches!(err, PayloadError::UnknownTopic(ref t) if t == "custom"));
}

// ── WidgetConfig ─────────────────────────────────────────────────────

#[test]
fn config_defaults_when_empty() {
    let config = WidgetConfig::from_json("{}").unwrap();
    assert_eq!(config, WidgetConfig::default());
    assert_eq!(config.position, WidgetPosition::BottomRight);
    assert_eq!(config.primary_color, "#002cf2");
    assert_eq!(config.company_name, "Botel AI");
    assert_eq!(config.title(), "Botel AI Assistant");
}

#[test]
fn config_ignores_unknown_keys_and_bad_values() {
    let config = WidgetConfig::from_json(
        r#"{
            "position": "top-center",
            "primaryColor": 12,
            "companyName": "Seaside Inn",
            "theme": "dark",
            "serverUrl": "wss://x",
            "token": ""
        }"#,
    )
    .unwrap();

    assert_eq!(config.position, WidgetPosition::BottomRight);
    assert_eq!(config.primary_color, "#002cf2");
    assert_eq!(config.company_name, "Seaside Inn");
    assert_eq!(config.server_url.as_deref(), Some("wss://x"));
    assert_eq!(config.token, None);
    assert!(config.static_details().is_none());
}

#[test]
fn config_non_object_falls_back_to_defaults() {
    assert_eq!(WidgetConfig::from_json("[1, 2]").unwrap(), WidgetConfig::default());
    assert!(WidgetConfig::from_json("{").is_err());
}

#[test]
fn config_static_details_need_url_and_token() {
    let config =
        WidgetConfig::from_json(r#"{"serverUrl": "wss://x", "token": "t1"}"#).unwrap();
    let details = config.static_details().expect("complete details");
    assert_eq!(details.server_url, "wss://x");
    assert_eq!(details.participant_token, "t1");
}

#[test]
fn config_query_round_trip_through_iframe_src() {
    let config = WidgetConfig {
        position: WidgetPosition::BottomLeft,
        primary_color: "#10b981".to_string(),
        company_name: "Your Company".to_string(),
        server_url: None,
        token: Some("secret".to_string()),
    };
    let base = embed_base_url("https://widget.example.com/widget/embed.js").unwrap();
    let src = config.iframe_src(&base).unwrap();

    assert_eq!(src.path(), "/widget-standalone");
    assert!(!src.as_str().contains("secret"));

    let parsed = WidgetConfig::from_query(src.query().unwrap_or_default());
    assert_eq!(parsed.position, WidgetPosition::BottomLeft);
    assert_eq!(parsed.primary_color, "#10b981");
    assert_eq!(parsed.company_name, "Your Company");
}

#[test]
fn config_query_blank_values_use_defaults() {
    let config = WidgetConfig::from_query("?position=&primaryColor=&companyName=&extra=1");
    assert_eq!(config, WidgetConfig::default());
}

#[test]
fn embed_base_url_strips_script_path() {
    let base = embed_base_url("https://cdn.example.com/app/widget/embed.js?v=3").unwrap();
    assert_eq!(base.as_str(), "https://cdn.example.com/app/");

    assert!(embed_base_url("https://cdn.example.com/other.js").is_err());
}

// ── Frame protocol ───────────────────────────────────────────────────

#[test]
fn frame_message_wire_format() {
    let resize = FrameMessage::Resize {
        width: 424,
        height: 700,
        interactive: true,
    };
    let json: serde_json::Value = serde_json::from_str(&resize.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "botel-widget-resize");
    assert_eq!(json["width"], 424);
    assert_eq!(json["interactive"], true);

    let ready: FrameMessage = serde_json::from_str(r#"{"type": "botel-widget-ready"}"#).unwrap();
    assert_eq!(ready, FrameMessage::Ready);
}

#[test]
fn frame_bridge_accepts_only_widget_origin() {
    let bridge = FrameBridge::new("https://widget.example.com/widget-standalone?x=1").unwrap();
    let data = r#"{"type": "botel-widget-resize", "width": 10, "height": 20, "interactive": false}"#;

    assert!(bridge.accept("https://widget.example.com", data).is_ok());
    for origin in [
        "https://evil.example.com",
        "http://widget.example.com",
        "https://widget.example.com:8443",
        "null",
        "",
    ] {
        assert!(
            matches!(bridge.accept(origin, data), Err(FrameError::UntrustedOrigin(_))),
            "origin {:?} must be rejected",
            origin
        );
    }
}

#[test]
fn frame_bridge_rejects_unknown_message_types() {
    let bridge = FrameBridge::new("https://widget.example.com").unwrap();
    let result = bridge.accept_value(
        "https://widget.example.com",
        serde_json::json!({"type": "something-else"}),
    );
    assert!(matches!(result, Err(FrameError::Unrecognized(_))));
}

#[test]
fn frame_bridge_rejects_resize_without_size() {
    let bridge = FrameBridge::new("https://widget.example.com").unwrap();
    let result = bridge.accept(
        "https://widget.example.com",
        r#"{"type": "botel-widget-resize", "active": true}"#,
    );
    assert!(matches!(result, Err(FrameError::Unrecognized(_))));
}

#[test]
fn iframe_style_follows_resize_messages() {
    let mut style = IframeStyle::default();
    assert_eq!(style.pointer_events, PointerEvents::None);

    let open = FrameMessage::for_ui_state(&WidgetUiState {
        is_open: true,
        ..Default::default()
    });
    assert!(style.apply(&open));
    assert_eq!((style.width, style.height), PANEL_SIZE);
    assert_eq!(style.pointer_events, PointerEvents::All);
    assert!(!style.apply(&open), "same message changes nothing");
    assert_eq!(style.to_css(), "width: 424px; height: 700px; pointer-events: all;");

    let closed = FrameMessage::for_ui_state(&WidgetUiState::default());
    assert!(style.apply(&closed));
    assert_eq!((style.width, style.height), LAUNCHER_SIZE);

    assert!(!style.apply(&FrameMessage::Ready));
}
