//! The widget as seen by its UI layer.
//!
//! [`Widget`] wires the session controller, mode switch and timeline to
//! the handful of user actions the widget exposes (open, close, send,
//! mute, switch mode) and to the client's event stream.

use crate::client::{ClientEvent, EventSubscription, RealtimeClient};
use crate::config::WidgetConfig;
use crate::details::ConnectionDetailsSource;
use crate::error::{ConnectionError, SessionError};
use crate::frame::FrameMessage;
use crate::mode::ModeSwitch;
use crate::payload::{self, Inbound, PayloadStats, DEFAULT_AGENT_IDENTITY};
use crate::session::{SessionController, SessionNotification, StartOutcome};
use crate::timeline::{SessionClock, TimelineMerger};
use crate::ui_state::UiStateStore;
use botel_types::{InteractionMode, Message, Role, SessionState, WidgetUiState};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct Widget {
    config: WidgetConfig,
    agent_identity: String,
    client: Arc<dyn RealtimeClient>,
    session: SessionController,
    details: Arc<dyn ConnectionDetailsSource>,
    store: Option<Arc<dyn UiStateStore>>,
    mode: ModeSwitch,
    timeline: TimelineMerger,
    clock: SessionClock,
    ui: WidgetUiState,
    stats: PayloadStats,
    subscription: Option<EventSubscription>,
    pending: Option<JoinHandle<Result<StartOutcome, SessionError>>>,
}

impl Widget {
    pub fn new(
        config: WidgetConfig,
        client: Arc<dyn RealtimeClient>,
        details: Arc<dyn ConnectionDetailsSource>,
    ) -> Self {
        Self {
            config,
            agent_identity: DEFAULT_AGENT_IDENTITY.to_string(),
            session: SessionController::new(client.clone()),
            client,
            details,
            store: None,
            mode: ModeSwitch::default(),
            timeline: TimelineMerger::new(),
            clock: SessionClock::system(),
            ui: WidgetUiState::default(),
            stats: PayloadStats::default(),
            subscription: None,
            pending: None,
        }
    }

    /// Persists UI state through `store`.
    pub fn with_store(mut self, store: Arc<dyn UiStateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_agent_identity(mut self, identity: impl Into<String>) -> Self {
        self.agent_identity = identity.into();
        self
    }

    pub fn with_clock(mut self, clock: SessionClock) -> Self {
        self.clock = clock;
        self
    }

    /// Attaches to the client's event stream and restores saved UI state.
    ///
    /// The widget always mounts closed; only the mode and mute flag are
    /// restored.
    pub async fn mount(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.session.subscribe());
        }

        if let Some(store) = &self.store {
            match store.load().await {
                Ok(Some(saved)) => {
                    self.mode.switch_mode(saved.mode);
                    self.ui.mode = saved.mode;
                    self.ui.is_muted = saved.is_muted;
                    info!(mode = saved.mode.as_str(), "restored widget state");
                }
                Ok(None) => {}
                Err(e) => warn!("failed to load widget state: {}", e),
            }
        }
    }

    /// Stops any session and releases the event subscription.
    pub async fn unmount(&mut self) {
        self.session.stop().await;
        self.subscription = None;
        // A pending connect sees the stop and tears itself down.
        self.pending = None;
    }

    /// Opens the panel and starts a session if none is active.
    ///
    /// Returns as soon as the session is `Connecting`; the connect itself
    /// runs on a background task so [`close`](Self::close) stays usable
    /// meanwhile. Returns `false` when a session was already active. Use
    /// [`wait_for_session`](Self::wait_for_session) for the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connection`] if connection details cannot be
    /// obtained. The panel stays open so the user sees the alert.
    pub async fn open(&mut self) -> Result<bool, SessionError> {
        if !self.ui.is_open {
            self.ui.is_open = true;
            self.persist().await;
        }

        if self.session.state().await.is_active() {
            return Ok(false);
        }

        self.timeline.reset();
        self.clock.reset();

        let details = match self.details.fetch().await {
            Ok(details) => details,
            Err(err) => {
                self.session.report_connection_failure(&err);
                return Err(err.into());
            }
        };

        let Some(attempt) = self.session.begin(&details).await? else {
            return Ok(false);
        };

        // Starting a session enables the microphone.
        if self.ui.is_muted {
            self.ui.is_muted = false;
            self.persist().await;
        }

        let session = self.session.clone();
        self.pending = Some(tokio::spawn(async move {
            session.complete(details, attempt).await
        }));
        Ok(true)
    }

    /// Waits for the connect started by the last [`open`](Self::open).
    /// Returns `None` when nothing is pending.
    ///
    /// Connect and microphone failures surface here as errors as well as
    /// through [`notifications`](Self::notifications).
    pub async fn wait_for_session(&mut self) -> Option<Result<StartOutcome, SessionError>> {
        let pending = self.pending.take()?;
        Some(match pending.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = ConnectionError::new("ConnectTaskFailed", e.to_string());
                self.session.report_connection_failure(&err);
                Err(err.into())
            }
        })
    }

    /// Closes the panel and ends the session. Returns `true` if a session
    /// was active.
    pub async fn close(&mut self) -> bool {
        if self.ui.is_open {
            self.ui.is_open = false;
            self.persist().await;
        }
        self.session.stop().await
    }

    /// Sends typed text to the agent and appends it to the timeline.
    ///
    /// Blank input is ignored and yields `Ok(None)`.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<Message>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.session.state().await != SessionState::Connected {
            return Err(ConnectionError::not_connected().into());
        }

        let receipt = self
            .client
            .send_chat_message(text)
            .await
            .map_err(ConnectionError::from)?;

        let message = Message::chat(receipt.id, Role::User, text, self.clock.now());
        if let Err(e) = self.timeline.push(message.clone()) {
            warn!("sent message not added to timeline: {}", e);
        }
        Ok(Some(message))
    }

    /// Mutes or unmutes the microphone. Returns the new muted flag.
    ///
    /// # Errors
    ///
    /// Returns a `NotConnected` [`SessionError::Connection`] without
    /// touching the microphone unless the session is connected, and
    /// [`SessionError::MediaDevice`] if the client rejects the change.
    pub async fn toggle_microphone(&mut self) -> Result<bool, SessionError> {
        if self.session.state().await != SessionState::Connected {
            return Err(ConnectionError::not_connected().into());
        }

        let enable = self.ui.is_muted;
        if let Err(e) = self.client.set_microphone_enabled(enable).await {
            self.session
                .handle_client_event(&ClientEvent::MediaDeviceError(e.clone()))
                .await;
            return Err(SessionError::MediaDevice(e.into()));
        }
        self.ui.is_muted = !enable;
        self.persist().await;
        Ok(self.ui.is_muted)
    }

    /// Switches between chat and voice. The timeline is untouched.
    pub async fn switch_mode(&mut self, mode: InteractionMode) {
        self.mode.switch_mode(mode);
        if self.ui.mode != mode {
            self.ui.mode = mode;
            self.persist().await;
        }
    }

    /// Routes one client event to the session and the timeline.
    ///
    /// Undecodable data payloads are counted and logged, never propagated.
    pub async fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::DataReceived {
                topic,
                sender,
                payload,
            } => match payload::decode(&topic, &sender, &payload, &self.agent_identity) {
                Ok(Inbound::Final(message)) => {
                    self.clock.observe(message.timestamp);
                    match self.timeline.push(message) {
                        Ok(_) => self.stats.record_accepted(),
                        Err(e) => {
                            self.stats.record_duplicate();
                            warn!(%topic, %sender, "ignoring data payload: {}", e);
                        }
                    }
                }
                Ok(Inbound::Interim(message)) => {
                    self.stats.record_accepted();
                    self.timeline.update_interim(message);
                }
                Err(e) => {
                    self.stats.record_error(&e);
                    warn!(%topic, %sender, "ignoring data payload: {}", e);
                }
            },
            other => self.session.handle_client_event(&other).await,
        }
    }

    /// Handles every event already queued on the subscription. Returns the
    /// number handled.
    pub async fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.subscription.as_mut().and_then(|s| s.try_recv()) {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Waits for and handles the next client event. Returns `false` when
    /// not mounted or the client has gone away.
    pub async fn next_event(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn notifications(&self) -> broadcast::Receiver<SessionNotification> {
        self.session.notifications()
    }

    pub fn ui_state(&self) -> WidgetUiState {
        self.ui
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode.mode()
    }

    pub fn messages(&self) -> &[Message] {
        self.timeline.messages()
    }

    pub fn timeline(&self) -> &TimelineMerger {
        &self.timeline
    }

    pub fn stats(&self) -> &PayloadStats {
        &self.stats
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Header status line.
    pub async fn status_label(&self) -> &'static str {
        self.session.state().await.status_label()
    }

    /// Resize message for the hosting iframe.
    pub fn frame_message(&self) -> FrameMessage {
        FrameMessage::for_ui_state(&self.ui)
    }

    async fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.ui).await {
                warn!("failed to save widget state: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("config", &self.config)
            .field("ui", &self.ui)
            .field("messages", &self.timeline.len())
            .finish_non_exhaustive()
    }
}
