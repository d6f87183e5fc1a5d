//! Session lifecycle controller.
//!
//! Owns the single session of a widget instance and drives it along
//! `Idle → Connecting → Connected → Disconnected → Idle`. The state lives
//! behind a mutex that is never held across a call into the client, so
//! `stop()` can run while a `start()` is still waiting on `connect`. Each
//! start is tagged with an attempt number; when the connect call returns
//! the controller checks the tag to learn whether it was overtaken. Only
//! one connect is in flight at a time.

use crate::client::{ClientEvent, EventSubscription, RealtimeClient};
use crate::error::{ConnectionError, MediaDeviceError, SessionError};
use botel_types::{ConnectionDetails, SessionState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

/// Default capacity for the lifecycle notification channel.
const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Lifecycle notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotification {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    Connected,
    Disconnected,
    ConnectionFailed(ConnectionError),
    MediaDeviceFailed(MediaDeviceError),
}

impl SessionNotification {
    /// The user-visible alert for this notification, if it warrants one.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            Self::ConnectionFailed(e) => Some(Alert {
                title: "There was an error connecting to the agent".to_string(),
                description: format!("{}: {}", e.name, e.message),
            }),
            Self::MediaDeviceFailed(e) => Some(Alert {
                title: "Encountered an error with your media devices".to_string(),
                description: format!("{}: {}", e.name, e.message),
            }),
            _ => None,
        }
    }
}

/// A dismissible notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub description: String,
}

/// Result of a successful `start()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session is now connected.
    Connected,
    /// A session was already connecting or connected; nothing was done.
    AlreadyActive,
    /// `stop()` ran while connecting; any late connection was torn down.
    Cancelled,
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    details: Option<ConnectionDetails>,
    attempt: u64,
}

#[derive(Clone)]
pub struct SessionController {
    client: Arc<dyn RealtimeClient>,
    inner: Arc<Mutex<Inner>>,
    notify_tx: broadcast::Sender<SessionNotification>,
    live_subscriptions: Arc<AtomicUsize>,
    connect_lock: Arc<Mutex<()>>,
}

impl SessionController {
    pub fn new(client: Arc<dyn RealtimeClient>) -> Self {
        let (notify_tx, _) = broadcast::channel(DEFAULT_NOTIFICATION_CAPACITY);
        Self {
            client,
            inner: Arc::new(Mutex::new(Inner::default())),
            notify_tx,
            live_subscriptions: Arc::new(AtomicUsize::new(0)),
            connect_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Connection details of the current or most recent session.
    pub async fn details(&self) -> Option<ConnectionDetails> {
        self.inner.lock().await.details.clone()
    }

    pub fn client(&self) -> &Arc<dyn RealtimeClient> {
        &self.client
    }

    /// Subscribes to lifecycle notifications.
    pub fn notifications(&self) -> broadcast::Receiver<SessionNotification> {
        self.notify_tx.subscribe()
    }

    /// Registers a listener on the client's event stream.
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription::new(self.client.events(), self.live_subscriptions.clone())
    }

    /// Number of client event subscriptions currently alive.
    pub fn live_subscriptions(&self) -> usize {
        self.live_subscriptions.load(Ordering::SeqCst)
    }

    /// Starts a session.
    ///
    /// A session left `Disconnected` by an earlier failure is reset to
    /// `Idle` first, so the user can retry. While a session is connecting
    /// or connected this is a no-op returning [`StartOutcome::AlreadyActive`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::Connection`] when the details are incomplete or
    ///   the client rejects `connect`.
    /// - [`SessionError::MediaDevice`] when the microphone cannot be
    ///   enabled.
    pub async fn start(&self, details: ConnectionDetails) -> Result<StartOutcome, SessionError> {
        match self.begin(&details).await? {
            Some(attempt) => self.complete(details, attempt).await,
            None => Ok(StartOutcome::AlreadyActive),
        }
    }

    /// First half of [`start`](Self::start): validates the details and
    /// moves to `Connecting`. Returns the attempt number, or `None` when a
    /// session is already active.
    pub(crate) async fn begin(
        &self,
        details: &ConnectionDetails,
    ) -> Result<Option<u64>, SessionError> {
        if !details.is_complete() {
            let err = ConnectionError::missing_details();
            self.report_connection_failure(&err);
            return Err(err.into());
        }

        let mut inner = self.inner.lock().await;
        match inner.state {
            SessionState::Connecting | SessionState::Connected => return Ok(None),
            SessionState::Disconnected => self.transition(&mut inner, SessionState::Idle),
            SessionState::Idle => {}
        }
        self.transition(&mut inner, SessionState::Connecting);
        inner.attempt += 1;
        inner.details = Some(details.clone());
        Ok(Some(inner.attempt))
    }

    /// Second half of [`start`](Self::start): connects the client for an
    /// attempt opened by [`begin`](Self::begin).
    ///
    /// Connects are serialized. An attempt overtaken by `stop()` tears its
    /// late connection down while still holding the connect lock, so that
    /// teardown always lands before any newer attempt calls `connect`.
    pub(crate) async fn complete(
        &self,
        details: ConnectionDetails,
        attempt: u64,
    ) -> Result<StartOutcome, SessionError> {
        let _connecting = self.connect_lock.lock().await;

        if !self.is_current(attempt).await {
            info!(attempt, "session stopped before connecting");
            return Ok(StartOutcome::Cancelled);
        }

        info!(server_url = %details.server_url, attempt, "connecting session");

        let (mic, connect) = tokio::join!(
            self.client.set_microphone_enabled(true),
            self.client
                .connect(&details.server_url, &details.participant_token),
        );

        let mut inner = self.inner.lock().await;
        if inner.attempt != attempt || inner.state != SessionState::Connecting {
            drop(inner);
            info!(attempt, "session stopped while connecting");
            if connect.is_ok() {
                if let Err(e) = self.client.disconnect().await {
                    warn!(attempt, "failed to tear down cancelled connection: {}", e);
                }
            }
            return Ok(StartOutcome::Cancelled);
        }

        match (mic, connect) {
            (_, Err(e)) => {
                let err = ConnectionError::from(e);
                error!(attempt, "error connecting to room: {}", err);
                self.transition(&mut inner, SessionState::Disconnected);
                self.emit(SessionNotification::ConnectionFailed(err.clone()));
                Err(err.into())
            }
            (Err(e), Ok(())) => {
                let err = MediaDeviceError::from(e);
                error!(attempt, "error enabling microphone: {}", err);
                self.transition(&mut inner, SessionState::Disconnected);
                drop(inner);
                if let Err(e) = self.client.disconnect().await {
                    warn!(attempt, "failed to disconnect after media error: {}", e);
                }
                self.emit(SessionNotification::MediaDeviceFailed(err.clone()));
                Err(err.into())
            }
            (Ok(()), Ok(())) => {
                self.transition(&mut inner, SessionState::Connected);
                self.emit(SessionNotification::Connected);
                Ok(StartOutcome::Connected)
            }
        }
    }

    async fn is_current(&self, attempt: u64) -> bool {
        let inner = self.inner.lock().await;
        inner.attempt == attempt && inner.state == SessionState::Connecting
    }

    /// Stops the session, returning `true` if one was active.
    ///
    /// Safe to call at any time; on an idle session it does nothing and
    /// makes no client calls. Disconnect failures are logged, not returned,
    /// so teardown paths never fail.
    pub async fn stop(&self) -> bool {
        {
            let mut inner = self.inner.lock().await;
            if !inner.state.is_active() {
                return false;
            }
            self.transition(&mut inner, SessionState::Disconnected);
            self.emit(SessionNotification::Disconnected);
            self.transition(&mut inner, SessionState::Idle);
        }

        if let Err(e) = self.client.disconnect().await {
            warn!("disconnect failed during stop: {}", e);
        }
        true
    }

    /// Applies a lifecycle event reported by the client.
    pub async fn handle_client_event(&self, event: &ClientEvent) {
        match event {
            ClientEvent::Disconnected { reason } => {
                let mut inner = self.inner.lock().await;
                if inner.state == SessionState::Connected {
                    info!(reason = reason.as_deref().unwrap_or("unknown"), "room disconnected");
                    self.transition(&mut inner, SessionState::Disconnected);
                    self.emit(SessionNotification::Disconnected);
                    self.transition(&mut inner, SessionState::Idle);
                }
            }
            ClientEvent::MediaDeviceError(e) => {
                let err = MediaDeviceError::from(e.clone());
                error!("media devices error: {}", err);
                self.emit(SessionNotification::MediaDeviceFailed(err));
            }
            ClientEvent::Connected => {
                tracing::debug!("client reported connected");
            }
            ClientEvent::DataReceived { .. } => {}
        }
    }

    /// Reports a connection failure that happened before the client was
    /// involved, such as a failed connection-details fetch.
    pub fn report_connection_failure(&self, err: &ConnectionError) {
        error!("session start aborted: {}", err);
        self.emit(SessionNotification::ConnectionFailed(err.clone()));
    }

    fn transition(&self, inner: &mut Inner, next: SessionState) {
        let from = inner.state;
        debug_assert!(
            from.can_transition_to(next),
            "illegal session transition {} -> {}",
            from,
            next
        );
        inner.state = next;
        info!(%from, to = %next, "session state changed");
        self.emit(SessionNotification::StateChanged { from, to: next });
    }

    fn emit(&self, notification: SessionNotification) {
        // No receivers is normal before the UI subscribes.
        let _ = self.notify_tx.send(notification);
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("live_subscriptions", &self.live_subscriptions())
            .finish_non_exhaustive()
    }
}
