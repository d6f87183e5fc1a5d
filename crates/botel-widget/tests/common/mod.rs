#![allow(dead_code)]

use async_trait::async_trait;
use botel_widget::{ChatReceipt, ClientError, ClientEvent, RealtimeClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

/// Scriptable stand-in for the real-time client.
pub struct MockClient {
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub mic_calls: Mutex<Vec<bool>>,
    pub sent: Mutex<Vec<String>>,
    connect_error: Mutex<Option<ClientError>>,
    mic_error: Mutex<Option<ClientError>>,
    connect_gate: Mutex<Option<Arc<Notify>>>,
    events_tx: broadcast::Sender<ClientEvent>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            mic_calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            connect_error: Mutex::new(None),
            mic_error: Mutex::new(None),
            connect_gate: Mutex::new(None),
            events_tx,
        })
    }

    pub fn fail_connect(&self, name: &str, message: &str) {
        *self.connect_error.lock().unwrap() = Some(ClientError::new(name, message));
    }

    pub fn fail_microphone(&self, name: &str, message: &str) {
        *self.mic_error.lock().unwrap() = Some(ClientError::new(name, message));
    }

    /// Makes `connect` wait until the returned handle is notified.
    pub fn hold_connect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.connect_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn emit(&self, event: ClientEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn connects(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.events_tx.receiver_count()
    }
}

#[async_trait]
impl RealtimeClient for MockClient {
    async fn connect(&self, _server_url: &str, _token: &str) -> Result<(), ClientError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.connect_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let scripted = self.connect_error.lock().unwrap().clone();
        match scripted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), ClientError> {
        self.mic_calls.lock().unwrap().push(enabled);
        let scripted = self.mic_error.lock().unwrap().clone();
        match scripted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn send_chat_message(&self, text: &str) -> Result<ChatReceipt, ClientError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(text.to_string());
        Ok(ChatReceipt {
            id: format!("local-{}", sent.len()),
        })
    }

    fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events_tx.subscribe()
    }
}

/// Collects every notification currently queued on `rx`.
pub fn drain<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(item) = rx.try_recv() {
        out.push(item);
    }
    out
}

/// Yields until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
