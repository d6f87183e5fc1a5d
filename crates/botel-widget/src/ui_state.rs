//! Persistence of the widget's visible state across reloads.
//!
//! State is loaded once when the widget mounts and saved on every change.

use crate::error::UiStateError;
use async_trait::async_trait;
use botel_types::WidgetUiState;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[async_trait]
pub trait UiStateStore: Send + Sync {
    /// Returns the saved state, or `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<WidgetUiState>, UiStateError>;

    async fn save(&self, state: &WidgetUiState) -> Result<(), UiStateError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryUiStateStore {
    state: Mutex<Option<WidgetUiState>>,
}

impl MemoryUiStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UiStateStore for MemoryUiStateStore {
    async fn load(&self) -> Result<Option<WidgetUiState>, UiStateError> {
        Ok(*self.state.lock().await)
    }

    async fn save(&self, state: &WidgetUiState) -> Result<(), UiStateError> {
        *self.state.lock().await = Some(*state);
        Ok(())
    }
}

/// Store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileUiStateStore {
    path: PathBuf,
}

impl JsonFileUiStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl UiStateStore for JsonFileUiStateStore {
    async fn load(&self) -> Result<Option<WidgetUiState>, UiStateError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(UiStateError::Io(e)),
        }
    }

    async fn save(&self, state: &WidgetUiState) -> Result<(), UiStateError> {
        let json = serde_json::to_vec_pretty(state)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
