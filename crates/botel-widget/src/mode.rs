//! Chat/voice interaction mode.

use botel_types::InteractionMode;

/// Tracks which interaction panel is visible. Purely presentational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSwitch {
    mode: InteractionMode,
}

impl ModeSwitch {
    pub fn new(mode: InteractionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Sets the mode and returns the previous one.
    pub fn switch_mode(&mut self, mode: InteractionMode) -> InteractionMode {
        let previous = std::mem::replace(&mut self.mode, mode);
        if previous != mode {
            tracing::debug!(
                from = previous.as_str(),
                to = mode.as_str(),
                "interaction mode switched"
            );
        }
        previous
    }

    /// Flips between chat and voice, returning the new mode.
    pub fn toggle(&mut self) -> InteractionMode {
        self.switch_mode(self.mode.toggled());
        self.mode
    }
}
