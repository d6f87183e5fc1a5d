//! Conversation timeline.
//!
//! Transcription segments and chat messages arrive on independent streams
//! in no particular order. The merger keeps a single list sorted by
//! timestamp; entries with equal timestamps stay in arrival order. The
//! list is append-only: nothing is removed or edited once inserted, and
//! only [`TimelineMerger::reset`] empties it for a new session.

use crate::error::TimelineError;
use botel_types::Message;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct TimelineMerger {
    messages: Vec<Message>,
    ids: HashSet<String>,
    /// Live captions for segments that are still being spoken.
    interim: BTreeMap<String, Message>,
}

impl TimelineMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a finalized message and returns its index.
    ///
    /// Any live caption with the same id is retired.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::DuplicateId`] if a message with the same
    /// id is already present; the timeline is left unchanged.
    pub fn push(&mut self, message: Message) -> Result<usize, TimelineError> {
        if self.ids.contains(&message.id) {
            return Err(TimelineError::DuplicateId(message.id));
        }

        let index = self
            .messages
            .partition_point(|m| m.timestamp <= message.timestamp);
        self.interim.remove(&message.id);
        self.ids.insert(message.id.clone());
        self.messages.insert(index, message);
        Ok(index)
    }

    /// Records or replaces the live caption for an unfinished segment.
    ///
    /// Ignored if the segment was already finalized.
    pub fn update_interim(&mut self, message: Message) {
        if self.ids.contains(&message.id) {
            return;
        }
        self.interim.insert(message.id.clone(), message);
    }

    /// Inserts every message from `items`, stopping at the first duplicate.
    pub fn extend<I>(&mut self, items: I) -> Result<(), TimelineError>
    where
        I: IntoIterator<Item = Message>,
    {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Live captions ordered by timestamp.
    pub fn interim(&self) -> Vec<&Message> {
        let mut captions: Vec<&Message> = self.interim.values().collect();
        captions.sort_by_key(|m| m.timestamp);
        captions
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Empties the timeline for a new session.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.ids.clear();
        self.interim.clear();
    }
}

/// Per-session millisecond clock that never goes backwards.
///
/// Readings come from a wall-clock source but are clamped to the highest
/// value seen so far, including timestamps observed on inbound messages,
/// so a locally created message never sorts before one already shown.
#[derive(Clone)]
pub struct SessionClock {
    source: Arc<dyn Fn() -> i64 + Send + Sync>,
    last: i64,
}

impl SessionClock {
    /// A clock reading the system time in Unix milliseconds.
    pub fn system() -> Self {
        Self::from_fn(|| chrono::Utc::now().timestamp_millis())
    }

    pub fn from_fn<F>(source: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
            last: i64::MIN,
        }
    }

    pub fn now(&mut self) -> i64 {
        let reading = (self.source)().max(self.last);
        self.last = reading;
        reading
    }

    /// Advances the floor to an externally supplied timestamp.
    pub fn observe(&mut self, timestamp: i64) {
        self.last = self.last.max(timestamp);
    }

    /// Forgets everything observed, for a new session.
    pub fn reset(&mut self) {
        self.last = i64::MIN;
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClock").field("last", &self.last).finish()
    }
}
