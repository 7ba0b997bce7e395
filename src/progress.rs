// Per-session playback position and watched-time high-water mark.

use crate::types::Timestamp;

/// In-memory progress for one player session. Never persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    current_time: Timestamp,
    watched_time: Timestamp,
}

impl ProgressState {
    /// Seed from the previously persisted position. The seed counts as already watched,
    /// so the first tick after a resume is not mistaken for a jump from zero.
    pub fn resume_at(position: Timestamp) -> Self {
        ProgressState {
            current_time: position,
            watched_time: position,
        }
    }

    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    pub fn watched_time(&self) -> Timestamp {
        self.watched_time
    }

    /// Accept a legal position. `watched_time` only ever moves forward here.
    pub fn advance(&mut self, position: Timestamp) {
        self.current_time = position;
        self.watched_time = self.watched_time.max(position);
    }

    /// Explicit reset for "review again".
    pub fn reset(&mut self) {
        *self = ProgressState::default();
    }
}
