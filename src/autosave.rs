// Autosave checkpoints on content time, not wall-clock time.
// Seeking past a checkpoint skips it; only the position reached is saved.

use crate::types::{LastTimePayload, Timestamp};

/// Emits a save request when playback sits on a positive multiple of the interval.
#[derive(Debug, Clone)]
pub struct AutosaveEmitter {
    interval_secs: u64,
    last_checkpoint: Option<u64>,
}

impl AutosaveEmitter {
    pub fn new(interval_secs: u64) -> Self {
        AutosaveEmitter {
            interval_secs: interval_secs.max(1),
            last_checkpoint: None,
        }
    }

    /// Check the latest position. `timeupdate` fires several times per second, so a
    /// checkpoint already emitted is not emitted again until another one was saved.
    pub fn check(&mut self, current: Timestamp) -> Option<LastTimePayload> {
        let whole = current.whole_secs();
        if whole == 0 || whole % self.interval_secs != 0 {
            return None;
        }
        if self.last_checkpoint == Some(whole) {
            return None;
        }
        self.last_checkpoint = Some(whole);
        Some(LastTimePayload {
            last_time_video: whole,
        })
    }

    pub fn last_checkpoint(&self) -> Option<u64> {
        self.last_checkpoint
    }

    pub fn reset(&mut self) {
        self.last_checkpoint = None;
    }
}
