// Exactly-once completion signal guarded by an in-memory latch.
// The latch is the only guard; there is no debounce timer.

use crate::types::{CompleteLessonPayload, Timestamp};

/// Completion latch state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionLatch {
    /// No request sent yet, or the last one failed.
    Idle,
    /// Request sent, result pending.
    InFlight,
    /// Lesson is complete. Seek guard is lifted.
    Completed,
}

/// Decides when the "lesson completed" request is sent.
#[derive(Debug, Clone)]
pub struct CompletionTrigger {
    ratio: f64,
    latch: CompletionLatch,
}

impl CompletionTrigger {
    pub fn new(ratio: f64, already_completed: bool) -> Self {
        CompletionTrigger {
            ratio,
            latch: if already_completed {
                CompletionLatch::Completed
            } else {
                CompletionLatch::Idle
            },
        }
    }

    pub fn latch(&self) -> CompletionLatch {
        self.latch
    }

    /// Latch is set, either pending or confirmed.
    pub fn is_latched(&self) -> bool {
        self.latch != CompletionLatch::Idle
    }

    pub fn is_completed(&self) -> bool {
        self.latch == CompletionLatch::Completed
    }

    /// Watched time must exceed `ratio * duration`. Unknown or zero duration never qualifies.
    pub fn threshold_reached(&self, watched: Timestamp, duration: Option<Timestamp>) -> bool {
        match duration {
            Some(total) if !total.is_zero() => {
                watched.as_micros() as f64 > total.as_micros() as f64 * self.ratio
            }
            _ => false,
        }
    }

    /// Returns the request payload if this tick should send completion, and sets the latch.
    pub fn check(
        &mut self,
        watched: Timestamp,
        duration: Option<Timestamp>,
    ) -> Option<CompleteLessonPayload> {
        if self.is_latched() || !self.threshold_reached(watched, duration) {
            return None;
        }
        self.latch = CompletionLatch::InFlight;
        Some(CompleteLessonPayload {
            current_time: watched.as_secs(),
        })
    }

    /// Request settled. Failure rolls the latch back so a later tick retries.
    pub fn settle(&mut self, succeeded: bool) {
        if self.latch != CompletionLatch::InFlight {
            return;
        }
        self.latch = if succeeded {
            CompletionLatch::Completed
        } else {
            CompletionLatch::Idle
        };
    }
}
