// Seek guard: blocks forward jumps past the watched high-water mark.
// Backward seeks and normal playback are always legal.

use crate::types::Timestamp;

/// Outcome of evaluating one reported position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekVerdict {
    Legal,
    /// Jump went further than `watched + tolerance`. `revert_to` is the last legal position.
    Illegal { revert_to: Timestamp },
}

/// Classifies reported positions and throttles the user-facing warning.
#[derive(Debug, Clone)]
pub struct SeekGuard {
    tolerance: Timestamp,
    warning_active: bool,
}

impl SeekGuard {
    pub fn new(tolerance: Timestamp) -> Self {
        SeekGuard {
            tolerance,
            warning_active: false,
        }
    }

    /// Pure legality check: `reported > watched + tolerance` is illegal.
    pub fn is_legal(&self, reported: Timestamp, watched: Timestamp) -> bool {
        reported <= watched.saturating_add(self.tolerance.as_micros())
    }

    pub fn evaluate(
        &self,
        reported: Timestamp,
        watched: Timestamp,
        last_legal: Timestamp,
    ) -> SeekVerdict {
        if self.is_legal(reported, watched) {
            SeekVerdict::Legal
        } else {
            SeekVerdict::Illegal {
                revert_to: last_legal,
            }
        }
    }

    /// Returns true when a warning should be surfaced for this illegal jump.
    /// Repeated jumps while the warning is still showing only revert.
    pub fn raise_warning(&mut self) -> bool {
        if self.warning_active {
            return false;
        }
        self.warning_active = true;
        true
    }

    /// Warning was dismissed or playback is back within bounds.
    pub fn clear_warning(&mut self) {
        self.warning_active = false;
    }

    pub fn warning_active(&self) -> bool {
        self.warning_active
    }
}
