// Page-exit flush: one fire-and-forget save of the current position on teardown.

use crate::types::{LastTimePayload, Timestamp};

/// Builds the final save. Only one flush per page lifetime; `pagehide` and
/// `beforeunload` can both fire for the same navigation.
#[derive(Debug, Clone, Default)]
pub struct PageExitFlush {
    flushed: bool,
}

impl PageExitFlush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush(&mut self, current: Timestamp) -> Option<LastTimePayload> {
        if self.flushed {
            return None;
        }
        self.flushed = true;
        Some(LastTimePayload::at(current))
    }

    /// Page came back from the back/forward cache.
    pub fn rearm(&mut self) {
        self.flushed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_once() {
        let mut flush = PageExitFlush::new();
        let payload = flush.flush(Timestamp::from_secs_f64(87.9).unwrap());
        assert_eq!(
            payload,
            Some(LastTimePayload {
                last_time_video: 87
            })
        );
        assert!(flush.flush(Timestamp::from_secs(90)).is_none());
        flush.rearm();
        assert!(flush.flush(Timestamp::from_secs(90)).is_some());
    }
}
