// lesson_core: Rust/WASM core for the video-lesson player.
// Progress, seek-guard, autosave and completion decisions live here; JS is plumbing.

mod autosave;
mod bindings;
mod completion;
mod error;
mod exit_flush;
mod progress;
mod seek_guard;
mod service;
mod session;
#[cfg(test)]
mod test_logs;
mod tracker;
mod types;
mod visibility;

use wasm_bindgen::prelude::*;

pub use autosave::AutosaveEmitter;
pub use bindings::{JsMediaControl, JsProgressService, WasmLessonPlayer};
pub use completion::{CompletionLatch, CompletionTrigger};
pub use error::TrackerError;
pub use exit_flush::PageExitFlush;
pub use progress::ProgressState;
pub use seek_guard::{SeekGuard, SeekVerdict};
pub use service::{LessonProgressService, MediaControl, ServiceFuture, Spawner};
pub use session::LessonSession;
pub use tracker::ProgressTracker;
pub use types::*;
pub use visibility::{VisibilityAction, VisibilityPause};

/// Initialize panic hook and console logging for the browser.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second module instance on the page already owns the global subscriber.
    #[cfg(feature = "console_log")]
    let _ = tracing_wasm::try_set_as_global_default();
}

/// Stateless seek-guard rule: may playback move to `reported_secs` given the watched mark?
/// Unreportable times are never allowed.
#[wasm_bindgen]
pub fn is_seek_allowed(reported_secs: f64, watched_secs: f64, tolerance_secs: f64) -> bool {
    match (
        Timestamp::from_secs_f64(reported_secs),
        Timestamp::from_secs_f64(watched_secs),
        Timestamp::from_secs_f64(tolerance_secs),
    ) {
        (Some(reported), Some(watched), Some(tolerance)) => {
            SeekGuard::new(tolerance).is_legal(reported, watched)
        }
        _ => false,
    }
}
