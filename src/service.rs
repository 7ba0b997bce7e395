// Injected collaborators. The tracker never reaches for globals; the host hands these in.

use futures::future::LocalBoxFuture;

use crate::error::TrackerError;
use crate::types::{CompleteLessonPayload, LastTimePayload, LessonId};

/// Result of a network call to the progress service. Not `Send`: the UI thread owns it.
pub type ServiceFuture = LocalBoxFuture<'static, Result<(), TrackerError>>;

/// Remote lesson-progress service. Transport and wire format belong to the service.
pub trait LessonProgressService {
    /// Idempotent. Marks the lesson complete and records the watched position.
    fn complete_lesson(
        &self,
        lesson_id: &LessonId,
        payload: CompleteLessonPayload,
    ) -> ServiceFuture;

    /// Best-effort checkpoint save.
    fn update_last_time(&self, lesson_id: &LessonId, payload: LastTimePayload) -> ServiceFuture;

    /// Fire-and-forget save during page teardown. Must not depend on the page staying alive.
    fn save_progress_on_exit(&self, lesson_id: &LessonId, payload: LastTimePayload);
}

/// The media element as seen by the tracker.
pub trait MediaControl {
    fn pause(&self);
    fn play(&self);
    fn seek_to(&self, position_secs: f64);
    fn show_seek_warning(&self, watched_secs: f64, attempted_secs: f64);
}

/// Runs a detached future on the current thread without awaiting it.
pub trait Spawner {
    fn spawn_detached(&self, future: LocalBoxFuture<'static, ()>);
}

impl<F> Spawner for F
where
    F: Fn(LocalBoxFuture<'static, ()>),
{
    fn spawn_detached(&self, future: LocalBoxFuture<'static, ()>) {
        self(future)
    }
}
