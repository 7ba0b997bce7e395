// Lesson session: runs tracker commands against the injected media and progress service.
// Single-threaded. Network calls are spawned, never awaited by the event handlers.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::TrackerError;
use crate::service::{LessonProgressService, MediaControl, Spawner};
use crate::tracker::ProgressTracker;
use crate::types::*;

/// One mounted lesson player.
pub struct LessonSession<M, S, X> {
    tracker: Rc<RefCell<ProgressTracker>>,
    media: M,
    service: S,
    spawner: X,
}

impl<M, S, X> LessonSession<M, S, X>
where
    M: MediaControl,
    S: LessonProgressService,
    X: Spawner,
{
    pub fn new(
        config: TrackerConfig,
        media: M,
        service: S,
        spawner: X,
    ) -> Result<Self, TrackerError> {
        Ok(LessonSession {
            tracker: Rc::new(RefCell::new(ProgressTracker::new(config)?)),
            media,
            service,
            spawner,
        })
    }

    /// Position the media at the persisted resume point.
    pub fn mount(&self) -> Result<Vec<PlayerCommand>, TrackerError> {
        let commands = {
            let tracker = self.tracker.borrow();
            if tracker.is_disposed() {
                return Err(TrackerError::Disposed);
            }
            tracker.mount()
        };
        self.execute(&commands);
        Ok(commands)
    }

    /// Feed one event through the tracker and run the resulting commands.
    pub fn dispatch(&self, event: &PlayerEvent) -> Vec<PlayerCommand> {
        // Borrow ends before any host callback runs; a callback may re-enter `dispatch`.
        let commands = self.tracker.borrow_mut().handle(event);
        self.execute(&commands);
        commands
    }

    /// Events are processed in order; no reordering or coalescing.
    pub fn dispatch_batch(&self, batch: &EventBatch) -> Vec<PlayerCommand> {
        batch
            .events
            .iter()
            .flat_map(|event| self.dispatch(event))
            .collect()
    }

    /// Detach from the player. In-flight requests finish on their own and are ignored.
    pub fn unmount(&self) {
        self.tracker.borrow_mut().dispose();
    }

    pub fn tracker(&self) -> Ref<'_, ProgressTracker> {
        self.tracker.borrow()
    }

    fn execute(&self, commands: &[PlayerCommand]) {
        for command in commands {
            match command {
                PlayerCommand::Pause => self.media.pause(),
                PlayerCommand::Play => self.media.play(),
                PlayerCommand::SeekTo { position } => self.media.seek_to(*position),
                PlayerCommand::ShowSeekWarning {
                    watched_time,
                    attempted_time,
                } => self.media.show_seek_warning(*watched_time, *attempted_time),
                PlayerCommand::UpdateLastTime { lesson_id, payload } => {
                    let request = self.service.update_last_time(lesson_id, *payload);
                    let lesson_id = lesson_id.clone();
                    self.spawner.spawn_detached(
                        async move {
                            // Next checkpoint tries again.
                            if let Err(err) = request.await {
                                warn!(%lesson_id, error = %err, "autosave failed");
                            }
                        }
                        .boxed_local(),
                    );
                }
                PlayerCommand::CompleteLesson { lesson_id, payload } => {
                    let request = self.service.complete_lesson(lesson_id, *payload);
                    let tracker = Rc::clone(&self.tracker);
                    let lesson_id = lesson_id.clone();
                    self.spawner.spawn_detached(
                        async move {
                            let succeeded = match request.await {
                                Ok(()) => true,
                                Err(err) => {
                                    warn!(%lesson_id, error = %err, "completion request failed");
                                    false
                                }
                            };
                            tracker.borrow_mut().settle_completion(succeeded);
                        }
                        .boxed_local(),
                    );
                }
                PlayerCommand::SaveProgressOnExit { lesson_id, payload } => {
                    debug!(
                        %lesson_id,
                        last_time_video = payload.last_time_video,
                        "flushing progress on exit"
                    );
                    self.service.save_progress_on_exit(lesson_id, *payload);
                }
            }
        }
    }
}
