// Progress tracker: the synchronous state machine behind the lesson player.
// Every handler is pure with respect to I/O. It mutates in-memory state and returns the
// commands the host must run, in order.

use tracing::{debug, info, warn};

use crate::autosave::AutosaveEmitter;
use crate::completion::{CompletionLatch, CompletionTrigger};
use crate::error::TrackerError;
use crate::exit_flush::PageExitFlush;
use crate::progress::ProgressState;
use crate::seek_guard::{SeekGuard, SeekVerdict};
use crate::types::*;
use crate::visibility::{VisibilityAction, VisibilityPause};

/// One player session's progress tracking. Owned by exactly one player instance.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    lesson_id: LessonId,
    progress: ProgressState,
    guard: SeekGuard,
    autosave: AutosaveEmitter,
    completion: CompletionTrigger,
    visibility: VisibilityPause,
    exit_flush: PageExitFlush,
    pause_when_hidden: bool,
    duration: Option<Timestamp>,
    disposed: bool,
}

impl ProgressTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;

        Ok(ProgressTracker {
            progress: ProgressState::resume_at(config.resume_position()),
            guard: SeekGuard::new(config.seek_tolerance()),
            autosave: AutosaveEmitter::new(config.checkpoint_interval_secs),
            completion: CompletionTrigger::new(config.completion_ratio, config.completed),
            visibility: VisibilityPause::new(),
            exit_flush: PageExitFlush::new(),
            pause_when_hidden: config.pause_when_hidden,
            duration: None,
            disposed: false,
            lesson_id: config.lesson_id,
        })
    }

    /// Commands to run once when the player mounts: position the media at the resume point.
    pub fn mount(&self) -> Vec<PlayerCommand> {
        let resume = self.progress.current_time();
        if self.disposed || resume.is_zero() {
            return Vec::new();
        }
        debug!(lesson_id = %self.lesson_id, resume_at = resume.as_secs(), "resuming lesson");
        vec![PlayerCommand::SeekTo {
            position: resume.as_secs(),
        }]
    }

    /// Route one host event. After disposal every event is ignored.
    pub fn handle(&mut self, event: &PlayerEvent) -> Vec<PlayerCommand> {
        match event {
            PlayerEvent::TimeUpdate {
                current_time,
                duration,
            } => self.on_time_update(*current_time, *duration),
            PlayerEvent::VisibilityChange { hidden, playing } => {
                self.on_visibility_change(*hidden, *playing)
            }
            PlayerEvent::PageHide => self.on_page_hide(),
            PlayerEvent::WarningDismissed => {
                self.dismiss_warning();
                Vec::new()
            }
            PlayerEvent::Restart => self.restart(),
            PlayerEvent::Unmount => {
                self.dispose();
                Vec::new()
            }
        }
    }

    pub fn on_time_update(
        &mut self,
        current_time: f64,
        duration: Option<f64>,
    ) -> Vec<PlayerCommand> {
        if self.disposed {
            return Vec::new();
        }

        if let Some(total) = duration.and_then(Timestamp::from_secs_f64) {
            if !total.is_zero() {
                self.duration = Some(total);
            }
        }

        let Some(reported) = Timestamp::from_secs_f64(current_time) else {
            debug!(lesson_id = %self.lesson_id, current_time, "ignoring unreportable media time");
            return Vec::new();
        };

        let mut commands = Vec::new();

        // Free seeking once completion is latched.
        if !self.completion.is_latched() {
            let verdict = self.guard.evaluate(
                reported,
                self.progress.watched_time(),
                self.progress.current_time(),
            );
            if let SeekVerdict::Illegal { revert_to } = verdict {
                warn!(
                    lesson_id = %self.lesson_id,
                    attempted = reported.as_secs(),
                    watched = self.progress.watched_time().as_secs(),
                    "blocked forward seek past watched time"
                );
                commands.push(PlayerCommand::Pause);
                commands.push(PlayerCommand::SeekTo {
                    position: revert_to.as_secs(),
                });
                if self.guard.raise_warning() {
                    commands.push(PlayerCommand::ShowSeekWarning {
                        watched_time: self.progress.watched_time().as_secs(),
                        attempted_time: reported.as_secs(),
                    });
                }
                return commands;
            }
        }

        let previous_watched = self.progress.watched_time();
        self.progress.advance(reported);
        if self.progress.watched_time() > previous_watched {
            self.guard.clear_warning();
        }

        if let Some(payload) = self.autosave.check(self.progress.current_time()) {
            info!(
                lesson_id = %self.lesson_id,
                checkpoint = payload.last_time_video,
                "autosave checkpoint"
            );
            commands.push(PlayerCommand::UpdateLastTime {
                lesson_id: self.lesson_id.clone(),
                payload,
            });
        }

        if let Some(payload) = self
            .completion
            .check(self.progress.watched_time(), self.duration)
        {
            info!(
                lesson_id = %self.lesson_id,
                watched = payload.current_time,
                "completion threshold reached"
            );
            commands.push(PlayerCommand::CompleteLesson {
                lesson_id: self.lesson_id.clone(),
                payload,
            });
        }

        commands
    }

    pub fn on_visibility_change(&mut self, hidden: bool, playing: bool) -> Vec<PlayerCommand> {
        if self.disposed {
            return Vec::new();
        }
        if !hidden {
            self.exit_flush.rearm();
        }
        if !self.pause_when_hidden {
            return Vec::new();
        }
        match self.visibility.on_change(hidden, playing) {
            VisibilityAction::Pause => vec![PlayerCommand::Pause],
            VisibilityAction::Resume => vec![PlayerCommand::Play],
            VisibilityAction::Nothing => Vec::new(),
        }
    }

    pub fn on_page_hide(&mut self) -> Vec<PlayerCommand> {
        if self.disposed {
            return Vec::new();
        }
        self.exit_flush
            .flush(self.progress.current_time())
            .map(|payload| PlayerCommand::SaveProgressOnExit {
                lesson_id: self.lesson_id.clone(),
                payload,
            })
            .into_iter()
            .collect()
    }

    pub fn dismiss_warning(&mut self) {
        self.guard.clear_warning();
    }

    /// "Review again": progress starts over. The completion latch is kept.
    pub fn restart(&mut self) -> Vec<PlayerCommand> {
        if self.disposed {
            return Vec::new();
        }
        info!(lesson_id = %self.lesson_id, "restarting lesson");
        self.progress.reset();
        self.guard.clear_warning();
        self.autosave.reset();
        vec![PlayerCommand::SeekTo { position: 0.0 }]
    }

    /// Result of a completion request. Dropped after disposal.
    pub fn settle_completion(&mut self, succeeded: bool) {
        if self.disposed {
            debug!(lesson_id = %self.lesson_id, succeeded, "completion settled after unmount");
            return;
        }
        self.completion.settle(succeeded);
        if succeeded {
            info!(lesson_id = %self.lesson_id, "lesson marked complete");
        } else {
            warn!(lesson_id = %self.lesson_id, "completion request failed, will retry");
        }
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn current_time(&self) -> Timestamp {
        self.progress.current_time()
    }

    pub fn watched_time(&self) -> Timestamp {
        self.progress.watched_time()
    }

    pub fn duration(&self) -> Option<Timestamp> {
        self.duration
    }

    pub fn completion_latch(&self) -> CompletionLatch {
        self.completion.latch()
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_completed()
    }

    pub fn warning_active(&self) -> bool {
        self.guard.warning_active()
    }
}
