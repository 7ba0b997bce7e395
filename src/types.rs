// Strong typing over strings. Newtypes for media timestamps and lesson ids.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Media position in microseconds. Newtype for type safety.
///
/// The media element reports float seconds; everything inside the tracker compares
/// integer microseconds so thresholds stay exact and `Ord` is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Convert a reported media time. Returns `None` for NaN, infinities and negatives,
    /// which browsers report before metadata is loaded or for live streams.
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        Some(Timestamp((secs * 1_000_000.0).round() as u64))
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_secs(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Whole seconds, truncated. This is what the progress service stores.
    pub fn whole_secs(&self) -> u64 {
        self.0 / 1_000_000
    }

    pub fn saturating_add(&self, micros: u64) -> Self {
        Timestamp(self.0.saturating_add(micros))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Identifier of the lesson being played, as issued by the progress service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    pub fn new(id: impl Into<String>) -> Self {
        LessonId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LessonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracker configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub lesson_id: LessonId,
    /// Previously persisted position, seconds. Seeds both current and watched time.
    #[serde(default)]
    pub last_time_video: f64,
    /// Lesson was already completed in an earlier session.
    #[serde(default)]
    pub completed: bool,
    /// Largest forward jump past the watched high-water mark that is still allowed.
    #[serde(default = "default_seek_tolerance")]
    pub seek_tolerance_secs: f64,
    /// Content-time spacing of autosave checkpoints.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval_secs: u64,
    /// Fraction of the media that must be watched before completion is reported.
    #[serde(default = "default_completion_ratio")]
    pub completion_ratio: f64,
    /// Pause playback while the document is hidden.
    #[serde(default = "default_true")]
    pub pause_when_hidden: bool,
}

fn default_seek_tolerance() -> f64 {
    10.0
}

fn default_checkpoint_interval() -> u64 {
    30
}

fn default_completion_ratio() -> f64 {
    2.0 / 3.0
}

fn default_true() -> bool {
    true
}

impl TrackerConfig {
    pub fn new(lesson_id: LessonId) -> Self {
        TrackerConfig {
            lesson_id,
            last_time_video: 0.0,
            completed: false,
            seek_tolerance_secs: default_seek_tolerance(),
            checkpoint_interval_secs: default_checkpoint_interval(),
            completion_ratio: default_completion_ratio(),
            pause_when_hidden: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.lesson_id.as_str().trim().is_empty() {
            return Err(TrackerError::InvalidConfig(
                "lesson_id must not be empty".to_string(),
            ));
        }
        if Timestamp::from_secs_f64(self.last_time_video).is_none() {
            return Err(TrackerError::InvalidConfig(format!(
                "last_time_video must be a non-negative number, got {}",
                self.last_time_video
            )));
        }
        if Timestamp::from_secs_f64(self.seek_tolerance_secs).is_none() {
            return Err(TrackerError::InvalidConfig(format!(
                "seek_tolerance_secs must be a non-negative number, got {}",
                self.seek_tolerance_secs
            )));
        }
        if self.checkpoint_interval_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "checkpoint_interval_secs must be positive".to_string(),
            ));
        }
        if !(self.completion_ratio > 0.0 && self.completion_ratio <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "completion_ratio must be in (0, 1], got {}",
                self.completion_ratio
            )));
        }
        Ok(())
    }

    pub fn resume_position(&self) -> Timestamp {
        Timestamp::from_secs_f64(self.last_time_video).unwrap_or_default()
    }

    pub fn seek_tolerance(&self) -> Timestamp {
        Timestamp::from_secs_f64(self.seek_tolerance_secs).unwrap_or_default()
    }
}

/// Event pushed by the host page. Batched to minimize JS↔WASM crossings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// `timeupdate` from the media element. Times are float seconds.
    TimeUpdate {
        current_time: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// `visibilitychange` on the document, with the media's playing state at that moment.
    VisibilityChange { hidden: bool, playing: bool },
    /// `pagehide`/`beforeunload`.
    PageHide,
    /// The illegal-seek warning was closed by the user.
    WarningDismissed,
    /// "Review again": start the lesson over from zero.
    Restart,
    /// Player component is going away.
    Unmount,
}

/// Batch of player events from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<PlayerEvent>,
}

/// Body of `completeLesson`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompleteLessonPayload {
    pub current_time: f64,
}

/// Body of `updateLastTime` and `saveProgressOnExit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTimePayload {
    pub last_time_video: u64,
}

impl LastTimePayload {
    pub fn at(position: Timestamp) -> Self {
        LastTimePayload {
            last_time_video: position.whole_secs(),
        }
    }
}

/// Action the host must perform on behalf of the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    Pause,
    Play,
    /// Move the media element to `position` seconds.
    SeekTo { position: f64 },
    ShowSeekWarning {
        watched_time: f64,
        attempted_time: f64,
    },
    UpdateLastTime {
        lesson_id: LessonId,
        payload: LastTimePayload,
    },
    CompleteLesson {
        lesson_id: LessonId,
        payload: CompleteLessonPayload,
    },
    SaveProgressOnExit {
        lesson_id: LessonId,
        payload: LastTimePayload,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_secs_f64(61.75).unwrap();
        assert_eq!(ts.as_micros(), 61_750_000);
        assert_eq!(ts.whole_secs(), 61);
        assert!((ts.as_secs() - 61.75).abs() < 0.0001);
        assert_eq!(Timestamp::from_secs(30), Timestamp::from_micros(30_000_000));
    }

    #[test]
    fn timestamp_rejects_unreportable_times() {
        assert!(Timestamp::from_secs_f64(f64::NAN).is_none());
        assert!(Timestamp::from_secs_f64(f64::INFINITY).is_none());
        assert!(Timestamp::from_secs_f64(-0.5).is_none());
        assert_eq!(Timestamp::from_secs_f64(0.0), Some(Timestamp::ZERO));
    }

    #[test]
    fn config_defaults() {
        let config = TrackerConfig::from_json(r#"{"lesson_id":"42"}"#).unwrap();
        assert_eq!(config.lesson_id.as_str(), "42");
        assert_eq!(config.seek_tolerance(), Timestamp::from_secs(10));
        assert_eq!(config.checkpoint_interval_secs, 30);
        assert!((config.completion_ratio - 2.0 / 3.0).abs() < f64::EPSILON);
        assert!(config.pause_when_hidden);
        assert!(!config.completed);
        assert_eq!(config.resume_position(), Timestamp::ZERO);
    }

    #[test]
    fn config_validation() {
        let bad = [
            r#"{"lesson_id":""}"#,
            r#"{"lesson_id":"1","last_time_video":-3}"#,
            r#"{"lesson_id":"1","checkpoint_interval_secs":0}"#,
            r#"{"lesson_id":"1","completion_ratio":0}"#,
            r#"{"lesson_id":"1","completion_ratio":1.5}"#,
        ];
        for json in bad {
            assert!(
                matches!(
                    TrackerConfig::from_json(json),
                    Err(TrackerError::InvalidConfig(_))
                ),
                "expected rejection for {}",
                json
            );
        }
        assert!(matches!(
            TrackerConfig::from_json("{}"),
            Err(TrackerError::Serialization(_))
        ));
    }

    #[test]
    fn events_are_tagged() {
        let batch: EventBatch = serde_json::from_str(
            r#"{"events":[
                {"type":"TimeUpdate","current_time":12.5,"duration":300},
                {"type":"TimeUpdate","current_time":13},
                {"type":"VisibilityChange","hidden":true,"playing":true},
                {"type":"PageHide"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(batch.events.len(), 4);
        assert_eq!(
            batch.events[1],
            PlayerEvent::TimeUpdate {
                current_time: 13.0,
                duration: None
            }
        );
    }

    #[test]
    fn commands_use_service_field_names() {
        let cmd = PlayerCommand::UpdateLastTime {
            lesson_id: LessonId::new("7"),
            payload: LastTimePayload::at(Timestamp::from_secs_f64(60.4).unwrap()),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"type":"UpdateLastTime","lesson_id":"7","payload":{"last_time_video":60}}"#
        );
    }
}
