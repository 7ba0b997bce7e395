// WASM bindings: JS hands in its media element and progress API as plain callbacks.
// Rust decides; JS executes.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Function, Promise, Reflect, JSON};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::TrackerError;
use crate::service::{LessonProgressService, MediaControl, ServiceFuture};
use crate::session::LessonSession;
use crate::types::*;

impl From<TrackerError> for JsValue {
    fn from(err: TrackerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn callback(callbacks: &JsValue, name: &str) -> Result<Function, TrackerError> {
    Reflect::get(callbacks, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| TrackerError::InvalidConfig(format!("missing callback `{}`", name)))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, TrackerError> {
    let json = serde_json::to_string(value)?;
    JSON::parse(&json).map_err(|e| TrackerError::Serialization(format!("{:?}", e)))
}

fn js_error(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// `HTMLMediaElement` control plus the warning dialog, as JS callbacks.
pub struct JsMediaControl {
    pause: Function,
    play: Function,
    seek_to: Function,
    show_seek_warning: Function,
}

impl JsMediaControl {
    pub fn from_callbacks(callbacks: &JsValue) -> Result<Self, TrackerError> {
        Ok(JsMediaControl {
            pause: callback(callbacks, "pause")?,
            play: callback(callbacks, "play")?,
            seek_to: callback(callbacks, "seekTo")?,
            show_seek_warning: callback(callbacks, "showSeekWarning")?,
        })
    }

    fn invoke(&self, name: &'static str, result: Result<JsValue, JsValue>) {
        // A throwing callback must not unwind into the tracker.
        let returned = match result {
            Ok(returned) => returned,
            Err(err) => {
                warn!(callback = name, error = %js_error(err), "media callback threw");
                return;
            }
        };
        // `HTMLMediaElement.play()` rejects when autoplay is blocked or a pause interrupts it.
        if let Some(promise) = returned.dyn_ref::<Promise>() {
            let pending = JsFuture::from(promise.clone());
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = pending.await {
                    warn!(callback = name, error = %js_error(err), "media callback rejected");
                }
            });
        }
    }
}

impl MediaControl for JsMediaControl {
    fn pause(&self) {
        self.invoke("pause", self.pause.call0(&JsValue::NULL));
    }

    fn play(&self) {
        self.invoke("play", self.play.call0(&JsValue::NULL));
    }

    fn seek_to(&self, position_secs: f64) {
        self.invoke(
            "seekTo",
            self.seek_to
                .call1(&JsValue::NULL, &JsValue::from_f64(position_secs)),
        );
    }

    fn show_seek_warning(&self, watched_secs: f64, attempted_secs: f64) {
        self.invoke(
            "showSeekWarning",
            self.show_seek_warning.call2(
                &JsValue::NULL,
                &JsValue::from_f64(watched_secs),
                &JsValue::from_f64(attempted_secs),
            ),
        );
    }
}

/// Progress API as JS callbacks. `completeLesson` and `updateLastTime` may return a Promise;
/// `saveProgressOnExit` is expected to use `navigator.sendBeacon`.
pub struct JsProgressService {
    complete_lesson: Function,
    update_last_time: Function,
    save_progress_on_exit: Function,
}

impl JsProgressService {
    pub fn from_callbacks(callbacks: &JsValue) -> Result<Self, TrackerError> {
        Ok(JsProgressService {
            complete_lesson: callback(callbacks, "completeLesson")?,
            update_last_time: callback(callbacks, "updateLastTime")?,
            save_progress_on_exit: callback(callbacks, "saveProgressOnExit")?,
        })
    }

    fn request<T: serde::Serialize>(
        operation: &'static str,
        function: &Function,
        lesson_id: &LessonId,
        payload: &T,
    ) -> ServiceFuture {
        let call = to_js(payload).and_then(|body| {
            function
                .call2(&JsValue::NULL, &JsValue::from_str(lesson_id.as_str()), &body)
                .map_err(|err| TrackerError::service(operation, js_error(err)))
        });

        async move {
            let returned = call?;
            if let Some(promise) = returned.dyn_ref::<Promise>() {
                JsFuture::from(promise.clone())
                    .await
                    .map_err(|err| TrackerError::service(operation, js_error(err)))?;
            }
            Ok(())
        }
        .boxed_local()
    }
}

impl LessonProgressService for JsProgressService {
    fn complete_lesson(
        &self,
        lesson_id: &LessonId,
        payload: CompleteLessonPayload,
    ) -> ServiceFuture {
        Self::request("complete_lesson", &self.complete_lesson, lesson_id, &payload)
    }

    fn update_last_time(&self, lesson_id: &LessonId, payload: LastTimePayload) -> ServiceFuture {
        Self::request("update_last_time", &self.update_last_time, lesson_id, &payload)
    }

    fn save_progress_on_exit(&self, lesson_id: &LessonId, payload: LastTimePayload) {
        let sent = to_js(&payload).and_then(|body| {
            self.save_progress_on_exit
                .call2(&JsValue::NULL, &JsValue::from_str(lesson_id.as_str()), &body)
                .map_err(|err| TrackerError::service("save_progress_on_exit", js_error(err)))
        });
        if let Err(err) = sent {
            warn!(%lesson_id, error = %err, "exit flush could not be sent");
        }
    }
}

fn spawn_on_event_loop(future: LocalBoxFuture<'static, ()>) {
    wasm_bindgen_futures::spawn_local(future);
}

type JsSession = LessonSession<JsMediaControl, JsProgressService, fn(LocalBoxFuture<'static, ()>)>;

/// WASM-exposed lesson player for the video-lesson page.
///
/// # Example
/// ```js
/// const player = new WasmLessonPlayer(
///   JSON.stringify({ lesson_id: "42", last_time_video: 45 }),
///   {
///     pause: () => video.pause(),
///     play: () => video.play(),
///     seekTo: (t) => { video.currentTime = t; },
///     showSeekWarning: (watched, attempted) => openSkipDialog(watched, attempted),
///     completeLesson: (id, body) => api.post(`/lessons/${id}/complete`, body),
///     updateLastTime: (id, body) => api.put(`/lessons/${id}/last-time`, body),
///     saveProgressOnExit: (id, body) =>
///       navigator.sendBeacon(`/lessons/${id}/last-time`, JSON.stringify(body)),
///   },
/// );
/// player.mount();
/// video.addEventListener("timeupdate", () =>
///   player.on_time_update(video.currentTime, video.duration));
/// ```
#[wasm_bindgen]
pub struct WasmLessonPlayer {
    session: JsSession,
}

#[wasm_bindgen]
impl WasmLessonPlayer {
    /// Create a player from a JSON `TrackerConfig` and an object of JS callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, callbacks: JsValue) -> Result<WasmLessonPlayer, JsValue> {
        let config = TrackerConfig::from_json(config_json)?;
        let media = JsMediaControl::from_callbacks(&callbacks)?;
        let service = JsProgressService::from_callbacks(&callbacks)?;
        let spawner: fn(LocalBoxFuture<'static, ()>) = spawn_on_event_loop;

        Ok(WasmLessonPlayer {
            session: LessonSession::new(config, media, service, spawner)?,
        })
    }

    /// Seek the media to the resume point. Returns the executed commands as JSON.
    pub fn mount(&self) -> Result<String, JsValue> {
        let commands = self.session.mount()?;
        Self::commands_json(&commands)
    }

    /// Process a JSON `EventBatch` in one crossing.
    pub fn handle_events(&self, events_json: &str) -> Result<String, JsValue> {
        let batch: EventBatch = serde_json::from_str(events_json).map_err(TrackerError::from)?;
        Self::commands_json(&self.session.dispatch_batch(&batch))
    }

    /// `timeupdate` handler. Pass `video.duration` as is; NaN means unknown.
    pub fn on_time_update(&self, current_time: f64, duration: f64) -> Result<String, JsValue> {
        self.dispatch(PlayerEvent::TimeUpdate {
            current_time,
            duration: Some(duration),
        })
    }

    /// `visibilitychange` handler.
    pub fn on_visibility_change(&self, hidden: bool, playing: bool) -> Result<String, JsValue> {
        self.dispatch(PlayerEvent::VisibilityChange { hidden, playing })
    }

    /// `pagehide` handler.
    pub fn on_page_hide(&self) -> Result<String, JsValue> {
        self.dispatch(PlayerEvent::PageHide)
    }

    pub fn dismiss_warning(&self) -> Result<String, JsValue> {
        self.dispatch(PlayerEvent::WarningDismissed)
    }

    pub fn restart(&self) -> Result<String, JsValue> {
        self.dispatch(PlayerEvent::Restart)
    }

    /// Call from the component's cleanup after removing its listeners.
    pub fn unmount(&self) {
        self.session.unmount();
    }

    pub fn current_time(&self) -> f64 {
        self.session.tracker().current_time().as_secs()
    }

    pub fn watched_time(&self) -> f64 {
        self.session.tracker().watched_time().as_secs()
    }

    pub fn is_completed(&self) -> bool {
        self.session.tracker().is_completed()
    }

    fn dispatch(&self, event: PlayerEvent) -> Result<String, JsValue> {
        Self::commands_json(&self.session.dispatch(&event))
    }

    fn commands_json(commands: &[PlayerCommand]) -> Result<String, JsValue> {
        serde_json::to_string(commands)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}
