// Browser tests for the JS-facing player. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Object, Promise, Reflect};
use lesson_core::WasmLessonPlayer;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Callbacks that append `[name, ...args]` to `log`. Network callbacks resolve immediately.
fn recording_callbacks(log: &Array) -> JsValue {
    let callbacks = Object::new();
    for name in ["pause", "play", "seekTo", "showSeekWarning", "saveProgressOnExit"] {
        let body = format!(
            "log.push(['{}'].concat(Array.prototype.slice.call(arguments)));",
            name
        );
        let f = Function::new_with_args("log", &format!("return function() {{ {} }};", body));
        let bound = f.call1(&JsValue::NULL, log).unwrap();
        Reflect::set(&callbacks, &JsValue::from_str(name), &bound).unwrap();
    }
    for name in ["completeLesson", "updateLastTime"] {
        let body = format!(
            "log.push(['{}'].concat(Array.prototype.slice.call(arguments))); \
             return Promise.resolve();",
            name
        );
        let f = Function::new_with_args("log", &format!("return function() {{ {} }};", body));
        let bound = f.call1(&JsValue::NULL, log).unwrap();
        Reflect::set(&callbacks, &JsValue::from_str(name), &bound).unwrap();
    }
    callbacks.into()
}

fn logged_names(log: &Array) -> Vec<String> {
    log.iter()
        .map(|entry| Array::from(&entry).get(0).as_string().unwrap())
        .collect()
}

/// Wait for a macrotask so every pending microtask has run.
async fn next_macrotask() {
    let promise = Promise::new(&mut |resolve, _reject| {
        let schedule = Function::new_with_args("resolve", "setTimeout(resolve, 0);");
        schedule.call1(&JsValue::NULL, &resolve).unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn rejects_missing_callbacks() {
    let result = WasmLessonPlayer::new(r#"{"lesson_id":"1"}"#, Object::new().into());
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn illegal_seek_calls_media_callbacks() {
    let log = Array::new();
    let config = r#"{"lesson_id":"1","last_time_video":100}"#;
    let player = WasmLessonPlayer::new(config, recording_callbacks(&log)).unwrap();

    player.on_time_update(150.0, 300.0).unwrap();
    assert_eq!(logged_names(&log), vec!["pause", "seekTo", "showSeekWarning"]);
    assert_eq!(player.watched_time(), 100.0);
}

#[wasm_bindgen_test]
async fn completion_promise_settles_latch() {
    let log = Array::new();
    let config = r#"{"lesson_id":"1","last_time_video":60}"#;
    let player = WasmLessonPlayer::new(config, recording_callbacks(&log)).unwrap();

    player.on_time_update(61.0, 90.0).unwrap();
    assert!(!player.is_completed());

    next_macrotask().await;
    assert!(player.is_completed());
    assert_eq!(logged_names(&log), vec!["completeLesson"]);
}

#[wasm_bindgen_test]
fn page_hide_uses_exit_callback() {
    let log = Array::new();
    let config = r#"{"lesson_id":"7","last_time_video":42.5}"#;
    let player = WasmLessonPlayer::new(config, recording_callbacks(&log)).unwrap();

    let commands = player.on_page_hide().unwrap();
    assert!(commands.contains("SaveProgressOnExit"));
    let entry = Array::from(&log.get(0));
    assert_eq!(entry.get(1).as_string().unwrap(), "7");
    let body = Reflect::get(&entry.get(2), &JsValue::from_str("last_time_video")).unwrap();
    assert_eq!(body.as_f64(), Some(42.0));
}

#[wasm_bindgen_test]
async fn rejected_play_promise_is_contained() {
    let log = Array::new();
    let callbacks = recording_callbacks(&log);
    // Autoplay policy rejects `HTMLMediaElement.play()` when the tab returns.
    let play = Function::new_with_args(
        "log",
        "return function() { log.push(['play']); \
         return Promise.reject(new DOMException('blocked', 'NotAllowedError')); };",
    )
    .call1(&JsValue::NULL, &log)
    .unwrap();
    Reflect::set(&callbacks, &JsValue::from_str("play"), &play).unwrap();
    let player = WasmLessonPlayer::new(r#"{"lesson_id":"3","last_time_video":10}"#, callbacks)
        .unwrap();

    player.on_visibility_change(true, true).unwrap();
    player.on_visibility_change(false, false).unwrap();
    next_macrotask().await;

    assert_eq!(logged_names(&log), vec!["pause", "play"]);
    player.on_time_update(10.5, 300.0).unwrap();
    assert_eq!(player.current_time(), 10.5);
}
