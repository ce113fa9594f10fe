//! Browser repaint scheduling

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::driver::{FrameCallback, Scheduler};

/// `requestAnimationFrame` / `cancelAnimationFrame`
#[derive(Debug, Clone, Copy, Default)]
pub struct RafScheduler;

impl Scheduler for RafScheduler {
    type Handle = i32;

    fn request(&self, callback: FrameCallback) -> Option<i32> {
        let window = web_sys::window()?;
        let closure = Closure::once(move |time: f64| callback(time));
        let handle = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        // A cancelled frame leaks its closure; it holds only a weak driver handle
        closure.forget();
        handle
    }

    fn cancel(&self, handle: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}
