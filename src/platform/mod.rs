//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`performance.now()` on web)
//! - Repaint scheduling (`requestAnimationFrame` on web)
//! - Storage (LocalStorage on web, nothing natively)
//! - Environment hints (reduced motion, coarse pointer, pixel ratio)

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::RafScheduler;

/// Milliseconds from an arbitrary fixed origin
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Read a LocalStorage item
#[cfg(target_arch = "wasm32")]
pub fn storage_get(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Write a LocalStorage item; false if storage is unavailable or full
#[cfg(target_arch = "wasm32")]
pub fn storage_set(key: &str, value: &str) -> bool {
    local_storage()
        .map(|s| s.set_item(key, value).is_ok())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_get(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_set(_key: &str, _value: &str) -> bool {
    false
}

/// Whether a CSS media query currently matches (false when unsupported)
#[cfg(target_arch = "wasm32")]
pub fn media_matches(query: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn media_matches(_query: &str) -> bool {
    false
}

/// Largest device pixel ratio a canvas backing store is scaled by
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Clamp a reported device pixel ratio to `[1, MAX_PIXEL_RATIO]`
pub fn clamp_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(1.0, MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Device pixels per CSS pixel, clamped
#[cfg(target_arch = "wasm32")]
pub fn device_pixel_ratio() -> f64 {
    clamp_pixel_ratio(web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn device_pixel_ratio() -> f64 {
    1.0
}

pub fn prefers_reduced_motion() -> bool {
    media_matches("(prefers-reduced-motion: reduce)")
}

pub fn has_coarse_pointer() -> bool {
    media_matches("(pointer: coarse)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_clock_is_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_native_fallbacks() {
        assert!(!storage_set("k", "v"));
        assert_eq!(storage_get("k"), None);
        assert!(!prefers_reduced_motion());
        assert!(!has_coarse_pointer());
        assert_eq!(device_pixel_ratio(), 1.0);
    }

    #[test]
    fn test_pixel_ratio_clamped() {
        assert_eq!(clamp_pixel_ratio(0.5), 1.0);
        assert_eq!(clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(clamp_pixel_ratio(3.0), MAX_PIXEL_RATIO);
        assert_eq!(clamp_pixel_ratio(f64::NAN), 1.0);
    }
}
