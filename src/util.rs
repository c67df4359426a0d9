// Shared helpers and the responsive threshold used by every component.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;

/// Single mobile/desktop threshold; every breakpoint check goes through this.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

pub fn is_mobile_width(width: f64) -> bool {
    width <= MOBILE_BREAKPOINT_PX
}

pub fn window_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(1024.0)
}

pub fn is_mobile() -> bool {
    is_mobile_width(window_width())
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub fn cerror(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

/// One-shot timer; returns the handle for `clear_timeout_with_handle`.
pub fn set_timeout(window: &Window, ms: i32, f: impl FnOnce() + 'static) -> Option<i32> {
    let cb = Closure::once_into_js(f);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
        .ok()
}

pub fn next_frame(f: impl FnOnce() + 'static) {
    if let Some(window) = web_sys::window() {
        let cb = Closure::once_into_js(f);
        let _ = window.request_animation_frame(cb.unchecked_ref());
    }
}

/// Extract the translateY component from an inline `transform` value, e.g.
/// `"translateY(42px)"` -> `Some(42.0)`. Percent values are not offsets the
/// drag logic can use, so they yield `None`.
pub fn parse_translate_y(transform: &str) -> Option<f64> {
    let start = transform.find("translateY(")? + "translateY(".len();
    let rest = &transform[start..];
    let end = rest.find(')')?;
    let value = rest[..end].trim();
    if let Some(px) = value.strip_suffix("px") {
        return px.trim().parse().ok();
    }
    if value.ends_with('%') {
        return None;
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pixel_translate_y() {
        assert_eq!(parse_translate_y("translateY(42px)"), Some(42.0));
        assert_eq!(parse_translate_y("translateY(-50px)"), Some(-50.0));
        assert_eq!(parse_translate_y("translateY(0)"), Some(0.0));
    }

    #[test]
    fn rejects_missing_or_percent_values() {
        assert_eq!(parse_translate_y(""), None);
        assert_eq!(parse_translate_y("translateX(10px)"), None);
        assert_eq!(parse_translate_y("translateY(100%)"), None);
    }

    #[test]
    fn breakpoint_boundary_is_inclusive_for_mobile() {
        assert!(is_mobile_width(MOBILE_BREAKPOINT_PX));
        assert!(!is_mobile_width(MOBILE_BREAKPOINT_PX + 1.0));
    }
}
