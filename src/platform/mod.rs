//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key bindings, latched one-shot actions)
//! - Storage (LocalStorage on web)
//! - Wall-clock time

pub mod input;
pub mod storage;

pub use input::{Action, InputState, KeyBindings};

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
