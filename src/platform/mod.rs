//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock time
//! - Keyboard and touch input, polled once per frame

pub mod input;
pub mod touch;

pub use input::{Action, CombinedInput, InputPoller, InputSource, KeyboardState};
pub use touch::{TouchControls, is_mobile};

/// Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}
