//! Profiling utilities based on the `puffin` crate.
//!
//! Scopes are only recorded with the `profiling` feature; without it the
//! [`profile_function!`](crate::profile_function) and
//! [`profile_scope!`](crate::profile_scope) macros expand to nothing.

#[cfg(feature = "profiling")]
pub use puffin;

/// Enable or disable scope recording.
#[cfg(feature = "profiling")]
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
    tracing::info!("Puffin scope recording {}", if enabled { "enabled" } else { "disabled" });
}

/// Enable or disable scope recording.
#[cfg(not(feature = "profiling"))]
pub fn set_enabled(enabled: bool) {
    if enabled {
        tracing::warn!("vantage-core was built without the `profiling` feature");
    }
}

/// Mark the start of a new layout pass.
///
/// Call this once per rendered chart to organize profiling data by pass.
#[inline]
pub fn new_frame() {
    #[cfg(feature = "profiling")]
    puffin::GlobalProfiler::lock().new_frame();
}

/// Profile the enclosing function.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_function {
    () => {
        $crate::profiling::puffin::profile_function!();
    };
}

/// Profile the enclosing function.
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_function {
    () => {};
}

/// Profile a named scope.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        $crate::profiling::puffin::profile_scope!($name);
    };
}

/// Profile a named scope.
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {};
}
