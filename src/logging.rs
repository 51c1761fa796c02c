//! Logger setup for native and web builds.

use crate::config::LogLevel;

/// Install the platform logger.
///
/// Native builds use `env_logger`; `RUST_LOG` overrides the configured level
/// when set. Web builds log to the browser console and install the panic hook.
/// Calling this more than once is harmless.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(level: LogLevel) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level.to_level_filter());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Install the platform logger.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: LogLevel) {
    console_error_panic_hook::set_once();
    let level = level.to_level_filter().to_level().unwrap_or(log::Level::Error);
    if console_log::init_with_level(level).is_err() {
        log::debug!("Logger already initialized");
    }
}
