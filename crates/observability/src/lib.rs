//! Process-wide tracing setup.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize tracing from the environment (`RUST_LOG`, `LOG_FORMAT`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
