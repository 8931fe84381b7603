//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
///
/// Does nothing if a logger has already been installed.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default level filter
///
/// `level` uses `env_logger` filter syntax ("info", "downpour_scene=debug").
/// `RUST_LOG` still takes precedence when set.
pub fn init_with_level(level: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).try_init()
}
