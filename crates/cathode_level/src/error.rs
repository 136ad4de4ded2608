//! Level-layer errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors from level loading and the session surface
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("A level load is already in progress")]
    LoadInProgress,

    #[error("Level not found: {}", path.display())]
    LevelNotFound { path: PathBuf },

    /// One or more required tables failed to load
    #[error("Level load failed ({} table(s)): {}", failures.len(), summarize(failures))]
    TableLoad { failures: Vec<(&'static str, cathode_core::Error)> },

    #[error("A table loader panicked")]
    LoaderPanicked,

    #[error("Cannot start loader pool: {0}")]
    LoaderPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Packet decode error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Unsupported packet version {found}, expected {expected}")]
    ProtocolVersion { found: i32, expected: i32 },

    #[error("Unknown packet event {0}")]
    UnknownEvent(i32),

    #[error("Packet {0:?} does not select an entity")]
    MissingTarget(crate::live_sync::PacketEvent),

    #[error(transparent)]
    Core(#[from] cathode_core::Error),
}

fn summarize(failures: &[(&'static str, cathode_core::Error)]) -> String {
    failures
        .iter()
        .map(|(table, e)| format!("{}: {}", table, e))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for level operations
pub type LevelResult<T> = Result<T, LevelError>;
