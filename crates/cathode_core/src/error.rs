//! Error types for container decoding and cross-reference resolution

use std::path::PathBuf;
use thiserror::Error;

/// The core error type
///
/// Load-time variants (`MissingFile`, `MalformedContainer`, `Io`) come out of
/// table decoding. Resolution-time variants (`UnresolvedReference`,
/// `UnsupportedFormat`, `OutOfBounds`) are recovered locally by callers.
#[derive(Debug, Error)]
pub enum Error {
    /// Optional table absent on disk
    #[error("Missing file: {}", path.display())]
    MissingFile { path: PathBuf },

    /// Declared size, count or offset is inconsistent with the data
    #[error("Malformed {container} at byte {offset}: {reason}")]
    MalformedContainer {
        container: &'static str,
        offset: usize,
        reason: String,
    },

    /// An index, GUID or path did not resolve
    #[error("Unresolved {kind} reference: {detail}")]
    UnresolvedReference { kind: &'static str, detail: String },

    /// An enum value with no decode or render path
    #[error("Unsupported {kind}: {detail}")]
    UnsupportedFormat { kind: &'static str, detail: String },

    /// A record range that does not fit its table
    #[error("{table} range {index}+{count} out of bounds (len {len})")]
    OutOfBounds {
        table: &'static str,
        index: i64,
        count: i64,
        len: usize,
    },

    /// IO error while reading a container
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Shorthand for a `MalformedContainer` error
    pub fn malformed(container: &'static str, offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            container,
            offset,
            reason: reason.into(),
        }
    }

    /// Shorthand for an `UnresolvedReference` error
    pub fn unresolved(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind,
            detail: detail.into(),
        }
    }

    /// Shorthand for an `UnsupportedFormat` error
    pub fn unsupported(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            kind,
            detail: detail.into(),
        }
    }

    /// Whether a level load may continue past this error
    pub fn is_tolerated(&self) -> bool {
        matches!(self, Self::MissingFile { .. })
    }

    /// Whether this error is local to one resolved element
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. } | Self::UnsupportedFormat { .. } | Self::OutOfBounds { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
