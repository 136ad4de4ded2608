//! Table - loaded / not-loaded state for optional tables

use std::path::{Path, PathBuf};

/// Load state for a table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LoadState {
    /// File was absent on disk
    NotLoaded = 0,
    /// Table decoded successfully
    Loaded = 1,
}

/// A table that may be absent from a level
#[derive(Debug, Clone)]
pub enum Table<T> {
    /// Decoded table
    Loaded(T),
    /// File was not present
    NotLoaded {
        /// Where the file was expected
        path: PathBuf,
    },
}

impl<T> Table<T> {
    /// Get current load state
    pub fn state(&self) -> LoadState {
        match self {
            Self::Loaded(_) => LoadState::Loaded,
            Self::NotLoaded { .. } => LoadState::NotLoaded,
        }
    }

    /// Check if loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Borrow the decoded table
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded { .. } => None,
        }
    }

    /// Expected path of an absent table
    pub fn missing_path(&self) -> Option<&Path> {
        match self {
            Self::Loaded(_) => None,
            Self::NotLoaded { path } => Some(path),
        }
    }
}
