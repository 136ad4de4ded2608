//! Content configuration

use crate::error::LevelResult;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where level content lives and how it is loaded
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Game install directory
    pub game_root: PathBuf,
    /// Levels directory relative to `game_root`
    pub production_dir: PathBuf,
    /// Shared WORLD directory relative to `game_root`
    pub global_dir: PathBuf,
    /// Load GLOBAL_TEXTURES.ALL.PAK alongside the level
    pub load_global_textures: bool,
    /// Upper bound on concurrent table loads
    pub max_parallel_loads: usize,
    /// Levels whose RENDERABLE data is taken from the un-patched level
    pub patched_levels: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            game_root: PathBuf::from("."),
            production_dir: PathBuf::from("DATA/ENV/PRODUCTION"),
            global_dir: PathBuf::from("DATA/ENV/GLOBAL/WORLD"),
            load_global_textures: true,
            max_parallel_loads: 15,
            patched_levels: vec![
                "DLC/BSPNOSTROMO_RIPLEY_PATCH".to_string(),
                "DLC/BSPNOSTROMO_TWOTEAMS_PATCH".to_string(),
            ],
        }
    }
}

impl ContentConfig {
    /// Config rooted at a game directory, other fields default
    pub fn with_root(game_root: impl Into<PathBuf>) -> Self {
        Self {
            game_root: game_root.into(),
            ..Default::default()
        }
    }

    /// Parse from TOML text
    pub fn from_toml(content: &str) -> LevelResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> LevelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
