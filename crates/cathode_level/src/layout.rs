//! On-disk layout of a level

use crate::config::ContentConfig;
use crate::error::{LevelError, LevelResult};
use std::path::{Path, PathBuf};

const PATCH_SUFFIX: &str = "_PATCH";

/// Resolved directories of one level
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelPaths {
    pub name: String,
    /// `<level>/WORLD/`
    pub world: PathBuf,
    /// `<level>/RENDERABLE/`, possibly from the un-patched level
    pub renderable: PathBuf,
    /// Shared WORLD directory holding GLOBAL_TEXTURES.ALL.PAK
    pub global: PathBuf,
}

impl LevelPaths {
    /// Locate a level under the configured production directory
    pub fn locate(config: &ContentConfig, name: &str) -> LevelResult<Self> {
        let production = config.game_root.join(&config.production_dir);
        let level_dir = production.join(name);
        if !level_dir.is_dir() {
            return Err(LevelError::LevelNotFound { path: level_dir });
        }

        let renderable_level = renderable_level_name(config, name);
        if renderable_level != name {
            log::info!("{} takes RENDERABLE from {}", name, renderable_level);
        }

        Ok(Self {
            name: name.to_string(),
            world: level_dir.join("WORLD"),
            renderable: production.join(renderable_level).join("RENDERABLE"),
            global: config.game_root.join(&config.global_dir),
        })
    }

    pub fn world_file(&self, file: &str) -> PathBuf {
        self.world.join(file)
    }

    pub fn renderable_file(&self, file: &str) -> PathBuf {
        self.renderable.join(file)
    }

    pub fn global_file(&self, file: &str) -> PathBuf {
        self.global.join(file)
    }

    /// Level directory
    pub fn root(&self) -> &Path {
        self.world.parent().unwrap_or(&self.world)
    }
}

/// Level whose RENDERABLE subtree serves `name`
fn renderable_level_name<'a>(config: &ContentConfig, name: &'a str) -> &'a str {
    let patched = config
        .patched_levels
        .iter()
        .any(|level| level.eq_ignore_ascii_case(name));
    if patched {
        name.strip_suffix(PATCH_SUFFIX).unwrap_or(name)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_exception() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentConfig::with_root(dir.path());
        let production = dir.path().join("DATA/ENV/PRODUCTION");
        std::fs::create_dir_all(production.join("DLC/BSPNOSTROMO_RIPLEY_PATCH")).unwrap();
        std::fs::create_dir_all(production.join("BSP_TORRENS_PATCH")).unwrap();

        let patched = LevelPaths::locate(&config, "DLC/BSPNOSTROMO_RIPLEY_PATCH").unwrap();
        assert_eq!(patched.renderable, production.join("DLC/BSPNOSTROMO_RIPLEY/RENDERABLE"));
        assert_eq!(patched.world, production.join("DLC/BSPNOSTROMO_RIPLEY_PATCH/WORLD"));

        // only the configured levels are redirected
        let other = LevelPaths::locate(&config, "BSP_TORRENS_PATCH").unwrap();
        assert_eq!(other.renderable, production.join("BSP_TORRENS_PATCH/RENDERABLE"));
    }

    #[test]
    fn test_missing_level() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentConfig::with_root(dir.path());
        assert!(matches!(
            LevelPaths::locate(&config, "NOPE"),
            Err(LevelError::LevelNotFound { .. })
        ));
    }
}
