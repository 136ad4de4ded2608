//! LevelSession - the consumer-facing surface over one loaded level

use crate::config::ContentConfig;
use crate::content::LevelContent;
use crate::error::{LevelError, LevelResult};
use crate::live_sync::{EditorEvent, EditorPacket, EntityTarget, LiveOverrides};
use crate::resolver::{CacheStats, ResolvedRenderable, Resolver};
use crate::scene::{SceneBuilder, SceneNode};
use cathode_commands::{resolve_entity_path, Composite, EntityPath, EntryPoint};
use cathode_core::ShortGuid;
use parking_lot::RwLock;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared handle to a composite of the loaded level
#[derive(Clone)]
pub struct CompositeRef {
    content: Arc<LevelContent>,
    index: usize,
}

impl Deref for CompositeRef {
    type Target = Composite;

    fn deref(&self) -> &Composite {
        &self.content.commands.composites()[self.index]
    }
}

impl std::fmt::Debug for CompositeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRef").field("name", &self.name).finish()
    }
}

/// Clears the loading flag when a load finishes or fails
struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One loaded level with the caches and live overrides derived from it
///
/// Cache keys are table indices of `content`, so the resolver never outlives
/// the tables it was filled from. A resolve still running against a replaced
/// level writes only into that level's caches.
pub struct LoadedLevel {
    content: Arc<LevelContent>,
    resolver: Resolver,
    live: RwLock<LiveOverrides>,
}

impl LoadedLevel {
    /// Wrap freshly loaded tables with empty caches
    pub fn new(content: Arc<LevelContent>) -> Self {
        Self {
            content,
            resolver: Resolver::new(),
            live: RwLock::new(LiveOverrides::new()),
        }
    }

    pub fn content(&self) -> &Arc<LevelContent> {
        &self.content
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Snapshot of the live overrides
    pub fn live_overrides(&self) -> LiveOverrides {
        self.live.read().clone()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.stats()
    }
}

impl std::fmt::Debug for LoadedLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedLevel")
            .field("name", &self.content.paths.name)
            .field("cache", &self.resolver.stats())
            .finish()
    }
}

/// One level at a time with its resolver caches and live overrides
pub struct LevelSession {
    config: ContentConfig,
    level: RwLock<Option<Arc<LoadedLevel>>>,
    loading: AtomicBool,
}

impl LevelSession {
    /// Create a session with no level loaded
    pub fn new(config: ContentConfig) -> Self {
        Self {
            config,
            level: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Currently loaded level with its caches
    pub fn level(&self) -> Option<Arc<LoadedLevel>> {
        self.level.read().clone()
    }

    /// Tables of the currently loaded level
    pub fn content(&self) -> Option<Arc<LevelContent>> {
        self.level.read().as_ref().map(|level| level.content.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.level.read().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Load a level, replacing the current one
    ///
    /// Fails with `LoadInProgress` while another load is running. The old
    /// level, its caches and its live overrides are dropped before any table
    /// is read; the new level starts with empty caches.
    pub fn load_level(&self, name: &str) -> LevelResult<Arc<LevelContent>> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LevelError::LoadInProgress);
        }
        let _guard = LoadGuard(&self.loading);

        self.reset();
        let content = Arc::new(LevelContent::load(&self.config, name)?);
        *self.level.write() = Some(Arc::new(LoadedLevel::new(content.clone())));
        Ok(content)
    }

    /// Drop the loaded level with every cache and all live overrides
    pub fn reset(&self) {
        if let Some(old) = self.level.write().take() {
            log::info!("Unloaded level {} ({:?})", old.content.paths.name, old.cache_stats());
        }
    }

    /// Get a composite by GUID
    pub fn composite(&self, guid: ShortGuid) -> Option<CompositeRef> {
        let content = self.content()?;
        let index = content.commands.composite_index(guid)?;
        Some(CompositeRef { content, index })
    }

    /// Root entry-point composite
    pub fn entry_point(&self) -> Option<CompositeRef> {
        let guid = self.content()?.commands.entry_point(EntryPoint::Root)?.guid;
        self.composite(guid)
    }

    /// Resolve an alias/proxy path from a starting composite
    pub fn resolve_entity_path(&self, path: &EntityPath, start: ShortGuid) -> Option<EntityTarget> {
        let content = self.content()?;
        let start = content.composite(start)?;
        let resolved = resolve_entity_path(&content.commands, start, path)?;
        Some(EntityTarget::new(resolved.composite.guid, resolved.entity.guid))
    }

    /// Resolve the meshes and materials an entity draws
    ///
    /// Resources remapped by the editor take precedence over the entity's own.
    /// Returns nothing when no level is loaded or the entity does not exist.
    pub fn resolve_renderable(&self, composite: ShortGuid, entity: ShortGuid) -> Vec<ResolvedRenderable> {
        let Some(level) = self.level() else {
            return Vec::new();
        };
        let content = &level.content;
        let target = EntityTarget::new(composite, entity);
        if let Some(elements) = level.live.read().remapped(target) {
            return level.resolver.resolve_elements(content, elements.iter().copied());
        }
        match content.commands.get_entity_by_id(composite, entity) {
            Some(entity) => level.resolver.resolve_resources(content, entity.resources()),
            None => {
                log::warn!(
                    "No entity {} in composite {}",
                    entity.to_byte_string(),
                    composite.to_byte_string()
                );
                Vec::new()
            }
        }
    }

    /// Instance a composite with live overrides applied
    pub fn build_scene(&self, composite: ShortGuid) -> Option<SceneNode> {
        let level = self.level()?;
        let live = level.live.read();
        match SceneBuilder::new(&level.content, &level.resolver, &live).build(composite) {
            Ok(node) => Some(node),
            Err(e) => {
                log::warn!("Cannot build scene: {}", e);
                None
            }
        }
    }

    /// Apply an editor event; returns whether any override changed
    ///
    /// Events arriving with no level loaded are dropped.
    pub fn apply_event(&self, event: &EditorEvent) -> bool {
        let Some(level) = self.level() else {
            log::debug!("No level loaded, dropping editor event {:?}", event);
            return false;
        };
        log::debug!("Editor event {:?}", event);
        let changed = level.live.write().apply(event);
        changed
    }

    /// Decode and apply a JSON editor packet
    pub fn handle_packet(&self, json: &str) -> LevelResult<EditorEvent> {
        let event = EditorPacket::from_json(json)?.into_event()?;
        self.apply_event(&event);
        Ok(event)
    }

    /// Snapshot of the live overrides, empty with no level loaded
    pub fn live_overrides(&self) -> LiveOverrides {
        self.level().map(|level| level.live_overrides()).unwrap_or_default()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.level().map(|level| level.cache_stats()).unwrap_or_default()
    }
}
