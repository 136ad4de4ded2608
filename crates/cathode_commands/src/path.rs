//! Alias/proxy path resolution and override scopes
//!
//! A path walks from a composite through nested composite-instance entities.
//! Each level of nesting consumes the first GUID. When walking a scene, the
//! aliases and proxies of every enclosing composite are carried down in an
//! [`OverrideScope`] and trimmed one element per level.

use crate::commands::Commands;
use crate::composite::Composite;
use crate::entity::{Entity, EntityPath};
use crate::parameter::{ResourceReference, Transform};
use cathode_core::ShortGuid;

/// Concrete target of a path walk
#[derive(Clone, Copy, Debug)]
pub struct ResolvedEntity<'a> {
    /// Composite that owns `entity`
    pub composite: &'a Composite,
    pub entity: &'a Entity,
}

/// Resolve a path starting at `start`
///
/// Returns `None` if any step does not resolve, or if an intermediate entity
/// is not a composite instance.
pub fn resolve_entity_path<'a>(
    commands: &'a Commands,
    start: &'a Composite,
    path: &EntityPath,
) -> Option<ResolvedEntity<'a>> {
    let steps = path.normalized();
    let (&last, walk) = steps.split_last()?;

    let mut composite = start;
    for &guid in walk {
        let entity = composite.get_entity(guid)?;
        composite = match commands.instanced_composite(entity) {
            Some(next) => next,
            None => {
                log::trace!(
                    "Path step {} in {} is not a composite instance",
                    guid.to_byte_string(),
                    composite.name
                );
                return None;
            }
        };
    }

    let entity = composite.get_entity(last)?;
    Some(ResolvedEntity { composite, entity })
}

/// An alias or proxy carried down the instancing hierarchy
#[derive(Clone, Debug, PartialEq)]
pub struct Override {
    /// Composite that declares the alias/proxy
    pub owner: ShortGuid,
    /// Alias/proxy entity GUID
    pub entity: ShortGuid,
    /// Path remaining below the current level
    pub path: EntityPath,
    /// The override's own `position` TRANSFORM
    pub transform: Option<Transform>,
    /// The override's own `resource` references, if any
    pub resources: Option<Vec<ResourceReference>>,
}

impl Override {
    /// Build from an alias or proxy entity
    pub fn from_entity(owner: ShortGuid, entity: &Entity) -> Option<Self> {
        let path = entity.path()?.clone();
        let resources = entity.resources();
        Some(Self {
            owner,
            entity: entity.guid,
            path,
            transform: entity.transform(),
            resources: (!resources.is_empty()).then(|| resources.to_vec()),
        })
    }

    /// Whether the remaining path names `guid` at this level
    pub fn targets(&self, guid: ShortGuid) -> bool {
        self.path.normalized() == [guid]
    }
}

/// Active overrides at one position of the instancing hierarchy
#[derive(Clone, Debug, Default)]
pub struct OverrideScope {
    overrides: Vec<Override>,
}

impl OverrideScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope for walking `composite` from the top
    pub fn root(composite: &Composite) -> Self {
        Self::new().with_composite(composite)
    }

    /// Register a composite's own aliases and proxies
    pub fn with_composite(mut self, composite: &Composite) -> Self {
        for entity in composite.overrides() {
            match Override::from_entity(composite.guid, entity) {
                Some(ov) if !ov.path.is_exhausted() => self.overrides.push(ov),
                _ => log::trace!(
                    "Ignoring empty override {} in {}",
                    entity.guid.to_byte_string(),
                    composite.name
                ),
            }
        }
        self
    }

    /// Scope inside the composite instantiated by `instance`
    ///
    /// Inherited overrides that pass through `instance` are trimmed by one
    /// element; those with nothing left, or that point elsewhere, are dropped.
    /// The child composite's own aliases and proxies are then appended.
    pub fn descend(&self, instance: ShortGuid, child: &Composite) -> Self {
        let overrides = self
            .overrides
            .iter()
            .filter(|ov| ov.path.normalized().first() == Some(&instance))
            .map(|ov| Override {
                path: ov.path.trimmed(),
                ..ov.clone()
            })
            .filter(|ov| !ov.path.is_exhausted())
            .collect();
        Self { overrides }.with_composite(child)
    }

    /// Override targeting an entity at this level
    ///
    /// When several overrides target the same entity the last registered wins.
    pub fn override_for(&self, guid: ShortGuid) -> Option<&Override> {
        self.overrides.iter().rev().find(|ov| ov.targets(guid))
    }

    /// All active overrides
    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Transform of `entity` after applying an override
///
/// The override's own TRANSFORM takes precedence over the entity's.
pub fn effective_transform(entity: &Entity, ov: Option<&Override>) -> Option<Transform> {
    ov.and_then(|o| o.transform).or_else(|| entity.transform())
}

/// Resources of `entity` after applying an override
pub fn effective_resources<'a>(entity: &'a Entity, ov: Option<&'a Override>) -> &'a [ResourceReference] {
    match ov.and_then(|o| o.resources.as_deref()) {
        Some(resources) => resources,
        None => entity.resources(),
    }
}
