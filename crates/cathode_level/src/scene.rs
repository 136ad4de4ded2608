//! Scene instancing walk
//!
//! Expands a composite into a renderer-agnostic tree: one node per nested
//! composite instance and one per model reference. Alias/proxy overrides of
//! enclosing composites are carried down the walk, and live editor changes
//! take precedence over both.

use crate::content::LevelContent;
use crate::live_sync::{EntityTarget, LiveOverrides};
use crate::resolver::{ResolvedRenderable, Resolver};
use cathode_commands::{
    effective_resources, effective_transform, Composite, Entity, FunctionRef, OverrideScope,
    Transform,
};
use cathode_core::{Error, Result, ShortGuid};
use glam::Mat4;

/// What a scene node draws or contains
#[derive(Clone, Debug)]
pub enum SceneNodeKind {
    /// Nested composite instance
    Instance { composite: ShortGuid, children: Vec<SceneNode> },
    /// Model reference with its resolved renderables
    Model { renderables: Vec<ResolvedRenderable> },
}

/// One node of an instanced scene
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Entity GUID, invalid for the root
    pub entity: ShortGuid,
    /// Composite that declares the entity
    pub owner: ShortGuid,
    /// Transform relative to the parent node
    pub transform: Transform,
    pub kind: SceneNodeKind,
}

impl SceneNode {
    pub fn children(&self) -> &[SceneNode] {
        match &self.kind {
            SceneNodeKind::Instance { children, .. } => children,
            SceneNodeKind::Model { .. } => &[],
        }
    }

    pub fn renderables(&self) -> &[ResolvedRenderable] {
        match &self.kind {
            SceneNodeKind::Model { renderables } => renderables,
            SceneNodeKind::Instance { .. } => &[],
        }
    }

    /// Find a direct child by entity GUID
    pub fn child(&self, entity: ShortGuid) -> Option<&SceneNode> {
        self.children().iter().find(|c| c.entity == entity)
    }

    /// Every renderable in the subtree with its world matrix
    pub fn flatten(&self) -> Vec<(Mat4, &ResolvedRenderable)> {
        let mut out = Vec::new();
        self.flatten_into(Mat4::IDENTITY, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, parent: Mat4, out: &mut Vec<(Mat4, &'a ResolvedRenderable)>) {
        let world = parent * self.transform.to_matrix();
        out.extend(self.renderables().iter().map(|r| (world, r)));
        for child in self.children() {
            child.flatten_into(world, out);
        }
    }

    /// Number of nodes in the subtree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Builds scene trees for one loaded level
pub struct SceneBuilder<'a> {
    content: &'a LevelContent,
    resolver: &'a Resolver,
    live: &'a LiveOverrides,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(content: &'a LevelContent, resolver: &'a Resolver, live: &'a LiveOverrides) -> Self {
        Self { content, resolver, live }
    }

    /// Instance a composite at the origin
    pub fn build(&self, composite: ShortGuid) -> Result<SceneNode> {
        let root = self
            .content
            .composite(composite)
            .ok_or_else(|| Error::unresolved("composite", composite.to_byte_string()))?;

        let mut stack = vec![root.guid];
        let children = self.walk(root, &OverrideScope::root(root), &mut stack);
        log::debug!("Instanced {} with {} top-level nodes", root.short_name(), children.len());

        Ok(SceneNode {
            entity: ShortGuid::INVALID,
            owner: root.guid,
            transform: Transform::IDENTITY,
            kind: SceneNodeKind::Instance {
                composite: root.guid,
                children,
            },
        })
    }

    fn walk(&self, composite: &Composite, scope: &OverrideScope, stack: &mut Vec<ShortGuid>) -> Vec<SceneNode> {
        let mut nodes = Vec::new();
        for entity in &composite.functions {
            let target = EntityTarget::new(composite.guid, entity.guid);
            if self.live.is_removed(target) {
                continue;
            }
            let ov = scope.override_for(entity.guid);
            let transform = self
                .live
                .moved_transform(target)
                .or_else(|| effective_transform(entity, ov))
                .unwrap_or(Transform::IDENTITY);

            let kind = match entity.function() {
                Some(FunctionRef::Builtin(ty)) if ty.is_model_reference() => SceneNodeKind::Model {
                    renderables: match self.live.remapped(target) {
                        Some(elements) => self.resolver.resolve_elements(self.content, elements.iter().copied()),
                        None => self.resolver.resolve_resources(self.content, effective_resources(entity, ov)),
                    },
                },
                Some(FunctionRef::Composite(_)) => match self.descend(composite, entity, scope, stack) {
                    Some(kind) => kind,
                    None => continue,
                },
                _ => continue,
            };

            nodes.push(SceneNode {
                entity: entity.guid,
                owner: composite.guid,
                transform,
                kind,
            });
        }
        nodes
    }

    fn descend(
        &self,
        composite: &Composite,
        entity: &Entity,
        scope: &OverrideScope,
        stack: &mut Vec<ShortGuid>,
    ) -> Option<SceneNodeKind> {
        let Some(child) = self.content.commands.instanced_composite(entity) else {
            log::warn!(
                "Instance {} in {} names a missing composite",
                entity.guid.to_byte_string(),
                composite.short_name()
            );
            return None;
        };
        if stack.contains(&child.guid) {
            log::warn!(
                "Cutting instancing cycle at {} -> {} in {}",
                entity.guid.to_byte_string(),
                child.short_name(),
                composite.short_name()
            );
            return None;
        }

        stack.push(child.guid);
        let children = self.walk(child, &scope.descend(entity.guid, child), stack);
        stack.pop();
        Some(SceneNodeKind::Instance {
            composite: child.guid,
            children,
        })
    }
}
