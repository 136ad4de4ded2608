//! Live-sync events from an external level editor
//!
//! Packets arrive as JSON. They are decoded into [`EditorEvent`]s and folded
//! into [`LiveOverrides`], which the resolver and scene walk consult before
//! the on-disk tables.

use crate::error::{LevelError, LevelResult};
use cathode_assets::RenderableElement;
use cathode_commands::Transform;
use cathode_core::ShortGuid;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Packet layout version understood by this crate
pub const PROTOCOL_VERSION: i32 = 3;

/// Event code carried by a packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketEvent {
    LevelLoaded = 0,
    CompositeSelected = 1,
    CompositeReloaded = 2,
    CompositeDeleted = 3,
    EntitySelected = 4,
    EntityMoved = 5,
    EntityDeleted = 6,
    EntityAdded = 7,
    EntityResourceModified = 8,
    GenericDataSync = 9,
}

impl TryFrom<i32> for PacketEvent {
    type Error = LevelError;

    fn try_from(code: i32) -> LevelResult<Self> {
        Ok(match code {
            0 => Self::LevelLoaded,
            1 => Self::CompositeSelected,
            2 => Self::CompositeReloaded,
            3 => Self::CompositeDeleted,
            4 => Self::EntitySelected,
            5 => Self::EntityMoved,
            6 => Self::EntityDeleted,
            7 => Self::EntityAdded,
            8 => Self::EntityResourceModified,
            9 => Self::GenericDataSync,
            other => return Err(LevelError::UnknownEvent(other)),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketVec3 {
    #[serde(rename = "X")]
    pub x: f32,
    #[serde(rename = "Y")]
    pub y: f32,
    #[serde(rename = "Z")]
    pub z: f32,
}

impl From<PacketVec3> for Vec3 {
    fn from(v: PacketVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// (model write index, material index) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRenderable {
    #[serde(rename = "Item1")]
    pub model: i32,
    #[serde(rename = "Item2")]
    pub material: i32,
}

/// Raw packet as sent by the editor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorPacket {
    pub packet_event: i32,
    pub version: i32,
    #[serde(default)]
    pub level_name: String,
    #[serde(default)]
    pub system_folder: String,
    /// Entity GUIDs from the root composite down to the selection
    #[serde(default)]
    pub path_entities: Vec<u32>,
    /// Composite GUIDs from the root composite down to the selection
    #[serde(default)]
    pub path_composites: Vec<u32>,
    #[serde(default)]
    pub position: PacketVec3,
    #[serde(default)]
    pub rotation: PacketVec3,
    #[serde(default)]
    pub renderable: Vec<PacketRenderable>,
    #[serde(default)]
    pub dirty: bool,
}

/// A (composite, entity) pair addressed by the editor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityTarget {
    pub composite: ShortGuid,
    pub entity: ShortGuid,
}

impl EntityTarget {
    pub fn new(composite: ShortGuid, entity: ShortGuid) -> Self {
        Self { composite, entity }
    }
}

/// Decoded editor event
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    LevelLoaded { level: String, system_folder: String },
    CompositeSelected { composite: ShortGuid },
    CompositeReloaded { composite: ShortGuid },
    CompositeDeleted { composite: ShortGuid },
    EntitySelected { target: EntityTarget },
    EntityMoved { target: EntityTarget, transform: Transform },
    EntityDeleted { target: EntityTarget },
    EntityAdded { target: EntityTarget },
    EntityResourceModified { target: EntityTarget, elements: Vec<RenderableElement> },
    GenericDataSync,
}

impl EditorPacket {
    /// Parse a JSON packet and check its version
    pub fn from_json(text: &str) -> LevelResult<Self> {
        let packet: Self = serde_json::from_str(text)?;
        if packet.version != PROTOCOL_VERSION {
            return Err(LevelError::ProtocolVersion {
                found: packet.version,
                expected: PROTOCOL_VERSION,
            });
        }
        Ok(packet)
    }

    pub fn event(&self) -> LevelResult<PacketEvent> {
        PacketEvent::try_from(self.packet_event)
    }

    /// Composite the editor is looking at, the last on the composite path
    pub fn current_composite(&self) -> Option<ShortGuid> {
        self.path_composites.last().map(|&g| ShortGuid::new(g))
    }

    /// Selected entity
    ///
    /// An entity is selected only when both paths have the same length.
    pub fn current_entity(&self) -> Option<EntityTarget> {
        if self.path_entities.is_empty() || self.path_entities.len() != self.path_composites.len() {
            return None;
        }
        let composite = self.current_composite()?;
        let entity = ShortGuid::new(*self.path_entities.last()?);
        Some(EntityTarget::new(composite, entity))
    }

    /// Convert into an editor event
    pub fn into_event(self) -> LevelResult<EditorEvent> {
        let kind = self.event()?;
        let composite = || self.current_composite().ok_or(LevelError::MissingTarget(kind));
        let target = || self.current_entity().ok_or(LevelError::MissingTarget(kind));

        Ok(match kind {
            PacketEvent::LevelLoaded => EditorEvent::LevelLoaded {
                level: self.level_name.clone(),
                system_folder: self.system_folder.clone(),
            },
            PacketEvent::CompositeSelected => EditorEvent::CompositeSelected { composite: composite()? },
            PacketEvent::CompositeReloaded => EditorEvent::CompositeReloaded { composite: composite()? },
            PacketEvent::CompositeDeleted => EditorEvent::CompositeDeleted { composite: composite()? },
            PacketEvent::EntitySelected => EditorEvent::EntitySelected { target: target()? },
            PacketEvent::EntityMoved => EditorEvent::EntityMoved {
                target: target()?,
                transform: Transform::new(self.position.into(), self.rotation.into()),
            },
            PacketEvent::EntityDeleted => EditorEvent::EntityDeleted { target: target()? },
            PacketEvent::EntityAdded => EditorEvent::EntityAdded { target: target()? },
            PacketEvent::EntityResourceModified => EditorEvent::EntityResourceModified {
                target: target()?,
                elements: self
                    .renderable
                    .iter()
                    .map(|r| RenderableElement {
                        model_index: r.model,
                        material_index: r.material,
                    })
                    .collect(),
            },
            PacketEvent::GenericDataSync => EditorEvent::GenericDataSync,
        })
    }
}

/// Editor-side changes layered over the loaded tables
#[derive(Clone, Debug, Default)]
pub struct LiveOverrides {
    moved: HashMap<EntityTarget, Transform>,
    remapped: HashMap<EntityTarget, Vec<RenderableElement>>,
    removed: HashSet<EntityTarget>,
}

impl LiveOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an event in; returns whether anything changed
    pub fn apply(&mut self, event: &EditorEvent) -> bool {
        match event {
            EditorEvent::LevelLoaded { .. } => {
                let changed = !self.is_empty();
                self.clear();
                changed
            }
            EditorEvent::CompositeReloaded { composite } | EditorEvent::CompositeDeleted { composite } => {
                self.forget_composite(*composite)
            }
            EditorEvent::EntityMoved { target, transform } => {
                self.moved.insert(*target, *transform) != Some(*transform)
            }
            EditorEvent::EntityDeleted { target } => self.removed.insert(*target),
            EditorEvent::EntityAdded { target } => self.removed.remove(target),
            EditorEvent::EntityResourceModified { target, elements } => {
                self.remapped.insert(*target, elements.clone()).as_ref() != Some(elements)
            }
            EditorEvent::CompositeSelected { .. }
            | EditorEvent::EntitySelected { .. }
            | EditorEvent::GenericDataSync => false,
        }
    }

    fn forget_composite(&mut self, composite: ShortGuid) -> bool {
        let before = self.len();
        self.moved.retain(|t, _| t.composite != composite);
        self.remapped.retain(|t, _| t.composite != composite);
        self.removed.retain(|t| t.composite != composite);
        before != self.len()
    }

    pub fn moved_transform(&self, target: EntityTarget) -> Option<Transform> {
        self.moved.get(&target).copied()
    }

    pub fn remapped(&self, target: EntityTarget) -> Option<&[RenderableElement]> {
        self.remapped.get(&target).map(Vec::as_slice)
    }

    pub fn is_removed(&self, target: EntityTarget) -> bool {
        self.removed.contains(&target)
    }

    /// Total number of stored overrides
    pub fn len(&self) -> usize {
        self.moved.len() + self.remapped.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.moved.clear();
        self.remapped.clear();
        self.removed.clear();
    }
}
