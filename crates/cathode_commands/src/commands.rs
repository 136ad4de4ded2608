//! COMMANDS.PAK - the composite graph of one level

use crate::composite::Composite;
use crate::entity::{Entity, FunctionRef};
use crate::parameter::Parameter;
use cathode_core::{ByteReader, Container, Result, ShortGuid};
use std::collections::HashMap;

/// Well-known entry-point composites
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryPoint {
    Root = 0,
    Global = 1,
    PauseMenu = 2,
}

/// Decoded scene graph store
#[derive(Clone, Debug, Default)]
pub struct Commands {
    entry_points: [ShortGuid; 3],
    composites: Vec<Composite>,
    by_guid: HashMap<ShortGuid, usize>,
}

impl Commands {
    /// Build a store from already-decoded composites
    pub fn from_composites(entry_points: [ShortGuid; 3], composites: Vec<Composite>) -> Self {
        let by_guid = composites
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.guid, idx))
            .collect();
        Self {
            entry_points,
            composites,
            by_guid,
        }
    }

    /// All composites in file order
    pub fn composites(&self) -> &[Composite] {
        &self.composites
    }

    /// Position of a composite in file order
    pub fn composite_index(&self, guid: ShortGuid) -> Option<usize> {
        self.by_guid.get(&guid).copied()
    }

    /// Get a composite by GUID
    pub fn get_composite(&self, guid: ShortGuid) -> Option<&Composite> {
        self.composite_index(guid).and_then(|idx| self.composites.get(idx))
    }

    /// Get an entity by composite and entity GUID
    pub fn get_entity_by_id(&self, composite: ShortGuid, entity: ShortGuid) -> Option<&Entity> {
        self.get_composite(composite)?.get_entity(entity)
    }

    /// Get a named parameter of an entity
    pub fn get_parameter<'a>(&self, entity: &'a Entity, name: &str) -> Option<&'a Parameter> {
        entity.parameter_named(name)
    }

    /// Composite instantiated by a function entity
    ///
    /// Built-in function types never resolve here, even if a composite with a
    /// colliding GUID exists.
    pub fn instanced_composite(&self, entity: &Entity) -> Option<&Composite> {
        match entity.function()? {
            FunctionRef::Builtin(_) => None,
            FunctionRef::Composite(guid) => self.get_composite(guid),
        }
    }

    /// Entry-point composite, if present
    pub fn entry_point(&self, which: EntryPoint) -> Option<&Composite> {
        let guid = self.entry_points[which as usize];
        if guid.is_invalid() {
            return None;
        }
        self.get_composite(guid)
    }

    /// Raw entry-point GUIDs
    pub fn entry_points(&self) -> [ShortGuid; 3] {
        self.entry_points
    }
}

impl Container for Commands {
    const NAME: &'static str = "COMMANDS.PAK";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"CMDS")?;
        let entry_points = [reader.read_guid()?, reader.read_guid()?, reader.read_guid()?];

        // guid + empty name + four empty lists
        let count = reader.read_count(24)?;
        let mut composites: Vec<Composite> = Vec::with_capacity(count);
        let mut by_guid = HashMap::with_capacity(count);
        for _ in 0..count {
            let offset = reader.position();
            let composite = Composite::read(reader)?;
            if by_guid.insert(composite.guid, composites.len()).is_some() {
                return Err(cathode_core::Error::malformed(
                    Self::NAME,
                    offset,
                    format!("duplicate composite {}", composite.guid.to_byte_string()),
                ));
            }
            composites.push(composite);
        }

        let root = entry_points[EntryPoint::Root as usize];
        log::debug!(
            "Decoded {} composites, root {} ({})",
            composites.len(),
            root.to_byte_string(),
            by_guid
                .get(&root)
                .map_or("missing", |&idx| composites[idx].short_name())
        );

        Ok(Self {
            entry_points,
            composites,
            by_guid,
        })
    }
}
