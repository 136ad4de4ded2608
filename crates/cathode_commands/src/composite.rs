//! Composites - named, instanceable graphs of entities

use crate::entity::{
    read_links, read_path, read_sequence, Entity, EntityKind, EntityVariant, FunctionRef,
};
use crate::function_type::FunctionType;
use crate::parameter::{read_data_type, read_parameters};
use cathode_core::{ByteReader, Result, ShortGuid};
use std::collections::HashMap;

/// A named container of function, variable, alias and proxy entities
#[derive(Clone, Debug, Default)]
pub struct Composite {
    pub guid: ShortGuid,
    pub name: String,
    pub functions: Vec<Entity>,
    pub variables: Vec<Entity>,
    pub aliases: Vec<Entity>,
    pub proxies: Vec<Entity>,
    lookup: HashMap<ShortGuid, (EntityVariant, usize)>,
}

impl Composite {
    /// Create an empty composite
    pub fn new(guid: ShortGuid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an entity to the collection matching its variant
    ///
    /// Returns `false` if an entity with the same GUID already exists.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.lookup.contains_key(&entity.guid) {
            return false;
        }
        let variant = entity.variant();
        let idx = self.list(variant).len();
        self.lookup.insert(entity.guid, (variant, idx));
        self.list_mut(variant).push(entity);
        true
    }

    fn list(&self, variant: EntityVariant) -> &Vec<Entity> {
        match variant {
            EntityVariant::Function => &self.functions,
            EntityVariant::Variable => &self.variables,
            EntityVariant::Alias => &self.aliases,
            EntityVariant::Proxy => &self.proxies,
        }
    }

    fn list_mut(&mut self, variant: EntityVariant) -> &mut Vec<Entity> {
        match variant {
            EntityVariant::Function => &mut self.functions,
            EntityVariant::Variable => &mut self.variables,
            EntityVariant::Alias => &mut self.aliases,
            EntityVariant::Proxy => &mut self.proxies,
        }
    }

    /// Get an entity of any variant by GUID
    pub fn get_entity(&self, guid: ShortGuid) -> Option<&Entity> {
        let &(variant, idx) = self.lookup.get(&guid)?;
        self.list(variant).get(idx)
    }

    /// All entities, functions first
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.functions
            .iter()
            .chain(&self.variables)
            .chain(&self.aliases)
            .chain(&self.proxies)
    }

    /// Number of entities across all variants
    pub fn entity_count(&self) -> usize {
        self.lookup.len()
    }

    /// Function entities of one built-in type
    pub fn functions_of_type(&self, ty: FunctionType) -> impl Iterator<Item = &Entity> {
        self.functions.iter().filter(move |e| e.is_function_type(ty))
    }

    /// Alias and proxy entities in registration order
    pub fn overrides(&self) -> impl Iterator<Item = &Entity> {
        self.aliases.iter().chain(&self.proxies)
    }

    /// Last `/` or `\` separated component of the name
    pub fn short_name(&self) -> &str {
        self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name)
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let guid = reader.read_guid()?;
        let name = reader.read_lstring()?;
        let mut composite = Composite::new(guid, name);

        let functions = reader.read_count(16)?;
        for _ in 0..functions {
            let guid = reader.read_guid()?;
            let function = FunctionRef::classify(reader.read_guid()?);
            let parameters = read_parameters(reader)?;
            let links = read_links(reader)?;
            let sequence = if function == FunctionRef::Builtin(FunctionType::TriggerSequence) {
                read_sequence(reader)?
            } else {
                Vec::new()
            };
            composite.push(
                reader,
                Entity {
                    guid,
                    kind: EntityKind::Function { function, sequence },
                    parameters,
                    links,
                },
            )?;
        }

        let variables = reader.read_count(17)?;
        for _ in 0..variables {
            let guid = reader.read_guid()?;
            let name = reader.read_guid()?;
            let data_type = read_data_type(reader)?;
            let parameters = read_parameters(reader)?;
            let links = read_links(reader)?;
            composite.push(
                reader,
                Entity {
                    guid,
                    kind: EntityKind::Variable { name, data_type },
                    parameters,
                    links,
                },
            )?;
        }

        let aliases = reader.read_count(16)?;
        for _ in 0..aliases {
            let guid = reader.read_guid()?;
            let path = read_path(reader)?;
            let parameters = read_parameters(reader)?;
            let links = read_links(reader)?;
            composite.push(
                reader,
                Entity {
                    guid,
                    kind: EntityKind::Alias { path },
                    parameters,
                    links,
                },
            )?;
        }

        let proxies = reader.read_count(20)?;
        for _ in 0..proxies {
            let guid = reader.read_guid()?;
            let function = reader.read_guid()?;
            let path = read_path(reader)?;
            let parameters = read_parameters(reader)?;
            let links = read_links(reader)?;
            composite.push(
                reader,
                Entity {
                    guid,
                    kind: EntityKind::Proxy { function, path },
                    parameters,
                    links,
                },
            )?;
        }

        Ok(composite)
    }

    fn push(&mut self, reader: &ByteReader<'_>, entity: Entity) -> Result<()> {
        let guid = entity.guid;
        if !self.insert(entity) {
            return Err(reader.error(format!(
                "duplicate entity {} in composite {}",
                guid.to_byte_string(),
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityPath;

    fn function(guid: u32, function: FunctionRef) -> Entity {
        Entity {
            guid: ShortGuid::new(guid),
            kind: EntityKind::Function { function, sequence: Vec::new() },
            parameters: Vec::new(),
            links: Vec::new(),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut composite = Composite::new(ShortGuid::new(1), "ENV/A");
        assert!(composite.insert(function(10, FunctionRef::Builtin(FunctionType::Zone))));
        assert!(composite.insert(Entity {
            guid: ShortGuid::new(11),
            kind: EntityKind::Alias { path: EntityPath::new(vec![ShortGuid::new(10)]) },
            parameters: Vec::new(),
            links: Vec::new(),
        }));
        assert!(!composite.insert(function(10, FunctionRef::Composite(ShortGuid::new(5)))));

        assert_eq!(composite.entity_count(), 2);
        assert_eq!(composite.get_entity(ShortGuid::new(11)).map(Entity::variant), Some(EntityVariant::Alias));
        assert_eq!(composite.functions_of_type(FunctionType::Zone).count(), 1);
        assert!(composite.get_entity(ShortGuid::new(12)).is_none());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(Composite::new(ShortGuid::new(1), "PRODUCTION\\BSP_TORRENS/ROOT").short_name(), "ROOT");
        assert_eq!(Composite::new(ShortGuid::new(1), "ROOT").short_name(), "ROOT");
    }
}
