//! Entities - the four node variants of a composite

use crate::function_type::FunctionType;
use crate::parameter::{DataType, Parameter, ParameterValue, ResourceReference, Transform};
use cathode_core::{ByteReader, Result, ShortGuid};
use std::fmt;

/// Ordered GUID walk through nested composite instances
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityPath(Vec<ShortGuid>);

impl EntityPath {
    /// Create a path from raw GUIDs
    pub fn new(guids: Vec<ShortGuid>) -> Self {
        Self(guids)
    }

    pub fn as_slice(&self) -> &[ShortGuid] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<ShortGuid> {
        self.0.first().copied()
    }

    /// Path without a trailing invalid GUID
    ///
    /// A trailing invalid GUID targets the composite-instance entity itself,
    /// so `[B, invalid]` and `[B]` name the same entity.
    pub fn normalized(&self) -> &[ShortGuid] {
        match self.0.split_last() {
            Some((last, rest)) if last.is_invalid() => rest,
            _ => &self.0,
        }
    }

    /// Drop the first element, consumed by one level of nesting
    pub fn trimmed(&self) -> EntityPath {
        Self(self.0.iter().skip(1).copied().collect())
    }

    /// Whether nothing remains to walk after normalisation
    pub fn is_exhausted(&self) -> bool {
        self.normalized().is_empty()
    }
}

impl From<Vec<ShortGuid>> for EntityPath {
    fn from(guids: Vec<ShortGuid>) -> Self {
        Self(guids)
    }
}

impl fmt::Debug for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Parameter link from one entity to another
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityLink {
    pub link_guid: ShortGuid,
    /// Parameter on the owning entity
    pub parent_param: ShortGuid,
    /// Linked entity
    pub child: ShortGuid,
    /// Parameter on the linked entity
    pub child_param: ShortGuid,
}

/// What a function entity instantiates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionRef {
    /// A built-in behaviour
    Builtin(FunctionType),
    /// Any other GUID, a nested composite instance
    Composite(ShortGuid),
}

impl FunctionRef {
    /// Classify a function GUID, built-in types first
    pub fn classify(guid: ShortGuid) -> Self {
        match FunctionType::from_guid(guid) {
            Some(ty) => Self::Builtin(ty),
            None => Self::Composite(guid),
        }
    }

    /// Raw GUID
    pub fn guid(self) -> ShortGuid {
        match self {
            Self::Builtin(ty) => ty.guid(),
            Self::Composite(guid) => guid,
        }
    }
}

/// One timed entry of a TriggerSequence
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceEntry {
    pub timing: f32,
    pub path: EntityPath,
}

/// Entity variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityVariant {
    Function,
    Variable,
    Alias,
    Proxy,
}

/// Variant-specific payload
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Function {
        function: FunctionRef,
        /// Populated for TriggerSequence functions only
        sequence: Vec<SequenceEntry>,
    },
    Variable {
        name: ShortGuid,
        data_type: DataType,
    },
    Alias {
        path: EntityPath,
    },
    Proxy {
        function: ShortGuid,
        path: EntityPath,
    },
}

/// A node within a composite
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub guid: ShortGuid,
    pub kind: EntityKind,
    pub parameters: Vec<Parameter>,
    pub links: Vec<EntityLink>,
}

impl Entity {
    pub fn variant(&self) -> EntityVariant {
        match self.kind {
            EntityKind::Function { .. } => EntityVariant::Function,
            EntityKind::Variable { .. } => EntityVariant::Variable,
            EntityKind::Alias { .. } => EntityVariant::Alias,
            EntityKind::Proxy { .. } => EntityVariant::Proxy,
        }
    }

    /// Get a parameter by name GUID
    pub fn parameter(&self, name: ShortGuid) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Get a parameter by name
    pub fn parameter_named(&self, name: &str) -> Option<&Parameter> {
        self.parameter(ShortGuid::from_name(name))
    }

    /// Function reference, for function entities
    pub fn function(&self) -> Option<FunctionRef> {
        match self.kind {
            EntityKind::Function { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Built-in function type, for function entities
    pub fn function_type(&self) -> Option<FunctionType> {
        match self.function()? {
            FunctionRef::Builtin(ty) => Some(ty),
            FunctionRef::Composite(_) => None,
        }
    }

    pub fn is_function_type(&self, ty: FunctionType) -> bool {
        self.function_type() == Some(ty)
    }

    /// Redirect path, for aliases and proxies
    pub fn path(&self) -> Option<&EntityPath> {
        match &self.kind {
            EntityKind::Alias { path } | EntityKind::Proxy { path, .. } => Some(path),
            _ => None,
        }
    }

    /// TriggerSequence entries (empty for everything else)
    pub fn sequence(&self) -> &[SequenceEntry] {
        match &self.kind {
            EntityKind::Function { sequence, .. } => sequence,
            _ => &[],
        }
    }

    /// The `position` TRANSFORM parameter
    pub fn transform(&self) -> Option<Transform> {
        self.parameter_named("position")
            .and_then(|p| p.value.as_transform())
            .copied()
    }

    /// The `resource` RESOURCE parameter
    pub fn resources(&self) -> &[ResourceReference] {
        self.parameter_named("resource")
            .and_then(|p| p.value.as_resources())
            .unwrap_or(&[])
    }

    /// Links from this entity through one of its parameters
    pub fn links_from<'a>(&'a self, parent_param: ShortGuid) -> impl Iterator<Item = &'a EntityLink> + 'a {
        self.links.iter().filter(move |l| l.parent_param == parent_param)
    }

    /// Set or replace a parameter value
    pub fn set_parameter(&mut self, name: ShortGuid, value: ParameterValue) {
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(param) => param.value = value,
            None => self.parameters.push(Parameter::new(name, value)),
        }
    }
}

pub(crate) fn read_path(reader: &mut ByteReader<'_>) -> Result<EntityPath> {
    let count = reader.read_count(4)?;
    let mut guids = Vec::with_capacity(count);
    for _ in 0..count {
        guids.push(reader.read_guid()?);
    }
    Ok(EntityPath(guids))
}

pub(crate) fn read_links(reader: &mut ByteReader<'_>) -> Result<Vec<EntityLink>> {
    let count = reader.read_count(16)?;
    let mut links = Vec::with_capacity(count);
    for _ in 0..count {
        links.push(EntityLink {
            link_guid: reader.read_guid()?,
            parent_param: reader.read_guid()?,
            child: reader.read_guid()?,
            child_param: reader.read_guid()?,
        });
    }
    Ok(links)
}

pub(crate) fn read_sequence(reader: &mut ByteReader<'_>) -> Result<Vec<SequenceEntry>> {
    let count = reader.read_count(8)?;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(SequenceEntry {
            timing: reader.read_f32()?,
            path: read_path(reader)?,
        });
    }
    Ok(entries)
}
