//! # cathode_commands - Scene Graph Store
//!
//! Decodes COMMANDS.PAK into composites of function, variable, alias and proxy
//! entities, and resolves alias/proxy paths through nested composite
//! instances.
//!
//! ## Example
//!
//! ```ignore
//! use cathode_commands::prelude::*;
//!
//! let commands: Commands = cathode_core::load(&world.join("COMMANDS.PAK"))?;
//! let root = commands.entry_point(EntryPoint::Root).unwrap();
//! if let Some(hit) = resolve_entity_path(&commands, root, &path) {
//!     println!("{} in {}", hit.entity.guid, hit.composite.name);
//! }
//! ```

pub mod commands;
pub mod composite;
pub mod entity;
pub mod function_type;
pub mod parameter;
pub mod path;
pub mod zone;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use commands::{Commands, EntryPoint};
pub use composite::Composite;
pub use entity::{
    Entity, EntityKind, EntityLink, EntityPath, EntityVariant, FunctionRef, SequenceEntry,
};
pub use function_type::FunctionType;
pub use parameter::{
    DataType, Parameter, ParameterValue, ResourceReference, ResourceType, Transform,
};
pub use path::{
    effective_resources, effective_transform, resolve_entity_path, Override, OverrideScope,
    ResolvedEntity,
};
pub use zone::{find_zone_for_entity, ZoneMatch};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::commands::{Commands, EntryPoint};
    pub use crate::composite::Composite;
    pub use crate::entity::{Entity, EntityKind, EntityPath, FunctionRef};
    pub use crate::function_type::FunctionType;
    pub use crate::parameter::{ParameterValue, ResourceReference, ResourceType, Transform};
    pub use crate::path::{resolve_entity_path, OverrideScope};
    pub use cathode_core::ShortGuid;
}
