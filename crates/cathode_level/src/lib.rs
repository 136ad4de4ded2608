//! # cathode_level - Level Loading and Resolution
//!
//! Ties the table decoders together into one loaded level:
//! - **Layout / Config**: where a level's files live, read from TOML
//! - **LevelContent**: every table of a level, loaded by parallel workers
//! - **Resolver**: resource -> mesh/material/texture resolution with index-keyed caches
//! - **Scene**: composite instancing walk with alias/proxy overrides
//! - **Live sync**: editor packets folded into live overrides
//! - **LevelSession**: the query surface used by renderers and tools
//!
//! ## Example
//!
//! ```ignore
//! use cathode_level::prelude::*;
//!
//! let session = LevelSession::new(ContentConfig::load("cathode.toml")?);
//! session.load_level("BSP_TORRENS")?;
//! let root = session.entry_point().expect("root composite");
//! let scene = session.build_scene(root.guid);
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod layout;
pub mod live_sync;
pub mod resolver;
pub mod scene;
pub mod session;

pub use cache::IndexCache;
pub use config::ContentConfig;
pub use content::{LevelContent, OpaqueTables, TableId};
pub use error::{LevelError, LevelResult};
pub use layout::LevelPaths;
pub use live_sync::{
    EditorEvent, EditorPacket, EntityTarget, LiveOverrides, PacketEvent, PROTOCOL_VERSION,
};
pub use resolver::{
    CacheStats, ParamValue, ResolvedMaterial, ResolvedMesh, ResolvedRenderable, Resolver,
};
pub use scene::{SceneBuilder, SceneNode, SceneNodeKind};
pub use session::{CompositeRef, LevelSession, LoadedLevel};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::config::ContentConfig;
    pub use crate::error::{LevelError, LevelResult};
    pub use crate::live_sync::{EditorEvent, EntityTarget};
    pub use crate::resolver::{ResolvedMaterial, ResolvedRenderable};
    pub use crate::scene::SceneNode;
    pub use crate::session::LevelSession;
    pub use cathode_core::ShortGuid;
}
