//! # cathode_core - Cathode Level Content Core
//!
//! Foundational primitives shared by every Cathode table decoder:
//! - **Reader**: bounds-checked little-endian cursor over container bytes
//! - **Container**: trait for self-contained on-disk tables, loaded from a path
//! - **Table**: "loaded / not loaded" state for optional tables
//! - **ShortGuid**: 32-bit hash-derived identifiers used by the scene graph
//!
//! ## Example
//!
//! ```ignore
//! use cathode_core::prelude::*;
//!
//! struct Blob(Vec<u8>);
//!
//! impl Container for Blob {
//!     const NAME: &'static str = "BLOB.BIN";
//!
//!     fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
//!         Ok(Blob(reader.read_remaining().to_vec()))
//!     }
//! }
//!
//! let table: Table<Blob> = load_optional(path)?;
//! ```

pub mod container;
pub mod error;
pub mod guid;
pub mod reader;
pub mod table;
pub mod writer;

pub use container::{load, load_bytes, load_optional, Container, RawBlob};
pub use error::{Error, Result};
pub use guid::ShortGuid;
pub use reader::ByteReader;
pub use table::{LoadState, Table};
pub use writer::ByteWriter;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::container::{load, load_optional, Container};
    pub use crate::error::{Error, Result};
    pub use crate::guid::ShortGuid;
    pub use crate::reader::ByteReader;
    pub use crate::table::{LoadState, Table};
}
