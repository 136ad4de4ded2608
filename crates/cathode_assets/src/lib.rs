//! # cathode_assets - Render Tables
//!
//! Decoders for the per-level render tables and the shader metadata used to
//! interpret them:
//! - **REDS.BIN**: renderable elements (model index, material index)
//! - **RESOURCES.BIN**: resource usage by composite instance
//! - **LEVEL_MODELS.PAK**: model / LOD / submesh geometry
//! - **LEVEL_MODELS.MTL / .CST**: materials and their constant buffers
//! - **LEVEL_SHADERS_DX11.PAK / IDX_REMAP**: shader link tables
//! - **TEXTURES.ALL.PAK**: local and global texture tables

pub mod materials;
pub mod metadata;
pub mod models;
pub mod reds;
pub mod resources;
pub mod shaders;
pub mod textures;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use materials::{
    ConstantBufferBlob, ConstantBufferRef, ConstantBuffers, Material, MaterialTable,
    TextureReference, TextureSource,
};
pub use metadata::{
    LayoutFamily, ParamLayout, ShaderCategory, ShaderMaterialMetadata, ShaderParam, TextureSlot,
};
pub use models::{GeometryBuffer, Lod, Model, ModelTable, Submesh, Vertex};
pub use reds::{RenderableElement, RenderableElements};
pub use resources::{ResourceUsage, ResourceUsages};
pub use shaders::{IdxRemap, IdxRemapEntry, ShaderEntry, ShaderTable, UNUSED_LINK};
pub use textures::{
    DecodedTexture, TextureEntry, TextureFormat, TextureKind, TexturePixels, TextureTable,
};
