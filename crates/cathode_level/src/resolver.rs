//! Cross-reference resolution from resources to renderer-ready meshes and materials
//!
//! Resolution walks RESOURCE parameters through REDS.BIN into the model,
//! material, shader and texture tables. Every lookup is memoized by its stable
//! table index. Failures are local: the element is logged and skipped.

use crate::cache::IndexCache;
use crate::content::LevelContent;
use cathode_assets::materials::CONSTANT_BUFFER_COUNT;
use cathode_assets::{
    DecodedTexture, GeometryBuffer, Material, ParamLayout, RenderableElement, ShaderCategory,
    ShaderParam, TextureReference, TextureSlot, TextureSource,
};
use cathode_commands::ResourceReference;
use cathode_core::{Error, Result};
use glam::Vec4;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Submesh geometry with its display name
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMesh {
    /// Write index in LEVEL_MODELS.PAK
    pub index: i32,
    /// `"<model>: <lod>"`
    pub name: String,
    /// Material used when an element asks for the default
    pub default_material: u32,
    pub geometry: GeometryBuffer,
}

/// A constant-buffer value read with its declared layout
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Vector(Vec4),
}

/// Renderer-independent material description
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMaterial {
    /// Index in LEVEL_MODELS.MTL
    pub index: i32,
    pub name: String,
    /// Diagnostic label including the shader category
    pub label: String,
    pub category: ShaderCategory,
    pub renderable: bool,
    pub textures: BTreeMap<TextureSlot, Arc<DecodedTexture>>,
    pub params: BTreeMap<ShaderParam, ParamValue>,
}

impl ResolvedMaterial {
    fn placeholder(index: i32, material: &Material, category: ShaderCategory) -> Self {
        Self {
            index,
            name: material.name.clone(),
            label: format!("{} (NOT RENDERED: {})", material.name, category),
            category,
            renderable: false,
            textures: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<DecodedTexture>> {
        self.textures.get(&slot)
    }

    pub fn param(&self, param: ShaderParam) -> Option<ParamValue> {
        self.params.get(&param).copied()
    }
}

/// One drawable (mesh, material) pair
#[derive(Clone, Debug)]
pub struct ResolvedRenderable {
    pub mesh: Arc<ResolvedMesh>,
    pub material: Arc<ResolvedMaterial>,
}

/// Bad references are warnings; broken table data is an error
fn severity(e: &Error) -> log::Level {
    if e.is_recoverable() {
        log::Level::Warn
    } else {
        log::Level::Error
    }
}

/// Number of memoized entries per cache
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
}

/// Memoizing resolver over one loaded level
///
/// Cache keys are table indices, so a resolver is only valid for the
/// `LevelContent` it was created alongside.
#[derive(Default)]
pub struct Resolver {
    meshes: IndexCache<i32, ResolvedMesh>,
    materials: IndexCache<i32, ResolvedMaterial>,
    textures: IndexCache<TextureReference, DecodedTexture>,
}

impl Resolver {
    /// Create a resolver with empty caches
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            meshes: self.meshes.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
        }
    }

    /// Resolve the submesh at a model write index
    pub fn resolve_mesh(&self, content: &LevelContent, index: i32) -> Result<Arc<ResolvedMesh>> {
        self.meshes.get_or_try_insert(index, || {
            let submesh = content
                .models
                .get_submesh_at_index(index)
                .ok_or_else(|| Error::unresolved("submesh", format!("write index {}", index)))?;
            Ok(ResolvedMesh {
                index,
                name: content.models.submesh_name(index).unwrap_or_default(),
                default_material: submesh.material_library_index,
                geometry: submesh.to_geometry_buffer(),
            })
        })
    }

    /// Resolve a material with its textures and shader parameters
    ///
    /// Materials whose shader category is never rendered resolve to a
    /// placeholder without touching textures or constant buffers.
    pub fn resolve_material(&self, content: &LevelContent, index: i32) -> Result<Arc<ResolvedMaterial>> {
        self.materials.get_or_try_insert(index, || {
            let material = content
                .materials
                .get_material_at_index(index)
                .ok_or_else(|| Error::unresolved("material", format!("index {}", index)))?;
            let metadata = content.shaders.classify_material(material, &content.shader_remap)?;
            if !metadata.is_renderable() {
                log::debug!("Material {} uses unrendered category {}", material.name, metadata.category);
                return Ok(ResolvedMaterial::placeholder(index, material, metadata.category));
            }
            let shader = content.shaders.shader_for_material(material, &content.shader_remap)?;

            let mut textures = BTreeMap::new();
            for (j, &slot) in metadata.texture_slots().iter().enumerate() {
                let Some(reference) = shader.texture_link(j).and_then(|link| material.texture_reference(link)) else {
                    continue;
                };
                match self.resolve_texture(content, reference) {
                    Ok(texture) => {
                        textures.insert(slot, texture);
                    }
                    Err(e) => log::warn!("Material {}: no {} texture: {}", material.name, slot, e),
                }
            }

            let mut params = BTreeMap::new();
            for buffer in 0..CONSTANT_BUFFER_COUNT {
                for &(param, slot) in metadata.cst_indexes() {
                    let Some(offset) = shader.cst_byte_offset(material, buffer, slot) else {
                        continue;
                    };
                    let value = match param.layout() {
                        ParamLayout::Scalar => content.constant_buffers.read_f32(buffer, offset).map(ParamValue::Scalar),
                        ParamLayout::Vector4 => content.constant_buffers.read_vec4(buffer, offset).map(ParamValue::Vector),
                    };
                    match value {
                        Ok(value) => {
                            params.insert(param, value);
                        }
                        Err(e) => log::warn!("Material {}: skipping {}: {}", material.name, param, e),
                    }
                }
            }

            Ok(ResolvedMaterial {
                index,
                name: material.name.clone(),
                label: format!("{} {}", material.name, metadata.category),
                category: metadata.category,
                renderable: true,
                textures,
                params,
            })
        })
    }

    /// Resolve and decode a texture from its local or global table
    pub fn resolve_texture(&self, content: &LevelContent, reference: TextureReference) -> Result<Arc<DecodedTexture>> {
        self.textures.get_or_try_insert(reference, || {
            let index = reference.bin_index as usize;
            let entry = match reference.source {
                TextureSource::Local => content.local_textures.get(index),
                TextureSource::Global => match content.global_textures.get() {
                    Some(table) => table.get(index),
                    None => {
                        return Err(Error::unresolved("texture", format!("global {} with no global table", index)));
                    }
                },
                TextureSource::Other(code) => {
                    return Err(Error::unsupported("texture source", format!("code {}", code)));
                }
            };
            entry
                .ok_or_else(|| Error::unresolved("texture", format!("{:?} index {}", reference.source, index)))?
                .decode()
        })
    }

    /// Resolve one renderable element; material -1 uses the submesh default
    pub fn resolve_element(&self, content: &LevelContent, element: RenderableElement) -> Result<ResolvedRenderable> {
        let mesh = self.resolve_mesh(content, element.model_index)?;
        let material_index = if element.uses_default_material() {
            mesh.default_material as i32
        } else {
            element.material_index
        };
        let material = self.resolve_material(content, material_index)?;
        Ok(ResolvedRenderable { mesh, material })
    }

    /// Resolve every renderable element a list of elements names
    ///
    /// Elements that fail to resolve are skipped with a warning.
    pub fn resolve_elements(
        &self,
        content: &LevelContent,
        elements: impl IntoIterator<Item = RenderableElement>,
    ) -> Vec<ResolvedRenderable> {
        elements
            .into_iter()
            .filter_map(|element| match self.resolve_element(content, element) {
                Ok(renderable) => Some(renderable),
                Err(e) => {
                    log::log!(
                        severity(&e),
                        "Skipping element (model {}, material {}): {}",
                        element.model_index,
                        element.material_index,
                        e
                    );
                    None
                }
            })
            .collect()
    }

    /// Resolve the renderable-instance runs of a RESOURCE parameter
    pub fn resolve_resources(&self, content: &LevelContent, resources: &[ResourceReference]) -> Vec<ResolvedRenderable> {
        let mut out = Vec::new();
        for reference in resources.iter().filter(|r| r.is_renderable()) {
            match content.renderable_elements.get_elements(reference.index, reference.count) {
                Ok(elements) => out.extend(self.resolve_elements(content, elements.iter().copied())),
                Err(e) => log::log!(
                    severity(&e),
                    "Skipping resource {}: {}",
                    reference.resource_guid.to_byte_string(),
                    e
                ),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_severity() {
        assert_eq!(severity(&Error::unresolved("material", "index 9")), log::Level::Warn);
        assert_eq!(
            severity(&Error::OutOfBounds { table: "REDS.BIN", index: 2, count: 4, len: 3 }),
            log::Level::Warn
        );
        assert_eq!(severity(&Error::malformed("LEVEL_TEXTURES.ALL.PAK", 8, "short payload")), log::Level::Error);
    }
}
