//! LEVEL_SHADERS_DX11.PAK and its IDX_REMAP indirection

use crate::materials::{Material, CONSTANT_BUFFER_COUNT};
use crate::metadata::{ShaderCategory, ShaderMaterialMetadata};
use cathode_core::{ByteReader, Container, Error, Result};

/// Link value marking an unused slot
pub const UNUSED_LINK: u8 = 255;

const ENTRY_HEADER_SIZE: usize = 8;

/// Per-shader texture and constant-buffer link tables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderEntry {
    pub category_code: u8,
    pub flags: u8,
    /// Metadata texture slot -> material texture reference index
    pub texture_links: Vec<u8>,
    /// Per buffer: metadata parameter slot -> float offset within the buffer
    pub cst_links: [Vec<u8>; CONSTANT_BUFFER_COUNT],
}

impl ShaderEntry {
    pub fn category(&self) -> ShaderCategory {
        ShaderCategory::from_code(self.category_code)
    }

    /// Per-buffer link counts from the header
    pub fn cst_counts(&self) -> [usize; CONSTANT_BUFFER_COUNT] {
        std::array::from_fn(|i| self.cst_links[i].len())
    }

    /// Texture reference index bound to a metadata texture slot
    pub fn texture_link(&self, slot: usize) -> Option<usize> {
        match self.texture_links.get(slot) {
            Some(&link) if link != UNUSED_LINK => Some(link as usize),
            _ => None,
        }
    }

    /// Link of a metadata parameter slot in one buffer
    ///
    /// Valid iff the slot is within the buffer's link count and not unused.
    pub fn cst_link(&self, buffer: usize, slot: usize) -> Option<usize> {
        match self.cst_links.get(buffer)?.get(slot) {
            Some(&link) if link != UNUSED_LINK => Some(link as usize),
            _ => None,
        }
    }

    /// Byte offset of a parameter into buffer region `buffer`
    pub fn cst_byte_offset(&self, material: &Material, buffer: usize, slot: usize) -> Option<usize> {
        let link = self.cst_link(buffer, slot)?;
        let base = material.constant_buffers.get(buffer)?.offset as usize;
        Some(base * 4 + link * 4)
    }
}

/// Decoded LEVEL_SHADERS_DX11.PAK
#[derive(Clone, Debug, Default)]
pub struct ShaderTable {
    entries: Vec<ShaderEntry>,
}

impl ShaderTable {
    pub fn new(entries: Vec<ShaderEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a shader entry by its true (remapped) index
    pub fn get_shader_entry(&self, index: usize) -> Result<&ShaderEntry> {
        self.entries.get(index).ok_or_else(|| {
            Error::unresolved(
                "shader",
                format!("index {} past {} shaders", index, self.entries.len()),
            )
        })
    }

    /// Shader entry used by a material
    pub fn shader_for_material(&self, material: &Material, remap: &IdxRemap) -> Result<&ShaderEntry> {
        self.get_shader_entry(remap.remap_shader_index(material.shader_index)?)
    }

    /// Classify a material's shader
    ///
    /// Categories outside the renderable set yield the not-renderable sentinel.
    pub fn classify_material(&self, material: &Material, remap: &IdxRemap) -> Result<ShaderMaterialMetadata> {
        let category = self.shader_for_material(material, remap)?.category();
        if category.is_renderable() {
            Ok(ShaderMaterialMetadata::for_category(category))
        } else {
            Ok(ShaderMaterialMetadata::not_renderable(category))
        }
    }
}

impl Container for ShaderTable {
    const NAME: &'static str = "LEVEL_SHADERS_DX11.PAK";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"SHDR")?;
        let count = reader.read_count(4 + ENTRY_HEADER_SIZE)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let entry_size = reader.read_u32()? as usize;
            let start = reader.position();
            let category_code = reader.read_u8()?;
            let texture_link_count = reader.read_u8()? as usize;
            let mut cst_counts = [0usize; CONSTANT_BUFFER_COUNT];
            for c in &mut cst_counts {
                *c = reader.read_u8()? as usize;
            }
            let flags = reader.read_u8()?;

            let expected = ENTRY_HEADER_SIZE + texture_link_count + cst_counts.iter().sum::<usize>();
            if entry_size != expected {
                return Err(Error::malformed(
                    Self::NAME,
                    start,
                    format!("entry size {} but links need {}", entry_size, expected),
                ));
            }

            let texture_links = reader.read_bytes(texture_link_count)?.to_vec();
            let mut cst_links: [Vec<u8>; CONSTANT_BUFFER_COUNT] = Default::default();
            for (links, &n) in cst_links.iter_mut().zip(&cst_counts) {
                *links = reader.read_bytes(n)?.to_vec();
            }

            entries.push(ShaderEntry {
                category_code,
                flags,
                texture_links,
                cst_links,
            });
        }
        Ok(Self { entries })
    }
}

/// One IDX_REMAP record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdxRemapEntry {
    pub index: u32,
    pub unknown: u32,
}

/// Decoded LEVEL_SHADERS_DX11_IDX_REMAP.PAK
#[derive(Clone, Debug, Default)]
pub struct IdxRemap {
    entries: Vec<IdxRemapEntry>,
}

impl IdxRemap {
    pub fn new(entries: Vec<IdxRemapEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a material's raw shader index to the shader table index
    pub fn remap_shader_index(&self, raw: u32) -> Result<usize> {
        self.entries
            .get(raw as usize)
            .map(|e| e.index as usize)
            .ok_or_else(|| {
                Error::unresolved(
                    "shader remap",
                    format!("raw index {} past {} entries", raw, self.entries.len()),
                )
            })
    }
}

impl Container for IdxRemap {
    const NAME: &'static str = "LEVEL_SHADERS_DX11_IDX_REMAP.PAK";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"IDXR")?;
        let count = reader.read_count(8)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(IdxRemapEntry {
                index: reader.read_u32()?,
                unknown: reader.read_u32()?,
            });
        }
        Ok(Self { entries })
    }
}
