//! LEVEL_MODELS.MTL and LEVEL_MODELS.CST - materials and their constant buffers

use cathode_core::{ByteReader, Container, Error, RawBlob, Result};
use glam::Vec4;
use std::ops::Range;

/// Number of texture references per material
pub const TEXTURE_REFERENCE_COUNT: usize = 12;
/// Number of constant buffers per material
pub const CONSTANT_BUFFER_COUNT: usize = 5;

const MATERIAL_SIZE: usize = 8 + TEXTURE_REFERENCE_COUNT * 4 + CONSTANT_BUFFER_COUNT * 8 + 8;
const EMPTY_BIN_INDEX: u16 = 0xFFFF;

/// Which texture table a reference points into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSource {
    /// Level-local LEVEL_TEXTURES.ALL.PAK
    Local,
    /// Shared GLOBAL_TEXTURES.ALL.PAK
    Global,
    /// Unrecognised source code
    Other(u16),
}

impl TextureSource {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Local,
            2 => Self::Global,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::Local => 0,
            Self::Global => 2,
            Self::Other(code) => code,
        }
    }
}

/// Reference to a texture table entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureReference {
    pub source: TextureSource,
    pub bin_index: u16,
}

/// Location of one constant buffer in the CST blob
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConstantBufferRef {
    /// Offset in 32-bit floats from the start of the buffer region
    pub offset: u32,
    pub length: u32,
}

/// One material record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub flags: u32,
    pub texture_references: [Option<TextureReference>; TEXTURE_REFERENCE_COUNT],
    pub constant_buffers: [ConstantBufferRef; CONSTANT_BUFFER_COUNT],
    /// Raw shader index, remapped through IDX_REMAP
    pub shader_index: u32,
    pub unknown: u32,
}

impl Material {
    /// Texture reference at a link slot
    pub fn texture_reference(&self, link: usize) -> Option<TextureReference> {
        self.texture_references.get(link).copied().flatten()
    }
}

/// Decoded LEVEL_MODELS.MTL
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    cst_offsets: [u32; CONSTANT_BUFFER_COUNT],
}

impl MaterialTable {
    pub fn new(materials: Vec<Material>, cst_offsets: [u32; CONSTANT_BUFFER_COUNT]) -> Self {
        Self {
            materials,
            cst_offsets,
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Get a material by table index
    pub fn get_material_at_index(&self, index: i32) -> Option<&Material> {
        usize::try_from(index).ok().and_then(|i| self.materials.get(i))
    }

    /// Byte offsets of the five buffer regions in the CST blob
    pub fn cst_offsets(&self) -> [u32; CONSTANT_BUFFER_COUNT] {
        self.cst_offsets
    }
}

fn read_name(reader: &ByteReader<'_>, strings: &[u8], offset: u32) -> Result<String> {
    let start = offset as usize;
    let tail = strings
        .get(start..)
        .ok_or_else(|| reader.error(format!("name offset {} past string table", offset)))?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| reader.error(format!("unterminated name at {}", offset)))?;
    Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
}

impl Container for MaterialTable {
    const NAME: &'static str = "LEVEL_MODELS.MTL";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"MTLS")?;
        let material_count = reader.read_u32()? as usize;
        let mut cst_offsets = [0u32; CONSTANT_BUFFER_COUNT];
        for offset in &mut cst_offsets {
            *offset = reader.read_u32()?;
        }
        let string_len = reader.read_u32()? as usize;
        let strings = reader.read_bytes(string_len)?;

        if material_count.saturating_mul(MATERIAL_SIZE) != reader.remaining() {
            return Err(reader.error(format!(
                "{} materials need {} bytes, {} left",
                material_count,
                material_count.saturating_mul(MATERIAL_SIZE),
                reader.remaining()
            )));
        }

        let mut materials = Vec::with_capacity(material_count);
        for _ in 0..material_count {
            let name_offset = reader.read_u32()?;
            let name = read_name(reader, strings, name_offset)?;
            let flags = reader.read_u32()?;

            let mut texture_references = [None; TEXTURE_REFERENCE_COUNT];
            for slot in &mut texture_references {
                let bin_index = reader.read_u16()?;
                let source = reader.read_u16()?;
                if bin_index != EMPTY_BIN_INDEX {
                    *slot = Some(TextureReference {
                        source: TextureSource::from_code(source),
                        bin_index,
                    });
                }
            }

            let mut constant_buffers = [ConstantBufferRef::default(); CONSTANT_BUFFER_COUNT];
            for cb in &mut constant_buffers {
                cb.offset = reader.read_u32()?;
                cb.length = reader.read_u32()?;
            }

            materials.push(Material {
                name,
                flags,
                texture_references,
                constant_buffers,
                shader_index: reader.read_u32()?,
                unknown: reader.read_u32()?,
            });
        }

        Ok(Self {
            materials,
            cst_offsets,
        })
    }
}

/// Raw LEVEL_MODELS.CST blob
#[derive(Clone, Debug, Default)]
pub struct ConstantBufferBlob(pub RawBlob);

impl Container for ConstantBufferBlob {
    const NAME: &'static str = "LEVEL_MODELS.CST";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self(RawBlob(reader.read_remaining().to_vec())))
    }
}

/// CST blob split into its five buffer regions
#[derive(Clone, Debug, Default)]
pub struct ConstantBuffers {
    data: Vec<u8>,
    regions: [Range<usize>; CONSTANT_BUFFER_COUNT],
}

impl ConstantBuffers {
    /// Split a blob by the material table's region offsets
    ///
    /// Region `i` runs from `offsets[i]` to the next larger offset, or the
    /// end of the blob. Offsets must be non-decreasing and inside the blob.
    pub fn split(blob: ConstantBufferBlob, offsets: [u32; CONSTANT_BUFFER_COUNT]) -> Result<Self> {
        let data = blob.0 .0;
        let len = data.len();
        for (i, &offset) in offsets.iter().enumerate() {
            if offset as usize > len {
                return Err(Error::malformed(
                    ConstantBufferBlob::NAME,
                    offset as usize,
                    format!("buffer {} starts past blob end ({} bytes)", i, len),
                ));
            }
            if i > 0 && offset < offsets[i - 1] {
                return Err(Error::malformed(
                    ConstantBufferBlob::NAME,
                    offset as usize,
                    format!("buffer {} offset decreases", i),
                ));
            }
        }

        let regions = std::array::from_fn(|i| {
            let start = offsets[i] as usize;
            let end = offsets[i + 1..]
                .iter()
                .map(|&o| o as usize)
                .find(|&o| o > start)
                .unwrap_or(len);
            start..end
        });
        Ok(Self { data, regions })
    }

    /// Bytes of one buffer region
    pub fn region(&self, buffer: usize) -> &[u8] {
        self.regions
            .get(buffer)
            .and_then(|r| self.data.get(r.clone()))
            .unwrap_or(&[])
    }

    fn reader_at(&self, buffer: usize, byte_offset: usize, size: usize) -> Result<ByteReader<'_>> {
        let region = self.region(buffer);
        if byte_offset.checked_add(size).map_or(true, |end| end > region.len()) {
            return Err(Error::unresolved(
                "constant buffer",
                format!(
                    "read of {} bytes at {} past buffer {} ({} bytes)",
                    size,
                    byte_offset,
                    buffer,
                    region.len()
                ),
            ));
        }
        Ok(ByteReader::new(ConstantBufferBlob::NAME, region))
    }

    /// Read an `f32` at a byte offset within a buffer region
    pub fn read_f32(&self, buffer: usize, byte_offset: usize) -> Result<f32> {
        self.reader_at(buffer, byte_offset, 4)?.f32_at(byte_offset)
    }

    /// Read a `Vec4` at a byte offset within a buffer region
    pub fn read_vec4(&self, buffer: usize, byte_offset: usize) -> Result<Vec4> {
        self.reader_at(buffer, byte_offset, 16)?.vec4_at(byte_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encode_materials, material};

    fn blob(floats: &[f32]) -> ConstantBufferBlob {
        ConstantBufferBlob(RawBlob(floats.iter().flat_map(|f| f.to_le_bytes()).collect()))
    }

    #[test]
    fn test_decode_materials() {
        let mut m = material("Metal", 3);
        m.texture_references[1] = Some(TextureReference { source: TextureSource::Global, bin_index: 9 });
        let bytes = encode_materials(&[material("Glass", 0), m], [0, 0, 0, 0, 0]);
        let table: MaterialTable = cathode_core::load_bytes(&bytes).unwrap();

        assert_eq!(table.len(), 2);
        let metal = table.get_material_at_index(1).unwrap();
        assert_eq!(metal.name, "Metal");
        assert_eq!(metal.shader_index, 3);
        assert_eq!(
            metal.texture_reference(1),
            Some(TextureReference { source: TextureSource::Global, bin_index: 9 })
        );
        assert_eq!(metal.texture_reference(2), None);
        assert!(table.get_material_at_index(-1).is_none());
        assert!(table.get_material_at_index(2).is_none());
    }

    #[test]
    fn test_region_split() {
        let buffers = ConstantBuffers::split(blob(&[0.0; 8]), [0, 0, 8, 16, 16]).unwrap();
        assert_eq!(buffers.region(0).len(), 8);
        assert_eq!(buffers.region(1).len(), 8);
        assert_eq!(buffers.region(2).len(), 8);
        assert_eq!(buffers.region(3).len(), 16);
        assert_eq!(buffers.region(4).len(), 16);
    }

    #[test]
    fn test_region_offsets_validated() {
        assert!(ConstantBuffers::split(blob(&[0.0; 2]), [0, 4, 2, 8, 8]).is_err());
        assert!(ConstantBuffers::split(blob(&[0.0; 2]), [0, 4, 8, 8, 12]).is_err());
    }

    #[test]
    fn test_reads_are_region_local() {
        let buffers = ConstantBuffers::split(blob(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), [0, 8, 8, 8, 8]).unwrap();
        assert_eq!(buffers.read_f32(0, 4).unwrap(), 2.0);
        assert_eq!(buffers.read_f32(1, 0).unwrap(), 3.0);
        assert_eq!(buffers.read_vec4(1, 0).unwrap(), Vec4::new(3.0, 4.0, 5.0, 6.0));
        assert!(matches!(buffers.read_f32(0, 8), Err(Error::UnresolvedReference { .. })));
        assert!(buffers.read_vec4(1, 4).is_err());
    }
}
