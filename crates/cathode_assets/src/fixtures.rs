//! Render-table builders for tests

use crate::materials::{Material, CONSTANT_BUFFER_COUNT};
use crate::metadata::ShaderCategory;
use crate::models::{Model, Submesh};
use crate::reds::RenderableElement;
use crate::shaders::ShaderEntry;
use crate::textures::TextureEntry;
use cathode_core::ByteWriter;
use glam::{Vec2, Vec3};

/// Encode REDS.BIN
pub fn encode_reds(elements: &[RenderableElement]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.u32(elements.len() as u32);
    for e in elements {
        w.u32(0).i32(e.model_index).u8(0).u32(0).i32(e.material_index).u8(0).u32(0).u32(0);
    }
    w.finish()
}

/// Single triangle submesh using `material` by default
pub fn triangle(material: u32) -> Submesh {
    Submesh {
        material_library_index: material,
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        normals: vec![Vec3::Z; 3],
        uvs: vec![Vec2::ZERO, Vec2::X, Vec2::Y],
        indices: vec![0, 1, 2],
    }
}

/// Encode LEVEL_MODELS.PAK; `None` write indices are holes
pub fn encode_models(models: &[Model], write_indices: &[Option<usize>]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.header(b"MDLS").u32(models.len() as u32).u32(write_indices.len() as u32);
    for wi in write_indices {
        w.i32(wi.map_or(-1, |i| i as i32));
    }
    for model in models {
        w.lstring(&model.name).u32(model.lods.len() as u32);
        for lod in &model.lods {
            w.lstring(&lod.name).u32(lod.submeshes.len() as u32);
            for sub in &lod.submeshes {
                w.u32(sub.material_library_index)
                    .u32(sub.positions.len() as u32)
                    .u32(sub.indices.len() as u32);
                for p in &sub.positions {
                    w.vec3(*p);
                }
                for n in &sub.normals {
                    w.vec3(*n);
                }
                for uv in &sub.uvs {
                    w.f32(uv.x).f32(uv.y);
                }
                for &i in &sub.indices {
                    w.u16(i);
                }
            }
        }
    }
    w.finish()
}

/// Material with no textures and all buffers at offset zero
pub fn material(name: &str, shader_index: u32) -> Material {
    Material {
        name: name.to_owned(),
        shader_index,
        ..Default::default()
    }
}

/// Encode LEVEL_MODELS.MTL
pub fn encode_materials(materials: &[Material], cst_offsets: [u32; CONSTANT_BUFFER_COUNT]) -> Vec<u8> {
    let mut strings = Vec::new();
    let mut name_offsets = Vec::with_capacity(materials.len());
    for m in materials {
        name_offsets.push(strings.len() as u32);
        strings.extend_from_slice(m.name.as_bytes());
        strings.push(0);
    }

    let mut w = ByteWriter::new();
    w.header(b"MTLS").u32(materials.len() as u32);
    for offset in cst_offsets {
        w.u32(offset);
    }
    w.u32(strings.len() as u32).bytes(&strings);
    for (m, name_offset) in materials.iter().zip(name_offsets) {
        w.u32(name_offset).u32(m.flags);
        for slot in &m.texture_references {
            match slot {
                Some(t) => w.u16(t.bin_index).u16(t.source.code()),
                None => w.u16(0xFFFF).u16(0),
            };
        }
        for cb in &m.constant_buffers {
            w.u32(cb.offset).u32(cb.length);
        }
        w.u32(m.shader_index).u32(m.unknown);
    }
    w.finish()
}

/// Shader entry of a category with the given links
pub fn shader(category: ShaderCategory, texture_links: Vec<u8>, cst_links: [Vec<u8>; CONSTANT_BUFFER_COUNT]) -> ShaderEntry {
    ShaderEntry {
        category_code: category.code(),
        flags: 0,
        texture_links,
        cst_links,
    }
}

/// Encode LEVEL_SHADERS_DX11.PAK
pub fn encode_shaders(entries: &[ShaderEntry]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.header(b"SHDR").u32(entries.len() as u32);
    for e in entries {
        let size = 8 + e.texture_links.len() + e.cst_links.iter().map(Vec::len).sum::<usize>();
        w.u32(size as u32).u8(e.category_code).u8(e.texture_links.len() as u8);
        for links in &e.cst_links {
            w.u8(links.len() as u8);
        }
        w.u8(e.flags).bytes(&e.texture_links);
        for links in &e.cst_links {
            w.bytes(links);
        }
    }
    w.finish()
}

/// Encode LEVEL_SHADERS_DX11_IDX_REMAP.PAK
pub fn encode_remap(indices: &[u32]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.header(b"IDXR").u32(indices.len() as u32);
    for &i in indices {
        w.u32(i).u32(0);
    }
    w.finish()
}

/// 2D texture entry
pub fn texture(name: &str, format: u32, size: (u16, u16), high: Vec<u8>, low: Vec<u8>) -> TextureEntry {
    TextureEntry {
        name: name.to_owned(),
        format_code: format,
        kind_code: 0,
        width: size.0,
        height: size.1,
        low_width: (size.0 / 2).max(1),
        low_height: (size.1 / 2).max(1),
        high,
        low,
    }
}

/// Encode a texture table
pub fn encode_textures(entries: &[TextureEntry]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.header(b"TXTR").u32(entries.len() as u32);
    for e in entries {
        w.lstring(&e.name)
            .u32(e.format_code)
            .u8(e.kind_code)
            .bytes(&[0; 3])
            .u16(e.width)
            .u16(e.height)
            .u16(e.low_width)
            .u16(e.low_height)
            .u32(e.high.len() as u32)
            .u32(e.low.len() as u32)
            .bytes(&e.high)
            .bytes(&e.low);
    }
    w.finish()
}
