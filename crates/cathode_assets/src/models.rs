//! LEVEL_MODELS.PAK - model / LOD / submesh hierarchy

use cathode_core::{ByteReader, Container, Result};
use glam::{Vec2, Vec3};

/// Standard vertex format produced from a submesh
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Renderer-agnostic geometry of one submesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    /// Vertex data as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| Vec3::from(v.position))
    }
}

/// Smallest drawable unit
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Submesh {
    /// Material table index used when no override is given
    pub material_library_index: u32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u16>,
}

impl Submesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Interleave into a geometry buffer
    pub fn to_geometry_buffer(&self) -> GeometryBuffer {
        let vertices = self
            .positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect();
        GeometryBuffer {
            vertices,
            indices: self.indices.iter().map(|&i| u32::from(i)).collect(),
        }
    }
}

/// Level of detail of a model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lod {
    pub name: String,
    pub submeshes: Vec<Submesh>,
}

/// Named model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub name: String,
    pub lods: Vec<Lod>,
}

/// Position of a submesh in the hierarchy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SubmeshLocation {
    model: usize,
    lod: usize,
    submesh: usize,
}

/// Decoded LEVEL_MODELS.PAK
#[derive(Clone, Debug, Default)]
pub struct ModelTable {
    models: Vec<Model>,
    /// Write index -> flattened submesh ordinal
    write_indices: Vec<Option<usize>>,
    locations: Vec<SubmeshLocation>,
}

impl ModelTable {
    /// Build from decoded models and write indices
    ///
    /// `write_indices` entries of `None` are holes.
    pub fn new(models: Vec<Model>, write_indices: Vec<Option<usize>>) -> Self {
        let locations = Self::index(&models);
        Self {
            models,
            write_indices,
            locations,
        }
    }

    fn index(models: &[Model]) -> Vec<SubmeshLocation> {
        let mut locations = Vec::new();
        for (m, model) in models.iter().enumerate() {
            for (l, lod) in model.lods.iter().enumerate() {
                for s in 0..lod.submeshes.len() {
                    locations.push(SubmeshLocation {
                        model: m,
                        lod: l,
                        submesh: s,
                    });
                }
            }
        }
        locations
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Number of write indices
    pub fn len(&self) -> usize {
        self.write_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.write_indices.is_empty()
    }

    fn locate(&self, index: i32) -> Option<SubmeshLocation> {
        let slot = usize::try_from(index).ok()?;
        let ordinal = (*self.write_indices.get(slot)?)?;
        self.locations.get(ordinal).copied()
    }

    /// Submesh at a write index; `None` for holes and out-of-range indices
    pub fn get_submesh_at_index(&self, index: i32) -> Option<&Submesh> {
        let loc = self.locate(index)?;
        self.models
            .get(loc.model)?
            .lods
            .get(loc.lod)?
            .submeshes
            .get(loc.submesh)
    }

    /// LOD owning the submesh at a write index
    pub fn find_lod_for_submesh(&self, index: i32) -> Option<&Lod> {
        let loc = self.locate(index)?;
        self.models.get(loc.model)?.lods.get(loc.lod)
    }

    /// Model owning the submesh at a write index
    pub fn find_model_for_submesh(&self, index: i32) -> Option<&Model> {
        let loc = self.locate(index)?;
        self.models.get(loc.model)
    }

    /// `"<model>: <lod>"` display name of a submesh
    pub fn submesh_name(&self, index: i32) -> Option<String> {
        let model = self.find_model_for_submesh(index)?;
        let lod = self.find_lod_for_submesh(index)?;
        Some(format!("{}: {}", model.name, lod.name))
    }
}

fn read_submesh(reader: &mut ByteReader<'_>) -> Result<Submesh> {
    let material_library_index = reader.read_u32()?;
    let vertex_count = reader.read_u32()? as usize;
    let index_count = reader.read_u32()? as usize;

    let needed = vertex_count
        .checked_mul(32)
        .and_then(|v| v.checked_add(index_count.checked_mul(2)?));
    if needed.map_or(true, |n| n > reader.remaining()) {
        return Err(reader.error(format!(
            "submesh declares {} vertices and {} indices, {} bytes left",
            vertex_count,
            index_count,
            reader.remaining()
        )));
    }

    let mut positions = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        positions.push(reader.read_vec3()?);
    }
    let mut normals = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        normals.push(reader.read_vec3()?);
    }
    let mut uvs = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        uvs.push(Vec2::new(reader.read_f32()?, reader.read_f32()?));
    }
    let mut indices = Vec::with_capacity(index_count);
    for _ in 0..index_count {
        let offset = reader.position();
        let index = reader.read_u16()?;
        if index as usize >= vertex_count {
            return Err(cathode_core::Error::malformed(
                ModelTable::NAME,
                offset,
                format!("vertex index {} >= vertex count {}", index, vertex_count),
            ));
        }
        indices.push(index);
    }

    Ok(Submesh {
        material_library_index,
        positions,
        normals,
        uvs,
        indices,
    })
}

impl Container for ModelTable {
    const NAME: &'static str = "LEVEL_MODELS.PAK";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"MDLS")?;
        let model_count = reader.read_u32()? as usize;
        let write_count = reader.read_count(4)?;
        let write_offset = reader.position();
        let mut raw_writes = Vec::with_capacity(write_count);
        for _ in 0..write_count {
            raw_writes.push(reader.read_i32()?);
        }

        // lstring + lod count
        if model_count.saturating_mul(8) > reader.remaining() {
            return Err(reader.error(format!("declared {} models, too few bytes", model_count)));
        }
        let mut models = Vec::with_capacity(model_count);
        for _ in 0..model_count {
            let name = reader.read_lstring()?;
            let lod_count = reader.read_count(8)?;
            let mut lods = Vec::with_capacity(lod_count);
            for _ in 0..lod_count {
                let lod_name = reader.read_lstring()?;
                let submesh_count = reader.read_count(12)?;
                let mut submeshes = Vec::with_capacity(submesh_count);
                for _ in 0..submesh_count {
                    submeshes.push(read_submesh(reader)?);
                }
                lods.push(Lod {
                    name: lod_name,
                    submeshes,
                });
            }
            models.push(Model { name, lods });
        }

        let locations = Self::index(&models);
        let mut write_indices = Vec::with_capacity(write_count);
        for (slot, raw) in raw_writes.into_iter().enumerate() {
            let entry = match raw {
                -1 => None,
                ordinal if ordinal >= 0 && (ordinal as usize) < locations.len() => Some(ordinal as usize),
                bad => {
                    return Err(cathode_core::Error::malformed(
                        Self::NAME,
                        write_offset + slot * 4,
                        format!("write index {} past {} submeshes", bad, locations.len()),
                    ))
                }
            };
            write_indices.push(entry);
        }

        log::debug!(
            "Decoded {} models, {} submeshes, {} write indices",
            models.len(),
            locations.len(),
            write_indices.len()
        );

        Ok(Self {
            models,
            write_indices,
            locations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encode_models, triangle};
    use cathode_core::{load_bytes, Error};

    fn table() -> ModelTable {
        let models = vec![
            Model {
                name: "CRATE".into(),
                lods: vec![Lod { name: "LOD0".into(), submeshes: vec![triangle(3), triangle(4)] }],
            },
            Model {
                name: "DOOR".into(),
                lods: vec![Lod { name: "LOD0".into(), submeshes: vec![triangle(5)] }],
            },
        ];
        load_bytes(&encode_models(&models, &[Some(0), None, Some(2), Some(1)])).unwrap()
    }

    #[test]
    fn test_holes_return_none() {
        let models = table();
        assert_eq!(models.len(), 4);
        assert!(models.get_submesh_at_index(1).is_none());
        assert!(models.get_submesh_at_index(9).is_none());
        assert!(models.get_submesh_at_index(-1).is_none());
        assert_eq!(models.get_submesh_at_index(2).map(|s| s.material_library_index), Some(5));
    }

    #[test]
    fn test_reverse_lookups() {
        let models = table();
        assert_eq!(models.find_model_for_submesh(3).map(|m| m.name.as_str()), Some("CRATE"));
        assert_eq!(models.find_lod_for_submesh(2).map(|l| l.name.as_str()), Some("LOD0"));
        assert_eq!(models.submesh_name(2).as_deref(), Some("DOOR: LOD0"));
        assert!(models.submesh_name(1).is_none());
    }

    #[test]
    fn test_geometry_buffer() {
        let models = table();
        let geometry = models.get_submesh_at_index(0).unwrap().to_geometry_buffer();
        assert_eq!(geometry.vertices.len(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.vertex_bytes().len(), 3 * 32);
        assert_eq!(geometry.index_bytes().len(), 3 * 4);
    }

    #[test]
    fn test_bad_write_index_is_malformed() {
        let models = vec![Model {
            name: "CRATE".into(),
            lods: vec![Lod { name: "LOD0".into(), submeshes: vec![triangle(0)] }],
        }];
        let bytes = encode_models(&models, &[Some(1)]);
        assert!(matches!(load_bytes::<ModelTable>(&bytes), Err(Error::MalformedContainer { .. })));
    }

    #[test]
    fn test_bad_vertex_index_is_malformed() {
        let mut sub = triangle(0);
        sub.indices[2] = 3;
        let models = vec![Model {
            name: "CRATE".into(),
            lods: vec![Lod { name: "LOD0".into(), submeshes: vec![sub] }],
        }];
        let bytes = encode_models(&models, &[Some(0)]);
        assert!(matches!(load_bytes::<ModelTable>(&bytes), Err(Error::MalformedContainer { .. })));
    }
}
