//! LevelContent - every decoded table of one level
//!
//! Tables are loaded on a bounded rayon pool. Each job owns its result; the
//! aggregate is assembled only after every job has finished.

use crate::config::ContentConfig;
use crate::error::{LevelError, LevelResult};
use crate::layout::LevelPaths;
use cathode_assets::{
    ConstantBufferBlob, ConstantBuffers, IdxRemap, MaterialTable, ModelTable, RenderableElements,
    ResourceUsages, ShaderTable, TextureTable,
};
use cathode_commands::{Commands, Composite, EntryPoint};
use cathode_core::{load, load_optional, RawBlob, Result, ShortGuid, Table};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

/// One loadable table of a level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableId {
    Commands,
    RenderableElements,
    Resources,
    MoverDescriptors,
    Physics,
    Lights,
    EnvironmentMap,
    EnvironmentAnimation,
    ConstantBuffers,
    Materials,
    Models,
    Shaders,
    ShaderRemap,
    LocalTextures,
    GlobalTextures,
}

impl TableId {
    pub const ALL: [TableId; 15] = [
        Self::Commands,
        Self::RenderableElements,
        Self::Resources,
        Self::MoverDescriptors,
        Self::Physics,
        Self::Lights,
        Self::EnvironmentMap,
        Self::EnvironmentAnimation,
        Self::ConstantBuffers,
        Self::Materials,
        Self::Models,
        Self::Shaders,
        Self::ShaderRemap,
        Self::LocalTextures,
        Self::GlobalTextures,
    ];

    /// File name on disk
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Commands => "COMMANDS.PAK",
            Self::RenderableElements => "REDS.BIN",
            Self::Resources => "RESOURCES.BIN",
            Self::MoverDescriptors => "MOVER_DESCRIPTORS.BIN",
            Self::Physics => "PHYSICS.MAP",
            Self::Lights => "LIGHTS.BIN",
            Self::EnvironmentMap => "ENVIRONMENTMAP.BIN",
            Self::EnvironmentAnimation => "ENVIRONMENT_ANIMATION.DAT",
            Self::ConstantBuffers => "LEVEL_MODELS.CST",
            Self::Materials => "LEVEL_MODELS.MTL",
            Self::Models => "LEVEL_MODELS.PAK",
            Self::Shaders => "LEVEL_SHADERS_DX11.PAK",
            Self::ShaderRemap => "LEVEL_SHADERS_DX11_IDX_REMAP.PAK",
            Self::LocalTextures => "LEVEL_TEXTURES.ALL.PAK",
            Self::GlobalTextures => "GLOBAL_TEXTURES.ALL.PAK",
        }
    }

    /// Full path within a level
    pub fn path(self, paths: &LevelPaths) -> PathBuf {
        match self {
            Self::Commands
            | Self::RenderableElements
            | Self::Resources
            | Self::MoverDescriptors
            | Self::Physics
            | Self::Lights
            | Self::EnvironmentMap
            | Self::EnvironmentAnimation => paths.world_file(self.file_name()),
            Self::GlobalTextures => paths.global_file(self.file_name()),
            _ => paths.renderable_file(self.file_name()),
        }
    }

    fn load(self, path: PathBuf) -> Result<LoadedTable> {
        Ok(match self {
            Self::Commands => LoadedTable::Commands(load(&path)?),
            Self::RenderableElements => LoadedTable::RenderableElements(load(&path)?),
            Self::Resources => LoadedTable::Resources(load(&path)?),
            Self::MoverDescriptors
            | Self::Physics
            | Self::Lights
            | Self::EnvironmentMap
            | Self::EnvironmentAnimation => LoadedTable::Opaque(self, load_optional(&path)?),
            Self::ConstantBuffers => LoadedTable::ConstantBuffers(load(&path)?),
            Self::Materials => LoadedTable::Materials(load(&path)?),
            Self::Models => LoadedTable::Models(load(&path)?),
            Self::Shaders => LoadedTable::Shaders(load(&path)?),
            Self::ShaderRemap => LoadedTable::ShaderRemap(load(&path)?),
            Self::LocalTextures => LoadedTable::LocalTextures(load(&path)?),
            Self::GlobalTextures => LoadedTable::GlobalTextures(load_optional(&path)?),
        })
    }
}

/// Owned result of one load job
enum LoadedTable {
    Commands(Commands),
    RenderableElements(RenderableElements),
    Resources(ResourceUsages),
    Opaque(TableId, Table<RawBlob>),
    ConstantBuffers(ConstantBufferBlob),
    Materials(MaterialTable),
    Models(ModelTable),
    Shaders(ShaderTable),
    ShaderRemap(IdxRemap),
    LocalTextures(TextureTable),
    GlobalTextures(Table<TextureTable>),
}

/// Opaque WORLD tables kept as bytes
#[derive(Clone, Debug)]
pub struct OpaqueTables {
    pub mover_descriptors: Table<RawBlob>,
    pub physics: Table<RawBlob>,
    pub lights: Table<RawBlob>,
    pub environment_map: Table<RawBlob>,
    pub environment_animation: Table<RawBlob>,
}

/// All decoded tables of one level, read-only once loaded
#[derive(Debug)]
pub struct LevelContent {
    pub paths: LevelPaths,
    pub commands: Commands,
    pub renderable_elements: RenderableElements,
    pub resources: ResourceUsages,
    pub constant_buffers: ConstantBuffers,
    pub materials: MaterialTable,
    pub models: ModelTable,
    pub shaders: ShaderTable,
    pub shader_remap: IdxRemap,
    pub local_textures: TextureTable,
    pub global_textures: Table<TextureTable>,
    pub opaque: OpaqueTables,
}

#[derive(Default)]
struct Slots {
    commands: Option<Commands>,
    renderable_elements: Option<RenderableElements>,
    resources: Option<ResourceUsages>,
    constant_buffers: Option<ConstantBufferBlob>,
    materials: Option<MaterialTable>,
    models: Option<ModelTable>,
    shaders: Option<ShaderTable>,
    shader_remap: Option<IdxRemap>,
    local_textures: Option<TextureTable>,
    global_textures: Option<Table<TextureTable>>,
    mover_descriptors: Option<Table<RawBlob>>,
    physics: Option<Table<RawBlob>>,
    lights: Option<Table<RawBlob>>,
    environment_map: Option<Table<RawBlob>>,
    environment_animation: Option<Table<RawBlob>>,
}

impl Slots {
    fn put(&mut self, table: LoadedTable) {
        match table {
            LoadedTable::Commands(t) => self.commands = Some(t),
            LoadedTable::RenderableElements(t) => self.renderable_elements = Some(t),
            LoadedTable::Resources(t) => self.resources = Some(t),
            LoadedTable::ConstantBuffers(t) => self.constant_buffers = Some(t),
            LoadedTable::Materials(t) => self.materials = Some(t),
            LoadedTable::Models(t) => self.models = Some(t),
            LoadedTable::Shaders(t) => self.shaders = Some(t),
            LoadedTable::ShaderRemap(t) => self.shader_remap = Some(t),
            LoadedTable::LocalTextures(t) => self.local_textures = Some(t),
            LoadedTable::GlobalTextures(t) => self.global_textures = Some(t),
            LoadedTable::Opaque(id, t) => {
                let slot = match id {
                    TableId::MoverDescriptors => &mut self.mover_descriptors,
                    TableId::Physics => &mut self.physics,
                    TableId::Lights => &mut self.lights,
                    TableId::EnvironmentMap => &mut self.environment_map,
                    _ => &mut self.environment_animation,
                };
                *slot = Some(t);
            }
        }
    }
}

fn take<T>(slot: Option<T>, id: TableId, paths: &LevelPaths) -> LevelResult<T> {
    slot.ok_or_else(|| LevelError::TableLoad {
        failures: vec![(
            id.file_name(),
            cathode_core::Error::MissingFile { path: id.path(paths) },
        )],
    })
}

fn optional(slot: Option<Table<RawBlob>>, id: TableId, paths: &LevelPaths) -> Table<RawBlob> {
    slot.unwrap_or_else(|| Table::NotLoaded { path: id.path(paths) })
}

/// Run load jobs on a pool of `workers` threads
fn run_jobs(jobs: &[(TableId, PathBuf)], workers: usize) -> LevelResult<Vec<(TableId, Result<LoadedTable>)>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("cathode-load-{}", i))
        .build()?;

    panic::catch_unwind(AssertUnwindSafe(|| {
        pool.install(|| {
            jobs.par_iter()
                .map(|(id, path)| {
                    log::trace!("Loading {}", path.display());
                    (*id, id.load(path.clone()))
                })
                .collect()
        })
    }))
    .map_err(|_| LevelError::LoaderPanicked)
}

impl LevelContent {
    /// Load every table of a level in parallel
    ///
    /// Required tables that fail, and any malformed table, are reported
    /// together in one `TableLoad` error.
    pub fn load(config: &ContentConfig, name: &str) -> LevelResult<Self> {
        let started = Instant::now();
        let paths = LevelPaths::locate(config, name)?;

        let jobs: Vec<(TableId, PathBuf)> = TableId::ALL
            .iter()
            .filter(|&&id| id != TableId::GlobalTextures || config.load_global_textures)
            .map(|&id| (id, id.path(&paths)))
            .collect();
        let workers = config.max_parallel_loads.clamp(1, jobs.len());

        let mut slots = Slots::default();
        let mut failures = Vec::new();
        for (id, result) in run_jobs(&jobs, workers)? {
            match result {
                Ok(table) => slots.put(table),
                Err(e) => {
                    log::warn!("Failed to load {} for {}: {}", id.file_name(), name, e);
                    failures.push((id.file_name(), e));
                }
            }
        }

        let cst_offsets = slots.materials.as_ref().map(MaterialTable::cst_offsets);
        let constant_buffers = match (slots.constant_buffers.take(), cst_offsets) {
            (Some(blob), Some(offsets)) => match ConstantBuffers::split(blob, offsets) {
                Ok(buffers) => Some(buffers),
                Err(e) => {
                    failures.push((TableId::ConstantBuffers.file_name(), e));
                    None
                }
            },
            _ => None,
        };

        if !failures.is_empty() {
            return Err(LevelError::TableLoad { failures });
        }

        let global_textures = slots.global_textures.unwrap_or_else(|| Table::NotLoaded {
            path: TableId::GlobalTextures.path(&paths),
        });

        let content = Self {
            commands: take(slots.commands, TableId::Commands, &paths)?,
            renderable_elements: take(slots.renderable_elements, TableId::RenderableElements, &paths)?,
            resources: take(slots.resources, TableId::Resources, &paths)?,
            constant_buffers: take(constant_buffers, TableId::ConstantBuffers, &paths)?,
            materials: take(slots.materials, TableId::Materials, &paths)?,
            models: take(slots.models, TableId::Models, &paths)?,
            shaders: take(slots.shaders, TableId::Shaders, &paths)?,
            shader_remap: take(slots.shader_remap, TableId::ShaderRemap, &paths)?,
            local_textures: take(slots.local_textures, TableId::LocalTextures, &paths)?,
            global_textures,
            opaque: OpaqueTables {
                mover_descriptors: optional(slots.mover_descriptors, TableId::MoverDescriptors, &paths),
                physics: optional(slots.physics, TableId::Physics, &paths),
                lights: optional(slots.lights, TableId::Lights, &paths),
                environment_map: optional(slots.environment_map, TableId::EnvironmentMap, &paths),
                environment_animation: optional(
                    slots.environment_animation,
                    TableId::EnvironmentAnimation,
                    &paths,
                ),
            },
            paths,
        };

        log::info!(
            "Loaded level {} ({} composites, {} materials, {} shaders) with {} workers in {:?}",
            name,
            content.commands.composites().len(),
            content.materials.len(),
            content.shaders.len(),
            workers,
            started.elapsed()
        );
        Ok(content)
    }

    /// Get a composite by GUID
    pub fn composite(&self, guid: ShortGuid) -> Option<&Composite> {
        self.commands.get_composite(guid)
    }

    /// Root entry-point composite
    pub fn entry_point(&self) -> Option<&Composite> {
        self.commands.entry_point(EntryPoint::Root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_locations() {
        let paths = LevelPaths {
            name: "BSP_TORRENS".into(),
            world: PathBuf::from("L/WORLD"),
            renderable: PathBuf::from("L/RENDERABLE"),
            global: PathBuf::from("G"),
        };
        assert_eq!(TableId::Commands.path(&paths), PathBuf::from("L/WORLD/COMMANDS.PAK"));
        assert_eq!(TableId::Models.path(&paths), PathBuf::from("L/RENDERABLE/LEVEL_MODELS.PAK"));
        assert_eq!(TableId::GlobalTextures.path(&paths), PathBuf::from("G/GLOBAL_TEXTURES.ALL.PAK"));
    }
}
