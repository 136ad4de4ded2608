//! Integration tests for cathode_level

use approx::assert_relative_eq;
use cathode_assets::fixtures::*;
use cathode_assets::{
    Lod, Material, Model, RenderableElement, ShaderCategory, ShaderParam, TextureReference, TextureSlot,
    TextureSource,
};
use cathode_commands::fixtures::*;
use cathode_commands::EntityPath;
use cathode_core::{ByteWriter, LoadState, ShortGuid};
use cathode_level::*;
use glam::{Vec3, Vec4};
use std::path::Path;
use std::sync::Arc;

fn g(name: &str) -> ShortGuid {
    ShortGuid::from_name(name)
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write(dir: &Path, file: &str, bytes: &[u8]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(file), bytes).unwrap();
}

fn local(bin_index: u16) -> Option<TextureReference> {
    Some(TextureReference {
        source: TextureSource::Local,
        bin_index,
    })
}

fn global(bin_index: u16) -> Option<TextureReference> {
    Some(TextureReference {
        source: TextureSource::Global,
        bin_index,
    })
}

/// Metal (environment, local texture 0), Shadow (shadowcaster), Lowres (local texture 1)
fn level_materials(first: &str) -> Vec<Material> {
    let mut metal = material(first, 0);
    metal.texture_references[0] = local(0);
    let shadow = material("Shadow", 1);
    let mut lowres = material("Lowres", 0);
    lowres.texture_references[0] = local(1);
    vec![metal, shadow, lowres]
}

fn write_level(root: &Path) {
    write_named_level(root, "TEST", "Metal");
}

/// Writes a level under `root` whose first material is named `first`
///
/// ROOT draws `model` (two elements) and instances CHILD as `inst`; `alias`
/// moves CHILD's `child_model`. LOOP instances itself.
fn write_named_level(root: &Path, name: &str, first: &str) {
    let level = root.join("DATA/ENV/PRODUCTION").join(name);
    let world = level.join("WORLD");
    let renderable = level.join("RENDERABLE");

    let composites = vec![
        composite(
            g("ROOT"),
            "PRODUCTION/TEST/ROOT",
            vec![
                model_reference(g("model"), Vec3::X, 0, 2),
                instance(g("inst"), g("CHILD"), Vec3::Y),
                alias(g("alias"), vec![g("inst"), g("child_model")], Some(Vec3::new(0.0, 0.0, 5.0))),
            ],
        ),
        composite(
            g("CHILD"),
            "CHILD",
            vec![model_reference(g("child_model"), Vec3::ZERO, 2, 1)],
        ),
        composite(g("LOOP"), "LOOP", vec![instance(g("loop"), g("LOOP"), Vec3::ZERO)]),
    ];
    write(
        &world,
        "COMMANDS.PAK",
        &encode_commands([g("ROOT"), ShortGuid::INVALID, ShortGuid::INVALID], &composites),
    );
    write(
        &world,
        "REDS.BIN",
        &encode_reds(&[
            RenderableElement { model_index: 0, material_index: -1 },
            RenderableElement { model_index: 1, material_index: -1 },
            RenderableElement { model_index: 0, material_index: 2 },
        ]),
    );
    let mut resources = ByteWriter::new();
    resources.header(b"RSRC").u32(1).guid(g("inst")).guid(g("model")).i32(0);
    write(&world, "RESOURCES.BIN", &resources.finish());

    let model = Model {
        name: "Crate".into(),
        lods: vec![Lod {
            name: "LOD0".into(),
            submeshes: vec![triangle(0), triangle(1)],
        }],
    };
    write(&renderable, "LEVEL_MODELS.PAK", &encode_models(&[model], &[Some(0), Some(1)]));

    write(
        &renderable,
        "LEVEL_MODELS.MTL",
        &encode_materials(&level_materials(first), [0; 5]),
    );

    let cst: Vec<u8> = [0.5f32, 0.25, 0.125, 1.0]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect();
    write(&renderable, "LEVEL_MODELS.CST", &cst);

    // Diffuse0 is environment slot 3, bound to float 0 of buffer 0
    let environment = shader(
        ShaderCategory::CA_ENVIRONMENT,
        vec![0],
        [vec![255, 255, 255, 0], vec![], vec![], vec![], vec![]],
    );
    let shadowcaster = shader(ShaderCategory::CA_SHADOWCASTER, vec![0], Default::default());
    write(&renderable, "LEVEL_SHADERS_DX11.PAK", &encode_shaders(&[environment, shadowcaster]));
    write(&renderable, "LEVEL_SHADERS_DX11_IDX_REMAP.PAK", &encode_remap(&[0, 1]));

    write(
        &renderable,
        "LEVEL_TEXTURES.ALL.PAK",
        &encode_textures(&[
            texture("Metal_D", 2, (1, 1), vec![10, 20, 30, 255], Vec::new()),
            texture("Lowres_D", 2, (2, 2), Vec::new(), vec![1, 2, 3, 4]),
        ]),
    );
}

fn session(root: &Path) -> LevelSession {
    init_logger();
    write_level(root);
    let session = LevelSession::new(ContentConfig::with_root(root));
    session.load_level("TEST").unwrap();
    session
}

#[test]
fn test_load_level_tables() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    let content = session.content().unwrap();

    assert_eq!(content.commands.composites().len(), 3);
    assert_eq!(content.renderable_elements.len(), 3);
    assert_eq!(content.materials.len(), 3);
    assert!(content.resources.find_usage(g("model")).is_some());

    // optional tables absent on disk stay unloaded
    assert_eq!(content.opaque.lights.state(), LoadState::NotLoaded);
    assert_eq!(content.global_textures.state(), LoadState::NotLoaded);

    let root = session.entry_point().unwrap();
    assert_eq!(root.guid, g("ROOT"));
    assert_eq!(session.composite(g("CHILD")).unwrap().name, "CHILD");
}

#[test]
fn test_resolve_renderable() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let renderables = session.resolve_renderable(g("ROOT"), g("model"));
    assert_eq!(renderables.len(), 2);

    // material -1 uses the submesh default
    let metal = &renderables[0].material;
    assert_eq!(metal.index, 0);
    assert_eq!(metal.label, "Metal CA_ENVIRONMENT");
    assert!(metal.renderable);
    assert!(metal.texture(TextureSlot::DiffuseMap).is_some());
    assert_eq!(
        metal.param(ShaderParam::Diffuse0),
        Some(ParamValue::Vector(Vec4::new(0.5, 0.25, 0.125, 1.0)))
    );
    assert_eq!(renderables[0].mesh.name, "Crate: LOD0");
    assert_eq!(renderables[0].mesh.geometry.vertices.len(), 3);

    let shadow = &renderables[1].material;
    assert_eq!(shadow.index, 1);
    assert_eq!(shadow.label, "Shadow (NOT RENDERED: CA_SHADOWCASTER)");
    assert!(!shadow.renderable);
    assert!(shadow.textures.is_empty());
    assert!(shadow.params.is_empty());

    assert!(session.resolve_renderable(g("ROOT"), g("nope")).is_empty());
}

#[test]
fn test_unrendered_material_is_cached_without_textures() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    let level = session.level().unwrap();
    let (content, resolver) = (level.content(), level.resolver());

    let first = resolver.resolve_material(content, 1).unwrap();
    let second = resolver.resolve_material(content, 1).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(session.cache_stats().textures, 0);
}

#[test]
fn test_low_res_texture_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    let level = session.level().unwrap();

    let lowres = level.resolver().resolve_material(level.content(), 2).unwrap();
    let texture = lowres.texture(TextureSlot::DiffuseMap).unwrap();
    assert!(texture.low_res);
    assert_eq!((texture.width, texture.height), (1, 1));
}

#[test]
fn test_out_of_range_references_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    let level = session.level().unwrap();
    let (content, resolver) = (level.content(), level.resolver());

    assert!(resolver.resolve_material(content, 9).is_err());
    assert!(resolver.resolve_mesh(content, 5).is_err());
    let resolved = resolver.resolve_elements(
        content,
        [
            RenderableElement { model_index: 7, material_index: -1 },
            RenderableElement { model_index: 1, material_index: 0 },
        ],
    );
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].material.name, "Metal");
}

#[test]
fn test_sentinel_path_matches_short_path() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let long = session.resolve_entity_path(&EntityPath::new(vec![g("inst"), ShortGuid::INVALID]), g("ROOT"));
    let short = session.resolve_entity_path(&EntityPath::new(vec![g("inst")]), g("ROOT"));
    assert_eq!(long, short);
    assert_eq!(short, Some(EntityTarget::new(g("ROOT"), g("inst"))));

    let nested = session.resolve_entity_path(&EntityPath::new(vec![g("inst"), g("child_model")]), g("ROOT"));
    assert_eq!(nested, Some(EntityTarget::new(g("CHILD"), g("child_model"))));
}

#[test]
fn test_scene_applies_alias_transform() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let scene = session.build_scene(g("ROOT")).unwrap();
    assert_eq!(scene.node_count(), 4);
    assert_eq!(scene.child(g("model")).unwrap().renderables().len(), 2);

    let inst = scene.child(g("inst")).unwrap();
    let child = inst.child(g("child_model")).unwrap();
    assert_eq!(child.transform.position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(child.renderables()[0].material.name, "Lowres");

    let drawn = scene.flatten();
    assert_eq!(drawn.len(), 3);
    let (world, _) = drawn
        .iter()
        .find(|(_, r)| r.material.name == "Lowres")
        .unwrap();
    let origin = world.transform_point3(Vec3::ZERO);
    assert_relative_eq!(origin.y, 1.0);
    assert_relative_eq!(origin.z, 5.0);
}

#[test]
fn test_scene_cuts_instancing_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let scene = session.build_scene(g("LOOP")).unwrap();
    assert_eq!(scene.node_count(), 1);
    assert!(session.build_scene(g("MISSING")).is_none());
}

#[test]
fn test_live_events_override_tables() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    session
        .handle_packet(
            &serde_json::json!({
                "packet_event": 8,
                "version": 3,
                "path_entities": [g("model").to_u32()],
                "path_composites": [g("ROOT").to_u32()],
                "renderable": [{ "Item1": 1, "Item2": -1 }]
            })
            .to_string(),
        )
        .unwrap();
    let remapped = session.resolve_renderable(g("ROOT"), g("model"));
    assert_eq!(remapped.len(), 1);
    assert_eq!(remapped[0].material.name, "Shadow");

    session
        .handle_packet(
            &serde_json::json!({
                "packet_event": 5,
                "version": 3,
                "path_entities": [g("inst").to_u32(), g("child_model").to_u32()],
                "path_composites": [g("ROOT").to_u32(), g("CHILD").to_u32()],
                "position": { "X": 3.0, "Y": 0.0, "Z": 0.0 },
                "rotation": { "X": 0.0, "Y": 0.0, "Z": 0.0 }
            })
            .to_string(),
        )
        .unwrap();
    assert!(session.apply_event(&EditorEvent::EntityDeleted {
        target: EntityTarget::new(g("ROOT"), g("model")),
    }));

    let scene = session.build_scene(g("ROOT")).unwrap();
    assert!(scene.child(g("model")).is_none());
    let child = scene.child(g("inst")).unwrap().child(g("child_model")).unwrap();
    assert_eq!(child.transform.position, Vec3::new(3.0, 0.0, 0.0));

    session.reset();
    assert!(session.live_overrides().is_empty());
}

#[test]
fn test_reload_after_reset_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let snapshot = |session: &LevelSession| {
        let mut out: Vec<(ResolvedMesh, ResolvedMaterial)> = Vec::new();
        for (composite, entity) in [(g("ROOT"), g("model")), (g("CHILD"), g("child_model"))] {
            for r in session.resolve_renderable(composite, entity) {
                out.push(((*r.mesh).clone(), (*r.material).clone()));
            }
        }
        out
    };

    let first = snapshot(&session);
    let first_stats = session.cache_stats();

    session.reset();
    assert!(!session.is_loaded());
    assert_eq!(session.cache_stats(), CacheStats::default());
    assert!(session.resolve_renderable(g("ROOT"), g("model")).is_empty());

    session.load_level("TEST").unwrap();
    assert_eq!(snapshot(&session), first);
    assert_eq!(session.cache_stats(), first_stats);
}

#[test]
fn test_reload_drops_caches_of_previous_level() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    write_named_level(dir.path(), "TEST2", "Other");

    let old = session.level().unwrap();
    session.load_level("TEST2").unwrap();

    // a resolve still running against the replaced level
    let stale = old.resolver().resolve_material(old.content(), 0).unwrap();
    assert_eq!(stale.name, "Metal");
    assert_eq!(old.cache_stats().materials, 1);

    let renderables = session.resolve_renderable(g("ROOT"), g("model"));
    assert_eq!(renderables[0].material.name, "Other");
    assert_eq!(session.content().unwrap().paths.name, "TEST2");
    assert!(!Arc::ptr_eq(&session.level().unwrap(), &old));
}

/// Rewrites TEST's materials with a fourth, `Decal`, drawing global texture 0
fn write_decal_material(root: &Path) {
    let mut materials = level_materials("Metal");
    let mut decal = material("Decal", 0);
    decal.texture_references[0] = global(0);
    materials.push(decal);
    write(
        &root.join("DATA/ENV/PRODUCTION/TEST/RENDERABLE"),
        "LEVEL_MODELS.MTL",
        &encode_materials(&materials, [0; 5]),
    );
}

#[test]
fn test_local_and_global_textures_are_cached_apart() {
    let dir = tempfile::tempdir().unwrap();
    init_logger();
    write_level(dir.path());
    write_decal_material(dir.path());
    write(
        &dir.path().join("DATA/ENV/GLOBAL/WORLD"),
        "GLOBAL_TEXTURES.ALL.PAK",
        &encode_textures(&[texture("Global_D", 2, (1, 1), vec![200, 100, 50, 255], Vec::new())]),
    );
    let session = LevelSession::new(ContentConfig::with_root(dir.path()));
    session.load_level("TEST").unwrap();
    let level = session.level().unwrap();
    let (content, resolver) = (level.content(), level.resolver());
    assert_eq!(content.global_textures.state(), LoadState::Loaded);

    // same bin index, different tables
    let local_tex = resolver.resolve_texture(content, local(0).unwrap()).unwrap();
    let global_tex = resolver.resolve_texture(content, global(0).unwrap()).unwrap();
    assert_eq!(local_tex.name, "Metal_D");
    assert_eq!(global_tex.name, "Global_D");
    assert_eq!(session.cache_stats().textures, 2);

    let decal = resolver.resolve_material(content, 3).unwrap();
    let diffuse = decal.texture(TextureSlot::DiffuseMap).unwrap();
    assert!(Arc::ptr_eq(diffuse, &global_tex));
    assert_eq!(session.cache_stats().textures, 2);
}

#[test]
fn test_missing_global_table_skips_slot() {
    let dir = tempfile::tempdir().unwrap();
    init_logger();
    write_level(dir.path());
    write_decal_material(dir.path());
    let session = LevelSession::new(ContentConfig::with_root(dir.path()));
    session.load_level("TEST").unwrap();
    let level = session.level().unwrap();
    let (content, resolver) = (level.content(), level.resolver());
    assert_eq!(content.global_textures.state(), LoadState::NotLoaded);

    assert!(matches!(
        resolver.resolve_texture(content, global(0).unwrap()),
        Err(cathode_core::Error::UnresolvedReference { .. })
    ));
    let decal = resolver.resolve_material(content, 3).unwrap();
    assert!(decal.renderable);
    assert!(decal.texture(TextureSlot::DiffuseMap).is_none());
    assert!(decal.param(ShaderParam::Diffuse0).is_some());
    assert_eq!(session.cache_stats().textures, 0);
}

#[test]
fn test_missing_required_table_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    init_logger();
    write_level(dir.path());
    std::fs::remove_file(dir.path().join("DATA/ENV/PRODUCTION/TEST/WORLD/REDS.BIN")).unwrap();
    std::fs::write(
        dir.path().join("DATA/ENV/PRODUCTION/TEST/RENDERABLE/LEVEL_SHADERS_DX11_IDX_REMAP.PAK"),
        b"IDXR",
    )
    .unwrap();

    let session = LevelSession::new(ContentConfig::with_root(dir.path()));
    match session.load_level("TEST") {
        Err(LevelError::TableLoad { failures }) => {
            let tables: Vec<_> = failures.iter().map(|(t, _)| *t).collect();
            assert!(tables.contains(&"REDS.BIN"));
            assert!(tables.contains(&"LEVEL_SHADERS_DX11_IDX_REMAP.PAK"));
        }
        other => panic!("expected table load failure, got {:?}", other.map(|_| ())),
    }
    assert!(!session.is_loaded());
    assert!(!session.is_loading());
}

#[test]
fn test_single_worker_load() {
    let dir = tempfile::tempdir().unwrap();
    init_logger();
    write_level(dir.path());

    let config = ContentConfig {
        max_parallel_loads: 1,
        load_global_textures: false,
        ..ContentConfig::with_root(dir.path())
    };
    let content = LevelContent::load(&config, "TEST").unwrap();
    assert_eq!(content.models.len(), 2);
    assert!(content.global_textures.missing_path().is_some());
}
