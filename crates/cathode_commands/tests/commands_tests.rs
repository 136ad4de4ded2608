//! Integration tests for cathode_commands

use cathode_commands::fixtures::*;
use cathode_commands::*;
use cathode_core::{load_bytes, Error, ShortGuid};
use glam::Vec3;

fn g(name: &str) -> ShortGuid {
    ShortGuid::from_name(name)
}

/// ROOT instances INNER as `inst`; INNER holds a model and a trigger/zone pair
fn sample() -> Vec<u8> {
    let root = composite(
        g("ROOT"),
        "PRODUCTION/BSP_TORRENS/ROOT",
        vec![
            instance(g("inst"), g("INNER"), Vec3::new(10.0, 0.0, 0.0)),
            trigger_sequence(g("trig"), vec![vec![g("inst"), g("model"), ShortGuid::INVALID]]),
            zone(g("zone"), g("trig")),
            alias(g("alias"), vec![g("inst"), g("model"), ShortGuid::INVALID], Some(Vec3::ONE)),
        ],
    );
    let inner = composite(
        g("INNER"),
        "INNER",
        vec![
            model_reference(g("model"), Vec3::new(0.0, 1.0, 0.0), 0, 2),
            proxy(g("proxy"), FunctionType::LightReference.guid(), vec![g("model")]),
        ],
    );
    encode_commands([g("ROOT"), ShortGuid::INVALID, ShortGuid::INVALID], &[root, inner])
}

#[test]
fn test_decode_store() {
    let commands: Commands = load_bytes(&sample()).expect("decode");
    assert_eq!(commands.composites().len(), 2);

    let root = commands.entry_point(EntryPoint::Root).expect("root");
    assert_eq!(root.name, "PRODUCTION/BSP_TORRENS/ROOT");
    assert_eq!(root.short_name(), "ROOT");
    assert_eq!(commands.composite_index(g("INNER")), Some(1));
    assert_eq!(commands.composite_index(g("NOPE")), None);
    assert!(commands.entry_point(EntryPoint::Global).is_none());

    let inner = commands.get_composite(g("INNER")).expect("inner");
    assert_eq!(inner.name, "INNER");
    assert_eq!(inner.proxies.len(), 1);

    let model = commands.get_entity_by_id(g("INNER"), g("model")).expect("model");
    assert!(model.is_function_type(FunctionType::ModelReference));
    assert_eq!(model.resources().len(), 1);
    assert_eq!(model.resources()[0].count, 2);
    assert!(commands.get_parameter(model, "position").is_some());

    let inst = root.get_entity(g("inst")).expect("inst");
    assert_eq!(commands.instanced_composite(inst).map(|c| c.guid), Some(g("INNER")));

    let trig = root.get_entity(g("trig")).expect("trig");
    assert_eq!(trig.sequence().len(), 1);
}

#[test]
fn test_sentinel_path_matches_bare_path() {
    let commands: Commands = load_bytes(&sample()).expect("decode");
    let root = commands.get_composite(g("ROOT")).expect("root");

    let with_sentinel = resolve_entity_path(&commands, root, &EntityPath::new(vec![g("inst"), ShortGuid::INVALID]))
        .expect("resolves");
    let bare = resolve_entity_path(&commands, root, &EntityPath::new(vec![g("inst")])).expect("resolves");

    assert_eq!(with_sentinel.entity.guid, g("inst"));
    assert_eq!(with_sentinel.entity.guid, bare.entity.guid);
    assert_eq!(with_sentinel.composite.guid, bare.composite.guid);
}

#[test]
fn test_nested_path_resolution() {
    let commands: Commands = load_bytes(&sample()).expect("decode");
    let root = commands.get_composite(g("ROOT")).expect("root");

    let hit = resolve_entity_path(&commands, root, &EntityPath::new(vec![g("inst"), g("model"), ShortGuid::INVALID]))
        .expect("resolves");
    assert_eq!(hit.composite.guid, g("INNER"));
    assert_eq!(hit.entity.guid, g("model"));

    // walking through a non-instance stops
    assert!(resolve_entity_path(&commands, root, &EntityPath::new(vec![g("zone"), g("model")])).is_none());
    assert!(resolve_entity_path(&commands, root, &EntityPath::new(vec![g("missing")])).is_none());
    assert!(resolve_entity_path(&commands, root, &EntityPath::new(vec![ShortGuid::INVALID])).is_none());
}

#[test]
fn test_scope_applies_alias_transform() {
    let commands: Commands = load_bytes(&sample()).expect("decode");
    let root = commands.get_composite(g("ROOT")).expect("root");
    let inner = commands.get_composite(g("INNER")).expect("inner");

    let scope = OverrideScope::root(root).descend(g("inst"), inner);
    let model = inner.get_entity(g("model")).expect("model");
    let ov = scope.override_for(g("model")).expect("alias applies");
    assert_eq!(ov.owner, g("ROOT"));
    assert_eq!(effective_transform(model, Some(ov)).map(|t| t.position), Some(Vec3::ONE));
}

#[test]
fn test_zone_lookup() {
    let commands: Commands = load_bytes(&sample()).expect("decode");
    let found = find_zone_for_entity(&commands, g("INNER"), g("model")).expect("zone");
    assert_eq!(found.zone, g("zone"));
    assert_eq!(found.trigger_sequence, g("trig"));
    assert_eq!(found.composite, g("ROOT"));

    assert!(find_zone_for_entity(&commands, g("INNER"), g("proxy")).is_none());
}

#[test]
fn test_duplicate_entity_is_malformed() {
    let mut dup = composite(g("A"), "A", vec![builtin(g("x"), FunctionType::Zone)]);
    // bypass the insert check
    dup.functions.push(builtin(g("x"), FunctionType::Checkpoint));
    let bytes = encode_commands([g("A"), ShortGuid::INVALID, ShortGuid::INVALID], &[dup]);

    match load_bytes::<Commands>(&bytes) {
        Err(Error::MalformedContainer { container, .. }) => assert_eq!(container, "COMMANDS.PAK"),
        other => panic!("expected malformed, got {:?}", other.map(|c| c.composites().len())),
    }
}

#[test]
fn test_truncated_file_is_malformed() {
    let bytes = sample();
    assert!(load_bytes::<Commands>(&bytes[..bytes.len() - 3]).is_err());
}
