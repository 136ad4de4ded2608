//! COMMANDS.PAK builders for tests

use crate::composite::Composite;
use crate::entity::{Entity, EntityKind, EntityLink, EntityPath, FunctionRef, SequenceEntry};
use crate::function_type::FunctionType;
use crate::parameter::{Parameter, ParameterValue, ResourceReference, ResourceType, Transform};
use cathode_core::{ByteWriter, ShortGuid};
use glam::Vec3;

/// Encode composites as COMMANDS.PAK bytes
pub fn encode_commands(entry_points: [ShortGuid; 3], composites: &[Composite]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.header(b"CMDS");
    for guid in entry_points {
        w.guid(guid);
    }
    w.u32(composites.len() as u32);
    for composite in composites {
        w.guid(composite.guid).lstring(&composite.name);

        w.u32(composite.functions.len() as u32);
        for e in &composite.functions {
            let (function, sequence) = match &e.kind {
                EntityKind::Function { function, sequence } => (*function, sequence),
                _ => continue,
            };
            w.guid(e.guid).guid(function.guid());
            write_parameters(&mut w, &e.parameters);
            write_links(&mut w, &e.links);
            if function == FunctionRef::Builtin(FunctionType::TriggerSequence) {
                w.u32(sequence.len() as u32);
                for entry in sequence {
                    w.f32(entry.timing);
                    write_path(&mut w, &entry.path);
                }
            }
        }

        w.u32(composite.variables.len() as u32);
        for e in &composite.variables {
            if let EntityKind::Variable { name, data_type } = &e.kind {
                w.guid(e.guid).guid(*name).u8(data_type.code());
                write_parameters(&mut w, &e.parameters);
                write_links(&mut w, &e.links);
            }
        }

        w.u32(composite.aliases.len() as u32);
        for e in &composite.aliases {
            if let EntityKind::Alias { path } = &e.kind {
                w.guid(e.guid);
                write_path(&mut w, path);
                write_parameters(&mut w, &e.parameters);
                write_links(&mut w, &e.links);
            }
        }

        w.u32(composite.proxies.len() as u32);
        for e in &composite.proxies {
            if let EntityKind::Proxy { function, path } = &e.kind {
                w.guid(e.guid).guid(*function);
                write_path(&mut w, path);
                write_parameters(&mut w, &e.parameters);
                write_links(&mut w, &e.links);
            }
        }
    }
    w.finish()
}

fn write_path(w: &mut ByteWriter, path: &EntityPath) {
    w.u32(path.len() as u32);
    for &guid in path.as_slice() {
        w.guid(guid);
    }
}

fn write_links(w: &mut ByteWriter, links: &[EntityLink]) {
    w.u32(links.len() as u32);
    for l in links {
        w.guid(l.link_guid).guid(l.parent_param).guid(l.child).guid(l.child_param);
    }
}

fn write_parameters(w: &mut ByteWriter, params: &[Parameter]) {
    w.u32(params.len() as u32);
    for p in params {
        w.guid(p.name).u8(p.value.data_type().code());
        match &p.value {
            ParameterValue::Transform(t) => {
                w.vec3(t.position).vec3(t.rotation);
            }
            ParameterValue::Integer(v) => {
                w.i32(*v);
            }
            ParameterValue::String(s) => {
                w.lstring(s);
            }
            ParameterValue::Bool(b) => {
                w.u8(*b as u8);
            }
            ParameterValue::Float(f) => {
                w.f32(*f);
            }
            ParameterValue::Resource(refs) => {
                w.u32(refs.len() as u32);
                for r in refs {
                    w.guid(r.resource_guid).u32(r.resource_type.code()).i32(r.index).i32(r.count);
                }
            }
            ParameterValue::Vector(v) => {
                w.vec3(*v);
            }
            ParameterValue::Enum { enum_guid, index } => {
                w.guid(*enum_guid).i32(*index);
            }
        }
    }
}

fn function(guid: ShortGuid, function: FunctionRef, parameters: Vec<Parameter>) -> Entity {
    Entity {
        guid,
        kind: EntityKind::Function {
            function,
            sequence: Vec::new(),
        },
        parameters,
        links: Vec::new(),
    }
}

fn position(position: Vec3) -> Parameter {
    Parameter::named(
        "position",
        ParameterValue::Transform(Transform::new(position, Vec3::ZERO)),
    )
}

/// ModelReference at `at` drawing `count` elements from REDS index `index`
pub fn model_reference(guid: ShortGuid, at: Vec3, index: i32, count: i32) -> Entity {
    function(
        guid,
        FunctionRef::Builtin(FunctionType::ModelReference),
        vec![
            position(at),
            Parameter::named(
                "resource",
                ParameterValue::Resource(vec![ResourceReference {
                    resource_guid: guid,
                    resource_type: ResourceType::RenderableInstance,
                    index,
                    count,
                }]),
            ),
        ],
    )
}

/// Instance of composite `target` at `at`
pub fn instance(guid: ShortGuid, target: ShortGuid, at: Vec3) -> Entity {
    function(guid, FunctionRef::Composite(target), vec![position(at)])
}

/// Built-in function with no parameters
pub fn builtin(guid: ShortGuid, ty: FunctionType) -> Entity {
    function(guid, FunctionRef::Builtin(ty), Vec::new())
}

/// TriggerSequence with one entry per path
pub fn trigger_sequence(guid: ShortGuid, paths: Vec<Vec<ShortGuid>>) -> Entity {
    let sequence = paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| SequenceEntry {
            timing: i as f32,
            path: EntityPath::new(path),
        })
        .collect();
    Entity {
        guid,
        kind: EntityKind::Function {
            function: FunctionRef::Builtin(FunctionType::TriggerSequence),
            sequence,
        },
        parameters: Vec::new(),
        links: Vec::new(),
    }
}

/// Zone whose `composites` parameter links to `trigger`
pub fn zone(guid: ShortGuid, trigger: ShortGuid) -> Entity {
    let mut entity = builtin(guid, FunctionType::Zone);
    entity.links.push(EntityLink {
        link_guid: ShortGuid::from_name("link"),
        parent_param: ShortGuid::from_name("composites"),
        child: trigger,
        child_param: ShortGuid::from_name("trigger"),
    });
    entity
}

/// Alias along `path`, optionally overriding position
pub fn alias(guid: ShortGuid, path: Vec<ShortGuid>, at: Option<Vec3>) -> Entity {
    Entity {
        guid,
        kind: EntityKind::Alias {
            path: EntityPath::new(path),
        },
        parameters: at.map(position).into_iter().collect(),
        links: Vec::new(),
    }
}

/// Proxy along `path`
pub fn proxy(guid: ShortGuid, function: ShortGuid, path: Vec<ShortGuid>) -> Entity {
    Entity {
        guid,
        kind: EntityKind::Proxy {
            function,
            path: EntityPath::new(path),
        },
        parameters: Vec::new(),
        links: Vec::new(),
    }
}

/// Composite holding `entities`
pub fn composite(guid: ShortGuid, name: &str, entities: Vec<Entity>) -> Composite {
    let mut composite = Composite::new(guid, name);
    for entity in entities {
        composite.insert(entity);
    }
    composite
}
