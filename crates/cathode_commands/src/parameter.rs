//! Typed parameter values attached to entities

use cathode_core::{ByteReader, Result, ShortGuid};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// On-disk data type code of a parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    Transform = 0,
    Integer = 1,
    String = 2,
    Bool = 3,
    Float = 4,
    Resource = 5,
    Vector = 6,
    Enum = 7,
}

impl DataType {
    /// Decode a type code
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Transform,
            1 => Self::Integer,
            2 => Self::String,
            3 => Self::Bool,
            4 => Self::Float,
            5 => Self::Resource,
            6 => Self::Vector,
            7 => Self::Enum,
            _ => return None,
        })
    }

    /// On-disk code
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Kind of a resource reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    RenderableInstance,
    CollisionMapping,
    DynamicPhysicsSystem,
    ExclusiveMasterStateResource,
    NavMeshBarrierResource,
    TraversalSegment,
    AnimatedModel,
    Unknown(u32),
}

impl ResourceType {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::RenderableInstance,
            1 => Self::CollisionMapping,
            2 => Self::DynamicPhysicsSystem,
            3 => Self::ExclusiveMasterStateResource,
            4 => Self::NavMeshBarrierResource,
            5 => Self::TraversalSegment,
            6 => Self::AnimatedModel,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::RenderableInstance => 0,
            Self::CollisionMapping => 1,
            Self::DynamicPhysicsSystem => 2,
            Self::ExclusiveMasterStateResource => 3,
            Self::NavMeshBarrierResource => 4,
            Self::TraversalSegment => 5,
            Self::AnimatedModel => 6,
            Self::Unknown(code) => code,
        }
    }
}

/// Pointer into the flat renderable-element table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceReference {
    /// Resource GUID (matches RESOURCES.BIN usage records)
    pub resource_guid: ShortGuid,
    pub resource_type: ResourceType,
    /// First element in REDS.BIN
    pub index: i32,
    /// Number of contiguous elements
    pub count: i32,
}

impl ResourceReference {
    pub fn is_renderable(&self) -> bool {
        self.resource_type == ResourceType::RenderableInstance
    }
}

/// Position plus Euler rotation in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees (X pitch, Y yaw, Z roll)
    pub rotation: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };

    /// Create a new transform
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Rotation as a quaternion (applied Z, then X, then Y)
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y.to_radians(),
            self.rotation.x.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Local-to-parent matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.quat(), self.position)
    }
}

/// Typed parameter payload
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    Transform(Transform),
    Integer(i32),
    String(String),
    Bool(bool),
    Float(f32),
    Resource(Vec<ResourceReference>),
    Vector(Vec3),
    Enum { enum_guid: ShortGuid, index: i32 },
}

impl ParameterValue {
    /// Data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Transform(_) => DataType::Transform,
            Self::Integer(_) => DataType::Integer,
            Self::String(_) => DataType::String,
            Self::Bool(_) => DataType::Bool,
            Self::Float(_) => DataType::Float,
            Self::Resource(_) => DataType::Resource,
            Self::Vector(_) => DataType::Vector,
            Self::Enum { .. } => DataType::Enum,
        }
    }

    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            Self::Transform(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_resources(&self) -> Option<&[ResourceReference]> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Named parameter on an entity
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: ShortGuid,
    pub value: ParameterValue,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(name: ShortGuid, value: ParameterValue) -> Self {
        Self { name, value }
    }

    /// Create a parameter keyed by the GUID of `name`
    pub fn named(name: &str, value: ParameterValue) -> Self {
        Self::new(ShortGuid::from_name(name), value)
    }
}

pub(crate) fn read_value(reader: &mut ByteReader<'_>, data_type: DataType) -> Result<ParameterValue> {
    Ok(match data_type {
        DataType::Transform => ParameterValue::Transform(Transform {
            position: reader.read_vec3()?,
            rotation: reader.read_vec3()?,
        }),
        DataType::Integer => ParameterValue::Integer(reader.read_i32()?),
        DataType::String => ParameterValue::String(reader.read_lstring()?),
        DataType::Bool => ParameterValue::Bool(reader.read_u8()? != 0),
        DataType::Float => ParameterValue::Float(reader.read_f32()?),
        DataType::Resource => {
            let count = reader.read_count(16)?;
            let mut refs = Vec::with_capacity(count);
            for _ in 0..count {
                refs.push(ResourceReference {
                    resource_guid: reader.read_guid()?,
                    resource_type: ResourceType::from_code(reader.read_u32()?),
                    index: reader.read_i32()?,
                    count: reader.read_i32()?,
                });
            }
            ParameterValue::Resource(refs)
        }
        DataType::Vector => ParameterValue::Vector(reader.read_vec3()?),
        DataType::Enum => ParameterValue::Enum {
            enum_guid: reader.read_guid()?,
            index: reader.read_i32()?,
        },
    })
}

pub(crate) fn read_data_type(reader: &mut ByteReader<'_>) -> Result<DataType> {
    let code = reader.read_u8()?;
    DataType::from_code(code).ok_or_else(|| reader.error(format!("unknown data type {}", code)))
}

pub(crate) fn read_parameters(reader: &mut ByteReader<'_>) -> Result<Vec<Parameter>> {
    // name + type code is the smallest possible record
    let count = reader.read_count(5)?;
    let mut params = Vec::with_capacity(count);
    for _ in 0..count {
        let name = reader.read_guid()?;
        let data_type = read_data_type(reader)?;
        params.push(Parameter::new(name, read_value(reader, data_type)?));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_quat_yaw() {
        let t = Transform::new(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0));
        let forward = t.quat() * Vec3::Z;
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_unknown_resource_type_kept() {
        assert_eq!(ResourceType::from_code(42), ResourceType::Unknown(42));
        assert_eq!(ResourceType::Unknown(42).code(), 42);
        assert_eq!(ResourceType::from_code(0), ResourceType::RenderableInstance);
    }

    #[test]
    fn test_unknown_data_type_is_malformed() {
        let bytes = [1u8, 0, 0, 0, 0, 0, 0, 0, 9];
        let mut reader = ByteReader::new("COMMANDS.PAK", &bytes);
        assert!(read_parameters(&mut reader).is_err());
    }
}
