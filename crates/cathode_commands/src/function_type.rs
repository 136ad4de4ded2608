//! Built-in function types
//!
//! A function entity's type GUID is looked up here first. Only a miss makes it
//! a composite instance.

use cathode_core::ShortGuid;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Built-in entity behaviours the level layer understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionType {
    ModelReference,
    EnvironmentModelReference,
    LightReference,
    TriggerSequence,
    Zone,
    PlayerTriggerBox,
    SoundObject,
    ParticleEmitterReference,
    CAGEAnimation,
    CharacterReference,
    SplineReference,
    CameraReference,
    PhysicsSystem,
    CollisionBarrier,
    NavMeshBarrier,
    Checkpoint,
}

impl FunctionType {
    /// Every built-in type
    pub const ALL: [FunctionType; 16] = [
        Self::ModelReference,
        Self::EnvironmentModelReference,
        Self::LightReference,
        Self::TriggerSequence,
        Self::Zone,
        Self::PlayerTriggerBox,
        Self::SoundObject,
        Self::ParticleEmitterReference,
        Self::CAGEAnimation,
        Self::CharacterReference,
        Self::SplineReference,
        Self::CameraReference,
        Self::PhysicsSystem,
        Self::CollisionBarrier,
        Self::NavMeshBarrier,
        Self::Checkpoint,
    ];

    /// Type name as hashed into its GUID
    pub const fn name(self) -> &'static str {
        match self {
            Self::ModelReference => "ModelReference",
            Self::EnvironmentModelReference => "EnvironmentModelReference",
            Self::LightReference => "LightReference",
            Self::TriggerSequence => "TriggerSequence",
            Self::Zone => "Zone",
            Self::PlayerTriggerBox => "PlayerTriggerBox",
            Self::SoundObject => "SoundObject",
            Self::ParticleEmitterReference => "ParticleEmitterReference",
            Self::CAGEAnimation => "CAGEAnimation",
            Self::CharacterReference => "CharacterReference",
            Self::SplineReference => "SplineReference",
            Self::CameraReference => "CameraReference",
            Self::PhysicsSystem => "PhysicsSystem",
            Self::CollisionBarrier => "CollisionBarrier",
            Self::NavMeshBarrier => "NavMeshBarrier",
            Self::Checkpoint => "Checkpoint",
        }
    }

    /// GUID stored in a function entity's `function` field
    pub fn guid(self) -> ShortGuid {
        ShortGuid::from_name(self.name())
    }

    /// Look up a built-in type by GUID
    pub fn from_guid(guid: ShortGuid) -> Option<Self> {
        static LOOKUP: OnceLock<HashMap<ShortGuid, FunctionType>> = OnceLock::new();
        LOOKUP
            .get_or_init(|| Self::ALL.iter().map(|&ty| (ty.guid(), ty)).collect())
            .get(&guid)
            .copied()
    }

    /// Whether entities of this type carry renderable resources
    pub fn is_model_reference(self) -> bool {
        matches!(self, Self::ModelReference | Self::EnvironmentModelReference)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
