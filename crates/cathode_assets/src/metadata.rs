//! Shader categories and their texture / constant-buffer layouts

use std::fmt;

/// Shader category stored in a shader entry header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ShaderCategory {
    CA_PARTICLE,
    CA_RIBBON,
    CA_ENVIRONMENT,
    CA_DECAL_ENVIRONMENT,
    CA_CHARACTER,
    CA_SKIN,
    CA_HAIR,
    CA_EYE,
    CA_SKIN_OCCLUSION,
    CA_DECAL,
    CA_FOGPLANE,
    CA_FOGSPHERE,
    CA_REFRACTION,
    CA_NONINTERACTIVE_WATER,
    CA_LOW_LOD_CHARACTER,
    CA_LIGHT_DECAL,
    CA_SPACESUIT_VISOR,
    CA_PLANET,
    CA_LIGHTMAP_ENVIRONMENT,
    CA_TERRAIN,
    CA_CAMERA_MAP,
    CA_SLIDEUP,
    CA_EFFECT_OVERLAY,
    CA_SHADOWCASTER,
    CA_DEFERRED,
    CA_DEBUG,
    CA_OCCLUSION_CULLING,
    CA_VOLUME_LIGHT,
    CA_STREAMER,
    CA_SIMPLE_REFRACTION,
    CA_DISTORTION_OVERLAY,
    CA_SIMPLEDIFFUSE,
    Unknown(u8),
}

const CATEGORIES: [ShaderCategory; 32] = {
    use ShaderCategory::*;
    [
        CA_PARTICLE,
        CA_RIBBON,
        CA_ENVIRONMENT,
        CA_DECAL_ENVIRONMENT,
        CA_CHARACTER,
        CA_SKIN,
        CA_HAIR,
        CA_EYE,
        CA_SKIN_OCCLUSION,
        CA_DECAL,
        CA_FOGPLANE,
        CA_FOGSPHERE,
        CA_REFRACTION,
        CA_NONINTERACTIVE_WATER,
        CA_LOW_LOD_CHARACTER,
        CA_LIGHT_DECAL,
        CA_SPACESUIT_VISOR,
        CA_PLANET,
        CA_LIGHTMAP_ENVIRONMENT,
        CA_TERRAIN,
        CA_CAMERA_MAP,
        CA_SLIDEUP,
        CA_EFFECT_OVERLAY,
        CA_SHADOWCASTER,
        CA_DEFERRED,
        CA_DEBUG,
        CA_OCCLUSION_CULLING,
        CA_VOLUME_LIGHT,
        CA_STREAMER,
        CA_SIMPLE_REFRACTION,
        CA_DISTORTION_OVERLAY,
        CA_SIMPLEDIFFUSE,
    ]
};

impl ShaderCategory {
    pub fn from_code(code: u8) -> Self {
        CATEGORIES
            .get(code as usize)
            .copied()
            .unwrap_or(Self::Unknown(code))
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Unknown(code) => code,
            known => CATEGORIES.iter().position(|&c| c == known).unwrap_or_default() as u8,
        }
    }

    /// Parameter layout family, `None` if the category is never rendered
    pub fn family(self) -> Option<LayoutFamily> {
        use ShaderCategory::*;
        Some(match self {
            CA_ENVIRONMENT | CA_DECAL_ENVIRONMENT | CA_NONINTERACTIVE_WATER | CA_LIGHT_DECAL
            | CA_SIMPLE_REFRACTION => LayoutFamily::Environment,
            CA_CHARACTER | CA_SKIN | CA_HAIR | CA_SKIN_OCCLUSION | CA_LOW_LOD_CHARACTER
            | CA_SPACESUIT_VISOR => LayoutFamily::Character,
            CA_EYE => LayoutFamily::Eye,
            CA_LIGHTMAP_ENVIRONMENT | CA_TERRAIN | CA_PLANET => LayoutFamily::Lightmap,
            CA_PARTICLE | CA_RIBBON | CA_STREAMER | CA_DISTORTION_OVERLAY => LayoutFamily::Particle,
            CA_CAMERA_MAP | CA_SLIDEUP | CA_SIMPLEDIFFUSE => LayoutFamily::Generic,
            CA_SHADOWCASTER | CA_DEFERRED | CA_DEBUG | CA_OCCLUSION_CULLING | CA_FOGSPHERE
            | CA_FOGPLANE | CA_EFFECT_OVERLAY | CA_DECAL | CA_VOLUME_LIGHT | CA_REFRACTION
            | Unknown(_) => return None,
        })
    }

    pub fn is_renderable(self) -> bool {
        self.family().is_some()
    }
}

impl fmt::Display for ShaderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "UNKNOWN_{}", code),
            known => fmt::Debug::fmt(known, f),
        }
    }
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// Every variant
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Semantic name
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum!(
    /// Semantic texture slot of a material
    TextureSlot {
        DiffuseMap,
        NormalMap,
        SpecularMap,
        Occlusion,
        Emissive,
        ColorRampMap,
        SecondaryDiffuseMap,
        DiffuseMapStatic,
        Opacity,
        SecondaryNormalMap,
        SecondarySpecularMap,
        EnvironmentMap,
        FresnelLut,
        ParallaxMap,
        OpacityNoiseMap,
        DirtMap,
        WetnessNoise,
        AlphaThreshold,
        IrradianceMap,
        ConvolvedDiffuse,
        WrinkleMask,
        WrinkleNormalMap,
        ScatterMap,
        BurnThrough,
        Liquify,
        Liquify2,
        ColorRamp,
        FlowMap,
        FlowTextureMap,
        AlphaMask,
        LowLodCharacterMask,
        UnscaledDirtMap,
        FaceMap,
        MaskingMap,
        AtmosphereMap,
        DetailMap,
        LightMap,
    }
);

named_enum!(
    /// Semantic constant-buffer parameter of a material
    ShaderParam {
        Diffuse0,
        DiffuseMap0UVMultiplier,
        NormalMap0UVMultiplier,
        OcclusionMapUVMultiplier,
        SpecularMap0UVMultiplier,
        Diffuse1,
        DiffuseMap1UVMultiplier,
        DirtPower,
        DirtStrength,
        DirtUVMultiplier,
        Emission,
        EmissiveFactor,
        EnvironmentMapEmission,
        EnvironmentMapStrength,
        FresnelLUT,
        Iris0,
        Iris1,
        Iris2,
        IrisParallaxDisplacement,
        IsTransparent,
        LimbalSmoothRadius,
        Metallic,
        MetallicFactor0,
        MetallicFactor1,
        NormalMap0Strength,
        NormalMap0UVMultiplierOfMultiplier,
        NormalMap1Strength,
        NormalMap1UVMultiplier,
        NormalMapStrength,
        NormalMapUVMultiplier,
        OcclusionTint,
        OpacityMapUVMultiplier,
        OpacityNoiseAmplitude,
        OpacityNoiseMapUVMultiplier,
        ParallaxFactor,
        ParallaxMapUVMultiplier,
        ParallaxOffset,
        PupilDilation,
        RetinaIndexOfRefraction,
        RetinaRadius,
        ScatterMapMultiplier,
        SpecularFactor0,
        SpecularFactor1,
        SpecularMap1UVMultiplier,
    }
);

/// Numeric layout of a parameter in the constant buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamLayout {
    /// One `f32`
    Scalar,
    /// Four consecutive `f32`s
    Vector4,
}

impl ShaderParam {
    pub fn layout(self) -> ParamLayout {
        match self {
            Self::Diffuse0
            | Self::Diffuse1
            | Self::Emission
            | Self::OcclusionTint
            | Self::Iris0
            | Self::Iris1
            | Self::Iris2 => ParamLayout::Vector4,
            _ => ParamLayout::Scalar,
        }
    }
}

/// Group of categories sharing one texture and parameter layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutFamily {
    Environment,
    Character,
    Eye,
    Lightmap,
    Particle,
    Generic,
}

mod layouts {
    use super::ShaderParam::{self, *};
    use super::TextureSlot::{self, *};

    pub const ENVIRONMENT_TEXTURES: &[TextureSlot] = &[
        DiffuseMap,
        SecondaryDiffuseMap,
        NormalMap,
        SecondaryNormalMap,
        SpecularMap,
        SecondarySpecularMap,
        EnvironmentMap,
        Occlusion,
        FresnelLut,
        ParallaxMap,
        OpacityNoiseMap,
        DirtMap,
        WetnessNoise,
        AlphaThreshold,
        Emissive,
        Opacity,
    ];

    pub const ENVIRONMENT_PARAMS: &[(ShaderParam, usize)] = &[
        (Diffuse0, 3),
        (DiffuseMap0UVMultiplier, 4),
        (NormalMap0UVMultiplier, 5),
        (NormalMap0Strength, 6),
        (SpecularFactor0, 7),
        (SpecularMap0UVMultiplier, 8),
        (MetallicFactor0, 9),
        (Diffuse1, 10),
        (DiffuseMap1UVMultiplier, 11),
        (NormalMap1UVMultiplier, 12),
        (NormalMap1Strength, 13),
        (SpecularFactor1, 14),
        (SpecularMap1UVMultiplier, 15),
        (MetallicFactor1, 16),
        (OcclusionMapUVMultiplier, 17),
        (OcclusionTint, 18),
        (Emission, 19),
        (EmissiveFactor, 20),
        (EnvironmentMapStrength, 21),
        (EnvironmentMapEmission, 22),
        (ParallaxMapUVMultiplier, 23),
        (ParallaxFactor, 24),
        (ParallaxOffset, 25),
        (DirtPower, 26),
        (DirtStrength, 27),
        (DirtUVMultiplier, 28),
        (OpacityMapUVMultiplier, 29),
        (OpacityNoiseMapUVMultiplier, 30),
        (OpacityNoiseAmplitude, 31),
        (IsTransparent, 32),
    ];

    pub const CHARACTER_TEXTURES: &[TextureSlot] = &[
        DiffuseMap,
        NormalMap,
        SpecularMap,
        Occlusion,
        WrinkleMask,
        WrinkleNormalMap,
        ScatterMap,
        BurnThrough,
        Liquify,
        Liquify2,
        DirtMap,
        LowLodCharacterMask,
        FaceMap,
        MaskingMap,
        UnscaledDirtMap,
    ];

    pub const CHARACTER_PARAMS: &[(ShaderParam, usize)] = &[
        (Diffuse0, 0),
        (DiffuseMap0UVMultiplier, 1),
        (NormalMap0UVMultiplier, 2),
        (NormalMapStrength, 3),
        (SpecularFactor0, 4),
        (Metallic, 5),
        (ScatterMapMultiplier, 6),
        (DirtPower, 7),
        (DirtStrength, 8),
        (DirtUVMultiplier, 9),
    ];

    pub const EYE_TEXTURES: &[TextureSlot] = &[
        DiffuseMap,
        NormalMap,
        ColorRampMap,
        EnvironmentMap,
        ConvolvedDiffuse,
        IrradianceMap,
    ];

    pub const EYE_PARAMS: &[(ShaderParam, usize)] = &[
        (Iris0, 0),
        (Iris1, 1),
        (Iris2, 2),
        (IrisParallaxDisplacement, 3),
        (LimbalSmoothRadius, 4),
        (PupilDilation, 5),
        (RetinaIndexOfRefraction, 6),
        (RetinaRadius, 7),
        (Diffuse0, 8),
        (NormalMapUVMultiplier, 9),
        (NormalMapStrength, 10),
    ];

    pub const LIGHTMAP_TEXTURES: &[TextureSlot] = &[
        DiffuseMap,
        NormalMap,
        SpecularMap,
        LightMap,
        DetailMap,
        AtmosphereMap,
    ];

    pub const LIGHTMAP_PARAMS: &[(ShaderParam, usize)] = &[
        (Diffuse0, 0),
        (DiffuseMap0UVMultiplier, 1),
        (NormalMapUVMultiplier, 2),
        (NormalMapStrength, 3),
        (SpecularFactor0, 4),
        (Emission, 5),
        (EmissiveFactor, 6),
    ];

    pub const PARTICLE_TEXTURES: &[TextureSlot] = &[
        DiffuseMap,
        ColorRamp,
        AlphaMask,
        FlowMap,
        FlowTextureMap,
        Opacity,
    ];

    pub const PARTICLE_PARAMS: &[(ShaderParam, usize)] = &[
        (Diffuse0, 0),
        (DiffuseMap0UVMultiplier, 1),
        (Emission, 2),
        (EmissiveFactor, 3),
        (IsTransparent, 4),
    ];

    pub const GENERIC_TEXTURES: &[TextureSlot] =
        &[DiffuseMap, NormalMap, SpecularMap, Emissive, Opacity];

    pub const GENERIC_PARAMS: &[(ShaderParam, usize)] = &[
        (Diffuse0, 0),
        (DiffuseMap0UVMultiplier, 1),
        (NormalMapUVMultiplier, 2),
        (SpecularFactor0, 3),
        (Emission, 4),
        (EmissiveFactor, 5),
    ];
}

impl LayoutFamily {
    /// Ordered texture slots; slot `j` binds through `texture_links[j]`
    pub fn texture_slots(self) -> &'static [TextureSlot] {
        match self {
            Self::Environment => layouts::ENVIRONMENT_TEXTURES,
            Self::Character => layouts::CHARACTER_TEXTURES,
            Self::Eye => layouts::EYE_TEXTURES,
            Self::Lightmap => layouts::LIGHTMAP_TEXTURES,
            Self::Particle => layouts::PARTICLE_TEXTURES,
            Self::Generic => layouts::GENERIC_TEXTURES,
        }
    }

    /// Parameter to metadata slot index into each `cst_links` table
    pub fn cst_indexes(self) -> &'static [(ShaderParam, usize)] {
        match self {
            Self::Environment => layouts::ENVIRONMENT_PARAMS,
            Self::Character => layouts::CHARACTER_PARAMS,
            Self::Eye => layouts::EYE_PARAMS,
            Self::Lightmap => layouts::LIGHTMAP_PARAMS,
            Self::Particle => layouts::PARTICLE_PARAMS,
            Self::Generic => layouts::GENERIC_PARAMS,
        }
    }
}

/// Classification of a material's shader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderMaterialMetadata {
    pub category: ShaderCategory,
    family: Option<LayoutFamily>,
}

impl ShaderMaterialMetadata {
    /// Metadata for a category
    pub fn for_category(category: ShaderCategory) -> Self {
        Self {
            category,
            family: category.family(),
        }
    }

    /// Sentinel for a category that is never rendered
    pub fn not_renderable(category: ShaderCategory) -> Self {
        Self {
            category,
            family: None,
        }
    }

    /// Callers must check this before resolving textures or parameters
    pub fn is_renderable(&self) -> bool {
        self.family.is_some()
    }

    pub fn family(&self) -> Option<LayoutFamily> {
        self.family
    }

    /// Ordered texture slots (empty when not renderable)
    pub fn texture_slots(&self) -> &'static [TextureSlot] {
        match self.family {
            Some(family) => family.texture_slots(),
            None => &[],
        }
    }

    /// Named constant-buffer slots (empty when not renderable)
    pub fn cst_indexes(&self) -> &'static [(ShaderParam, usize)] {
        match self.family {
            Some(family) => family.cst_indexes(),
            None => &[],
        }
    }

    /// Metadata slot index of one parameter
    pub fn cst_index(&self, param: ShaderParam) -> Option<usize> {
        self.cst_indexes()
            .iter()
            .find(|(p, _)| *p == param)
            .map(|&(_, slot)| slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_category_codes() {
        for code in 0..32u8 {
            let category = ShaderCategory::from_code(code);
            assert_ne!(category, ShaderCategory::Unknown(code));
            assert_eq!(category.code(), code);
        }
        assert_eq!(ShaderCategory::from_code(7), ShaderCategory::CA_EYE);
        assert_eq!(ShaderCategory::from_code(40), ShaderCategory::Unknown(40));
        assert_eq!(ShaderCategory::CA_ENVIRONMENT.to_string(), "CA_ENVIRONMENT");
    }

    #[test]
    fn test_unsupported_set() {
        use ShaderCategory::*;
        let unsupported = [
            CA_SHADOWCASTER,
            CA_DEFERRED,
            CA_DEBUG,
            CA_OCCLUSION_CULLING,
            CA_FOGSPHERE,
            CA_FOGPLANE,
            CA_EFFECT_OVERLAY,
            CA_DECAL,
            CA_VOLUME_LIGHT,
            CA_REFRACTION,
            Unknown(99),
        ];
        for category in unsupported {
            let meta = ShaderMaterialMetadata::for_category(category);
            assert!(!meta.is_renderable(), "{} should not render", category);
            assert!(meta.texture_slots().is_empty());
            assert!(meta.cst_indexes().is_empty());
        }
        assert!(CA_ENVIRONMENT.is_renderable());
        assert!(CA_SKIN.is_renderable());
    }

    #[test]
    fn test_layouts_have_unique_entries() {
        let families = [
            LayoutFamily::Environment,
            LayoutFamily::Character,
            LayoutFamily::Eye,
            LayoutFamily::Lightmap,
            LayoutFamily::Particle,
            LayoutFamily::Generic,
        ];
        for family in families {
            let slots: HashSet<_> = family.texture_slots().iter().collect();
            assert_eq!(slots.len(), family.texture_slots().len());
            let params: HashSet<_> = family.cst_indexes().iter().map(|(p, _)| p).collect();
            assert_eq!(params.len(), family.cst_indexes().len());
            let indexes: HashSet<_> = family.cst_indexes().iter().map(|(_, i)| i).collect();
            assert_eq!(indexes.len(), family.cst_indexes().len());
        }
        assert_eq!(ShaderParam::ALL.len(), 44);
        assert_eq!(TextureSlot::ALL.len(), 37);
    }

    #[test]
    fn test_eye_params() {
        let meta = ShaderMaterialMetadata::for_category(ShaderCategory::CA_EYE);
        assert_eq!(meta.cst_index(ShaderParam::PupilDilation), Some(5));
        assert_eq!(meta.cst_index(ShaderParam::DirtPower), None);
        assert_eq!(ShaderParam::Iris0.layout(), ParamLayout::Vector4);
        assert_eq!(ShaderParam::PupilDilation.layout(), ParamLayout::Scalar);
    }
}
