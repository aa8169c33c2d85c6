//! Surface materials and their physical/acoustic properties.
//!
//! Every rigid body carries a material tag; the table maps tags to the
//! contact parameters the engine needs (restitution, friction, density) and
//! the acoustic parameters the collision sound pipeline needs (pitch base,
//! volume base).

use serde::{Deserialize, Serialize};

/// Surface material tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    /// Soft tissue.
    Flesh,
    /// Dense organic material.
    Bone,
    /// Timber surfaces.
    Wood,
    /// Rock and masonry.
    Stone,
    /// Ferrous and non-ferrous metal.
    Metal,
    /// Elastomers.
    Rubber,
}

impl Material {
    /// All material tags, in table order.
    pub const ALL: [Material; 6] = [
        Material::Flesh,
        Material::Bone,
        Material::Wood,
        Material::Stone,
        Material::Metal,
        Material::Rubber,
    ];

    /// Stable lowercase name used in sound sample keys.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Material::Flesh => "flesh",
            Material::Bone => "bone",
            Material::Wood => "wood",
            Material::Stone => "stone",
            Material::Metal => "metal",
            Material::Rubber => "rubber",
        }
    }

    const fn index(self) -> usize {
        match self {
            Material::Flesh => 0,
            Material::Bone => 1,
            Material::Wood => 2,
            Material::Stone => 3,
            Material::Metal => 4,
            Material::Rubber => 5,
        }
    }
}

/// Physical and acoustic properties of one material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Coefficient of restitution in [0, 1].
    pub restitution: f32,
    /// Friction coefficient (≥ 0).
    pub friction: f32,
    /// Density in kg/m³ (> 0).
    pub density_kg_m3: f32,
    /// Characteristic impact pitch in Hz (> 0).
    pub pitch_base_hz: f32,
    /// Baseline loudness contribution in [0, 1].
    pub volume_base: f32,
}

impl MaterialProperties {
    /// True when every field is finite and inside its documented range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.restitution.is_finite()
            && (0.0..=1.0).contains(&self.restitution)
            && self.friction.is_finite()
            && self.friction >= 0.0
            && self.density_kg_m3.is_finite()
            && self.density_kg_m3 > 0.0
            && self.pitch_base_hz.is_finite()
            && self.pitch_base_hz > 0.0
            && self.volume_base.is_finite()
            && (0.0..=1.0).contains(&self.volume_base)
    }
}

/// Immutable per-material property table.
///
/// Built once at configuration time and handed to the simulation; entries are
/// indexed by [`Material`], so there is no out-of-range tag to reject.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialTable {
    entries: [MaterialProperties; 6],
}

impl MaterialTable {
    /// Build a table from entries listed in [`Material::ALL`] order.
    #[must_use]
    pub const fn from_entries(entries: [MaterialProperties; 6]) -> Self {
        Self { entries }
    }

    /// Look up the properties for a material tag.
    #[must_use]
    pub const fn get(&self, material: Material) -> MaterialProperties {
        self.entries[material.index()]
    }

    /// Replace one entry, returning the updated table.
    #[must_use]
    pub const fn with_entry(mut self, material: Material, props: MaterialProperties) -> Self {
        self.entries[material.index()] = props;
        self
    }

    /// True when every entry passes [`MaterialProperties::is_valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(MaterialProperties::is_valid)
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::from_entries([
            // Flesh
            MaterialProperties {
                restitution: 0.1,
                friction: 0.8,
                density_kg_m3: 985.0,
                pitch_base_hz: 180.0,
                volume_base: 0.4,
            },
            // Bone
            MaterialProperties {
                restitution: 0.3,
                friction: 0.5,
                density_kg_m3: 1900.0,
                pitch_base_hz: 900.0,
                volume_base: 0.7,
            },
            // Wood
            MaterialProperties {
                restitution: 0.4,
                friction: 0.55,
                density_kg_m3: 650.0,
                pitch_base_hz: 420.0,
                volume_base: 0.6,
            },
            // Stone
            MaterialProperties {
                restitution: 0.2,
                friction: 0.9,
                density_kg_m3: 2600.0,
                pitch_base_hz: 700.0,
                volume_base: 0.9,
            },
            // Metal
            MaterialProperties {
                restitution: 0.55,
                friction: 0.4,
                density_kg_m3: 7800.0,
                pitch_base_hz: 1250.0,
                volume_base: 1.0,
            },
            // Rubber
            MaterialProperties {
                restitution: 0.85,
                friction: 1.1,
                density_kg_m3: 1100.0,
                pitch_base_hz: 90.0,
                volume_base: 0.3,
            },
        ])
    }
}
