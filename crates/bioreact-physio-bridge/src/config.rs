//! Configuration types, validated at construction boundaries.
//!
//! Everything the host can tune is here; nothing in these structs changes
//! implicitly mid-run. Validation returns [`SimError::InvalidConfig`] with
//! the offending field named; creation APIs reject bad input instead of
//! panicking.

use bioreact_physio_core::{
    AcousticsModel, Material, MaterialTable, PidGains, ThermoParams, Velocity,
};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

fn reject(field: &'static str, value: f32, reason: &'static str) -> SimError {
    SimError::InvalidConfig {
        field,
        value: f64::from(value),
        reason,
    }
}

/// World-level simulation configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Gravity vector (m/s²).
    pub gravity: Velocity,
    /// Fixed simulation timestep (s), strictly positive.
    pub fixed_timestep_s: f32,
    /// Maximum sub-steps consumed per `step` call.
    pub max_substeps: u32,
    /// Per-material contact and acoustic properties.
    pub materials: MaterialTable,
    /// Acoustic reference constants.
    pub acoustics: AcousticsModel,
}

impl SimConfig {
    /// Check every invariant the orchestrator relies on.
    pub fn validate(&self) -> SimResult<()> {
        if !self.fixed_timestep_s.is_finite() || self.fixed_timestep_s <= 0.0 {
            return Err(reject(
                "fixed_timestep_s",
                self.fixed_timestep_s,
                "must be a positive finite number",
            ));
        }
        if self.max_substeps == 0 {
            return Err(reject("max_substeps", 0.0, "must be at least 1"));
        }
        if !self.gravity.is_finite() {
            return Err(reject("gravity", self.gravity.y, "components must be finite"));
        }
        if !self.materials.is_valid() {
            return Err(reject("materials", 0.0, "table entry out of range"));
        }
        if !self.acoustics.is_valid() {
            return Err(reject("acoustics", 0.0, "constants must be finite and positive"));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Velocity::new(0.0, -bioreact_physio_core::STANDARD_GRAVITY_M_S2, 0.0),
            fixed_timestep_s: 1.0 / 60.0,
            max_substeps: 5,
            materials: MaterialTable::default(),
            acoustics: AcousticsModel::default(),
        }
    }
}

/// How a body responds to forces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// Integrated by the engine, responds to forces.
    #[default]
    Dynamic,
    /// Immovable environment geometry.
    Static,
}

/// Collider shape for a plain body.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum BodyShape {
    /// Ball collider.
    Sphere {
        /// Ball radius (m).
        radius_m: f32,
    },
    /// Box collider.
    Cuboid {
        /// Half extents along each axis (m).
        half_extents: Velocity,
    },
    /// Vertical capsule collider.
    Capsule {
        /// Half the length of the straight segment (m).
        half_height_m: f32,
        /// Cap radius (m).
        radius_m: f32,
    },
}

impl BodyShape {
    /// Radius of the sphere the fluid submersion approximation uses.
    #[must_use]
    pub fn submersion_radius_m(&self) -> f32 {
        match *self {
            BodyShape::Sphere { radius_m } => radius_m,
            BodyShape::Cuboid { half_extents } => {
                half_extents.x.max(half_extents.y).max(half_extents.z)
            }
            BodyShape::Capsule {
                half_height_m,
                radius_m,
            } => half_height_m + radius_m,
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            BodyShape::Sphere { radius_m } => radius_m.is_finite() && radius_m > 0.0,
            BodyShape::Cuboid { half_extents } => {
                half_extents.is_finite()
                    && half_extents.x > 0.0
                    && half_extents.y > 0.0
                    && half_extents.z > 0.0
            }
            BodyShape::Capsule {
                half_height_m,
                radius_m,
            } => {
                half_height_m.is_finite()
                    && half_height_m > 0.0
                    && radius_m.is_finite()
                    && radius_m > 0.0
            }
        }
    }
}

/// Specification for one plain rigid body.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BodySpec {
    /// Spawn position of the body center (m).
    pub position: Velocity,
    /// Body mass (kg), strictly positive.
    pub mass_kg: f32,
    /// Surface material tag.
    pub material: Material,
    /// Collider shape.
    pub shape: BodyShape,
    /// Dynamic or static.
    pub motion: Motion,
}

impl BodySpec {
    /// Check mass, shape and position before engine-side creation.
    pub fn validate(&self) -> SimResult<()> {
        if !self.mass_kg.is_finite() || self.mass_kg <= 0.0 {
            return Err(reject("mass_kg", self.mass_kg, "must be a positive finite number"));
        }
        if !self.shape.is_valid() {
            return Err(reject("shape", 0.0, "dimensions must be positive finite numbers"));
        }
        if !self.position.is_finite() {
            return Err(reject("position", self.position.x, "components must be finite"));
        }
        Ok(())
    }
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            position: Velocity::zero(),
            mass_kg: 1.0,
            material: Material::Wood,
            shape: BodyShape::Sphere { radius_m: 0.5 },
            motion: Motion::Dynamic,
        }
    }
}

/// Biomechanical constants for one character.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CharacterParams {
    /// Spawn position of the capsule center (m).
    pub position: Velocity,
    /// Whole-body mass (kg).
    pub mass_kg: f32,
    /// Capsule radius (m).
    pub radius_m: f32,
    /// Total standing height (m), must exceed twice the radius.
    pub height_m: f32,
    /// Peak locomotion speed (m/s).
    pub max_speed_m_s: f32,
    /// Peak corrective force the legs can apply (N).
    pub max_force_n: f32,
    /// Vertical impulse of one jump (N·s).
    pub jump_impulse_n_s: f32,
    /// Balance loop gains.
    pub balance_gains: PidGains,
    /// Gait loop gains.
    pub gait_gains: PidGains,
    /// Skin material tag.
    pub material: Material,
    /// Heat-balance parameters.
    pub thermo: ThermoParams,
}

impl CharacterParams {
    /// Check every biomechanical constant.
    pub fn validate(&self) -> SimResult<()> {
        if !self.mass_kg.is_finite() || self.mass_kg <= 0.0 {
            return Err(reject("mass_kg", self.mass_kg, "must be a positive finite number"));
        }
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(reject("radius_m", self.radius_m, "must be a positive finite number"));
        }
        if !self.height_m.is_finite() || self.height_m <= 2.0 * self.radius_m {
            return Err(reject(
                "height_m",
                self.height_m,
                "must exceed twice the capsule radius",
            ));
        }
        if !self.max_speed_m_s.is_finite() || self.max_speed_m_s <= 0.0 {
            return Err(reject(
                "max_speed_m_s",
                self.max_speed_m_s,
                "must be a positive finite number",
            ));
        }
        if !self.max_force_n.is_finite() || self.max_force_n <= 0.0 {
            return Err(reject(
                "max_force_n",
                self.max_force_n,
                "must be a positive finite number",
            ));
        }
        if !self.jump_impulse_n_s.is_finite() || self.jump_impulse_n_s < 0.0 {
            return Err(reject(
                "jump_impulse_n_s",
                self.jump_impulse_n_s,
                "must be finite and non-negative",
            ));
        }
        if !self.balance_gains.is_finite() {
            return Err(reject("balance_gains", self.balance_gains.kp, "gains must be finite"));
        }
        if !self.gait_gains.is_finite() {
            return Err(reject("gait_gains", self.gait_gains.kp, "gains must be finite"));
        }
        if !self.position.is_finite() {
            return Err(reject("position", self.position.x, "components must be finite"));
        }
        if !self.thermo.is_valid() {
            return Err(reject("thermo", self.thermo.body_mass_kg, "parameters out of range"));
        }
        Ok(())
    }

    /// Half the length of the capsule's straight segment.
    #[must_use]
    pub fn capsule_half_height_m(&self) -> f32 {
        self.height_m * 0.5 - self.radius_m
    }
}

impl Default for CharacterParams {
    fn default() -> Self {
        Self {
            position: Velocity::new(0.0, 1.0, 0.0),
            mass_kg: 70.0,
            radius_m: 0.3,
            height_m: 1.75,
            max_speed_m_s: 4.0,
            max_force_n: 800.0,
            jump_impulse_n_s: 250.0,
            balance_gains: PidGains::new(60.0, 8.0, 10.0),
            gait_gains: PidGains::new(40.0, 5.0, 2.0),
            material: Material::Flesh,
            thermo: ThermoParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(BodySpec::default().validate().is_ok());
        assert!(CharacterParams::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let config = SimConfig {
            fixed_timestep_s: 0.0,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "fixed_timestep_s", .. }));
    }

    #[test]
    fn test_negative_mass_rejected() {
        let spec = BodySpec {
            mass_kg: -3.0,
            ..BodySpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_nan_gain_rejected() {
        let params = CharacterParams {
            balance_gains: PidGains::new(f32::NAN, 0.0, 0.0),
            ..CharacterParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_squat_capsule_rejected() {
        let params = CharacterParams {
            radius_m: 0.5,
            height_m: 0.9,
            ..CharacterParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_submersion_radius_per_shape() {
        let sphere = BodyShape::Sphere { radius_m: 0.4 };
        assert!((sphere.submersion_radius_m() - 0.4).abs() < 1e-6);

        let cuboid = BodyShape::Cuboid {
            half_extents: Velocity::new(0.1, 0.5, 0.2),
        };
        assert!((cuboid.submersion_radius_m() - 0.5).abs() < 1e-6);

        let capsule = BodyShape::Capsule {
            half_height_m: 0.6,
            radius_m: 0.3,
        };
        assert!((capsule.submersion_radius_m() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert!((back.fixed_timestep_s - config.fixed_timestep_s).abs() < 1e-9);
        assert_eq!(back.max_substeps, config.max_substeps);
    }
}
