//! Collision acoustics and Doppler shift.
//!
//! Impacts are sonified from two inputs the physics step already has: the
//! contact force magnitude and the material pair. Gain is the force scaled
//! into [0, 1]; pitch is the mean of the two materials' characteristic
//! pitches, reported both absolute and as a ratio against the reference
//! frequency so the audio layer can retune a single sample.

use serde::{Deserialize, Serialize};

use crate::materials::{Material, MaterialTable};
use crate::types::{Intensity, Velocity};
use crate::SPEED_OF_SOUND_M_S;

/// Contact force mapping to full-scale gain before clamping (N).
pub const FORCE_FULL_SCALE_N: f32 = 100.0;

/// Default reference frequency for pitch ratios (Hz).
pub const DEFAULT_REFERENCE_HZ: f32 = 440.0;

/// Acoustic constants, fixed at configuration time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AcousticsModel {
    /// Speed of sound used by the Doppler computation (m/s).
    pub speed_of_sound_m_s: f32,
    /// Reference frequency pitch ratios are expressed against (Hz).
    pub reference_hz: f32,
    /// Multiplier applied to contact force before gain scaling.
    pub impulse_scale: f32,
}

impl AcousticsModel {
    /// True when every constant is finite and positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.speed_of_sound_m_s.is_finite()
            && self.speed_of_sound_m_s > 0.0
            && self.reference_hz.is_finite()
            && self.reference_hz > 0.0
            && self.impulse_scale.is_finite()
            && self.impulse_scale > 0.0
    }

    /// Map one contact to sound parameters.
    ///
    /// Gain is `clamp(force × impulse_scale / 100, 0, 1)`; pitch is the mean
    /// of the two material pitch bases.
    #[must_use]
    pub fn contact_sound(
        &self,
        contact_force_n: f32,
        a: Material,
        b: Material,
        table: &MaterialTable,
    ) -> ContactSound {
        let props_a = table.get(a);
        let props_b = table.get(b);

        let gain = Intensity::new(contact_force_n * self.impulse_scale / FORCE_FULL_SCALE_N);
        let pitch_hz = (props_a.pitch_base_hz + props_b.pitch_base_hz) * 0.5;
        let material_gain = Intensity::new((props_a.volume_base + props_b.volume_base) * 0.5);

        ContactSound {
            materials: (a, b),
            gain,
            material_gain,
            pitch_hz,
            pitch_ratio: pitch_hz / self.reference_hz,
        }
    }

    /// Doppler-shifted frequency, `f × c / (c − v_rel·d̂)`.
    ///
    /// `direction` is the unit vector from source toward listener; the
    /// relative velocity is `source − listener` projected on it.
    #[must_use]
    pub fn doppler_shift(
        &self,
        source_vel: &Velocity,
        listener_vel: &Velocity,
        direction: &Velocity,
        frequency_hz: f32,
    ) -> f32 {
        let relative = (*source_vel - *listener_vel).dot(direction);
        frequency_hz * self.speed_of_sound_m_s / (self.speed_of_sound_m_s - relative)
    }
}

impl Default for AcousticsModel {
    fn default() -> Self {
        Self {
            speed_of_sound_m_s: SPEED_OF_SOUND_M_S,
            reference_hz: DEFAULT_REFERENCE_HZ,
            impulse_scale: 1.0,
        }
    }
}

/// Sound parameters derived from one contact.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ContactSound {
    /// Material pair, in (first body, second body) order.
    pub materials: (Material, Material),
    /// Force-derived gain in [0, 1].
    pub gain: Intensity,
    /// Mean of the pair's baseline loudness, for the mixer to fold in.
    pub material_gain: Intensity,
    /// Mean of the pair's characteristic pitches (Hz).
    pub pitch_hz: f32,
    /// Pitch relative to the reference frequency.
    pub pitch_ratio: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_formula() {
        let model = AcousticsModel::default();
        let table = MaterialTable::default();
        let sound = model.contact_sound(50.0, Material::Wood, Material::Stone, &table);
        assert!((sound.gain.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_gain_clamps_at_full_scale() {
        let model = AcousticsModel::default();
        let table = MaterialTable::default();
        let sound = model.contact_sound(1.0e6, Material::Metal, Material::Metal, &table);
        assert_eq!(sound.gain.value(), 1.0);
    }

    #[test]
    fn test_pitch_is_material_mean() {
        let model = AcousticsModel::default();
        let table = MaterialTable::default();
        let sound = model.contact_sound(10.0, Material::Metal, Material::Rubber, &table);
        let expected =
            (table.get(Material::Metal).pitch_base_hz + table.get(Material::Rubber).pitch_base_hz)
                * 0.5;
        assert!((sound.pitch_hz - expected).abs() < 1e-3);
        assert!((sound.pitch_ratio - expected / DEFAULT_REFERENCE_HZ).abs() < 1e-5);
    }

    #[test]
    fn test_doppler_identity_at_rest() {
        let model = AcousticsModel::default();
        let shifted = model.doppler_shift(
            &Velocity::zero(),
            &Velocity::zero(),
            &Velocity::new(1.0, 0.0, 0.0),
            440.0,
        );
        assert!((shifted - 440.0).abs() < 1e-4);
    }

    #[test]
    fn test_doppler_identity_with_perpendicular_motion() {
        let model = AcousticsModel::default();
        // Moving, but with no velocity component along the direction.
        let shifted = model.doppler_shift(
            &Velocity::new(0.0, 0.0, 12.0),
            &Velocity::zero(),
            &Velocity::new(1.0, 0.0, 0.0),
            440.0,
        );
        assert!((shifted - 440.0).abs() < 1e-4);
    }

    #[test]
    fn test_doppler_approaching_raises_pitch() {
        let model = AcousticsModel::default();
        let toward = model.doppler_shift(
            &Velocity::new(30.0, 0.0, 0.0),
            &Velocity::zero(),
            &Velocity::new(1.0, 0.0, 0.0),
            440.0,
        );
        let away = model.doppler_shift(
            &Velocity::new(-30.0, 0.0, 0.0),
            &Velocity::zero(),
            &Velocity::new(1.0, 0.0, 0.0),
            440.0,
        );
        assert!(toward > 440.0);
        assert!(away < 440.0);
    }
}
