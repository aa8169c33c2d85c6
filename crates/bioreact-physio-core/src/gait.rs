//! Gait phase oscillator.
//!
//! Produces alternating left/right muscle-torque target magnitudes from a
//! phase that accumulates simulated time, so replaying the same fixed steps
//! replays the same gait exactly. The targets are half-wave rectified sines
//! a half cycle apart: one leg drives while the other swings free.
//!
//! The targets are values, not forces; nothing in the simulation applies
//! them to a body. They exist for downstream articulated-skeleton work and
//! for display.

use serde::{Deserialize, Serialize};

/// Default stride frequency (Hz).
pub const DEFAULT_GAIT_FREQUENCY_HZ: f32 = 1.4;

/// Default peak torque target magnitude (N·m).
pub const DEFAULT_GAIT_TORQUE_NM: f32 = 30.0;

const TAU: f32 = 2.0 * core::f32::consts::PI;

/// Joints the oscillator produces targets for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Joint {
    /// Left hip flexor group.
    HipLeft,
    /// Right hip flexor group.
    HipRight,
}

impl Joint {
    /// Stable joint key name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Joint::HipLeft => "hip_l",
            Joint::HipRight => "hip_r",
        }
    }

    const fn index(self) -> usize {
        match self {
            Joint::HipLeft => 0,
            Joint::HipRight => 1,
        }
    }
}

/// Torque target magnitudes keyed by joint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MuscleTargets {
    targets: [f32; 2],
}

impl MuscleTargets {
    /// All-zero targets.
    #[must_use]
    pub const fn zero() -> Self {
        Self { targets: [0.0; 2] }
    }

    /// Target magnitude for one joint (N·m, never negative).
    #[must_use]
    pub const fn get(&self, joint: Joint) -> f32 {
        self.targets[joint.index()]
    }

    /// Iterate `(joint, magnitude)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, f32)> + '_ {
        [Joint::HipLeft, Joint::HipRight]
            .into_iter()
            .map(move |joint| (joint, self.targets[joint.index()]))
    }
}

/// Phase oscillator advanced by accumulated simulated time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GaitOscillator {
    frequency_hz: f32,
    amplitude_nm: f32,
    phase_rad: f32,
}

impl GaitOscillator {
    /// Create an oscillator at phase zero.
    #[must_use]
    pub const fn new(frequency_hz: f32, amplitude_nm: f32) -> Self {
        Self {
            frequency_hz,
            amplitude_nm,
            phase_rad: 0.0,
        }
    }

    /// Advance the phase by `dt` seconds of simulated time.
    pub fn advance(&mut self, dt: f32) {
        self.phase_rad += TAU * self.frequency_hz * dt;
    }

    /// Current targets: `amp·max(0, sin φ)` left, `amp·max(0, sin(φ+π))`
    /// right.
    #[must_use]
    pub fn targets(&self) -> MuscleTargets {
        let left = libm::sinf(self.phase_rad).max(0.0) * self.amplitude_nm;
        let right = libm::sinf(self.phase_rad + core::f32::consts::PI).max(0.0) * self.amplitude_nm;
        MuscleTargets {
            targets: [left, right],
        }
    }

    /// Accumulated phase (rad).
    #[must_use]
    pub const fn phase_rad(&self) -> f32 {
        self.phase_rad
    }
}

impl Default for GaitOscillator {
    fn default() -> Self {
        Self::new(DEFAULT_GAIT_FREQUENCY_HZ, DEFAULT_GAIT_TORQUE_NM)
    }
}
