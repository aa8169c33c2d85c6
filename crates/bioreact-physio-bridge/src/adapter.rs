//! Host environment adapter.
//!
//! Input and ambient readings come through this trait instead of any global
//! context: the orchestrator is handed an adapter at construction and
//! queries it once per `step` call. Tests and the demo binary implement it
//! with plain structs.

use bioreact_physio_core::{AmbientSample, Velocity};
use serde::{Deserialize, Serialize};

use crate::character::CharacterId;

/// Movement intent for one character, sampled once per frame.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MovementIntent {
    /// Lateral axis in [-1, 1].
    pub move_x: f32,
    /// Forward/backward axis in [-1, 1].
    pub move_z: f32,
    /// Yaw axis in [-1, 1].
    pub turn: f32,
    /// Level state of the jump control (edge detection happens in the
    /// controller).
    pub jump: bool,
}

impl MovementIntent {
    /// No input at all.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            move_x: 0.0,
            move_z: 0.0,
            turn: 0.0,
            jump: false,
        }
    }

    /// Resolve the axes into a unit horizontal direction, or zero when the
    /// stick is centered.
    #[must_use]
    pub fn direction(&self) -> Velocity {
        Velocity::new(self.move_x, 0.0, self.move_z).normalized()
    }
}

/// Everything the simulation reads from its host each frame.
pub trait EnvironmentAdapter {
    /// Current ambient environment around the simulated bodies.
    fn ambient(&self) -> AmbientSample;

    /// Movement intent for one character.
    fn intent(&self, character: CharacterId) -> MovementIntent;
}

/// Neutral host: still indoor air, no input.
///
/// The default adapter for tests and headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StillEnvironment;

impl EnvironmentAdapter for StillEnvironment {
    fn ambient(&self) -> AmbientSample {
        AmbientSample::default()
    }

    fn intent(&self, _character: CharacterId) -> MovementIntent {
        MovementIntent::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_normalizes() {
        let intent = MovementIntent {
            move_x: 3.0,
            move_z: 4.0,
            ..MovementIntent::idle()
        };
        let dir = intent.direction();
        assert!((dir.magnitude() - 1.0).abs() < 1e-5);
        assert_eq!(dir.y, 0.0);
    }

    #[test]
    fn test_centered_stick_gives_zero() {
        assert_eq!(MovementIntent::idle().direction(), Velocity::zero());
    }

    #[test]
    fn test_still_environment_is_neutral() {
        let host = StillEnvironment;
        let ambient = host.ambient();
        assert!((ambient.air_speed_m_s).abs() < 1e-6);
        assert!(!host.intent(CharacterId(0)).jump);
    }
}
