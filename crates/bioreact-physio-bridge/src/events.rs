//! Domain events.
//!
//! The simulation never broadcasts; it appends to an internal queue that the
//! caller drains once per step (`Simulation::drain_events`). Ordering within
//! a step follows emission order, and every event is serializable for the
//! web boundary.

use bioreact_physio_core::{Intensity, Material, Velocity};
use serde::{Deserialize, Serialize};

use crate::body::BodyId;
use crate::character::CharacterId;

/// Sound parameters for one collision, ready for the audio layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    /// Sample key built from the material pair.
    pub sample: String,
    /// Force-derived gain in [0, 1].
    pub gain: Intensity,
    /// Material baseline loudness for the mixer to fold in.
    pub material_gain: Intensity,
    /// Absolute pitch (Hz).
    pub pitch_hz: f32,
    /// Pitch relative to the configured reference frequency.
    pub pitch_ratio: f32,
    /// World-space contact point (m).
    pub position: Velocity,
}

impl SoundCue {
    /// Sample key for a material pair, e.g. `impacts/metal_wood.ogg`.
    #[must_use]
    pub fn sample_key(a: Material, b: Material) -> String {
        format!("impacts/{}_{}.ogg", a.name(), b.name())
    }
}

/// Lifecycle and domain notifications, drained by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The rigid-body world is constructed and stepping.
    PhysicsReady,
    /// A plain body entered the registry.
    BodyCreated {
        /// Registry id of the new body.
        id: BodyId,
    },
    /// A body and its engine-side objects were released.
    BodyRemoved {
        /// Registry id of the removed body.
        id: BodyId,
    },
    /// A character entered the registry.
    CharacterCreated {
        /// Registry id of the new character.
        id: CharacterId,
    },
    /// A character and its engine-side objects were released.
    CharacterRemoved {
        /// Registry id of the removed character.
        id: CharacterId,
    },
    /// A character update failed; the entity is quarantined and will be
    /// removed on the next pass.
    CharacterFault {
        /// Registry id of the faulted character.
        id: CharacterId,
        /// Human-readable failure description.
        reason: String,
    },
    /// A collision produced a sound.
    Sound(SoundCue),
    /// The world and every registered entity were released.
    Disposed,
}
