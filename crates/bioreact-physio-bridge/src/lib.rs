//! # Bio-React Physio Bridge
//!
//! Binds the engine-free models of `bioreact-physio-core` to a real
//! rigid-body world and drives everything at a fixed timestep.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Host application                        │
//! │     (rendering, audio playback, input capture, UI)              │
//! └───────────┬─────────────────────────────────────▲───────────────┘
//!             │ EnvironmentAdapter                  │ SimEvent queue,
//!             │ (ambient + intent)                  │ CharacterState
//! ┌───────────▼─────────────────────────────────────┴───────────────┐
//! │                     Simulation (world.rs)                       │
//! │                                                                 │
//! │   accumulator loop ── per substep:                              │
//! │     rapier world step ─▶ character updates ─▶ fluid forces      │
//! │                       ─▶ collisions → sound cues                │
//! │   once per call: cardiac dipole, pupil, standalone thermo       │
//! │                                                                 │
//! │   registries: BodyId → SimBody, CharacterId → controller        │
//! └───────────┬─────────────────────────────────────────────────────┘
//!             │
//! ┌───────────▼─────────────────────────────────────────────────────┐
//! │                    bioreact-physio-core                         │
//! │   pid ─ thermo ─ cardiac ─ optics ─ acoustics ─ gait ─ hemo     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use bioreact_physio_bridge::{Simulation, SimConfig, StillEnvironment};
//! use bioreact_physio_bridge::config::{BodySpec, CharacterParams};
//!
//! let mut sim = Simulation::new(SimConfig::default(), Box::new(StillEnvironment))?;
//! let ball = sim.create_body(&BodySpec::default())?;
//! let player = sim.create_character(&CharacterParams::default())?;
//!
//! loop {
//!     let summary = sim.step(frame_delta_seconds);
//!     for event in sim.drain_events() {
//!         // forward sounds and lifecycle notices to the host
//!     }
//!     let state = sim.character_state(player);
//! }
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod body;
pub mod character;
pub mod config;
pub mod error;
pub mod events;
pub mod fluids;
pub mod world;

pub use adapter::{EnvironmentAdapter, MovementIntent, StillEnvironment};
pub use body::BodyId;
pub use character::{CharacterController, CharacterId, CharacterState};
pub use config::{BodyShape, BodySpec, CharacterParams, Motion, SimConfig};
pub use error::{CharacterError, SimError, SimResult};
pub use events::{SimEvent, SoundCue};
pub use fluids::{FluidField, FluidRegion};
pub use world::{Simulation, StepSummary};
