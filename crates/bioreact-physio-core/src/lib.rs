//! # Bio-React Physio Core
//!
//! Engine-free physiological and physical models for the Bio-React
//! simulation layer.
//!
//! Everything in this crate is pure state-plus-arithmetic: feedback control,
//! heat balance, cardiac electricity, ocular optics, contact acoustics and
//! hemodynamics. The rigid-body world, registries and event plumbing live in
//! `bioreact-physio-bridge`; this crate never touches an engine handle.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              bioreact-physio-bridge          │
//! │   (rigid-body world, characters, events)     │
//! └──────────────────────┬───────────────────────┘
//!                        │ feeds state / reads signals
//! ┌──────────────────────▼───────────────────────┐
//! │              bioreact-physio-core            │
//! │  pid ─ thermo ─ cardiac ─ optics ─ acoustics │
//! │        gait ─ hemo ─ materials ─ types       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `std` (default): standard library support. Disable for `no_std` hosts
//!   (WASM embeds, wearable firmware); all models compute through `libm`.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod acoustics;
pub mod cardiac;
pub mod gait;
pub mod hemo;
pub mod materials;
pub mod optics;
pub mod pid;
pub mod thermo;
pub mod types;

pub use acoustics::{AcousticsModel, ContactSound};
pub use cardiac::{CardiacDipole, EcgLead, EcgMontage, Electrode};
pub use gait::{GaitOscillator, Joint, MuscleTargets};
pub use materials::{Material, MaterialProperties, MaterialTable};
pub use optics::OcularModel;
pub use pid::{PidController, PidGains};
pub use thermo::{AmbientSample, ThermoParams, ThermoregulationModel};
pub use types::{Intensity, Velocity};

/// Version of the physio core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY_M_S2: f32 = 9.81;

/// Speed of sound in air at 20 °C (m/s).
pub const SPEED_OF_SOUND_M_S: f32 = 343.0;
