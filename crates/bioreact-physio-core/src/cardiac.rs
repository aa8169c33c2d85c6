//! Cardiac bioelectric source model.
//!
//! The heart is approximated as a single oriented dipole whose magnitude
//! oscillates at the cardiac rate: `m(t) = 1 + 0.5·sin(2π·rate·t)`. The
//! surface potential at an electrode is the dipole projected onto the
//! direction to the electrode with inverse-square falloff, which is what the
//! front end plots as an ECG trace.
//!
//! A fixed-capacity [`EcgMontage`] samples up to twelve labelled leads at
//! once without allocating, so the same code runs on `no_std` hosts.

use heapless::Vec as FixedVec;
use serde::{Deserialize, Serialize};

use crate::types::Velocity;

/// Default cardiac rate, 72 beats per minute (Hz).
pub const DEFAULT_CARDIAC_RATE_HZ: f32 = 1.2;

/// Default projection scale mapping the dimensionless dipole to millivolts.
pub const DEFAULT_DIPOLE_SCALE: f32 = 1.0e-3;

/// Maximum electrodes in a montage (standard 12-lead).
pub const MONTAGE_CAPACITY: usize = 12;

const TAU: f32 = 2.0 * core::f32::consts::PI;

/// Oscillating cardiac dipole.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CardiacDipole {
    rate_hz: f32,
    scale: f32,
    direction: Velocity,
    time_s: f32,
}

impl CardiacDipole {
    /// Create a dipole with the given rate and projection scale.
    ///
    /// The default orientation follows the mean electrical axis, pointing
    /// down and to the anatomical left in the frontal plane.
    #[must_use]
    pub fn new(rate_hz: f32, scale: f32) -> Self {
        Self {
            rate_hz,
            scale,
            direction: Velocity::new(0.87, -0.5, 0.0).normalized(),
            time_s: 0.0,
        }
    }

    /// Override the dipole orientation (normalized on entry).
    #[must_use]
    pub fn with_direction(mut self, direction: Velocity) -> Self {
        self.direction = direction.normalized();
        self
    }

    /// Advance the cardiac phase by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.time_s += dt;
    }

    /// Instantaneous dipole magnitude `1 + 0.5·sin(2π·rate·t)`.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        1.0 + 0.5 * libm::sinf(TAU * self.rate_hz * self.time_s)
    }

    /// Surface potential at an electrode position relative to the dipole.
    ///
    /// `m(t) × (r̂ · d) / |r|² × scale`: projection with inverse-square
    /// falloff.
    #[must_use]
    pub fn ecg(&self, electrode: &Velocity) -> f32 {
        let distance_sq = electrode.magnitude_squared();
        let toward = electrode.normalized();
        self.magnitude() * toward.dot(&self.direction) / distance_sq * self.scale
    }

    /// Accumulated cardiac time (s).
    #[must_use]
    pub const fn time_s(&self) -> f32 {
        self.time_s
    }

    /// Configured cardiac rate (Hz).
    #[must_use]
    pub const fn rate_hz(&self) -> f32 {
        self.rate_hz
    }
}

impl Default for CardiacDipole {
    fn default() -> Self {
        Self::new(DEFAULT_CARDIAC_RATE_HZ, DEFAULT_DIPOLE_SCALE)
    }
}

/// Standard ECG lead labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcgLead {
    /// Limb lead I.
    I,
    /// Limb lead II.
    II,
    /// Limb lead III.
    III,
    /// Augmented right arm.
    AvR,
    /// Augmented left arm.
    AvL,
    /// Augmented foot.
    AvF,
    /// Precordial V1.
    V1,
    /// Precordial V2.
    V2,
    /// Precordial V3.
    V3,
    /// Precordial V4.
    V4,
    /// Precordial V5.
    V5,
    /// Precordial V6.
    V6,
}

impl EcgLead {
    /// Conventional display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            EcgLead::I => "I",
            EcgLead::II => "II",
            EcgLead::III => "III",
            EcgLead::AvR => "aVR",
            EcgLead::AvL => "aVL",
            EcgLead::AvF => "aVF",
            EcgLead::V1 => "V1",
            EcgLead::V2 => "V2",
            EcgLead::V3 => "V3",
            EcgLead::V4 => "V4",
            EcgLead::V5 => "V5",
            EcgLead::V6 => "V6",
        }
    }
}

/// One labelled electrode site, positioned relative to the dipole origin.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Electrode {
    /// Lead label.
    pub lead: EcgLead,
    /// Position relative to the heart (m).
    pub position: Velocity,
}

/// Potential sampled at one lead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LeadSample {
    /// Lead label.
    pub lead: EcgLead,
    /// Projected potential (mV at the default scale).
    pub potential: f32,
}

/// Fixed-capacity electrode montage.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EcgMontage {
    electrodes: FixedVec<Electrode, MONTAGE_CAPACITY>,
}

impl EcgMontage {
    /// Empty montage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            electrodes: FixedVec::new(),
        }
    }

    /// The three limb leads at torso-scale positions.
    #[must_use]
    pub fn limb_leads() -> Self {
        let mut montage = Self::new();
        // Capacity is 12 and we insert 3; the pushes cannot fail.
        let _ = montage.add(Electrode {
            lead: EcgLead::I,
            position: Velocity::new(0.35, 0.05, 0.0),
        });
        let _ = montage.add(Electrode {
            lead: EcgLead::II,
            position: Velocity::new(0.2, -0.45, 0.0),
        });
        let _ = montage.add(Electrode {
            lead: EcgLead::III,
            position: Velocity::new(-0.15, -0.45, 0.0),
        });
        montage
    }

    /// Add an electrode, returning it back when the montage is full.
    pub fn add(&mut self, electrode: Electrode) -> Result<(), Electrode> {
        self.electrodes.push(electrode)
    }

    /// Sample every electrode against the dipole's current state.
    #[must_use]
    pub fn sample(&self, dipole: &CardiacDipole) -> FixedVec<LeadSample, MONTAGE_CAPACITY> {
        let mut out = FixedVec::new();
        for electrode in &self.electrodes {
            let sample = LeadSample {
                lead: electrode.lead,
                potential: dipole.ecg(&electrode.position),
            };
            // Output capacity equals input capacity.
            let _ = out.push(sample);
        }
        out
    }

    /// Number of electrodes placed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.electrodes.len()
    }

    /// True when no electrodes are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.electrodes.is_empty()
    }
}
