//! Ocular optics: pupil dynamics, accommodation and acuity.
//!
//! The pupil eases toward a binary target (constricted above the brightness
//! threshold, dilated below) by 10% of the remaining gap per update, so the
//! response is an exponential approach rather than a snap. Acuity is the
//! diffraction limit of the current aperture, `1.22·λ / (2r)`. Accommodation
//! is a binary near/far choice of lens radius of curvature at a fixed
//! refractive index.

use serde::{Deserialize, Serialize};

/// Fully constricted pupil radius (m).
pub const PUPIL_MIN_RADIUS_M: f32 = 1.0e-3;

/// Fully dilated pupil radius (m).
pub const PUPIL_MAX_RADIUS_M: f32 = 4.0e-3;

/// Fraction of the remaining gap closed per update.
pub const PUPIL_APPROACH_RATE: f32 = 0.1;

/// Luminance above which the pupil constricts (lux).
pub const BRIGHT_THRESHOLD_LUX: f32 = 100.0;

/// Reference wavelength for the diffraction limit, green light (m).
pub const WAVELENGTH_GREEN_M: f32 = 550.0e-9;

/// Distances closer than this trigger near accommodation (m).
pub const NEAR_FOCUS_THRESHOLD_M: f32 = 1.0;

/// Lens radius of curvature when accommodated for near work (m).
pub const LENS_RADIUS_NEAR_M: f32 = 6.0e-3;

/// Lens radius of curvature at rest, focused far (m).
pub const LENS_RADIUS_FAR_M: f32 = 10.2e-3;

/// Refractive index of the crystalline lens.
pub const LENS_REFRACTIVE_INDEX: f32 = 1.41;

/// Refractive index of the surrounding aqueous humor.
pub const AQUEOUS_REFRACTIVE_INDEX: f32 = 1.336;

/// Stateful eye model.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OcularModel {
    pupil_radius_m: f32,
    lens_radius_m: f32,
}

impl OcularModel {
    /// Create an eye with a mid-dilated pupil, focused far.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pupil_radius_m: (PUPIL_MIN_RADIUS_M + PUPIL_MAX_RADIUS_M) * 0.5,
            lens_radius_m: LENS_RADIUS_FAR_M,
        }
    }

    /// Ease the pupil toward the luminance-appropriate bound.
    ///
    /// Bright light targets [`PUPIL_MIN_RADIUS_M`], dim light
    /// [`PUPIL_MAX_RADIUS_M`]; each call closes 10% of the remaining gap and
    /// the radius is clamped to its bounds afterwards.
    pub fn update_pupil(&mut self, luminance_lux: f32) {
        let target = if luminance_lux > BRIGHT_THRESHOLD_LUX {
            PUPIL_MIN_RADIUS_M
        } else {
            PUPIL_MAX_RADIUS_M
        };
        self.pupil_radius_m += (target - self.pupil_radius_m) * PUPIL_APPROACH_RATE;
        self.pupil_radius_m = self.pupil_radius_m.clamp(PUPIL_MIN_RADIUS_M, PUPIL_MAX_RADIUS_M);
    }

    /// Diffraction-limited angular resolution of the current aperture (rad).
    #[must_use]
    pub fn visual_acuity_rad(&self) -> f32 {
        1.22 * WAVELENGTH_GREEN_M / (2.0 * self.pupil_radius_m)
    }

    /// Accommodate for a target at the given distance.
    ///
    /// Binary choice: closer than [`NEAR_FOCUS_THRESHOLD_M`] selects the near
    /// radius of curvature, anything else the far one.
    pub fn focus(&mut self, distance_m: f32) {
        self.lens_radius_m = if distance_m < NEAR_FOCUS_THRESHOLD_M {
            LENS_RADIUS_NEAR_M
        } else {
            LENS_RADIUS_FAR_M
        };
    }

    /// Dioptric power of the lens as a thin symmetric lens in aqueous,
    /// `(n_lens − n_aqueous) × 2 / R`.
    #[must_use]
    pub fn lens_power_diopters(&self) -> f32 {
        (LENS_REFRACTIVE_INDEX - AQUEOUS_REFRACTIVE_INDEX) * 2.0 / self.lens_radius_m
    }

    /// Current pupil radius (m), always within the configured bounds.
    #[must_use]
    pub const fn pupil_radius_m(&self) -> f32 {
        self.pupil_radius_m
    }

    /// Current lens radius of curvature (m).
    #[must_use]
    pub const fn lens_radius_m(&self) -> f32 {
        self.lens_radius_m
    }
}

impl Default for OcularModel {
    fn default() -> Self {
        Self::new()
    }
}
