//! Hemodynamic formulas.
//!
//! Small closed-form helpers used by downstream physiological computations
//! (vascular load displays, perfusion estimates). Nothing here is stateful;
//! each function is a direct transcription of the named law.

/// Physical constants for blood and typical vessels.
pub mod constants {
    /// Dynamic viscosity of whole blood at 37 °C (Pa·s).
    pub const BLOOD_VISCOSITY_PA_S: f32 = 3.5e-3;

    /// Density of whole blood (kg/m³).
    pub const BLOOD_DENSITY_KG_M3: f32 = 1060.0;

    /// Typical capillary filtration coefficient (mL/(min·mmHg)), whole body.
    pub const CAPILLARY_KF_ML_MIN_MMHG: f32 = 12.5;
}

/// Pressure drop along a cylindrical vessel segment (Poiseuille).
///
/// `ΔP = 8·μ·L·Q / (π·r⁴)` for laminar flow `Q` (m³/s) through a vessel of
/// length `L` (m) and radius `r` (m) with fluid viscosity `μ` (Pa·s).
#[must_use]
pub fn poiseuille_pressure_drop(
    flow_m3_s: f32,
    viscosity_pa_s: f32,
    length_m: f32,
    radius_m: f32,
) -> f32 {
    let r4 = radius_m * radius_m * radius_m * radius_m;
    8.0 * viscosity_pa_s * length_m * flow_m3_s / (core::f32::consts::PI * r4)
}

/// Wall tension of a pressurized vessel (Laplace).
///
/// `T = P·r`: tension grows with both transmural pressure and radius,
/// so dilated vessels bear more wall stress at the same pressure.
#[must_use]
pub fn laplace_wall_tension(pressure_pa: f32, radius_m: f32) -> f32 {
    pressure_pa * radius_m
}

/// Net capillary filtration rate (Starling).
///
/// `Jv = Kf·[(Pc − Pi) − σ·(πc − πi)]`: hydrostatic pressures push fluid
/// out, oncotic pressures pull it back, weighted by the reflection
/// coefficient `σ`. Positive is filtration, negative is absorption. Units
/// follow `kf` (conventionally mL/min when pressures are mmHg).
#[must_use]
pub fn starling_filtration(
    kf: f32,
    capillary_hydrostatic: f32,
    interstitial_hydrostatic: f32,
    capillary_oncotic: f32,
    interstitial_oncotic: f32,
    sigma: f32,
) -> f32 {
    let hydrostatic = capillary_hydrostatic - interstitial_hydrostatic;
    let oncotic = capillary_oncotic - interstitial_oncotic;
    kf * (hydrostatic - sigma * oncotic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poiseuille_radius_fourth_power() {
        let narrow = poiseuille_pressure_drop(1.0e-6, constants::BLOOD_VISCOSITY_PA_S, 0.1, 1.0e-3);
        let wide = poiseuille_pressure_drop(1.0e-6, constants::BLOOD_VISCOSITY_PA_S, 0.1, 2.0e-3);
        // Doubling the radius divides the drop by 16.
        assert!((narrow / wide - 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_poiseuille_zero_flow() {
        let drop = poiseuille_pressure_drop(0.0, constants::BLOOD_VISCOSITY_PA_S, 0.1, 1.0e-3);
        assert_eq!(drop, 0.0);
    }

    #[test]
    fn test_laplace_scales_with_radius() {
        let aorta = laplace_wall_tension(13_000.0, 0.012);
        let capillary = laplace_wall_tension(3_300.0, 4.0e-6);
        assert!(aorta > capillary);
        assert!((laplace_wall_tension(2.0, 3.0) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_starling_balance_is_zero() {
        // Textbook equilibrium: hydrostatic gradient equals effective
        // oncotic gradient.
        let jv = starling_filtration(1.0, 25.0, 5.0, 28.0, 8.0, 1.0);
        assert!(jv.abs() < 1e-6);
    }

    #[test]
    fn test_starling_filtration_sign() {
        // Arteriolar end: hydrostatic wins, fluid filters out.
        assert!(starling_filtration(1.0, 35.0, 0.0, 25.0, 3.0, 0.9) > 0.0);
        // Venular end: oncotic wins, fluid is absorbed.
        assert!(starling_filtration(1.0, 15.0, 0.0, 28.0, 3.0, 1.0) < 0.0);
    }
}
