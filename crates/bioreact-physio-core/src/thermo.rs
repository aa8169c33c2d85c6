//! Body heat balance and thermoregulation.
//!
//! Single-node model: one body temperature feeds every loss term. Heat in is
//! the caller-supplied metabolic rate; heat out is convection (wind-modulated
//! coefficient), radiation (Stefan–Boltzmann on absolute temperatures) and
//! evaporation (sweat mass flow × latent heat). The temperature integrates
//! `ΔT = net·dt / (c·m)` and the sweat rate is re-derived from the setpoint
//! error after each step.
//!
//! Humidity is carried in [`AmbientSample`] but does not enter any term yet;
//! the shivering flag is a bare threshold with no hysteresis. Both behaviors
//! are pinned by tests.

use serde::{Deserialize, Serialize};

/// Celsius to Kelvin offset.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Stefan–Boltzmann constant (W/(m²·K⁴)).
pub const STEFAN_BOLTZMANN_W_M2_K4: f32 = 5.670e-8;

/// Emissivity of skin (dimensionless).
pub const SKIN_EMISSIVITY: f32 = 0.95;

/// Convective coefficient in still air (W/(m²·°C)).
pub const CONVECTIVE_BASE_W_M2_C: f32 = 3.1;

/// Convective coefficient gain per √(m/s) of air speed (W/(m²·°C)).
pub const CONVECTIVE_WIND_W_M2_C: f32 = 8.3;

/// Latent heat of sweat evaporation (J/g).
pub const LATENT_HEAT_J_PER_G: f32 = 2260.0;

/// Skin temperature above which sweat actually evaporates (°C).
pub const SWEAT_ONSET_C: f32 = 37.2;

/// Ambient environment readings sampled once per frame.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AmbientSample {
    /// Air temperature (°C).
    pub temperature_c: f32,
    /// Air speed over the body (m/s).
    pub air_speed_m_s: f32,
    /// Relative humidity (0–100). Accepted but not yet used by any term.
    pub humidity_pct: f32,
    /// Ambient luminance (lux), consumed by the pupil model.
    pub luminance_lux: f32,
}

impl AmbientSample {
    /// Still air at the given temperature, indoor light.
    #[must_use]
    pub const fn still(temperature_c: f32) -> Self {
        Self {
            temperature_c,
            air_speed_m_s: 0.0,
            humidity_pct: 50.0,
            luminance_lux: 500.0,
        }
    }
}

impl Default for AmbientSample {
    fn default() -> Self {
        Self::still(20.0)
    }
}

/// Biophysical constants for one body.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ThermoParams {
    /// Body mass (kg).
    pub body_mass_kg: f32,
    /// Skin surface area (m²).
    pub surface_area_m2: f32,
    /// Tissue specific heat capacity (J/(kg·°C)).
    pub specific_heat_j_kg_c: f32,
    /// Resting metabolic rate (W).
    pub basal_rate_w: f32,
    /// Thermoneutral setpoint (°C).
    pub setpoint_c: f32,
    /// Sweat response gain (g/s per °C above setpoint).
    pub sweat_gain_g_s_c: f32,
    /// Shivering onset temperature (°C).
    pub shiver_threshold_c: f32,
}

impl ThermoParams {
    /// True when every parameter is finite and physically positive where it
    /// must be.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.body_mass_kg.is_finite()
            && self.body_mass_kg > 0.0
            && self.surface_area_m2.is_finite()
            && self.surface_area_m2 > 0.0
            && self.specific_heat_j_kg_c.is_finite()
            && self.specific_heat_j_kg_c > 0.0
            && self.basal_rate_w.is_finite()
            && self.basal_rate_w >= 0.0
            && self.setpoint_c.is_finite()
            && self.sweat_gain_g_s_c.is_finite()
            && self.sweat_gain_g_s_c >= 0.0
            && self.shiver_threshold_c.is_finite()
    }
}

impl Default for ThermoParams {
    fn default() -> Self {
        Self {
            body_mass_kg: 70.0,
            surface_area_m2: 1.9,
            specific_heat_j_kg_c: 3500.0,
            basal_rate_w: 100.0,
            setpoint_c: 37.0,
            sweat_gain_g_s_c: 0.25,
            shiver_threshold_c: 35.5,
        }
    }
}

/// Stateful heat-balance model.
///
/// Reusable standalone or embedded in a character controller.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ThermoregulationModel {
    params: ThermoParams,
    body_temp_c: f32,
    sweat_rate_g_s: f32,
    shivering: bool,
}

impl ThermoregulationModel {
    /// Create a model resting at its setpoint.
    #[must_use]
    pub const fn new(params: ThermoParams) -> Self {
        Self {
            params,
            body_temp_c: params.setpoint_c,
            sweat_rate_g_s: 0.0,
            shivering: false,
        }
    }

    /// Override the starting temperature (scenario setup).
    #[must_use]
    pub const fn with_body_temp(mut self, temperature_c: f32) -> Self {
        self.body_temp_c = temperature_c;
        self
    }

    /// Convective loss for the current body temperature (W).
    ///
    /// `h = h_base + h_wind·√v`; negative when the air is hotter than the
    /// body (convective gain).
    #[must_use]
    pub fn convective_loss_w(&self, ambient: &AmbientSample) -> f32 {
        let h = CONVECTIVE_BASE_W_M2_C
            + CONVECTIVE_WIND_W_M2_C * libm::sqrtf(ambient.air_speed_m_s.max(0.0));
        h * self.params.surface_area_m2 * (self.body_temp_c - ambient.temperature_c)
    }

    /// Radiative loss via Stefan–Boltzmann on absolute temperatures (W).
    #[must_use]
    pub fn radiative_loss_w(&self, ambient: &AmbientSample) -> f32 {
        let skin_k = self.body_temp_c + KELVIN_OFFSET;
        let ambient_k = ambient.temperature_c + KELVIN_OFFSET;
        SKIN_EMISSIVITY
            * STEFAN_BOLTZMANN_W_M2_K4
            * self.params.surface_area_m2
            * (libm::powf(skin_k, 4.0) - libm::powf(ambient_k, 4.0))
    }

    /// Evaporative loss from the current sweat rate (W).
    ///
    /// Zero unless the body is above [`SWEAT_ONSET_C`] and sweating.
    #[must_use]
    pub fn evaporative_loss_w(&self) -> f32 {
        if self.body_temp_c > SWEAT_ONSET_C && self.sweat_rate_g_s > 0.0 {
            self.sweat_rate_g_s * LATENT_HEAT_J_PER_G
        } else {
            0.0
        }
    }

    /// Integrate one step of the heat balance.
    ///
    /// `metabolic_w` is total heat production (basal plus activity); the
    /// caller computes it. After the temperature update the sweat rate is
    /// re-derived as `max(0, (T − setpoint) × gain)` and the shivering flag
    /// as `T < shiver_threshold`.
    pub fn advance(&mut self, metabolic_w: f32, ambient: &AmbientSample, dt: f32) {
        let losses = self.convective_loss_w(ambient)
            + self.radiative_loss_w(ambient)
            + self.evaporative_loss_w();
        let net_w = metabolic_w - losses;

        let heat_capacity = self.params.specific_heat_j_kg_c * self.params.body_mass_kg;
        self.body_temp_c += net_w * dt / heat_capacity;

        self.sweat_rate_g_s =
            ((self.body_temp_c - self.params.setpoint_c) * self.params.sweat_gain_g_s_c).max(0.0);
        self.shivering = self.body_temp_c < self.params.shiver_threshold_c;
    }

    /// Current body temperature (°C).
    #[must_use]
    pub const fn body_temp_c(&self) -> f32 {
        self.body_temp_c
    }

    /// Current sweat rate (g/s), never negative.
    #[must_use]
    pub const fn sweat_rate_g_s(&self) -> f32 {
        self.sweat_rate_g_s
    }

    /// True while the body is below the shivering threshold.
    #[must_use]
    pub const fn is_shivering(&self) -> bool {
        self.shivering
    }

    /// The configured parameters.
    #[must_use]
    pub const fn params(&self) -> ThermoParams {
        self.params
    }
}

impl Default for ThermoregulationModel {
    fn default() -> Self {
        Self::new(ThermoParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equilibrium_holds_temperature() {
        let mut model = ThermoregulationModel::default();
        let ambient = AmbientSample::still(25.0);
        let balanced = model.convective_loss_w(&ambient)
            + model.radiative_loss_w(&ambient)
            + model.evaporative_loss_w();

        model.advance(balanced, &ambient, 1.0 / 60.0);
        assert!((model.body_temp_c() - 37.0).abs() < 1e-5);
    }

    #[test]
    fn test_exertion_warms_and_sweats() {
        let mut model = ThermoregulationModel::default();
        let ambient = AmbientSample::still(30.0);
        // Heavy exertion for a simulated minute.
        for _ in 0..3600 {
            model.advance(900.0, &ambient, 1.0 / 60.0);
        }
        assert!(model.body_temp_c() > 37.0);
        assert!(model.sweat_rate_g_s() > 0.0);
        assert!(!model.is_shivering());
    }

    #[test]
    fn test_cold_wind_cools_faster_than_still_air() {
        let still = AmbientSample::still(0.0);
        let windy = AmbientSample {
            air_speed_m_s: 9.0,
            ..still
        };
        let model = ThermoregulationModel::default();
        assert!(model.convective_loss_w(&windy) > model.convective_loss_w(&still));
    }

    #[test]
    fn test_humidity_is_ignored() {
        let model = ThermoregulationModel::default();
        let dry = AmbientSample {
            humidity_pct: 0.0,
            ..AmbientSample::still(25.0)
        };
        let humid = AmbientSample {
            humidity_pct: 100.0,
            ..AmbientSample::still(25.0)
        };
        // Known gap: humidity plays no role in any loss term.
        assert_eq!(model.convective_loss_w(&dry), model.convective_loss_w(&humid));
        assert_eq!(model.radiative_loss_w(&dry), model.radiative_loss_w(&humid));
    }

    #[test]
    fn test_sweat_rate_never_negative() {
        let mut model = ThermoregulationModel::default().with_body_temp(34.0);
        model.advance(0.0, &AmbientSample::still(-10.0), 1.0 / 60.0);
        assert_eq!(model.sweat_rate_g_s(), 0.0);
    }

    #[test]
    fn test_shivering_threshold_no_hysteresis() {
        let ambient = AmbientSample::still(35.0);
        // dt = 0 leaves the temperature untouched, so the flag reflects the
        // seeded value exactly.
        let mut at_threshold = ThermoregulationModel::default().with_body_temp(35.5);
        at_threshold.advance(0.0, &ambient, 0.0);
        assert!(!at_threshold.is_shivering());

        let mut below = ThermoregulationModel::default().with_body_temp(35.499);
        below.advance(0.0, &ambient, 0.0);
        assert!(below.is_shivering());
    }

    #[test]
    fn test_zero_dt_no_temperature_change() {
        let mut model = ThermoregulationModel::default();
        model.advance(5000.0, &AmbientSample::still(50.0), 0.0);
        assert!((model.body_temp_c() - 37.0).abs() < 1e-6);
    }

    #[test]
    fn test_evaporation_requires_onset_temperature() {
        let mut model = ThermoregulationModel::default().with_body_temp(37.1);
        // Force a sweat rate by stepping once above setpoint.
        model.advance(0.0, &AmbientSample::still(37.1), 0.0);
        assert!(model.sweat_rate_g_s() > 0.0);
        // 37.1 °C is below the 37.2 °C onset: sweat exists but does not cool.
        assert_eq!(model.evaporative_loss_w(), 0.0);
    }
}
