//! Discrete PID feedback control.
//!
//! Used by the character controller for balance and gait regulation, but
//! generic over any scalar error signal.
//!
//! Two sharp edges are deliberate and covered by tests rather than patched:
//!
//! - `dt` must be positive. Passing `dt == 0` divides by zero in the
//!   derivative term and the result is non-finite; the caller guards.
//! - There is no integral clamping. A sustained one-sided error grows the
//!   accumulator without bound (classic windup).

use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f32,
    /// Integral gain.
    pub ki: f32,
    /// Derivative gain.
    pub kd: f32,
}

impl PidGains {
    /// Create a gain set.
    #[must_use]
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// Proportional-only gains.
    #[must_use]
    pub const fn proportional(kp: f32) -> Self {
        Self::new(kp, 0.0, 0.0)
    }

    /// True when every gain is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

/// A discrete PID control loop.
///
/// State is reset only by recreating the controller; there is no reset
/// method on purpose.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PidController {
    gains: PidGains,
    integral: f32,
    prev_error: f32,
}

impl PidController {
    /// Create a controller with zeroed accumulator state.
    #[must_use]
    pub const fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Advance the loop by one sample and return the control output
    /// `kp·e + ki·∫e + kd·de/dt`.
    ///
    /// `dt` must be > 0; a zero `dt` produces a non-finite derivative term.
    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        self.integral += error * dt;
        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    /// The configured gains.
    #[must_use]
    pub const fn gains(&self) -> PidGains {
        self.gains
    }

    /// Current integral accumulator value.
    #[must_use]
    pub const fn integral(&self) -> f32 {
        self.integral
    }

    /// Error seen by the previous update.
    #[must_use]
    pub const fn prev_error(&self) -> f32 {
        self.prev_error
    }
}
