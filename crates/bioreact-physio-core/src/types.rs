//! Shared value types for the physio models.
//!
//! Serde-facing structs keep plain `f32` fields so snapshots serialize the
//! same way on every tier; nalgebra enters only through explicit converters
//! at the bridge boundary.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A 3-component vector quantity (velocity, position offset, direction).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// X component (m or m/s).
    pub x: f32,
    /// Y component, vertical axis (m or m/s).
    pub y: f32,
    /// Z component (m or m/s).
    pub z: f32,
}

impl Velocity {
    /// Create a new vector from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Euclidean magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.magnitude_squared())
    }

    /// Squared magnitude (cheaper when only compared or squared anyway).
    #[must_use]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit vector in the same direction, or zero if the magnitude is
    /// negligible.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < 1e-6 {
            return Self::zero();
        }
        Self::new(self.x / mag, self.y / mag, self.z / mag)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Copy with the vertical component zeroed (ground-plane projection).
    #[must_use]
    pub const fn horizontal(&self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Convert to a nalgebra vector for engine-side math.
    #[must_use]
    pub fn to_vector3(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Build from a nalgebra vector coming back from the engine.
    #[must_use]
    pub fn from_vector3(v: &Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// True when every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl core::ops::Add for Velocity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl core::ops::Sub for Velocity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl core::ops::Mul<f32> for Velocity {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f32; 3]> for Velocity {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Velocity> for [f32; 3] {
    fn from(v: Velocity) -> Self {
        [v.x, v.y, v.z]
    }
}

/// A unitless intensity clamped to [0.0, 1.0].
///
/// Used for acoustic gain and any other normalized signal strength.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Intensity(f32);

impl Intensity {
    /// Create a new intensity, clamping to [0.0, 1.0].
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Silence.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Full scale.
    #[must_use]
    pub const fn max() -> Self {
        Self(1.0)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }

    /// True when the intensity would be perceptible at all.
    #[must_use]
    pub fn is_audible(&self) -> bool {
        self.0 > 1e-3
    }
}
