//! Fluid regions, buoyancy and drag.
//!
//! Submersion geometry is deliberately coarse: a body inside a region is
//! treated as a half-submerged sphere of its configured radius, so volume
//! and cross-section are closed-form. Buoyancy is Archimedes on that half
//! volume; drag is the quadratic law against the region's drag coefficient.
//! The registry only grows; there is no removal API.

use std::f32::consts::PI;

use bioreact_physio_core::Velocity;
use rapier3d::prelude::RigidBody;
use serde::{Deserialize, Serialize};

/// A spherical region of fluid with uniform density.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FluidRegion {
    /// Region center (m).
    pub center: Velocity,
    /// Fluid density (kg/m³), strictly positive.
    pub density_kg_m3: f32,
    /// Drag coefficient for bodies moving through the region.
    pub drag_coefficient: f32,
    /// Region extent radius (m).
    pub radius_m: f32,
}

impl FluidRegion {
    /// Fresh water with the drag coefficient of a smooth sphere.
    #[must_use]
    pub const fn water(center: Velocity, radius_m: f32) -> Self {
        Self {
            center,
            density_kg_m3: 1000.0,
            drag_coefficient: 0.47,
            radius_m,
        }
    }

    /// True when density and radius are physical.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.density_kg_m3.is_finite()
            && self.density_kg_m3 > 0.0
            && self.drag_coefficient.is_finite()
            && self.drag_coefficient >= 0.0
            && self.radius_m.is_finite()
            && self.radius_m > 0.0
    }
}

/// Volume of a half-submerged sphere, `(4/3)·π·r³ × 0.5`.
#[must_use]
pub fn half_submerged_volume_m3(radius_m: f32) -> f32 {
    (4.0 / 3.0) * PI * radius_m * radius_m * radius_m * 0.5
}

/// Buoyant and drag force one region exerts on a body.
///
/// Returns `(buoyancy, drag)`; both are exactly zero when the body center is
/// farther from the region center than the region radius. The boundary
/// itself counts as submerged.
#[must_use]
pub fn region_forces(
    region: &FluidRegion,
    body_position: Velocity,
    body_velocity: Velocity,
    submersion_radius_m: f32,
    gravity_m_s2: f32,
) -> (Velocity, Velocity) {
    let distance = (body_position - region.center).magnitude();
    if distance > region.radius_m {
        return (Velocity::zero(), Velocity::zero());
    }

    let volume = half_submerged_volume_m3(submersion_radius_m);
    let area = PI * submersion_radius_m * submersion_radius_m;

    let buoyancy = Velocity::new(0.0, region.density_kg_m3 * gravity_m_s2 * volume, 0.0);

    let speed = body_velocity.magnitude();
    let drag = if speed > 1e-6 {
        let magnitude = 0.5 * region.density_kg_m3 * speed * speed * region.drag_coefficient * area;
        body_velocity.normalized() * -magnitude
    } else {
        Velocity::zero()
    };

    (buoyancy, drag)
}

/// Append-only registry of fluid regions.
#[derive(Debug, Default)]
pub struct FluidField {
    regions: Vec<FluidRegion>,
    gravity_m_s2: f32,
}

impl FluidField {
    /// Create a field using the magnitude of the world gravity for
    /// buoyancy.
    #[must_use]
    pub fn new(gravity: Velocity) -> Self {
        Self {
            regions: Vec::new(),
            gravity_m_s2: gravity.magnitude(),
        }
    }

    /// Append a region. Regions are never removed.
    pub fn add_region(&mut self, region: FluidRegion) {
        self.regions.push(region);
    }

    /// Registered regions, in insertion order.
    #[must_use]
    pub fn regions(&self) -> &[FluidRegion] {
        &self.regions
    }

    /// Number of registered regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no regions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Accumulate buoyancy and drag from every region onto one body.
    pub(crate) fn apply(&self, body: &mut RigidBody, submersion_radius_m: f32) {
        let position = Velocity::from_vector3(body.translation());
        let velocity = Velocity::from_vector3(body.linvel());

        for region in &self.regions {
            let (buoyancy, drag) =
                region_forces(region, position, velocity, submersion_radius_m, self.gravity_m_s2);
            let total = buoyancy + drag;
            if total != Velocity::zero() {
                body.add_force(total.to_vector3(), true);
            }
        }
    }
}
