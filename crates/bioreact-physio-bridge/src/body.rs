//! Registry entries for plain rigid bodies.
//!
//! External code never holds engine handles; it holds a [`BodyId`] and goes
//! through the orchestrator, which owns these entries. Each entry pairs the
//! engine body and collider with the metadata the physio models need
//! (material, configured mass, submersion radius).

use bioreact_physio_core::Material;
use rapier3d::prelude::{ColliderHandle, RigidBody, RigidBodyHandle};
use serde::{Deserialize, Serialize};

/// Opaque id for a plain body in the orchestrator's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// One engine body + collider pair with its simulation metadata.
#[derive(Debug)]
pub(crate) struct SimBody {
    pub(crate) body: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
    pub(crate) material: Material,
    pub(crate) mass_kg: f32,
    pub(crate) submersion_radius_m: f32,
    pub(crate) dynamic: bool,
}

/// Translational plus rotational kinetic energy (J).
///
/// The rotational term uses the principal inertia with the angular velocity
/// expressed in the principal frame: `½ Σ Iᵢωᵢ²`.
pub(crate) fn kinetic_energy(body: &RigidBody) -> f32 {
    let linear = 0.5 * body.mass() * body.linvel().norm_squared();

    let mprops = &body.mass_properties().local_mprops;
    let principal = mprops.principal_inertia();
    let to_world = body.rotation() * mprops.principal_inertia_local_frame;
    let w = to_world.inverse_transform_vector(body.angvel());
    let rotational =
        0.5 * (principal.x * w.x * w.x + principal.y * w.y * w.y + principal.z * w.z * w.z);

    linear + rotational
}
