//! Upright-capsule character controller.
//!
//! One rapier capsule per character, plus the physiological models that hang
//! off it. Every fixed substep runs a fixed-order mechanical pass:
//!
//!   ground probe -> drive -> jump -> tendon -> balance -> gait -> turn
//!     -> thermal
//!
//! The cardiac dipole and pupil run on frame cadence instead, advanced once
//! per orchestrator call through [`CharacterController::advance_physiology`].
//!
//! Failure isolation: `update` returns `Err` when the rapier body has gone
//! missing or its state has turned non-finite; the orchestrator quarantines
//! the character and the frame continues for everyone else.

use bioreact_physio_core::cardiac::{DEFAULT_CARDIAC_RATE_HZ, DEFAULT_DIPOLE_SCALE};
use bioreact_physio_core::{
    AmbientSample, CardiacDipole, GaitOscillator, MuscleTargets, OcularModel, PidController,
    ThermoregulationModel, Velocity,
};
use nalgebra::{Point3, Vector3};
use rapier3d::prelude::{
    ColliderHandle, ColliderSet, QueryFilter, QueryPipeline, Ray, RigidBodyHandle, RigidBodySet,
};
use serde::{Deserialize, Serialize};

use crate::body::kinetic_energy;
use crate::config::CharacterParams;
use crate::error::CharacterError;

/// Downward probe length below the capsule base (m).
const GROUND_PROBE_M: f32 = 0.15;

/// Cooldown after a jump (s).
const JUMP_COOLDOWN_S: f32 = 0.8;

/// Vertical speed below which a grounded capsule counts as descending (m/s).
const DESCENT_THRESHOLD_M_S: f32 = -0.1;

/// Tendon strain accumulated per metre of descent.
const TENDON_LOAD_PER_M: f32 = 1.0;

/// Multiplicative strain decay per step outside the loading condition.
const TENDON_DECAY: f32 = 0.9;

/// Upward elastic force per unit strain (N).
const TENDON_STIFFNESS_N: f32 = 400.0;

/// Fraction of kinetic power fed back into the thermal model as work heat.
const WORK_HEAT_FACTOR: f32 = 0.05;

/// Yaw rate requested by a full-scale turn input (rad/s).
const MAX_TURN_RATE_RAD_S: f32 = 3.0;

/// Yaw torque response (1/s). Matched to the capsule's angular damping so
/// the steady-state yaw rate equals the requested rate.
pub(crate) const TURN_RESPONSE_PER_S: f32 = 4.0;

/// Opaque character identifier handed to external code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

/// Serializable per-character snapshot, refreshed by the controller's own
/// update and never mutated elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    /// Capsule center position (m).
    pub position: Velocity,
    /// Body orientation as a unit quaternion, `(x, y, z, w)`.
    pub rotation: [f32; 4],
    /// Linear velocity (m/s).
    pub velocity: Velocity,
    /// True when the downward probe hit within range this step.
    pub grounded: bool,
    /// Seconds until the next jump is allowed, never negative.
    pub jump_cooldown_s: f32,
    /// Accumulated tendon strain, never negative.
    pub tendon_strain: f32,
    /// Core body temperature (°C).
    pub body_temp_c: f32,
    /// Sweat secretion rate (g/s), never negative.
    pub sweat_rate_g_s: f32,
    /// True when the thermal model is shivering.
    pub shivering: bool,
    /// Pupil radius (m), within the ocular clamp bounds.
    pub pupil_radius_m: f32,
    /// Gait torque targets, stored but not applied to any body.
    pub muscle_targets: MuscleTargets,
}

impl CharacterState {
    fn initial(position: Velocity, body_temp_c: f32, pupil_radius_m: f32) -> Self {
        Self {
            position,
            rotation: [0.0, 0.0, 0.0, 1.0],
            velocity: Velocity::zero(),
            grounded: false,
            jump_cooldown_s: 0.0,
            tendon_strain: 0.0,
            body_temp_c,
            sweat_rate_g_s: 0.0,
            shivering: false,
            pupil_radius_m,
            muscle_targets: MuscleTargets::zero(),
        }
    }
}

/// Controller owning one capsule body and the physiology attached to it.
#[derive(Debug)]
pub struct CharacterController {
    params: CharacterParams,
    pub(crate) body: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
    /// Balance loop. Public so hosts can retune gains between steps.
    pub balance_pid: PidController,
    /// Gait speed loop. Wired for a future articulated skeleton; the phase
    /// oscillator currently runs open loop and never consults it.
    pub gait_pid: PidController,
    gait: GaitOscillator,
    cardiac: CardiacDipole,
    ocular: OcularModel,
    thermo: ThermoregulationModel,
    state: CharacterState,
    prev_jump: bool,
}

impl CharacterController {
    pub(crate) fn new(
        params: CharacterParams,
        body: RigidBodyHandle,
        collider: ColliderHandle,
    ) -> Self {
        let thermo = ThermoregulationModel::new(params.thermo);
        let ocular = OcularModel::new();
        let state =
            CharacterState::initial(params.position, thermo.body_temp_c(), ocular.pupil_radius_m());
        Self {
            balance_pid: PidController::new(params.balance_gains),
            gait_pid: PidController::new(params.gait_gains),
            gait: GaitOscillator::default(),
            cardiac: CardiacDipole::new(DEFAULT_CARDIAC_RATE_HZ, DEFAULT_DIPOLE_SCALE),
            ocular,
            thermo,
            state,
            params,
            body,
            collider,
            prev_jump: false,
        }
    }

    /// Latest snapshot.
    #[must_use]
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    /// Construction parameters.
    #[must_use]
    pub fn params(&self) -> &CharacterParams {
        &self.params
    }

    /// Thermal model state.
    #[must_use]
    pub fn thermo(&self) -> &ThermoregulationModel {
        &self.thermo
    }

    /// Cardiac dipole state.
    #[must_use]
    pub fn cardiac(&self) -> &CardiacDipole {
        &self.cardiac
    }

    /// Ocular state.
    #[must_use]
    pub fn ocular(&self) -> &OcularModel {
        &self.ocular
    }

    /// ECG potential at a world-space electrode, with the dipole sitting at
    /// the capsule center.
    #[must_use]
    pub fn ecg(&self, electrode_world: &Velocity) -> f32 {
        let relative = *electrode_world - self.state.position;
        self.cardiac.ecg(&relative)
    }

    /// One fixed-step mechanical pass. `dt` is the fixed timestep.
    pub(crate) fn update(
        &mut self,
        dt: f32,
        intent: &crate::adapter::MovementIntent,
        ambient: &AmbientSample,
        bodies: &mut RigidBodySet,
        colliders: &ColliderSet,
        queries: &QueryPipeline,
    ) -> Result<(), CharacterError> {
        let (position, rotation, velocity) = {
            let body = bodies.get(self.body).ok_or(CharacterError::BodyMissing)?;
            (
                Velocity::from_vector3(body.translation()),
                *body.rotation(),
                Velocity::from_vector3(body.linvel()),
            )
        };
        if !position.is_finite() {
            return Err(CharacterError::NonFinite {
                quantity: "position",
            });
        }
        if !velocity.is_finite() {
            return Err(CharacterError::NonFinite {
                quantity: "velocity",
            });
        }

        // 1. Ground probe from the capsule base, excluding our own collider.
        let base_offset = rotation
            * Vector3::new(
                0.0,
                -(self.params.capsule_half_height_m() + self.params.radius_m),
                0.0,
            );
        let ray = Ray::new(
            Point3::from(position.to_vector3() + base_offset),
            Vector3::new(0.0, -1.0, 0.0),
        );
        let filter = QueryFilter::default().exclude_rigid_body(self.body);
        let grounded = queries
            .cast_ray(bodies, colliders, &ray, GROUND_PROBE_M, true, filter)
            .is_some();

        // 2. Movement intent as a unit horizontal direction.
        let direction = intent.direction();

        let body = bodies.get_mut(self.body).ok_or(CharacterError::BodyMissing)?;

        // 3. Velocity-matching drive impulse, capped at max_force · dt.
        let desired = direction * self.params.max_speed_m_s;
        let mut impulse = (desired - velocity.horizontal()) * self.params.mass_kg;
        let limit = self.params.max_force_n * dt;
        let magnitude = impulse.magnitude();
        if magnitude > limit {
            impulse = impulse * (limit / magnitude);
        }
        if magnitude > 1e-6 {
            body.apply_impulse(impulse.to_vector3(), true);
        }

        // 4. Edge-triggered jump.
        self.state.jump_cooldown_s = (self.state.jump_cooldown_s - dt).max(0.0);
        let jump_edge = intent.jump && !self.prev_jump;
        self.prev_jump = intent.jump;
        if jump_edge && grounded && self.state.jump_cooldown_s <= 0.0 {
            body.apply_impulse(Vector3::new(0.0, self.params.jump_impulse_n_s, 0.0), true);
            self.state.jump_cooldown_s = JUMP_COOLDOWN_S;
        }

        // 5. Tendon strain: load while grounded and descending, decay
        //    otherwise; positive strain pushes back up.
        if grounded && velocity.y < DESCENT_THRESHOLD_M_S {
            self.state.tendon_strain += -velocity.y * TENDON_LOAD_PER_M * dt;
        } else {
            self.state.tendon_strain *= TENDON_DECAY;
        }
        if self.state.tendon_strain > 1e-4 {
            body.add_force(
                Vector3::new(0.0, self.state.tendon_strain * TENDON_STIFFNESS_N, 0.0),
                true,
            );
        }

        // 6. Balance: horizontal COM drift from the capsule base feeds the
        //    PID; its output becomes a torque about the vertical axis.
        let com = Velocity::from_vector3(&body.center_of_mass().coords);
        let support = position + Velocity::from_vector3(&base_offset);
        let drift = (com - support).horizontal();
        let correction = self.balance_pid.update(-drift.magnitude(), dt);
        if correction.abs() > 1e-6 {
            body.add_torque(Vector3::new(0.0, correction, 0.0), true);
        }

        // 7. Gait phase accumulates simulated time; targets are stored for
        //    downstream articulation, never applied here.
        self.gait.advance(dt);
        self.state.muscle_targets = self.gait.targets();

        // 8. Turn torque scaled by the yaw moment of inertia.
        let desired_rate = intent.turn.clamp(-1.0, 1.0) * MAX_TURN_RATE_RAD_S;
        if desired_rate.abs() > 1e-6 {
            let yaw_inertia = body.mass_properties().local_mprops.principal_inertia().y;
            body.add_torque(
                Vector3::new(0.0, yaw_inertia * desired_rate * TURN_RESPONSE_PER_S, 0.0),
                true,
            );
        }

        // 9. Thermal balance with kinetic power recovered as work heat.
        let metabolic =
            self.params.thermo.basal_rate_w + (kinetic_energy(body) / dt) * WORK_HEAT_FACTOR;
        self.thermo.advance(metabolic, ambient, dt);

        self.state.position = Velocity::from_vector3(body.translation());
        self.state.velocity = Velocity::from_vector3(body.linvel());
        let q = body.rotation().coords;
        self.state.rotation = [q.x, q.y, q.z, q.w];
        self.state.grounded = grounded;
        self.state.body_temp_c = self.thermo.body_temp_c();
        self.state.sweat_rate_g_s = self.thermo.sweat_rate_g_s();
        self.state.shivering = self.thermo.is_shivering();
        Ok(())
    }

    /// Frame-cadence physiology: cardiac phase by elapsed simulated time,
    /// one pupil easing step from ambient luminance.
    pub(crate) fn advance_physiology(&mut self, elapsed_s: f32, ambient: &AmbientSample) {
        self.cardiac.advance(elapsed_s);
        self.ocular.update_pupil(ambient.luminance_lux);
        self.state.pupil_radius_m = self.ocular.pupil_radius_m();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MovementIntent;
    use rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder};

    fn capsule_world(
        params: &CharacterParams,
    ) -> (RigidBodySet, ColliderSet, QueryPipeline, CharacterController) {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector3::new(
                params.position.x,
                params.position.y,
                params.position.z,
            ))
            .build();
        let handle = bodies.insert(body);
        let collider = ColliderBuilder::capsule_y(params.capsule_half_height_m(), params.radius_m)
            .mass(params.mass_kg)
            .build();
        let collider_handle = colliders.insert_with_parent(collider, handle, &mut bodies);
        let controller = CharacterController::new(*params, handle, collider_handle);
        // Query pipeline left empty: probes find nothing, grounded stays
        // false, which is what a free-floating capsule should see.
        (bodies, colliders, QueryPipeline::new(), controller)
    }

    #[test]
    fn test_at_rest_idle_applies_no_impulse() {
        let params = CharacterParams::default();
        let (mut bodies, colliders, queries, mut controller) = capsule_world(&params);

        let intent = MovementIntent::idle();
        let ambient = AmbientSample::default();
        controller
            .update(1.0 / 60.0, &intent, &ambient, &mut bodies, &colliders, &queries)
            .unwrap();

        let body = &bodies[controller.body];
        assert_eq!(body.linvel().norm(), 0.0);
        assert!(!controller.state().grounded);
    }

    #[test]
    fn test_missing_body_reports_fault() {
        let params = CharacterParams::default();
        let (mut bodies, colliders, queries, mut controller) = capsule_world(&params);
        let handle = controller.body;
        let mut impulse_joints = rapier3d::prelude::ImpulseJointSet::new();
        let mut multibody_joints = rapier3d::prelude::MultibodyJointSet::new();
        let mut islands = rapier3d::prelude::IslandManager::new();
        let mut collider_set = colliders;
        bodies.remove(
            handle,
            &mut islands,
            &mut collider_set,
            &mut impulse_joints,
            &mut multibody_joints,
            true,
        );

        let err = controller
            .update(
                1.0 / 60.0,
                &MovementIntent::idle(),
                &AmbientSample::default(),
                &mut bodies,
                &collider_set,
                &queries,
            )
            .unwrap_err();
        assert_eq!(err, CharacterError::BodyMissing);
    }

    #[test]
    fn test_non_finite_position_reports_fault() {
        let params = CharacterParams::default();
        let (mut bodies, colliders, queries, mut controller) = capsule_world(&params);
        bodies[controller.body].set_translation(Vector3::new(f32::NAN, 0.0, 0.0), false);

        let err = controller
            .update(
                1.0 / 60.0,
                &MovementIntent::idle(),
                &AmbientSample::default(),
                &mut bodies,
                &colliders,
                &queries,
            )
            .unwrap_err();
        assert!(matches!(err, CharacterError::NonFinite { quantity: "position" }));
    }

    #[test]
    fn test_drive_impulse_capped_by_max_force() {
        let mut params = CharacterParams::default();
        params.max_force_n = 10.0;
        let (mut bodies, colliders, queries, mut controller) = capsule_world(&params);

        let intent = MovementIntent {
            move_x: 1.0,
            move_z: 0.0,
            turn: 0.0,
            jump: false,
        };
        let dt = 1.0 / 60.0;
        controller
            .update(dt, &intent, &AmbientSample::default(), &mut bodies, &colliders, &queries)
            .unwrap();

        // Δv = impulse / mass, with impulse capped at max_force · dt.
        let expected = params.max_force_n * dt / params.mass_kg;
        let speed = bodies[controller.body].linvel().norm();
        assert!((speed - expected).abs() < 1e-5);
    }

    #[test]
    fn test_jump_denied_while_airborne() {
        let params = CharacterParams::default();
        let (mut bodies, colliders, queries, mut controller) = capsule_world(&params);

        let intent = MovementIntent {
            move_x: 0.0,
            move_z: 0.0,
            turn: 0.0,
            jump: true,
        };
        controller
            .update(
                1.0 / 60.0,
                &intent,
                &AmbientSample::default(),
                &mut bodies,
                &colliders,
                &queries,
            )
            .unwrap();

        assert_eq!(bodies[controller.body].linvel().y, 0.0);
        assert_eq!(controller.state().jump_cooldown_s, 0.0);
    }

    #[test]
    fn test_gait_targets_stored_not_applied() {
        let params = CharacterParams::default();
        let (mut bodies, colliders, queries, mut controller) = capsule_world(&params);

        // A quarter of the default gait cycle puts the left hip near peak.
        let steps = (0.25 / bioreact_physio_core::gait::DEFAULT_GAIT_FREQUENCY_HZ / (1.0 / 60.0))
            .round() as usize;
        for _ in 0..steps {
            controller
                .update(
                    1.0 / 60.0,
                    &MovementIntent::idle(),
                    &AmbientSample::default(),
                    &mut bodies,
                    &colliders,
                    &queries,
                )
                .unwrap();
        }

        let targets = controller.state().muscle_targets;
        assert!(targets.get(bioreact_physio_core::Joint::HipLeft) > 0.0);
        // Idle body: the stored targets moved nothing.
        assert_eq!(bodies[controller.body].linvel().norm(), 0.0);
    }

    #[test]
    fn test_physiology_runs_on_frame_cadence() {
        let params = CharacterParams::default();
        let (_, _, _, mut controller) = capsule_world(&params);

        let initial = controller.state().pupil_radius_m;
        let bright = AmbientSample {
            luminance_lux: 10_000.0,
            ..AmbientSample::default()
        };
        controller.advance_physiology(0.1, &bright);

        assert!(controller.state().pupil_radius_m < initial);
        assert!((controller.cardiac().time_s() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_ecg_uses_capsule_relative_electrode() {
        let params = CharacterParams::default();
        let (_, _, _, controller) = capsule_world(&params);

        let close = controller.ecg(&(params.position + Velocity::new(0.2, 0.0, 0.0)));
        let far = controller.ecg(&(params.position + Velocity::new(0.8, 0.0, 0.0)));
        assert!(close.abs() > far.abs());
    }
}
