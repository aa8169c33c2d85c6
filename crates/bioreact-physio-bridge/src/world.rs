//! Simulation orchestrator.
//!
//! [`Simulation`] owns the rapier world and the registries of bodies,
//! characters and fluid regions. `step(frame_delta)` runs the fixed-timestep
//! accumulator loop; each whole substep advances the world, then updates
//! every character, then applies fluid forces to plain dynamic bodies, then
//! turns fresh collisions into sound cues. Cardiac and pupil models advance
//! once per call, not per substep.
//!
//! External code holds opaque [`BodyId`]/[`CharacterId`] values and talks to
//! the engine only through the pass-through operations here; nothing outside
//! this module sees a rapier handle. When the engine is absent (built via
//! [`Simulation::disabled`] or after [`Simulation::dispose`]) every stepping
//! and per-body operation degrades to a no-op and creation returns
//! [`SimError::EngineUnavailable`].

use std::collections::{BTreeMap, VecDeque};

use crossbeam::channel::Receiver;
use nalgebra::{Point3, Vector3};
use rapier3d::prelude::{
    ActiveEvents, CCDSolver, ChannelEventCollector, ColliderBuilder, ColliderHandle, ColliderSet,
    CollisionEvent, ContactForceEvent, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters,
    IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryPipeline, RigidBody,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bioreact_physio_core::{AmbientSample, Material, ThermoregulationModel, Velocity};

use crate::adapter::{EnvironmentAdapter, MovementIntent, StillEnvironment};
use crate::body::{kinetic_energy, BodyId, SimBody};
use crate::character::{CharacterController, CharacterId, CharacterState, TURN_RESPONSE_PER_S};
use crate::config::{BodyShape, BodySpec, CharacterParams, Motion, SimConfig};
use crate::error::{SimError, SimResult};
use crate::events::{SimEvent, SoundCue};
use crate::fluids::{FluidField, FluidRegion};

/// What one [`Simulation::step`] call consumed and produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Fixed substeps consumed, never above the configured cap.
    pub substeps: u32,
    /// Simulated time left in the accumulator after the call (s).
    pub accumulator_s: f32,
    /// Character faults recorded during the call.
    pub faults: u32,
}

/// The rapier world and everything required to step it.
struct Engine {
    gravity: Vector3<f32>,
    integration: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    queries: QueryPipeline,
    collector: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    force_recv: Receiver<ContactForceEvent>,
}

impl Engine {
    fn new(config: &SimConfig) -> Self {
        let (collision_send, collision_recv) = crossbeam::channel::unbounded();
        let (force_send, force_recv) = crossbeam::channel::unbounded();
        let mut integration = IntegrationParameters::default();
        integration.dt = config.fixed_timestep_s;
        Self {
            gravity: config.gravity.to_vector3(),
            integration,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            queries: QueryPipeline::new(),
            collector: ChannelEventCollector::new(collision_send, force_send),
            collision_recv,
            force_recv,
        }
    }

    /// One fixed engine step, refreshing the query pipeline.
    fn advance(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.queries),
            &(),
            &self.collector,
        );
    }

    /// Release one body's engine-side objects, collider first.
    fn release(&mut self, collider: ColliderHandle, body: RigidBodyHandle) {
        self.colliders
            .remove(collider, &mut self.islands, &mut self.bodies, false);
        self.bodies.remove(
            body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            false,
        );
    }
}

/// Fixed-timestep rigid-body simulation with physiological signal models.
pub struct Simulation {
    config: SimConfig,
    adapter: Box<dyn EnvironmentAdapter>,
    engine: Option<Engine>,
    bodies: BTreeMap<BodyId, SimBody>,
    characters: BTreeMap<CharacterId, CharacterController>,
    fluids: FluidField,
    thermo: Option<ThermoregulationModel>,
    events: VecDeque<SimEvent>,
    quarantine: Vec<CharacterId>,
    accumulator_s: f32,
    sim_time_s: f32,
    next_body: u32,
    next_character: u32,
}

impl Simulation {
    /// Build the rigid-body world and the empty registries.
    ///
    /// Rejects an invalid configuration with
    /// [`SimError::InvalidConfig`]; on success the event queue starts with
    /// [`SimEvent::PhysicsReady`].
    pub fn new(config: SimConfig, adapter: Box<dyn EnvironmentAdapter>) -> SimResult<Self> {
        config.validate()?;
        let mut sim = Self {
            engine: Some(Engine::new(&config)),
            fluids: FluidField::new(config.gravity),
            config,
            adapter,
            bodies: BTreeMap::new(),
            characters: BTreeMap::new(),
            thermo: None,
            events: VecDeque::new(),
            quarantine: Vec::new(),
            accumulator_s: 0.0,
            sim_time_s: 0.0,
            next_body: 0,
            next_character: 0,
        };
        info!(
            "Rigid-body world ready (dt = {:.4} s, max {} substeps)",
            sim.config.fixed_timestep_s, sim.config.max_substeps
        );
        sim.events.push_back(SimEvent::PhysicsReady);
        Ok(sim)
    }

    /// Build without a rigid-body engine.
    ///
    /// The degraded mode hosts fall back to when world construction fails:
    /// `step` consumes nothing, creation returns
    /// [`SimError::EngineUnavailable`], per-body operations are no-ops.
    #[must_use]
    pub fn disabled(config: SimConfig) -> Self {
        warn!("Simulation running without a rigid-body engine; all stepping is a no-op");
        Self {
            engine: None,
            fluids: FluidField::new(config.gravity),
            config,
            adapter: Box::new(StillEnvironment),
            bodies: BTreeMap::new(),
            characters: BTreeMap::new(),
            thermo: None,
            events: VecDeque::new(),
            quarantine: Vec::new(),
            accumulator_s: 0.0,
            sim_time_s: 0.0,
            next_body: 0,
            next_character: 0,
        }
    }

    /// Advance simulated time by `frame_delta_s` of wall time.
    ///
    /// Runs whole fixed substeps out of the accumulator, at most
    /// `max_substeps` per call; leftover time stays accumulated. The frame
    /// delta is not validated; a negative value drives the accumulator
    /// negative and simply consumes no substeps. Without an engine this is a
    /// no-op returning an empty summary.
    pub fn step(&mut self, frame_delta_s: f32) -> StepSummary {
        // Characters that faulted last call leave the world first.
        let stale = std::mem::take(&mut self.quarantine);
        for id in stale {
            self.remove_character(id);
        }

        if self.engine.is_none() {
            return StepSummary::default();
        }

        self.accumulator_s += frame_delta_s;

        // Input and environment are sampled once per call, not per substep.
        let ambient = self.adapter.ambient();
        let intents: Vec<(CharacterId, MovementIntent)> = self
            .characters
            .keys()
            .map(|&id| (id, self.adapter.intent(id)))
            .collect();

        let dt = self.config.fixed_timestep_s;
        let mut summary = StepSummary::default();
        while self.accumulator_s >= dt && summary.substeps < self.config.max_substeps {
            self.advance_substep(dt, &ambient, &intents, &mut summary);
            self.accumulator_s -= dt;
            self.sim_time_s += dt;
            summary.substeps += 1;
        }

        // Frame-cadence physiology, advanced by the simulated time the call
        // actually consumed.
        let elapsed = summary.substeps as f32 * dt;
        for character in self.characters.values_mut() {
            character.advance_physiology(elapsed, &ambient);
        }
        if let Some(model) = self.thermo.as_mut() {
            let basal = model.params().basal_rate_w;
            model.advance(basal, &ambient, elapsed);
        }

        summary.accumulator_s = self.accumulator_s;
        summary
    }

    /// One fixed substep: world advance, character updates, fluid forces,
    /// collision sounds.
    fn advance_substep(
        &mut self,
        dt: f32,
        ambient: &AmbientSample,
        intents: &[(CharacterId, MovementIntent)],
        summary: &mut StepSummary,
    ) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        engine.advance();

        // Forces accumulated during the previous substep have now acted for
        // exactly one engine step.
        for (_, body) in engine.bodies.iter_mut() {
            if body.is_dynamic() {
                body.reset_forces(false);
                body.reset_torques(false);
            }
        }

        for (id, intent) in intents {
            if self.quarantine.contains(id) {
                continue;
            }
            let Some(character) = self.characters.get_mut(id) else {
                continue;
            };
            if let Err(err) = character.update(
                dt,
                intent,
                ambient,
                &mut engine.bodies,
                &engine.colliders,
                &engine.queries,
            ) {
                warn!("Character {} quarantined: {}", id.0, err);
                self.events.push_back(SimEvent::CharacterFault {
                    id: *id,
                    reason: err.to_string(),
                });
                self.quarantine.push(*id);
                summary.faults += 1;
            }
        }

        if !self.fluids.is_empty() {
            for sim_body in self.bodies.values() {
                if !sim_body.dynamic {
                    continue;
                }
                if let Some(body) = engine.bodies.get_mut(sim_body.body) {
                    self.fluids.apply(body, sim_body.submersion_radius_m);
                }
            }
        }

        // A cue fires when a pair starts touching, with the contact force
        // rapier measured this substep; sustained contact stays silent.
        let mut started: Vec<(ColliderHandle, ColliderHandle)> = Vec::new();
        while let Ok(event) = engine.collision_recv.try_recv() {
            if let CollisionEvent::Started(first, second, _) = event {
                started.push((first, second));
            }
        }
        while let Ok(event) = engine.force_recv.try_recv() {
            let fresh = started.iter().any(|&(a, b)| {
                (a == event.collider1 && b == event.collider2)
                    || (a == event.collider2 && b == event.collider1)
            });
            if !fresh {
                continue;
            }
            let Some(material_a) = material_of(&self.bodies, &self.characters, event.collider1)
            else {
                continue;
            };
            let Some(material_b) = material_of(&self.bodies, &self.characters, event.collider2)
            else {
                continue;
            };
            let sound = self.config.acoustics.contact_sound(
                event.total_force_magnitude,
                material_a,
                material_b,
                &self.config.materials,
            );
            let cue = SoundCue {
                sample: SoundCue::sample_key(material_a, material_b),
                gain: sound.gain,
                material_gain: sound.material_gain,
                pitch_hz: sound.pitch_hz,
                pitch_ratio: sound.pitch_ratio,
                position: contact_point(engine, event.collider1, event.collider2),
            };
            debug!(
                "Impact {} gain {:.2}",
                cue.sample,
                cue.gain.value()
            );
            self.events.push_back(SimEvent::Sound(cue));
        }
    }

    /// Create one plain rigid body from a validated spec.
    pub fn create_body(&mut self, spec: &BodySpec) -> SimResult<BodyId> {
        if let Err(err) = spec.validate() {
            warn!("Body rejected: {}", err);
            return Err(err);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Err(SimError::EngineUnavailable);
        };

        let props = self.config.materials.get(spec.material);
        let builder = match spec.motion {
            Motion::Dynamic => RigidBodyBuilder::dynamic(),
            Motion::Static => RigidBodyBuilder::fixed(),
        };
        let body = engine
            .bodies
            .insert(builder.translation(spec.position.to_vector3()).build());
        let collider = collider_for(&spec.shape)
            .mass(spec.mass_kg)
            .friction(props.friction)
            .restitution(props.restitution)
            .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
            .build();
        let collider = engine
            .colliders
            .insert_with_parent(collider, body, &mut engine.bodies);

        let id = BodyId(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            id,
            SimBody {
                body,
                collider,
                material: spec.material,
                mass_kg: spec.mass_kg,
                submersion_radius_m: spec.shape.submersion_radius_m(),
                dynamic: spec.motion == Motion::Dynamic,
            },
        );
        info!(
            "Body {} created ({}, {:.1} kg)",
            id.0,
            spec.material.name(),
            spec.mass_kg
        );
        self.events.push_back(SimEvent::BodyCreated { id });
        Ok(id)
    }

    /// Create one character: a dynamic capsule plus its physiology.
    pub fn create_character(&mut self, params: &CharacterParams) -> SimResult<CharacterId> {
        if let Err(err) = params.validate() {
            warn!("Character rejected: {}", err);
            return Err(err);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Err(SimError::EngineUnavailable);
        };

        let props = self.config.materials.get(params.material);
        // Angular damping matches the turn response so the steady-state yaw
        // rate equals the requested rate.
        let body = engine.bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(params.position.to_vector3())
                .angular_damping(TURN_RESPONSE_PER_S)
                .build(),
        );
        let collider = ColliderBuilder::capsule_y(params.capsule_half_height_m(), params.radius_m)
            .mass(params.mass_kg)
            .friction(props.friction)
            .restitution(props.restitution)
            .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
            .build();
        let collider = engine
            .colliders
            .insert_with_parent(collider, body, &mut engine.bodies);

        let id = CharacterId(self.next_character);
        self.next_character += 1;
        self.characters
            .insert(id, CharacterController::new(*params, body, collider));
        info!(
            "Character {} created ({:.1} kg, {:.2} m)",
            id.0, params.mass_kg, params.height_m
        );
        self.events.push_back(SimEvent::CharacterCreated { id });
        Ok(id)
    }

    /// Remove one body and its engine-side objects. No-op on a stale id.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(sim_body) = self.bodies.remove(&id) else {
            return false;
        };
        if let Some(engine) = self.engine.as_mut() {
            engine.release(sim_body.collider, sim_body.body);
        }
        info!("Body {} removed", id.0);
        self.events.push_back(SimEvent::BodyRemoved { id });
        true
    }

    /// Remove one character and its engine-side objects. No-op on a stale
    /// id.
    pub fn remove_character(&mut self, id: CharacterId) -> bool {
        let Some(character) = self.characters.remove(&id) else {
            return false;
        };
        self.quarantine.retain(|q| *q != id);
        if let Some(engine) = self.engine.as_mut() {
            engine.release(character.collider, character.body);
        }
        info!("Character {} removed", id.0);
        self.events.push_back(SimEvent::CharacterRemoved { id });
        true
    }

    /// Release every registered entity, then the world itself.
    /// Irreversible: afterwards the simulation behaves like
    /// [`Simulation::disabled`].
    pub fn dispose(&mut self) {
        let bodies: Vec<BodyId> = self.bodies.keys().copied().collect();
        for id in bodies {
            self.remove_body(id);
        }
        let characters: Vec<CharacterId> = self.characters.keys().copied().collect();
        for id in characters {
            self.remove_character(id);
        }
        self.engine = None;
        info!("Simulation disposed");
        self.events.push_back(SimEvent::Disposed);
    }

    /// Drain every pending event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    /// Register a fluid region. Regions are append-only.
    pub fn add_fluid_region(&mut self, region: FluidRegion) -> SimResult<()> {
        if !region.is_valid() {
            warn!("Fluid region rejected (radius {} m)", region.radius_m);
            return Err(SimError::InvalidConfig {
                field: "fluid_region",
                value: f64::from(region.radius_m),
                reason: "density and radius must be positive finite numbers",
            });
        }
        self.fluids.add_region(region);
        Ok(())
    }

    /// Attach a standalone thermoregulation model, advanced once per `step`
    /// call at its basal metabolic rate.
    pub fn attach_thermo_model(&mut self, model: ThermoregulationModel) {
        self.thermo = Some(model);
    }

    /// The standalone thermoregulation model, if one is attached.
    #[must_use]
    pub fn thermo_model(&self) -> Option<&ThermoregulationModel> {
        self.thermo.as_ref()
    }

    /// Continuous force on a body, acting for exactly one engine step.
    pub fn apply_force(&mut self, id: BodyId, force: Velocity, wake: bool) -> bool {
        self.with_body(id, |body| body.add_force(force.to_vector3(), wake))
    }

    /// Instantaneous velocity change on a body.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Velocity, wake: bool) -> bool {
        self.with_body(id, |body| body.apply_impulse(impulse.to_vector3(), wake))
    }

    /// Instantaneous impulse at a world-space point, imparting spin when
    /// off-center.
    pub fn apply_impulse_at_point(
        &mut self,
        id: BodyId,
        impulse: Velocity,
        point: Velocity,
        wake: bool,
    ) -> bool {
        self.with_body(id, |body| {
            body.apply_impulse_at_point(impulse.to_vector3(), Point3::from(point.to_vector3()), wake);
        })
    }

    /// Continuous torque on a body, acting for exactly one engine step.
    pub fn apply_torque(&mut self, id: BodyId, torque: Velocity, wake: bool) -> bool {
        self.with_body(id, |body| body.add_torque(torque.to_vector3(), wake))
    }

    /// Overwrite a body's linear velocity.
    pub fn set_linear_velocity(&mut self, id: BodyId, velocity: Velocity, wake: bool) -> bool {
        self.with_body(id, |body| body.set_linvel(velocity.to_vector3(), wake))
    }

    /// Overwrite a body's angular velocity.
    pub fn set_angular_velocity(&mut self, id: BodyId, velocity: Velocity, wake: bool) -> bool {
        self.with_body(id, |body| body.set_angvel(velocity.to_vector3(), wake))
    }

    /// Body center position (m), `None` on a stale id or without an engine.
    #[must_use]
    pub fn body_position(&self, id: BodyId) -> Option<Velocity> {
        self.read_body(id)
            .map(|body| Velocity::from_vector3(body.translation()))
    }

    /// Body orientation as `(x, y, z, w)`.
    #[must_use]
    pub fn body_rotation(&self, id: BodyId) -> Option<[f32; 4]> {
        self.read_body(id).map(|body| {
            let q = body.rotation().coords;
            [q.x, q.y, q.z, q.w]
        })
    }

    /// Body linear velocity (m/s).
    #[must_use]
    pub fn body_velocity(&self, id: BodyId) -> Option<Velocity> {
        self.read_body(id)
            .map(|body| Velocity::from_vector3(body.linvel()))
    }

    /// Translational plus rotational kinetic energy (J).
    #[must_use]
    pub fn kinetic_energy(&self, id: BodyId) -> Option<f32> {
        self.read_body(id).map(kinetic_energy)
    }

    /// Latest snapshot for one character.
    #[must_use]
    pub fn character_state(&self, id: CharacterId) -> Option<&CharacterState> {
        self.characters.get(&id).map(CharacterController::state)
    }

    /// Full controller access for one character.
    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&CharacterController> {
        self.characters.get(&id)
    }

    /// Mutable controller access, e.g. for retuning PID gains between steps.
    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut CharacterController> {
        self.characters.get_mut(&id)
    }

    /// ECG potential of one character's cardiac dipole at a world-space
    /// electrode.
    #[must_use]
    pub fn ecg(&self, id: CharacterId, electrode_world: &Velocity) -> Option<f32> {
        self.characters
            .get(&id)
            .map(|character| character.ecg(electrode_world))
    }

    /// Total simulated time consumed so far (s).
    #[must_use]
    pub fn sim_time(&self) -> f32 {
        self.sim_time_s
    }

    /// False once disposed or when built via [`Simulation::disabled`].
    #[must_use]
    pub fn is_engine_available(&self) -> bool {
        self.engine.is_some()
    }

    /// The configuration this simulation was built with.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The fluid region registry.
    #[must_use]
    pub fn fluids(&self) -> &FluidField {
        &self.fluids
    }

    /// Registered plain bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Registered characters.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    fn with_body(&mut self, id: BodyId, op: impl FnOnce(&mut RigidBody)) -> bool {
        let Some(sim_body) = self.bodies.get(&id) else {
            return false;
        };
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        match engine.bodies.get_mut(sim_body.body) {
            Some(body) => {
                op(body);
                true
            }
            None => false,
        }
    }

    fn read_body(&self, id: BodyId) -> Option<&RigidBody> {
        let sim_body = self.bodies.get(&id)?;
        self.engine.as_ref()?.bodies.get(sim_body.body)
    }
}

fn collider_for(shape: &BodyShape) -> ColliderBuilder {
    match *shape {
        BodyShape::Sphere { radius_m } => ColliderBuilder::ball(radius_m),
        BodyShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        BodyShape::Capsule {
            half_height_m,
            radius_m,
        } => ColliderBuilder::capsule_y(half_height_m, radius_m),
    }
}

/// Material of whichever registry entry owns `collider`, if any.
fn material_of(
    bodies: &BTreeMap<BodyId, SimBody>,
    characters: &BTreeMap<CharacterId, CharacterController>,
    collider: ColliderHandle,
) -> Option<Material> {
    bodies
        .values()
        .find(|sim_body| sim_body.collider == collider)
        .map(|sim_body| sim_body.material)
        .or_else(|| {
            characters
                .values()
                .find(|character| character.collider == collider)
                .map(|character| character.params().material)
        })
}

/// World-space contact point for a collider pair: the deepest manifold
/// contact when the narrow phase still has one, else the midpoint of the two
/// collider positions.
fn contact_point(engine: &Engine, first: ColliderHandle, second: ColliderHandle) -> Velocity {
    if let Some(pair) = engine.narrow_phase.contact_pair(first, second) {
        if let Some((_, contact)) = pair.find_deepest_contact() {
            if let Some(collider) = engine.colliders.get(pair.collider1) {
                let world = collider.position() * contact.local_p1;
                return Velocity::new(world.x, world.y, world.z);
            }
        }
    }
    let a = engine.colliders.get(first).map(|c| *c.translation());
    let b = engine.colliders.get(second).map(|c| *c.translation());
    match (a, b) {
        (Some(a), Some(b)) => Velocity::from_vector3(&((a + b) * 0.5)),
        (Some(a), None) => Velocity::from_vector3(&a),
        (None, Some(b)) => Velocity::from_vector3(&b),
        (None, None) => Velocity::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioreact_physio_core::Material;

    /// Host scripting a constant walk for every character.
    struct WalkEast;

    impl EnvironmentAdapter for WalkEast {
        fn ambient(&self) -> AmbientSample {
            AmbientSample::default()
        }

        fn intent(&self, _character: CharacterId) -> MovementIntent {
            MovementIntent {
                move_x: 1.0,
                move_z: 0.0,
                turn: 0.0,
                jump: false,
            }
        }
    }

    fn still_sim() -> Simulation {
        Simulation::new(SimConfig::default(), Box::new(StillEnvironment)).unwrap()
    }

    fn ground_spec() -> BodySpec {
        BodySpec {
            position: Velocity::zero(),
            mass_kg: 1000.0,
            material: Material::Stone,
            shape: BodyShape::Cuboid {
                half_extents: Velocity::new(20.0, 0.1, 20.0),
            },
            motion: Motion::Static,
        }
    }

    fn standing_character() -> CharacterParams {
        let params = CharacterParams::default();
        // Capsule base a few millimetres above the ground top at y = 0.1.
        CharacterParams {
            position: Velocity::new(0.0, 0.1 + params.height_m * 0.5 + 0.005, 0.0),
            ..params
        }
    }

    #[test]
    fn test_substep_cap_and_leftover() {
        let mut sim = still_sim();
        // 0.1 s at 1/60 wants 6 substeps; the cap stops at 5 and leaves the
        // remainder accumulated.
        let summary = sim.step(0.1);
        assert_eq!(summary.substeps, 5);
        assert!((summary.accumulator_s - (0.1 - 5.0 / 60.0)).abs() < 1e-4);
        assert!((summary.accumulator_s - 0.01667).abs() < 1e-3);
        assert!((sim.sim_time() - 5.0 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_leftover_below_timestep_without_cap() {
        let mut sim = still_sim();
        let summary = sim.step(0.035);
        assert_eq!(summary.substeps, 2);
        assert!(summary.accumulator_s < sim.config().fixed_timestep_s);
        assert!(summary.accumulator_s >= 0.0);
    }

    #[test]
    fn test_accumulator_carries_between_calls() {
        let mut sim = still_sim();
        let dt = sim.config().fixed_timestep_s;
        let first = sim.step(0.6 * dt);
        assert_eq!(first.substeps, 0);
        let second = sim.step(0.6 * dt);
        assert_eq!(second.substeps, 1);
        assert!(second.accumulator_s < dt);
    }

    #[test]
    fn test_negative_delta_consumes_nothing() {
        let mut sim = still_sim();
        let summary = sim.step(-0.05);
        assert_eq!(summary.substeps, 0);
        assert!(summary.accumulator_s < 0.0);
        assert_eq!(sim.sim_time(), 0.0);
    }

    #[test]
    fn test_disabled_simulation_no_ops() {
        let mut sim = Simulation::disabled(SimConfig::default());
        assert!(!sim.is_engine_available());

        let summary = sim.step(0.1);
        assert_eq!(summary, StepSummary::default());

        assert_eq!(
            sim.create_body(&BodySpec::default()),
            Err(SimError::EngineUnavailable)
        );
        assert_eq!(
            sim.create_character(&CharacterParams::default()),
            Err(SimError::EngineUnavailable)
        );
        assert!(!sim.apply_force(BodyId(0), Velocity::new(1.0, 0.0, 0.0), true));
        assert_eq!(sim.body_position(BodyId(0)), None);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_spec_rejected_at_boundary() {
        let mut sim = still_sim();
        let spec = BodySpec {
            mass_kg: -1.0,
            ..BodySpec::default()
        };
        let err = sim.create_body(&spec).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "mass_kg", .. }));
        assert_eq!(sim.body_count(), 0);
    }

    #[test]
    fn test_lifecycle_events_in_order() {
        let mut sim = still_sim();
        let body = sim.create_body(&ground_spec()).unwrap();
        let character = sim.create_character(&standing_character()).unwrap();
        sim.remove_body(body);
        sim.remove_character(character);
        sim.dispose();

        let events = sim.drain_events();
        assert!(matches!(events[0], SimEvent::PhysicsReady));
        assert!(matches!(events[1], SimEvent::BodyCreated { id } if id == body));
        assert!(matches!(events[2], SimEvent::CharacterCreated { id } if id == character));
        assert!(matches!(events[3], SimEvent::BodyRemoved { id } if id == body));
        assert!(matches!(events[4], SimEvent::CharacterRemoved { id } if id == character));
        assert!(matches!(events[5], SimEvent::Disposed));
        assert_eq!(events.len(), 6);

        // Drained means drained.
        assert!(sim.drain_events().is_empty());
        assert!(!sim.is_engine_available());
    }

    #[test]
    fn test_stale_ids_degrade_to_no_ops() {
        let mut sim = still_sim();
        let id = sim.create_body(&BodySpec::default()).unwrap();
        assert!(sim.remove_body(id));
        assert!(!sim.remove_body(id));
        assert!(!sim.apply_impulse(id, Velocity::new(1.0, 0.0, 0.0), true));
        assert_eq!(sim.kinetic_energy(id), None);
    }

    #[test]
    fn test_sphere_falls_under_gravity() {
        let mut sim = still_sim();
        let id = sim
            .create_body(&BodySpec {
                position: Velocity::new(0.0, 5.0, 0.0),
                ..BodySpec::default()
            })
            .unwrap();

        for _ in 0..30 {
            sim.step(1.0 / 60.0);
        }

        let position = sim.body_position(id).unwrap();
        let velocity = sim.body_velocity(id).unwrap();
        assert!(position.y < 5.0);
        assert!(velocity.y < -1.0);
    }

    #[test]
    fn test_impulse_changes_velocity_immediately() {
        let mut sim = still_sim();
        let id = sim
            .create_body(&BodySpec {
                mass_kg: 2.0,
                position: Velocity::new(0.0, 50.0, 0.0),
                ..BodySpec::default()
            })
            .unwrap();

        assert!(sim.apply_impulse(id, Velocity::new(4.0, 0.0, 0.0), true));
        let velocity = sim.body_velocity(id).unwrap();
        assert!((velocity.x - 2.0).abs() < 1e-5);

        // E = ½ m v² = ½ · 2 · 4.
        let energy = sim.kinetic_energy(id).unwrap();
        assert!((energy - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_character_at_rest_stays_grounded() {
        let mut sim = still_sim();
        sim.create_body(&ground_spec()).unwrap();
        let id = sim.create_character(&standing_character()).unwrap();

        for _ in 0..10 {
            sim.step(1.0 / 60.0);
        }

        let state = sim.character_state(id).unwrap();
        assert!(state.grounded);
        assert!(state.velocity.horizontal().magnitude() < 1e-2);
        assert!(state.tendon_strain >= 0.0);
    }

    #[test]
    fn test_character_walks_on_intent() {
        let mut sim = Simulation::new(SimConfig::default(), Box::new(WalkEast)).unwrap();
        sim.create_body(&ground_spec()).unwrap();
        let id = sim.create_character(&standing_character()).unwrap();

        for _ in 0..30 {
            sim.step(1.0 / 60.0);
        }

        let state = sim.character_state(id).unwrap();
        assert!(state.velocity.x > 0.1);
        assert!(state.position.x > 0.0);
    }

    #[test]
    fn test_fault_quarantines_without_killing_frame() {
        let mut sim = still_sim();
        sim.create_body(&ground_spec()).unwrap();
        let faulty = sim.create_character(&standing_character()).unwrap();
        let healthy = sim
            .create_character(&CharacterParams {
                position: Velocity::new(3.0, 1.0, 0.0),
                ..CharacterParams::default()
            })
            .unwrap();
        sim.drain_events();

        // Pull the rapier body out from under the first character.
        let handle = sim.characters[&faulty].body;
        let engine = sim.engine.as_mut().unwrap();
        engine.bodies.remove(
            handle,
            &mut engine.islands,
            &mut engine.colliders,
            &mut engine.impulse_joints,
            &mut engine.multibody_joints,
            true,
        );

        let summary = sim.step(1.0 / 60.0);
        assert_eq!(summary.faults, 1);
        assert_eq!(sim.character_count(), 2);

        let events = sim.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::CharacterFault { id, .. } if *id == faulty)));

        // The quarantined character leaves at the start of the next call;
        // the healthy one keeps running.
        sim.step(1.0 / 60.0);
        assert_eq!(sim.character_state(faulty), None);
        assert!(sim.character_state(healthy).is_some());
        let events = sim.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::CharacterRemoved { id } if *id == faulty)));
    }

    #[test]
    fn test_buoyancy_lifts_submerged_sphere() {
        let mut sim = still_sim();
        sim.add_fluid_region(FluidRegion::water(Velocity::zero(), 50.0))
            .unwrap();
        let id = sim
            .create_body(&BodySpec {
                position: Velocity::zero(),
                mass_kg: 1.0,
                ..BodySpec::default()
            })
            .unwrap();

        for _ in 0..10 {
            sim.step(1.0 / 60.0);
        }

        // Water displaced by a half-submerged 0.5 m sphere outweighs the
        // 1 kg body by orders of magnitude.
        assert!(sim.body_velocity(id).unwrap().y > 0.0);
    }

    #[test]
    fn test_invalid_fluid_region_rejected() {
        let mut sim = still_sim();
        let mut region = FluidRegion::water(Velocity::zero(), 5.0);
        region.density_kg_m3 = -1.0;
        assert!(sim.add_fluid_region(region).is_err());
        assert!(sim.fluids().is_empty());
    }

    #[test]
    fn test_collision_emits_sound_cue() {
        let mut sim = still_sim();
        sim.create_body(&ground_spec()).unwrap();
        sim.create_body(&BodySpec {
            position: Velocity::new(0.0, 1.5, 0.0),
            material: Material::Wood,
            ..BodySpec::default()
        })
        .unwrap();

        let mut sounds = Vec::new();
        for _ in 0..120 {
            sim.step(1.0 / 60.0);
            for event in sim.drain_events() {
                if let SimEvent::Sound(cue) = event {
                    sounds.push(cue);
                }
            }
        }

        assert!(!sounds.is_empty());
        let cue = &sounds[0];
        assert!(cue.sample.starts_with("impacts/"));
        assert!(cue.sample.contains("wood"));
        assert!(cue.sample.contains("stone"));
        assert!(cue.gain.value() > 0.0);
        assert!(cue.pitch_hz > 0.0);
        // The contact sits on the ground plane, well below the drop height.
        assert!(cue.position.y < 1.0);
    }

    #[test]
    fn test_standalone_thermo_advances_per_call() {
        let mut sim = still_sim();
        let params = bioreact_physio_core::ThermoParams::default();
        sim.attach_thermo_model(ThermoregulationModel::new(params).with_body_temp(40.0));

        sim.step(0.1);

        let model = sim.thermo_model().unwrap();
        // 40 °C against 20 °C air: losses beat the basal rate, and the
        // above-setpoint temperature re-derives a positive sweat rate.
        assert!(model.body_temp_c() < 40.0);
        assert!(model.sweat_rate_g_s() > 0.0);
    }

    #[test]
    fn test_ecg_query_per_character() {
        let mut sim = still_sim();
        let id = sim.create_character(&standing_character()).unwrap();

        let electrode = Velocity::new(0.3, 1.2, 0.0);
        let sample = sim.ecg(id, &electrode).unwrap();
        assert!(sample.is_finite());
        assert_eq!(sim.ecg(CharacterId(99), &electrode), None);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = SimConfig {
            fixed_timestep_s: -1.0,
            ..SimConfig::default()
        };
        assert!(Simulation::new(config, Box::new(StillEnvironment)).is_err());
    }
}
