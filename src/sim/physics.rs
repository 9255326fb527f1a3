//! Rigid-body physics world
//!
//! Thin wrapper over rapier3d. Owns every body handle; the rest of the sim
//! holds [`BodyHandle`]s and never touches rapier types directly. Item
//! collision shapes are spheres; the bowl is a static compound of one
//! cylindrical base plus concentric rings of short wall segments, because the
//! engine's primitive set has no open-top bowl shape.

use glam::{Quat, Vec3};
use rapier3d::na::{Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::consts::*;

/// Handle to a rigid body owned by the physics world
pub type BodyHandle = RigidBodyHandle;

/// The rigid-body simulation
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Unsimulated frame time carried between steps
    accumulator: f32,
}

impl PhysicsWorld {
    /// Construct the simulation with the given gravity vector
    pub fn new(gravity: Vec3) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = PHYS_DT;
        Self {
            gravity: vector![gravity.x, gravity.y, gravity.z],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            accumulator: 0.0,
        }
    }

    /// Add a dynamic sphere body. Sleeping is disabled so slow-rolling items
    /// keep responding to contacts.
    pub fn add_dynamic_sphere(&mut self, radius: f32, mass: f32, position: Vec3) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .can_sleep(false)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius)
            .mass(mass)
            .restitution(ITEM_RESTITUTION)
            .friction(ITEM_FRICTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Add the static bowl: a cylindrical base plus `BOWL_RINGS` concentric
    /// rings of `BOWL_RING_SEGMENTS` horizontal wall segments whose radii
    /// grow with height, approximating the bowl's curvature
    pub fn add_bowl(&mut self, bowl_radius: f32) -> BodyHandle {
        let mut shapes: Vec<(Isometry<Real>, SharedShape)> = Vec::new();

        shapes.push((
            Isometry::identity(),
            SharedShape::cylinder(0.3, bowl_radius * 1.3),
        ));

        let wall_height = bowl_radius * BOWL_WALL_HEIGHT_FACTOR;
        for ring in 0..BOWL_RINGS {
            let progress = ring as f32 / (BOWL_RINGS - 1) as f32;
            // The two lowest rings pinch inward to close the bowl's base
            let ring_radius = if ring < 2 {
                bowl_radius * (0.8 + progress * 0.3)
            } else {
                bowl_radius * (1.0 + progress * 0.3)
            };
            let ring_height = progress * wall_height;
            let segment_angle = std::f32::consts::TAU / BOWL_RING_SEGMENTS as f32;

            for seg in 0..BOWL_RING_SEGMENTS {
                let a0 = seg as f32 * segment_angle;
                let a1 = (seg + 1) as f32 * segment_angle;
                let (x0, z0) = (a0.cos() * ring_radius, a0.sin() * ring_radius);
                let (x1, z1) = (a1.cos() * ring_radius, a1.sin() * ring_radius);
                let half_length = 0.5 * ((x1 - x0).powi(2) + (z1 - z0).powi(2)).sqrt();
                let yaw = (z1 - z0).atan2(x1 - x0);

                // Cylinders are Y-aligned; tip onto the X axis, then yaw into
                // place along the ring chord
                let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -yaw)
                    * UnitQuaternion::from_axis_angle(
                        &Vector3::z_axis(),
                        std::f32::consts::FRAC_PI_2,
                    );
                let translation =
                    Translation3::new((x0 + x1) * 0.5, ring_height, (z0 + z1) * 0.5);
                shapes.push((
                    Isometry::from_parts(translation, rotation),
                    SharedShape::cylinder(half_length, BOWL_WALL_SEGMENT_RADIUS),
                ));
            }
        }

        let body = RigidBodyBuilder::fixed().build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::new(SharedShape::compound(shapes))
            .friction(ITEM_FRICTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Detach a body. Removing an already-removed handle is a no-op.
    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the simulation by a wall-clock frame delta. The solver runs
    /// fixed `PHYS_DT` substeps, at most `max_substeps` per call; excess time
    /// is dropped to bound worst-case cost on frame spikes.
    pub fn step(&mut self, delta_seconds: f32, max_substeps: u32) {
        self.accumulator += delta_seconds.max(0.0);
        let cap = max_substeps as f32 * PHYS_DT;
        if self.accumulator > cap {
            self.accumulator = cap;
        }
        while self.accumulator >= PHYS_DT {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
            self.accumulator -= PHYS_DT;
        }
    }

    /// Current pose of a body; `None` once the handle is dead
    pub fn pose(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        let q = body.rotation();
        Some((
            Vec3::new(t.x, t.y, t.z),
            Quat::from_xyzw(q.i, q.j, q.k, q.w),
        ))
    }

    /// Teleport a body (cull checks, tests)
    pub fn set_translation(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vector![position.x, position.y, position.z], true);
        }
    }

    /// Nudge a body, as done to freshly dropped items
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(Vec3::new(0.0, GRAVITY_Y, 0.0))
    }

    #[test]
    fn test_dynamic_body_falls() {
        let mut physics = world();
        let handle = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::new(0.0, 5.0, 0.0));
        for _ in 0..60 {
            physics.step(PHYS_DT, MAX_SUBSTEPS);
        }
        let (pos, _) = physics.pose(handle).unwrap();
        assert!(pos.y < 5.0, "body should fall under gravity, y = {}", pos.y);
    }

    #[test]
    fn test_static_bowl_stays_put() {
        let mut physics = world();
        let bowl = physics.add_bowl(BOWL_RADIUS);
        for _ in 0..30 {
            physics.step(PHYS_DT, MAX_SUBSTEPS);
        }
        let (pos, _) = physics.pose(bowl).unwrap();
        assert!(pos.length() < 0.001);
    }

    #[test]
    fn test_bowl_contains_dropped_item() {
        let mut physics = world();
        physics.add_bowl(BOWL_RADIUS);
        let item = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::new(0.0, 5.0, 0.0));
        // Simulate four seconds of settling
        for _ in 0..240 {
            physics.step(PHYS_DT, MAX_SUBSTEPS);
        }
        let (pos, _) = physics.pose(item).unwrap();
        assert!(pos.y > -1.0, "item fell through the bowl, y = {}", pos.y);
    }

    #[test]
    fn test_remove_body_twice_is_noop() {
        let mut physics = world();
        let handle = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::ZERO);
        physics.remove_body(handle);
        assert!(physics.pose(handle).is_none());
        physics.remove_body(handle);
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_step_caps_substeps() {
        let mut physics = world();
        let handle = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::new(0.0, 100.0, 0.0));
        // A ten-second frame spike must only advance MAX_SUBSTEPS * PHYS_DT
        physics.step(10.0, MAX_SUBSTEPS);
        let (pos, _) = physics.pose(handle).unwrap();
        let simulated = MAX_SUBSTEPS as f32 * PHYS_DT;
        let free_fall = 0.5 * GRAVITY_Y.abs() * simulated * simulated;
        assert!(pos.y > 100.0 - free_fall - 1.0);
    }
}
