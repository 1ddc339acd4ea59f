use std::collections::{HashMap, HashSet};

use glam::{BVec3, Quat, Vec3};
use log::{debug, warn};
use rapier3d::prelude::*;

use super::config::PhysicsConfig;
use super::contact::{ContactPoint, Hit};
use super::convert::{from_isometry, from_point, from_vector, to_isometry, to_vector};
use super::error::{PhysicsError, PhysicsResult};
use super::shape::{BodyDesc, Face, ShapeDesc};
use crate::data_model::DataModel;
use crate::scene::{ObjectId, SceneObject};

/// Side table entry linking a scene object to the body standing in for it.
#[derive(Debug, Clone, Copy)]
struct BodyRecord {
    body: RigidBodyHandle,
    ignore_physics: bool,
}

/// Simulation world plus the bookkeeping that ties bodies to scene objects.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    accumulator: f32,
    records: HashMap<ObjectId, BodyRecord>,
    owners: HashMap<RigidBodyHandle, ObjectId>,
    dynamic_objects: Vec<ObjectId>,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("config", &self.config)
            .field("bodies", &self.rigid_body_set.len())
            .field("dynamic_objects", &self.dynamic_objects)
            .finish_non_exhaustive()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::with_config(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self::with_config(PhysicsConfig {
            gravity,
            ..PhysicsConfig::default()
        })
    }

    pub fn with_config(mut config: PhysicsConfig) -> Self {
        if !config.fixed_time_step.is_finite() || config.fixed_time_step <= 0.0 {
            warn!(
                "invalid fixed time step {}; using the default",
                config.fixed_time_step
            );
            config.fixed_time_step = PhysicsConfig::default().fixed_time_step;
        }
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_time_step;
        Self {
            config,
            gravity: to_vector(config.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            accumulator: 0.0,
            records: HashMap::new(),
            owners: HashMap::new(),
            dynamic_objects: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
        self.gravity = to_vector(gravity);
    }

    /// Advances the simulation by `delta_time` seconds.
    ///
    /// Time is consumed in fixed steps, at most `max_substeps` per call.
    /// Whole steps beyond the cap are dropped; only the remainder below one
    /// step carries over to the next call. Returns the number of steps run.
    pub fn update(&mut self, delta_time: f32) -> usize {
        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!("ignoring invalid frame delta {delta_time}");
            return 0;
        }
        if self.config.max_substeps == 0 {
            if delta_time > 0.0 {
                self.integration_parameters.dt = delta_time;
                self.step_once();
                self.integration_parameters.dt = self.config.fixed_time_step;
                return 1;
            }
            return 0;
        }

        let fixed = self.config.fixed_time_step;
        self.accumulator += delta_time;
        let pending = (self.accumulator / fixed).floor();
        self.accumulator -= pending * fixed;
        let pending = pending as usize;
        let steps = pending.min(self.config.max_substeps);
        if pending > steps {
            debug!(
                "frame needed {pending} steps; running {steps} and dropping {}",
                pending - steps
            );
        }
        for _ in 0..steps {
            self.step_once();
        }
        steps
    }

    fn step_once(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Adds `id` to the objects refreshed by [`Self::update_dynamic_objects_model_pose`].
    ///
    /// Returns `false` when the object was already registered.
    pub fn register_dynamic_object(&mut self, id: ObjectId) -> bool {
        if self.dynamic_objects.contains(&id) {
            warn!("object {id} is already registered as dynamic");
            return false;
        }
        self.dynamic_objects.push(id);
        true
    }

    pub fn unregister_dynamic_object(&mut self, id: ObjectId) -> bool {
        let before = self.dynamic_objects.len();
        self.dynamic_objects.retain(|existing| *existing != id);
        self.dynamic_objects.len() != before
    }

    /// Registered objects in registration order.
    pub fn dynamic_objects(&self) -> &[ObjectId] {
        &self.dynamic_objects
    }

    /// Stops (or resumes) physics from driving the render pose of `id`.
    pub fn set_ignore_physics(&mut self, id: ObjectId, ignore: bool) -> PhysicsResult<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(PhysicsError::UnknownObject(id))?;
        record.ignore_physics = ignore;
        Ok(())
    }

    pub fn is_ignoring_physics(&self, id: ObjectId) -> bool {
        self.records
            .get(&id)
            .map(|record| record.ignore_physics)
            .unwrap_or(false)
    }

    /// Copies body poses onto every registered object not ignoring physics.
    ///
    /// Objects without a body are skipped. Returns the number of objects updated.
    pub fn update_dynamic_objects_model_pose(&self, model: &DataModel) -> usize {
        let mut updated = 0;
        for id in &self.dynamic_objects {
            let Some(record) = self.records.get(id) else {
                continue;
            };
            if record.ignore_physics {
                continue;
            }
            let Some(body) = self.rigid_body_set.get(record.body) else {
                continue;
            };
            let (position, rotation) = from_isometry(body.position());
            if model
                .update_by_id(*id, |object| apply_body_pose(object, position, rotation))
                .is_some()
            {
                updated += 1;
            }
        }
        updated
    }

    /// Copies the body pose of a single object onto it.
    ///
    /// Returns `false` when the object has no body.
    pub fn set_model_pose(&self, object: &mut SceneObject) -> bool {
        let Some((position, rotation)) = self.body_pose(object.id) else {
            return false;
        };
        apply_body_pose(object, position, rotation);
        true
    }

    /// Overwrites the body pose of `object` from its render transform and
    /// wakes the body up.
    ///
    /// Kinematic bodies move there on the next step, picking up the velocity
    /// of that motion for contact response.
    pub fn set_physics_pose(&mut self, object: &SceneObject) -> PhysicsResult<()> {
        let record = self
            .records
            .get(&object.id)
            .ok_or(PhysicsError::UnknownObject(object.id))?;
        let body = self
            .rigid_body_set
            .get_mut(record.body)
            .ok_or(PhysicsError::UnknownObject(object.id))?;
        if body.is_kinematic() {
            body.set_next_kinematic_position(body_isometry(object));
        } else {
            body.set_position(body_isometry(object), true);
        }
        body.wake_up(true);
        Ok(())
    }

    /// World space pose of the body attached to `id`.
    pub fn body_pose(&self, id: ObjectId) -> Option<(Vec3, Quat)> {
        let record = self.records.get(&id)?;
        let body = self.rigid_body_set.get(record.body)?;
        Some(from_isometry(body.position()))
    }

    pub fn linear_velocity(&self, id: ObjectId) -> Option<Vec3> {
        let record = self.records.get(&id)?;
        let body = self.rigid_body_set.get(record.body)?;
        Some(from_vector(body.linvel()))
    }

    pub fn body_handle(&self, id: ObjectId) -> Option<RigidBodyHandle> {
        self.records.get(&id).map(|record| record.body)
    }

    pub fn object_for_body(&self, handle: RigidBodyHandle) -> Option<ObjectId> {
        self.owners.get(&handle).copied()
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn add_sphere_body(
        &mut self,
        object: &SceneObject,
        radius: f32,
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        self.add_body(object, BodyDesc::new(ShapeDesc::Sphere { radius }, mass))
    }

    pub fn add_box_body(
        &mut self,
        object: &SceneObject,
        size: Vec3,
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        self.add_body(object, BodyDesc::new(ShapeDesc::Box { size }, mass))
    }

    pub fn add_cylinder_body(
        &mut self,
        object: &SceneObject,
        radius: f32,
        height: f32,
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        self.add_body(
            object,
            BodyDesc::new(ShapeDesc::Cylinder { radius, height }, mass),
        )
    }

    pub fn add_cone_body(
        &mut self,
        object: &SceneObject,
        radius: f32,
        height: f32,
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        self.add_body(object, BodyDesc::new(ShapeDesc::Cone { radius, height }, mass))
    }

    pub fn add_capsule_body(
        &mut self,
        object: &SceneObject,
        radius: f32,
        height: f32,
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        self.add_body(
            object,
            BodyDesc::new(ShapeDesc::Capsule { radius, height }, mass),
        )
    }

    pub fn add_convex_body(
        &mut self,
        object: &SceneObject,
        vertices: &[Vec3],
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        let shape = ShapeDesc::ConvexHull {
            vertices: vertices.to_vec(),
        };
        self.add_body(object, BodyDesc::new(shape, mass))
    }

    /// Triangle meshes can only back static or kinematic bodies, so a
    /// non-zero mass is rejected.
    pub fn add_triangle_body(
        &mut self,
        object: &SceneObject,
        vertices: &[Vec3],
        faces: &[Face],
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        let shape = ShapeDesc::TriangleMesh {
            vertices: vertices.to_vec(),
            faces: faces.to_vec(),
        };
        self.add_body(object, BodyDesc::new(shape, mass))
    }

    /// Upright capsule sized from the object's footprint, with `size.y` as
    /// its capsule height.
    ///
    /// The body may only turn about the vertical axis.
    pub fn add_human_body(
        &mut self,
        object: &SceneObject,
        scale: f32,
        friction: f32,
        mass: f32,
    ) -> PhysicsResult<RigidBodyHandle> {
        let size = object.size;
        let radius = (size.x * size.x + size.z * size.z).sqrt() * 0.5 * scale;
        let desc = BodyDesc::new(ShapeDesc::Capsule { radius, height: size.y }, mass)
            .with_friction(friction)
            .with_rotation_locks(BVec3::new(true, false, true));
        self.add_body(object, desc)
    }

    /// Builds a body for `object` and inserts it into the world.
    ///
    /// Fails without touching the world when the object already has a body
    /// or the description is invalid.
    pub fn add_body(
        &mut self,
        object: &SceneObject,
        desc: BodyDesc,
    ) -> PhysicsResult<RigidBodyHandle> {
        if self.records.contains_key(&object.id) {
            return Err(PhysicsError::AlreadyAttached(object.id));
        }
        desc.validate()?;
        let shape = desc.shape.build()?;

        let kinematic = desc.body_type() == RigidBodyType::KinematicPositionBased;
        let body = RigidBodyBuilder::new(desc.body_type())
            .position(body_isometry(object))
            .locked_axes(desc.locked_axes())
            .can_sleep(!kinematic)
            .build();

        let mut collider = ColliderBuilder::new(shape);
        if desc.body_type() == RigidBodyType::Dynamic {
            collider = collider.mass(desc.mass);
        }
        if let Some(friction) = desc.friction {
            collider = collider.friction(friction);
        }

        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider.build(), handle, &mut self.rigid_body_set);
        self.records.insert(
            object.id,
            BodyRecord {
                body: handle,
                ignore_physics: false,
            },
        );
        self.owners.insert(handle, object.id);
        debug!(
            "attached {:?} {} body to {} ({})",
            desc.kind,
            desc.shape.name(),
            object.name,
            object.id
        );
        Ok(handle)
    }

    /// Detaches and destroys the body of `id`, unregistering it as dynamic.
    pub fn remove_body(&mut self, id: ObjectId) -> PhysicsResult<()> {
        let record = self
            .records
            .remove(&id)
            .ok_or(PhysicsError::UnknownObject(id))?;
        self.owners.remove(&record.body);
        self.rigid_body_set.remove(
            record.body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.unregister_dynamic_object(id);
        debug!("removed body of {id}");
        Ok(())
    }

    /// Lists contact manifolds whose two bodies both belong to `targets`.
    ///
    /// Targets are looked up by name; those without a body are skipped. The
    /// `hits` annotation of every target found is cleared. With
    /// `need_hit_point`, each hit carries the world positions of its
    /// penetrating contacts. The simulation itself is left untouched.
    pub fn hit_test<I, S>(&self, model: &DataModel, targets: I, need_hit_point: bool) -> Vec<Hit>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut target_bodies = HashSet::new();
        for name in targets {
            let Some(id) = model.update(name.as_ref(), |object| {
                object.hits.clear();
                object.id
            }) else {
                continue;
            };
            if let Some(record) = self.records.get(&id) {
                target_bodies.insert(record.body);
            }
        }

        let mut hits = Vec::new();
        if target_bodies.len() < 2 {
            return hits;
        }
        for pair in self.narrow_phase.contact_pairs() {
            let (Some(collider_a), Some(collider_b)) = (
                self.collider_set.get(pair.collider1),
                self.collider_set.get(pair.collider2),
            ) else {
                continue;
            };
            let (Some(body_a), Some(body_b)) = (collider_a.parent(), collider_b.parent()) else {
                continue;
            };
            if !target_bodies.contains(&body_a) || !target_bodies.contains(&body_b) {
                continue;
            }
            let (Some(a), Some(b)) = (self.object_for_body(body_a), self.object_for_body(body_b))
            else {
                continue;
            };
            for manifold in &pair.manifolds {
                let points = need_hit_point.then(|| {
                    manifold
                        .points
                        .iter()
                        .filter(|contact| contact.dist < 0.0)
                        .map(|contact| ContactPoint {
                            a: from_point(&(collider_a.position() * contact.local_p1)),
                            b: from_point(&(collider_b.position() * contact.local_p2)),
                            distance: contact.dist,
                        })
                        .collect()
                });
                hits.push(Hit { a, b, points });
            }
        }
        hits
    }
}

fn body_isometry(object: &SceneObject) -> Isometry<Real> {
    let center = object.center.unwrap_or(Vec3::ZERO);
    to_isometry(object.position - center, object.rotation)
}

fn apply_body_pose(object: &mut SceneObject, position: Vec3, rotation: Quat) {
    object.position = position + object.center.unwrap_or(Vec3::ZERO);
    object.rotation = rotation;
    object.refresh_bounding_box();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyKind;
    use crate::scene::BoundingBox;

    const DT: f32 = 1.0 / 60.0;

    fn object(id: u32, name: &str, position: Vec3) -> SceneObject {
        let mut object = SceneObject::new(ObjectId(id), name);
        object.position = position;
        object
    }

    #[test]
    fn body_creation_attaches_exactly_one_body() {
        let mut world = PhysicsWorld::default();
        let crate_box = object(0, "Crate", Vec3::ZERO);
        let ball = object(1, "Ball", Vec3::Y * 3.0);

        world.add_box_body(&crate_box, Vec3::ONE, 1.0).unwrap();
        assert_eq!(world.body_count(), 1);
        assert!(world.body_handle(crate_box.id).is_some());

        world.add_sphere_body(&ball, 0.5, 2.0).unwrap();
        assert_eq!(world.body_count(), 2);
        let handle = world.body_handle(ball.id).unwrap();
        assert_eq!(world.object_for_body(handle), Some(ball.id));
    }

    #[test]
    fn every_shape_family_builds_a_body() {
        let mut world = PhysicsWorld::default();
        let cube = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        let floor = [
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(5.0, 0.0, -5.0),
            Vec3::new(5.0, 0.0, 5.0),
            Vec3::new(-5.0, 0.0, 5.0),
        ];
        world
            .add_cylinder_body(&object(0, "Cylinder", Vec3::ZERO), 0.5, 2.0, 1.0)
            .unwrap();
        world
            .add_cone_body(&object(1, "Cone", Vec3::X * 3.0), 0.5, 2.0, 1.0)
            .unwrap();
        world
            .add_capsule_body(&object(2, "Capsule", Vec3::X * 6.0), 0.5, 1.0, 1.0)
            .unwrap();
        world
            .add_convex_body(&object(3, "Hull", Vec3::X * 9.0), &cube, 1.0)
            .unwrap();
        world
            .add_triangle_body(
                &object(4, "Floor", Vec3::Y * -4.0),
                &floor,
                &[Face::Quad(0, 1, 2, 3)],
                0.0,
            )
            .unwrap();
        assert_eq!(world.body_count(), 5);
        let floor_collider = world
            .collider_set
            .iter()
            .find(|(_, collider)| collider.parent() == world.body_handle(ObjectId(4)))
            .map(|(_, collider)| collider)
            .unwrap();
        assert_eq!(floor_collider.shape().as_trimesh().unwrap().indices().len(), 2);
    }

    #[test]
    fn reattaching_is_rejected_without_leaking() {
        let mut world = PhysicsWorld::default();
        let crate_box = object(0, "Crate", Vec3::ZERO);
        world.add_box_body(&crate_box, Vec3::ONE, 1.0).unwrap();
        let err = world.add_sphere_body(&crate_box, 1.0, 1.0).unwrap_err();
        assert_eq!(err, PhysicsError::AlreadyAttached(crate_box.id));
        assert_eq!(world.body_count(), 1);

        world.remove_body(crate_box.id).unwrap();
        assert_eq!(world.body_count(), 0);
        world.add_sphere_body(&crate_box, 1.0, 1.0).unwrap();
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn invalid_bodies_leave_the_world_untouched() {
        let mut world = PhysicsWorld::default();
        let target = object(0, "Bad", Vec3::ZERO);
        assert_eq!(
            world.add_box_body(&target, Vec3::ONE, -1.0),
            Err(PhysicsError::InvalidMass(-1.0))
        );
        assert!(matches!(
            world.add_convex_body(&target, &[], 1.0),
            Err(PhysicsError::DegenerateGeometry(_))
        ));
        assert!(matches!(
            world.add_triangle_body(
                &target,
                &[Vec3::ZERO, Vec3::X, Vec3::Z],
                &[Face::Triangle(0, 1, 2)],
                3.0
            ),
            Err(PhysicsError::UnsupportedDynamicShape("triangle mesh"))
        ));
        assert_eq!(world.body_count(), 0);
        assert!(world.body_handle(target.id).is_none());
    }

    #[test]
    fn human_body_is_an_upright_capsule() {
        let mut world = PhysicsWorld::default();
        let mut player = object(0, "Player", Vec3::ZERO);
        player.size = Vec3::new(0.6, 3.0, 0.8);
        world.add_human_body(&player, 1.0, 0.3, 200.0).unwrap();

        let handle = world.body_handle(player.id).unwrap();
        let body = &world.rigid_body_set[handle];
        assert_eq!(
            body.locked_axes(),
            LockedAxes::ROTATION_LOCKED_X | LockedAxes::ROTATION_LOCKED_Z
        );
        let collider = &world.collider_set[body.colliders()[0]];
        assert!((collider.friction() - 0.3).abs() < 1e-6);
        let capsule = collider.shape().as_capsule().unwrap();
        assert!((capsule.radius - 0.5).abs() < 1e-6);
        assert!((capsule.half_height() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn box_falls_freely_under_default_gravity() {
        let model = DataModel::from_objects(vec![object(0, "Crate", Vec3::ZERO)]);
        let mut world = PhysicsWorld::default();
        let crate_box = model.get("Crate").unwrap();
        world.add_box_body(&crate_box, Vec3::ONE, 1.0).unwrap();
        world.register_dynamic_object(crate_box.id);

        let mut last_y = 0.0;
        for _ in 0..60 {
            assert_eq!(world.update(DT), 1);
            world.update_dynamic_objects_model_pose(&model);
            let y = model.get("Crate").unwrap().position.y;
            assert!(y < last_y);
            last_y = y;
        }
        let analytic = -0.5 * 100.0 * 1.0_f32.powi(2);
        assert!((last_y - analytic).abs() < 1.5, "fell to {last_y}");
    }

    #[test]
    fn static_and_kinematic_bodies_ignore_gravity() {
        let mut world = PhysicsWorld::default();
        let pillar = object(0, "Pillar", Vec3::Y * 3.0);
        let lift = object(1, "Lift", Vec3::X * 5.0);
        world
            .add_body(
                &pillar,
                BodyDesc::new(ShapeDesc::Box { size: Vec3::ONE }, 5.0).with_kind(BodyKind::Static),
            )
            .unwrap();
        world
            .add_body(
                &lift,
                BodyDesc::new(ShapeDesc::Sphere { radius: 1.0 }, 5.0)
                    .with_kind(BodyKind::Kinematic),
            )
            .unwrap();
        let activation = world.rigid_body_set[world.body_handle(lift.id).unwrap()].activation();
        assert!(activation.normalized_linear_threshold < 0.0);

        for _ in 0..30 {
            world.update(DT);
            assert_eq!(world.body_pose(pillar.id).unwrap().0, pillar.position);
            assert_eq!(world.body_pose(lift.id).unwrap().0, lift.position);
        }
    }

    #[test]
    fn update_caps_substeps_and_drops_excess_time() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig {
            fixed_time_step: 0.25,
            max_substeps: 2,
            ..PhysicsConfig::default()
        });
        assert_eq!(world.update(1.0), 2);
        assert_eq!(world.update(0.125), 0);
        assert_eq!(world.update(0.125), 1);
        assert_eq!(world.update(-1.0), 0);
        assert_eq!(world.update(f32::NAN), 0);
    }

    #[test]
    fn ignored_objects_keep_their_render_pose() {
        let model = DataModel::from_objects(vec![
            object(0, "Ghost", Vec3::Y * 10.0),
            object(1, "Ball", Vec3::new(5.0, 10.0, 0.0)),
        ]);
        let mut world = PhysicsWorld::default();
        for name in ["Ghost", "Ball"] {
            let target = model.get(name).unwrap();
            world.add_sphere_body(&target, 0.5, 1.0).unwrap();
            world.register_dynamic_object(target.id);
        }
        world.set_ignore_physics(ObjectId(0), true).unwrap();
        assert!(world.is_ignoring_physics(ObjectId(0)));

        for _ in 0..10 {
            world.update(DT);
            assert_eq!(world.update_dynamic_objects_model_pose(&model), 1);
        }
        assert_eq!(model.get("Ghost").unwrap().position, Vec3::Y * 10.0);
        assert!(model.get("Ball").unwrap().position.y < 10.0);
        assert!(world.body_pose(ObjectId(0)).unwrap().0.y < 10.0);
    }

    #[test]
    fn objects_without_bodies_are_skipped() {
        let model = DataModel::from_objects(vec![object(0, "Decor", Vec3::ONE)]);
        let mut world = PhysicsWorld::default();
        assert!(world.register_dynamic_object(ObjectId(0)));
        assert!(!world.register_dynamic_object(ObjectId(0)));
        world.update(DT);
        assert_eq!(world.update_dynamic_objects_model_pose(&model), 0);
        assert_eq!(model.get("Decor").unwrap().position, Vec3::ONE);
        assert_eq!(
            world.set_physics_pose(&model.get("Decor").unwrap()),
            Err(PhysicsError::UnknownObject(ObjectId(0)))
        );
    }

    #[test]
    fn physics_pose_round_trips_through_pivot() {
        let mut start = object(0, "Door", Vec3::new(1.0, 2.0, 3.0));
        start.center = Some(Vec3::new(0.0, 0.5, 0.0));
        start.bounding_box = Some(BoundingBox::from_object(&start));
        let model = DataModel::from_objects(vec![start.clone()]);
        let mut world = PhysicsWorld::default();
        world.add_box_body(&start, Vec3::ONE, 1.0).unwrap();
        world.register_dynamic_object(start.id);

        let mut moved = start.clone();
        moved.position = Vec3::new(-4.0, 7.5, 0.25);
        moved.rotation = Quat::from_rotation_y(1.2) * Quat::from_rotation_z(0.4);
        model.replace_objects(vec![moved.clone()]);
        world.set_physics_pose(&moved).unwrap();

        let (body_position, _) = world.body_pose(moved.id).unwrap();
        assert!((body_position - Vec3::new(-4.0, 7.0, 0.25)).length() < 1e-5);

        world.update_dynamic_objects_model_pose(&model);
        let synced = model.get("Door").unwrap();
        assert!((synced.position - moved.position).length() < 1e-5);
        assert!(synced.rotation.dot(moved.rotation).abs() > 1.0 - 1e-5);
        let bounds = synced.bounding_box.unwrap();
        assert!((bounds.center() - moved.position).length() < 1e-5);
    }

    #[test]
    fn kinematic_pose_moves_with_velocity() {
        let mut lift = object(0, "Lift", Vec3::ZERO);
        let mut world = PhysicsWorld::default();
        world
            .add_body(
                &lift,
                BodyDesc::new(ShapeDesc::Sphere { radius: 0.5 }, 0.0)
                    .with_kind(BodyKind::Kinematic),
            )
            .unwrap();

        lift.position = Vec3::X;
        world.set_physics_pose(&lift).unwrap();
        assert_eq!(world.update(DT), 1);
        let (position, _) = world.body_pose(lift.id).unwrap();
        assert!((position - Vec3::X).length() < 1e-5);
        assert!(world.linear_velocity(lift.id).unwrap().x > 0.0);
    }

    #[test]
    fn set_model_pose_updates_a_single_object() {
        let mut world = PhysicsWorld::default();
        let mut ball = object(0, "Ball", Vec3::Y);
        world.add_sphere_body(&ball, 0.5, 1.0).unwrap();
        world.update(DT);
        assert!(world.set_model_pose(&mut ball));
        assert!(ball.position.y < 1.0);
        assert!(!world.set_model_pose(&mut object(9, "Other", Vec3::ZERO)));
    }

    fn contact_scene() -> (DataModel, PhysicsWorld) {
        let mut apple = object(1, "Apple", Vec3::Y * 0.5);
        apple.hits = vec![ObjectId(7)];
        let mut decor = object(3, "Decor", Vec3::ZERO);
        decor.hits = vec![ObjectId(1)];
        let model = DataModel::from_objects(vec![
            object(0, "Ground", Vec3::Y * -0.5),
            apple,
            object(2, "Pear", Vec3::new(0.3, 0.5, 0.0)),
            decor,
        ]);
        let mut world = PhysicsWorld::default();
        world
            .add_box_body(&model.get("Ground").unwrap(), Vec3::new(10.0, 1.0, 10.0), 0.0)
            .unwrap();
        world
            .add_sphere_body(&model.get("Apple").unwrap(), 1.0, 1.0)
            .unwrap();
        world
            .add_sphere_body(&model.get("Pear").unwrap(), 1.0, 1.0)
            .unwrap();
        world.update(DT);
        world.update(DT);
        (model, world)
    }

    #[test]
    fn hit_test_only_reports_pairs_inside_the_target_set() {
        let (model, world) = contact_scene();
        let hits = world.hit_test(&model, ["Ground", "Apple", "Decor", "Missing"], false);
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(hit.points.is_none());
            assert!(hit.involves(ObjectId(0)) && hit.involves(ObjectId(1)));
            assert!(!hit.involves(ObjectId(2)));
        }
        assert!(model.get("Apple").unwrap().hits.is_empty());
        assert!(model.get("Decor").unwrap().hits.is_empty());
    }

    #[test]
    fn hit_points_are_penetrating_and_read_only() {
        let (model, world) = contact_scene();
        let pose_before = world.body_pose(ObjectId(1));
        let hits = world.hit_test(&model, ["Ground", "Apple", "Pear"], true);
        let again = world.hit_test(&model, ["Ground", "Apple", "Pear"], true);
        assert_eq!(hits, again);
        assert_eq!(world.body_pose(ObjectId(1)), pose_before);

        let points: Vec<_> = hits.iter().flat_map(|hit| hit.points.clone().unwrap()).collect();
        assert!(!points.is_empty());
        assert!(points.iter().all(|point| point.distance < 0.0));
    }

    #[test]
    fn hit_test_with_single_target_is_empty() {
        let (model, world) = contact_scene();
        assert!(world.hit_test(&model, ["Apple"], true).is_empty());
    }
}
