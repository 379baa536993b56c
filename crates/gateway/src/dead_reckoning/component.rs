use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::helper::{DeadReckoningHelper, GroundClampType, UpdateMode};
use crate::actor::{ActorId, ActorStore, Message, MessageType, Transform};
use crate::config::DeadReckoningConfig;
use crate::error::DeadReckoningError;

/// What the engine needs from the actor framework.
pub trait DeadReckoningScene {
    fn transform(&self, id: ActorId) -> Option<Transform>;

    fn set_transform(&mut self, id: ActorId, transform: Transform);

    fn is_remote(&self, id: ActorId) -> Option<bool>;

    fn set_dof(&mut self, id: ActorId, name: &str, hpr: Vec3);
}

impl DeadReckoningScene for ActorStore {
    fn transform(&self, id: ActorId) -> Option<Transform> {
        self.get(id).map(|record| record.transform)
    }

    fn set_transform(&mut self, id: ActorId, transform: Transform) {
        if let Some(record) = self.get_mut(id) {
            record.transform = transform;
        }
    }

    fn is_remote(&self, id: ActorId) -> Option<bool> {
        self.get(id).map(|record| record.remote)
    }

    fn set_dof(&mut self, id: ActorId, name: &str, hpr: Vec3) {
        if let Some(record) = self.get_mut(id) {
            record.dofs.insert(name.to_string(), hpr);
        }
    }
}

/// Terrain height lookup used for ground clamping.
pub trait GroundQuery {
    /// Height and surface normal below `point`, or `None` on a miss.
    fn ground_at(&self, point: Vec3) -> Option<(f32, Vec3)>;
}

/// Flat ground at a fixed height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundQuery for FlatGround {
    fn ground_at(&self, _point: Vec3) -> Option<(f32, Vec3)> {
        Some((self.height, Vec3::Z))
    }
}

pub struct DeadReckoningComponent {
    config: DeadReckoningConfig,
    helpers: BTreeMap<ActorId, DeadReckoningHelper>,
    terrain: Option<Box<dyn GroundQuery>>,
    eye_point_actor: Option<ActorId>,
}

impl std::fmt::Debug for DeadReckoningComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadReckoningComponent")
            .field("config", &self.config)
            .field("actors", &self.helpers.len())
            .field("terrain", &self.terrain.is_some())
            .field("eye_point_actor", &self.eye_point_actor)
            .finish()
    }
}

impl Default for DeadReckoningComponent {
    fn default() -> Self {
        Self::new(DeadReckoningConfig::default())
    }
}

impl DeadReckoningComponent {
    pub fn new(config: DeadReckoningConfig) -> Self {
        Self {
            config,
            helpers: BTreeMap::new(),
            terrain: None,
            eye_point_actor: None,
        }
    }

    pub fn config(&self) -> &DeadReckoningConfig {
        &self.config
    }

    pub fn set_terrain(&mut self, terrain: impl GroundQuery + 'static) {
        self.terrain = Some(Box::new(terrain));
    }

    pub fn clear_terrain(&mut self) {
        self.terrain = None;
    }

    /// The actor whose position decides between one and three point clamping.
    pub fn set_eye_point_actor(&mut self, actor: Option<ActorId>) {
        self.eye_point_actor = actor;
    }

    pub fn eye_point_actor(&self) -> Option<ActorId> {
        self.eye_point_actor
    }

    pub fn register_actor(
        &mut self,
        id: ActorId,
        mut helper: DeadReckoningHelper,
        scene: &mut impl DeadReckoningScene,
    ) -> Result<(), DeadReckoningError> {
        if self.helpers.contains_key(&id) {
            return Err(DeadReckoningError::AlreadyRegistered(id));
        }

        let remote = scene.is_remote(id).unwrap_or(true);
        let mode = helper.effective_update_mode(remote);
        let current = scene.transform(id).unwrap_or_default();

        if helper.is_updated() && mode == UpdateMode::CalculateAndMoveActor {
            let xform = Transform::new(helper.last_known_translation(), helper.last_known_quat());
            scene.set_transform(id, xform);
            helper.set_translation_before_update(helper.last_known_translation());
            helper.set_rotation_before_update(helper.last_known_quat());
        }

        // Local actors are not moved. The helper just mirrors them.
        if mode == UpdateMode::CalculateOnly {
            helper.set_last_known_translation(current.translation);
            helper.set_last_known_rotation(current.hpr());
            helper.set_translation_before_update(helper.last_known_translation());
            helper.set_rotation_before_update(helper.last_known_quat());
        }

        helper.set_force_clamp_countdown(self.config.force_clamp_interval);
        log::debug!("Registered actor {} for dead reckoning ({:?})", id, mode);
        self.helpers.insert(id, helper);
        Ok(())
    }

    pub fn unregister_actor(&mut self, id: ActorId) -> Option<DeadReckoningHelper> {
        let helper = self.helpers.remove(&id);
        if helper.is_some() {
            log::debug!("Unregistered actor {} from dead reckoning", id);
        }
        helper
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        self.helpers.contains_key(&id)
    }

    pub fn helper(&self, id: ActorId) -> Option<&DeadReckoningHelper> {
        self.helpers.get(&id)
    }

    pub fn helper_mut(&mut self, id: ActorId) -> Option<&mut DeadReckoningHelper> {
        self.helpers.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    pub fn should_force_clamp(
        &self,
        helper: &mut DeadReckoningHelper,
        delta: f32,
        transform_changed: bool,
    ) -> bool {
        helper.should_force_clamp(delta, transform_changed, self.config.force_clamp_interval)
    }

    pub fn process_message(&mut self, message: &Message, scene: &mut impl DeadReckoningScene) {
        match message.message_type {
            MessageType::TickRemote => {
                self.tick_remote(message.delta_sim_time, message.sim_time, scene);
            }
            MessageType::ActorCreated | MessageType::ActorUpdated => {
                if let Some(helper) = message.about_actor_id.and_then(|id| self.helpers.get_mut(&id)) {
                    helper.apply_update(message);
                }
            }
            MessageType::ActorDeleted => {
                if let Some(id) = message.about_actor_id {
                    self.unregister_actor(id);
                    if self.eye_point_actor == Some(id) {
                        self.eye_point_actor = None;
                    }
                }
            }
            MessageType::MapUnloaded => self.helpers.clear(),
            _ => {}
        }
    }

    pub fn tick_remote(&mut self, delta: f32, sim_time: f64, scene: &mut impl DeadReckoningScene) {
        let Self {
            config,
            helpers,
            terrain,
            eye_point_actor,
        } = self;
        let eye_point = eye_point_actor
            .and_then(|actor| scene.transform(actor))
            .map(|xform| xform.translation);
        if let Some(eye) = eye_point {
            log::debug!("Clamping relative to the eye point at {}", eye);
        }
        let clamp = GroundClamp {
            terrain: terrain.as_deref(),
            eye_point,
            high_res_range: config.high_res_clamp_range,
        };

        for (&id, helper) in helpers.iter_mut() {
            let Some(mut xform) = scene.transform(id) else {
                log::warn!("Dead reckoned actor {} is not in the scene", id);
                continue;
            };
            let remote = scene.is_remote(id).unwrap_or(true);

            if helper.is_updated() {
                // Treat the update as if it arrived on the previous tick so
                // there is a time delta to move across.
                if helper.is_translation_updated() {
                    helper.set_last_translation_updated_time(sim_time - f64::from(delta));
                    helper.set_translation_elapsed(0.0);
                }
                if helper.is_rotation_updated() {
                    helper.set_last_rotation_updated_time(sim_time - f64::from(delta));
                    helper.set_rotation_elapsed(0.0);
                    helper.set_rotation_resolved(false);
                }
            }
            helper.advance(delta);

            let outcome = helper.do_dr(&mut xform);
            let mode = helper.effective_update_mode(remote);
            if mode == UpdateMode::CalculateAndMoveActor {
                let forced = helper.should_force_clamp(delta, outcome.changed, config.force_clamp_interval);
                if outcome.changed || forced {
                    if (outcome.ground_clamp || forced) && !helper.is_flying() {
                        clamp.apply(helper, &mut xform);
                    }
                    scene.set_transform(id, xform);
                }

                for (name, hpr) in helper.step_articulations(
                    delta,
                    config.articulation_smooth_time,
                    config.articulation_period,
                ) {
                    scene.set_dof(id, &name, hpr);
                }
            }

            log::trace!("Actor {} at {} after dead reckoning", id, xform.translation);
            helper.clear_updated();
        }
    }

    /// Advances one actor's articulation chains without moving the actor.
    pub fn do_articulation(
        &mut self,
        id: ActorId,
        delta: f32,
        scene: &mut impl DeadReckoningScene,
    ) -> usize {
        let Some(helper) = self.helpers.get_mut(&id) else {
            return 0;
        };
        let remote = scene.is_remote(id).unwrap_or(true);
        if helper.effective_update_mode(remote) != UpdateMode::CalculateAndMoveActor {
            return 0;
        }
        let updates = helper.step_articulations(
            delta,
            self.config.articulation_smooth_time,
            self.config.articulation_period,
        );
        for (name, hpr) in &updates {
            scene.set_dof(id, name, *hpr);
        }
        updates.len()
    }
}

struct GroundClamp<'a> {
    terrain: Option<&'a dyn GroundQuery>,
    eye_point: Option<Vec3>,
    high_res_range: f32,
}

impl GroundClamp<'_> {
    fn apply(&self, helper: &DeadReckoningHelper, xform: &mut Transform) {
        let Some(terrain) = self.terrain else {
            return;
        };
        if helper.ground_clamp_type() == GroundClampType::None {
            return;
        }

        let near = match self.eye_point {
            Some(eye) if self.high_res_range > 0.0 => {
                xform.translation.distance_squared(eye) <= self.high_res_range * self.high_res_range
            }
            _ => true,
        };
        let (height, normal) = match helper.model_dimensions() {
            Some(dimensions) if near => {
                log::debug!("Using three point ground clamping");
                three_point(terrain, xform, dimensions)
            }
            _ => {
                log::debug!("Using one point ground clamping");
                ground_or_self(terrain, xform.translation)
            }
        };

        let target = height + helper.ground_offset();
        match helper.ground_clamp_type() {
            GroundClampType::Full => {
                xform.translation.z = target;
                xform.rotation = align_to_normal(xform.rotation, normal);
            }
            GroundClampType::KeepAbove => {
                if xform.translation.z < target {
                    xform.translation.z = target;
                }
            }
            GroundClampType::None => {}
        }
    }
}

fn ground_or_self(terrain: &dyn GroundQuery, point: Vec3) -> (f32, Vec3) {
    match terrain.ground_at(point) {
        Some((height, normal)) => {
            log::trace!("Ground hit at {} for z {}", height, point.z);
            (height, normal)
        }
        None => (point.z, Vec3::Z),
    }
}

/// Samples the front center and both rear corners of the model footprint.
fn three_point(terrain: &dyn GroundQuery, xform: &Transform, dimensions: Vec3) -> (f32, Vec3) {
    let half = dimensions * 0.5;
    let local = [
        Vec3::new(0.0, half.y, 0.0),
        Vec3::new(half.x, -half.y, 0.0),
        Vec3::new(-half.x, -half.y, 0.0),
    ];
    let mut points = local.map(|p| xform.rotation * p + xform.translation);
    for point in &mut points {
        point.z = ground_or_self(terrain, *point).0;
    }
    let [p1, p2, p3] = points;
    let normal = (p1 - p3).cross(p1 - p2).try_normalize().unwrap_or(Vec3::Z);
    ((p1.z + p2.z + p3.z) / 3.0, normal)
}

fn align_to_normal(rotation: Quat, normal: Vec3) -> Quat {
    let Some(normal) = normal.try_normalize() else {
        return rotation;
    };
    let up = rotation * Vec3::Z;
    Quat::from_rotation_arc(up, normal) * rotation
}
