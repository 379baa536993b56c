use std::collections::{BTreeMap, VecDeque};

use bitflags::bitflags;
use glam::{Quat, Vec3};

use crate::actor::{Message, PropertyValue, Transform, hpr_to_quat};
use crate::codec::{ArticulatedParameter, ArticulatedTypeMetric, ParameterValue};
use crate::config::DEFAULT_FORCE_CLAMP_INTERVAL;

pub const DEFAULT_MAX_TRANSLATION_SMOOTHING_TIME: f32 = 4.0;
pub const DEFAULT_MAX_ROTATION_SMOOTHING_TIME: f32 = 2.0;
pub const DEFAULT_FIXED_SMOOTHING_TIME: f32 = 1.0;

pub const LAST_KNOWN_TRANSLATION: &str = "Last Known Translation";
pub const LAST_KNOWN_ROTATION: &str = "Last Known Rotation";
pub const VELOCITY_VECTOR: &str = "Velocity Vector";
pub const ACCELERATION_VECTOR: &str = "Acceleration Vector";
pub const ANGULAR_VELOCITY_VECTOR: &str = "Angular Velocity Vector";
pub const DEAD_RECKONING_ALGORITHM: &str = "Dead Reckoning Algorithm";
pub const GROUND_CLAMP_TYPE: &str = "GroundClampType";
pub const GROUND_OFFSET: &str = "Ground Offset";
pub const FLYING: &str = "Flying";
pub const ARTICULATED_PARAMETERS: &str = "Articulated Parameters";

const MOVING_VELOCITY2: f32 = 1e-2;
const MOVING_ANGULAR_VELOCITY2: f32 = 1e-5;
const ROTATING_ANGULAR_VELOCITY2: f32 = 1e-6;
const SPLINE_CONTROL_SCALE: f32 = 0.33333;

/// DIS articulated part classes with a well known model node.
const DEFAULT_DOF_NAMES: [(u32, &str); 6] = [
    (2048, "dof_periscope"),
    (4096, "dof_turret_01"),
    (4128, "dof_turret_02"),
    (4416, "dof_gun_01"),
    (4448, "dof_gun_02"),
    (6144, "dof_launcher"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeadReckoningAlgorithm {
    None,
    #[default]
    Static,
    VelocityOnly,
    VelocityAndAcceleration,
}

impl DeadReckoningAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Static => "Static",
            Self::VelocityOnly => "Velocity Only",
            Self::VelocityAndAcceleration => "Velocity and Acceleration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::None,
            Self::Static,
            Self::VelocityOnly,
            Self::VelocityAndAcceleration,
        ]
        .into_iter()
        .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    #[default]
    Auto,
    CalculateOnly,
    CalculateAndMoveActor,
}

impl UpdateMode {
    /// Resolves `Auto` by who owns the actor.
    pub fn effective(self, remote: bool) -> Self {
        match self {
            UpdateMode::Auto if remote => UpdateMode::CalculateAndMoveActor,
            UpdateMode::Auto => UpdateMode::CalculateOnly,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GroundClampType {
    None,
    #[default]
    KeepAbove,
    Full,
}

impl GroundClampType {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::KeepAbove => "Keep Above",
            Self::Full => "Full",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::None, Self::KeepAbove, Self::Full]
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        const UPDATED = 1 << 0;
        const TRANSLATION = 1 << 1;
        const ROTATION = 1 << 2;
    }
}

/// Result of one dead-reckoning step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadReckoningOutcome {
    pub changed: bool,
    pub ground_clamp: bool,
}

/// One time-stamped articulation target for a named DOF.
#[derive(Debug, Clone, PartialEq)]
pub struct DofStop {
    pub metric: String,
    pub start: Vec3,
    pub rate: Vec3,
    pub current_time: f32,
}

#[derive(Debug, Clone)]
pub struct DeadReckoningHelper {
    algorithm: DeadReckoningAlgorithm,
    update_mode: UpdateMode,
    ground_clamp_type: GroundClampType,
    ground_offset: f32,
    flying: bool,
    force_upright: bool,
    use_cubic_spline: bool,
    use_fixed_smoothing_time: bool,
    fixed_smoothing_time: f32,
    max_translation_smoothing_time: f32,
    max_rotation_smoothing_time: f32,
    model_dimensions: Option<Vec3>,

    initiated: bool,
    dirty: DirtyFlags,
    rotation_resolved: bool,

    last_translation: Vec3,
    last_rotation: Vec3,
    last_quat: Quat,
    last_velocity: Vec3,
    acceleration: Vec3,
    angular_velocity: Vec3,

    translation_before_update: Vec3,
    rotation_before_update: Quat,
    velocity_before_update: Vec3,
    previous_instant_velocity: Vec3,
    current_translation: Vec3,
    current_rotation: Quat,

    last_translation_time: f64,
    last_rotation_time: f64,
    average_translation_interval: f32,
    average_rotation_interval: f32,
    translation_elapsed: f32,
    rotation_elapsed: f32,
    translation_end: f32,
    rotation_end: f32,
    current_time_delta: f32,

    spline: [Vec3; 4],

    force_clamp_countdown: f32,

    dof_names: BTreeMap<u32, String>,
    dofs: BTreeMap<String, VecDeque<DofStop>>,
    dof_positions: BTreeMap<String, Vec3>,
}

impl Default for DeadReckoningHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadReckoningHelper {
    pub fn new() -> Self {
        Self {
            algorithm: DeadReckoningAlgorithm::default(),
            update_mode: UpdateMode::default(),
            ground_clamp_type: GroundClampType::default(),
            ground_offset: 0.0,
            flying: false,
            force_upright: false,
            use_cubic_spline: false,
            use_fixed_smoothing_time: false,
            fixed_smoothing_time: DEFAULT_FIXED_SMOOTHING_TIME,
            max_translation_smoothing_time: DEFAULT_MAX_TRANSLATION_SMOOTHING_TIME,
            max_rotation_smoothing_time: DEFAULT_MAX_ROTATION_SMOOTHING_TIME,
            model_dimensions: None,
            initiated: false,
            dirty: DirtyFlags::empty(),
            rotation_resolved: true,
            last_translation: Vec3::ZERO,
            last_rotation: Vec3::ZERO,
            last_quat: Quat::IDENTITY,
            last_velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            translation_before_update: Vec3::ZERO,
            rotation_before_update: Quat::IDENTITY,
            velocity_before_update: Vec3::ZERO,
            previous_instant_velocity: Vec3::ZERO,
            current_translation: Vec3::ZERO,
            current_rotation: Quat::IDENTITY,
            last_translation_time: 0.0,
            last_rotation_time: 0.0,
            average_translation_interval: 0.0,
            average_rotation_interval: 0.0,
            translation_elapsed: 0.0,
            rotation_elapsed: 0.0,
            translation_end: 0.0,
            rotation_end: 0.0,
            current_time_delta: 0.0,
            spline: [Vec3::ZERO; 4],
            force_clamp_countdown: DEFAULT_FORCE_CLAMP_INTERVAL,
            dof_names: DEFAULT_DOF_NAMES
                .iter()
                .map(|&(class, name)| (class, name.to_string()))
                .collect(),
            dofs: BTreeMap::new(),
            dof_positions: BTreeMap::new(),
        }
    }

    pub fn algorithm(&self) -> DeadReckoningAlgorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: DeadReckoningAlgorithm) {
        self.algorithm = algorithm;
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    pub fn set_update_mode(&mut self, mode: UpdateMode) {
        self.update_mode = mode;
    }

    pub fn effective_update_mode(&self, remote: bool) -> UpdateMode {
        self.update_mode.effective(remote)
    }

    pub fn ground_clamp_type(&self) -> GroundClampType {
        self.ground_clamp_type
    }

    pub fn set_ground_clamp_type(&mut self, clamp: GroundClampType) {
        self.ground_clamp_type = clamp;
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn ground_offset(&self) -> f32 {
        self.ground_offset
    }

    pub fn set_ground_offset(&mut self, offset: f32) {
        self.ground_offset = offset;
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn is_flying(&self) -> bool {
        self.flying
    }

    pub fn set_flying(&mut self, flying: bool) {
        self.flying = flying;
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn set_force_upright(&mut self, force_upright: bool) {
        self.force_upright = force_upright;
    }

    pub fn set_use_cubic_spline(&mut self, use_spline: bool) {
        self.use_cubic_spline = use_spline;
    }

    pub fn set_fixed_smoothing_time(&mut self, time: Option<f32>) {
        match time {
            Some(time) => {
                self.use_fixed_smoothing_time = true;
                self.fixed_smoothing_time = time;
            }
            None => self.use_fixed_smoothing_time = false,
        }
    }

    pub fn set_max_smoothing_times(&mut self, translation: f32, rotation: f32) {
        self.max_translation_smoothing_time = translation;
        self.max_rotation_smoothing_time = rotation;
    }

    pub fn model_dimensions(&self) -> Option<Vec3> {
        self.model_dimensions
    }

    pub fn set_model_dimensions(&mut self, dimensions: Vec3) {
        self.model_dimensions = Some(dimensions);
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn is_updated(&self) -> bool {
        self.dirty.contains(DirtyFlags::UPDATED)
    }

    pub fn is_translation_updated(&self) -> bool {
        self.dirty.contains(DirtyFlags::TRANSLATION)
    }

    pub fn is_rotation_updated(&self) -> bool {
        self.dirty.contains(DirtyFlags::ROTATION)
    }

    pub fn clear_updated(&mut self) {
        self.dirty = DirtyFlags::empty();
    }

    pub fn is_rotation_resolved(&self) -> bool {
        self.rotation_resolved
    }

    pub fn set_rotation_resolved(&mut self, resolved: bool) {
        self.rotation_resolved = resolved;
    }

    pub fn last_known_translation(&self) -> Vec3 {
        self.last_translation
    }

    /// Starts a new translation smoothing window from wherever the actor was
    /// dead reckoned to.
    pub fn set_last_known_translation(&mut self, translation: Vec3) {
        self.translation_before_update = if self.initiated {
            self.current_translation
        } else {
            translation
        };
        self.initiated = true;
        self.last_translation = translation;
        self.set_translation_elapsed(0.0);
        self.dirty |= DirtyFlags::UPDATED | DirtyFlags::TRANSLATION;
    }

    pub fn last_known_rotation(&self) -> Vec3 {
        self.last_rotation
    }

    pub fn last_known_quat(&self) -> Quat {
        self.last_quat
    }

    /// Heading, pitch and roll in radians.
    pub fn set_last_known_rotation(&mut self, hpr: Vec3) {
        let hpr = if self.force_upright {
            Vec3::new(hpr.x, 0.0, 0.0)
        } else {
            hpr
        };
        let quat = hpr_to_quat(hpr);
        self.rotation_before_update = if self.initiated {
            self.current_rotation
        } else {
            quat
        };
        self.last_rotation = hpr;
        self.last_quat = quat;
        self.rotation_elapsed = 0.0;
        self.initiated = true;
        self.dirty |= DirtyFlags::UPDATED | DirtyFlags::ROTATION;
    }

    pub fn last_known_velocity(&self) -> Vec3 {
        self.last_velocity
    }

    pub fn set_last_known_velocity(&mut self, velocity: Vec3) {
        let instant = self.previous_instant_velocity.length();
        let last = self.last_velocity.length();
        // A large instantaneous jump usually comes from a position correction,
        // not from real motion, so it is scaled back before blending.
        self.velocity_before_update = if instant > 0.01 && instant > 4.0 * last {
            self.previous_instant_velocity * (2.0 * last / instant)
        } else {
            self.previous_instant_velocity
        };
        self.last_velocity = velocity;
        self.set_translation_elapsed(0.0);
        self.dirty |= DirtyFlags::UPDATED | DirtyFlags::TRANSLATION;
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn set_last_known_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn set_last_known_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
        self.dirty |= DirtyFlags::UPDATED;
    }

    pub fn translation_before_update(&self) -> Vec3 {
        self.translation_before_update
    }

    pub fn set_translation_before_update(&mut self, translation: Vec3) {
        self.translation_before_update = translation;
    }

    pub fn set_rotation_before_update(&mut self, rotation: Quat) {
        self.rotation_before_update = rotation;
    }

    pub fn current_dead_reckoned_translation(&self) -> Vec3 {
        self.current_translation
    }

    pub fn current_dead_reckoned_rotation(&self) -> Quat {
        self.current_rotation
    }

    pub fn set_last_translation_updated_time(&mut self, time: f64) {
        self.average_translation_interval =
            0.5 * (time - self.last_translation_time) as f32 + 0.5 * self.average_translation_interval;
        self.last_translation_time = time;
    }

    pub fn set_last_rotation_updated_time(&mut self, time: f64) {
        self.average_rotation_interval =
            0.5 * (time - self.last_rotation_time) as f32 + 0.5 * self.average_rotation_interval;
        self.last_rotation_time = time;
    }

    pub fn average_translation_interval(&self) -> f32 {
        self.average_translation_interval
    }

    pub fn average_rotation_interval(&self) -> f32 {
        self.average_rotation_interval
    }

    pub fn translation_elapsed(&self) -> f32 {
        self.translation_elapsed
    }

    pub fn set_translation_elapsed(&mut self, elapsed: f32) {
        self.current_time_delta = (elapsed - self.translation_elapsed).max(0.0);
        self.translation_elapsed = elapsed;
    }

    pub fn rotation_elapsed(&self) -> f32 {
        self.rotation_elapsed
    }

    pub fn set_rotation_elapsed(&mut self, elapsed: f32) {
        self.rotation_elapsed = elapsed;
    }

    pub fn translation_end_smoothing(&self) -> f32 {
        self.translation_end
    }

    pub fn rotation_end_smoothing(&self) -> f32 {
        self.rotation_end
    }

    /// Moves both smoothing clocks forward, never below zero.
    pub fn advance(&mut self, delta: f32) {
        self.set_translation_elapsed((self.translation_elapsed + delta).max(0.0));
        self.rotation_elapsed = (self.rotation_elapsed + delta).max(0.0);
    }

    /// Applies the kinematic properties carried by an actor update.
    pub fn apply_update(&mut self, message: &Message) {
        if let Some(name) = message.param(DEAD_RECKONING_ALGORITHM).and_then(PropertyValue::as_str) {
            match DeadReckoningAlgorithm::from_name(name) {
                Some(algorithm) => self.set_algorithm(algorithm),
                None => log::warn!("Unknown dead reckoning algorithm \"{}\"", name),
            }
        }
        if let Some(name) = message.param(GROUND_CLAMP_TYPE).and_then(PropertyValue::as_str) {
            match GroundClampType::from_name(name) {
                Some(clamp) => self.set_ground_clamp_type(clamp),
                None => log::warn!("Unknown ground clamp type \"{}\"", name),
            }
        }
        if let Some(offset) = message.param(GROUND_OFFSET).and_then(PropertyValue::as_f64) {
            self.set_ground_offset(offset as f32);
        }
        if let Some(PropertyValue::Bool(flying)) = message.param(FLYING) {
            self.set_flying(*flying);
        }
        if let Some(v) = message.param(LAST_KNOWN_TRANSLATION).and_then(PropertyValue::as_vec3) {
            self.set_last_known_translation(v);
        }
        if let Some(v) = message.param(LAST_KNOWN_ROTATION).and_then(PropertyValue::as_vec3) {
            self.set_last_known_rotation(v);
        }
        if let Some(v) = message.param(VELOCITY_VECTOR).and_then(PropertyValue::as_vec3) {
            self.set_last_known_velocity(v);
        }
        if let Some(v) = message.param(ACCELERATION_VECTOR).and_then(PropertyValue::as_vec3) {
            self.set_last_known_acceleration(v);
        }
        if let Some(v) = message.param(ANGULAR_VELOCITY_VECTOR).and_then(PropertyValue::as_vec3) {
            self.set_last_known_angular_velocity(v);
        }
        if let Some(PropertyValue::Articulations(parts)) = message.param(ARTICULATED_PARAMETERS) {
            self.apply_articulations(parts);
        }
    }

    pub fn map_articulation_class(&mut self, class: u32, dof_name: impl Into<String>) {
        self.dof_names.insert(class, dof_name.into());
    }

    /// Turns articulated parts into DOF stops. Azimuth drives heading,
    /// elevation drives pitch and rotation drives roll.
    pub fn apply_articulations(&mut self, parameters: &[ArticulatedParameter]) {
        let mut targets: BTreeMap<String, (Vec3, Vec3, &'static str)> = BTreeMap::new();
        for parameter in parameters {
            let ParameterValue::Articulated(part) = parameter.value else {
                continue;
            };
            let Some(dof_name) = self.dof_names.get(&part.class) else {
                log::debug!("No DOF mapped for articulated part class {}", part.class);
                continue;
            };
            let metric = match part.metric() {
                Ok(metric) => metric,
                Err(e) => {
                    log::warn!("Skipping articulated part {}: {}", part.class, e);
                    continue;
                }
            };
            let axis = match metric {
                ArticulatedTypeMetric::Azimuth | ArticulatedTypeMetric::AzimuthRate => Vec3::X,
                ArticulatedTypeMetric::Elevation | ArticulatedTypeMetric::ElevationRate => Vec3::Y,
                ArticulatedTypeMetric::Rotation | ArticulatedTypeMetric::RotationRate => Vec3::Z,
                other => {
                    log::debug!("Articulation metric {} is not an angle", other.name());
                    continue;
                }
            };
            let entry = targets
                .entry(dof_name.clone())
                .or_insert((Vec3::ZERO, Vec3::ZERO, metric.name()));
            if metric.is_rate() {
                entry.1 += axis * part.value;
            } else {
                entry.0 += axis * part.value;
                entry.2 = metric.name();
            }
        }

        for (name, (position, rate, metric)) in targets {
            self.add_dof(&name, position, rate, metric);
        }
    }

    /// Appends a stop to the named DOF's chain. The previous tail restarts
    /// from the DOF's current orientation.
    pub fn add_dof(&mut self, name: &str, position: Vec3, rate: Vec3, metric: &str) {
        let current = self.dof_positions.get(name).copied();
        let chain = self.dofs.entry(name.to_string()).or_default();
        if let Some(tail) = chain.back_mut() {
            tail.current_time = 0.0;
            if let Some(current) = current {
                tail.start = current;
            }
        }
        chain.push_back(DofStop {
            metric: metric.to_string(),
            start: position,
            rate,
            current_time: 0.0,
        });
    }

    pub fn remove_all_dofs_named(&mut self, name: &str) {
        self.dofs.remove(name);
    }

    pub fn dof_stops(&self, name: &str) -> Option<&VecDeque<DofStop>> {
        self.dofs.get(name)
    }

    pub fn dof_stop_count(&self) -> usize {
        self.dofs.values().map(VecDeque::len).sum()
    }

    pub fn dof_position(&self, name: &str) -> Option<Vec3> {
        self.dof_positions.get(name).copied()
    }

    /// Advances every DOF chain by `delta` and returns the orientation each
    /// DOF should take this tick.
    pub(crate) fn step_articulations(
        &mut self,
        delta: f32,
        smooth_time: f32,
        period: f32,
    ) -> Vec<(String, Vec3)> {
        let mut updates = Vec::with_capacity(self.dofs.len());
        for (name, chain) in &mut self.dofs {
            // Only the head and the newest stop take part in a transition.
            while chain.len() > 2 {
                chain.remove(1);
            }
            let Some(head) = chain.front_mut() else {
                continue;
            };
            head.current_time += delta;
            let head = head.clone();

            let value = match chain.get(1) {
                Some(next) if head.current_time < smooth_time => {
                    let weight = head.current_time / (smooth_time * period).max(f32::EPSILON);
                    smooth_articulation(head.start, next.start, weight.min(1.0))
                }
                Some(next) => predict_articulation(
                    next.start,
                    next.rate,
                    head.current_time - smooth_time,
                ),
                None => predict_articulation(head.start, head.rate, head.current_time),
            };

            if chain.len() > 1 && head.current_time >= period {
                chain.pop_front();
                if let Some(next) = chain.front_mut() {
                    next.start = value;
                    next.current_time = 0.0;
                }
            }

            self.dof_positions.insert(name.clone(), value);
            updates.push((name.clone(), value));
        }
        updates
    }

    /// Counts down to the next forced ground clamp. A real transform change
    /// restarts the countdown.
    pub fn should_force_clamp(&mut self, delta: f32, transform_changed: bool, interval: f32) -> bool {
        if transform_changed {
            self.force_clamp_countdown = interval;
            return false;
        }
        self.force_clamp_countdown -= delta;
        if self.force_clamp_countdown <= 0.0 {
            self.force_clamp_countdown = interval;
            return true;
        }
        false
    }

    pub fn force_clamp_countdown(&self) -> f32 {
        self.force_clamp_countdown
    }

    pub fn set_force_clamp_countdown(&mut self, countdown: f32) {
        self.force_clamp_countdown = countdown;
    }

    pub fn do_dr(&mut self, xform: &mut Transform) -> DeadReckoningOutcome {
        let ground_clamp = !self.flying;
        match self.algorithm {
            DeadReckoningAlgorithm::None => DeadReckoningOutcome::default(),
            DeadReckoningAlgorithm::Static => {
                if !self.is_updated() {
                    return DeadReckoningOutcome::default();
                }
                xform.translation = self.last_translation;
                xform.rotation = self.last_quat;
                self.translation_before_update = self.last_translation;
                self.rotation_before_update = self.last_quat;
                self.rotation_resolved = true;
                self.current_translation = self.last_translation;
                self.current_rotation = self.last_quat;
                self.previous_instant_velocity = Vec3::ZERO;
                DeadReckoningOutcome {
                    changed: true,
                    ground_clamp,
                }
            }
            DeadReckoningAlgorithm::VelocityOnly | DeadReckoningAlgorithm::VelocityAndAcceleration => {
                if !self.needs_extrapolation(xform) {
                    self.previous_instant_velocity = Vec3::ZERO;
                    return DeadReckoningOutcome::default();
                }
                if self.is_updated() {
                    self.calculate_smoothing_times(xform);
                    self.recompute_spline();
                }
                self.dead_reckon_rotation(xform);
                self.dead_reckon_position(xform);
                log::trace!(
                    "Dead reckoned to {} after {:.3}s of {:.3}s smoothing",
                    xform.translation,
                    self.translation_elapsed,
                    self.translation_end
                );
                DeadReckoningOutcome {
                    changed: true,
                    ground_clamp,
                }
            }
        }
    }

    fn uses_acceleration(&self) -> bool {
        self.algorithm == DeadReckoningAlgorithm::VelocityAndAcceleration
    }

    fn needs_extrapolation(&self, xform: &Transform) -> bool {
        let accel = self.uses_acceleration();
        self.is_updated()
            || self.last_translation != xform.translation
            || !self.rotation_resolved
            || self.last_velocity.length_squared() > MOVING_VELOCITY2
            || (accel && self.acceleration.length_squared() > MOVING_VELOCITY2)
            || (accel && self.angular_velocity.length_squared() > MOVING_ANGULAR_VELOCITY2)
    }

    /// Sizes both smoothing windows from the average update interval. An
    /// actor that cannot cover the correction at its current speed gets at
    /// most one second.
    fn calculate_smoothing_times(&mut self, xform: &Transform) {
        if self.use_fixed_smoothing_time {
            self.translation_end = self.fixed_smoothing_time;
            self.rotation_end = self.fixed_smoothing_time;
            return;
        }

        let mut rotation_end = self
            .max_rotation_smoothing_time
            .min(self.average_rotation_interval);
        if self.uses_acceleration() {
            let rotation_gap = (self.last_quat - xform.rotation).length_squared();
            if self.angular_velocity.length_squared() * rotation_end * rotation_end
                < 0.1 * rotation_gap
            {
                rotation_end = rotation_end.min(1.0);
            }
        }
        self.rotation_end = rotation_end;

        let mut translation_end = self
            .max_translation_smoothing_time
            .min(self.average_translation_interval);
        let translation_gap = (self.last_translation - xform.translation).length_squared();
        if self.last_velocity.length_squared() * translation_end * translation_end < translation_gap {
            translation_end = translation_end.min(1.0);
        }
        self.translation_end = translation_end;
    }

    fn recompute_spline(&mut self) {
        let end = self.translation_end;
        let accel = if self.uses_acceleration() {
            self.acceleration
        } else {
            Vec3::ZERO
        };
        let norm = if end > 0.0 { end } else { 1.0 };
        let end_location = self.last_translation + self.last_velocity * end + 0.5 * accel * end * end;
        let estimated_velocity = self.last_velocity + accel * end;

        let c0 = self.translation_before_update;
        let c1 = c0 + self.velocity_before_update * norm * SPLINE_CONTROL_SCALE;
        let c3 = end_location;
        let c2 = c3 - estimated_velocity * norm * SPLINE_CONTROL_SCALE;
        self.spline = [c0, c1, c2, c3];
    }

    fn dead_reckon_rotation(&mut self, xform: &mut Transform) {
        if self.rotation_resolved {
            return;
        }

        let mut target = self.last_quat;
        let mut start = self.rotation_before_update;
        let mut changed_by_angular_velocity = false;
        if self.uses_acceleration()
            && self.angular_velocity.length_squared() > ROTATING_ANGULAR_VELOCITY2
        {
            changed_by_angular_velocity = true;
            let elapsed = self.rotation_elapsed.min(self.rotation_end);
            let angle = self.angular_velocity.length() * elapsed;
            let spin = Quat::from_axis_angle(self.angular_velocity.normalize(), angle);
            target = spin * self.last_quat;
            start = spin * self.rotation_before_update;
        }

        if self.rotation_end > 0.0 && self.rotation_elapsed < self.rotation_end {
            let t = (self.rotation_elapsed / self.rotation_end).clamp(0.0, 1.0);
            xform.rotation = start.slerp(target, t);
        } else {
            xform.rotation = target;
            self.rotation_resolved = !changed_by_angular_velocity;
        }
        self.current_rotation = xform.rotation;
    }

    fn dead_reckon_position(&mut self, xform: &mut Transform) {
        let t = self.translation_elapsed;
        let end = self.translation_end;
        let accel_term = if self.uses_acceleration() {
            0.5 * self.acceleration * t * t
        } else {
            Vec3::ZERO
        };

        let position = if end <= 0.0 || t >= end {
            self.last_translation + self.last_velocity * t + accel_term
        } else if self.use_cubic_spline {
            bezier(&self.spline, t / end)
        } else {
            let fraction = t / end;
            let last_known = self.last_translation + self.last_velocity * t;
            let blended_velocity = self.velocity_before_update
                + (self.last_velocity - self.velocity_before_update) * fraction;
            let velocity_blended = self.translation_before_update + blended_velocity * t;
            velocity_blended + (last_known - velocity_blended) * fraction + accel_term
        };

        if self.current_time_delta > 0.0 {
            self.previous_instant_velocity =
                (position - self.current_translation) / self.current_time_delta;
        }
        self.current_translation = position;
        xform.translation = position;
    }
}

fn bezier(c: &[Vec3; 4], t: f32) -> Vec3 {
    let u = 1.0 - t;
    c[0] * (u * u * u) + c[1] * (3.0 * u * u * t) + c[2] * (3.0 * u * t * t) + c[3] * (t * t * t)
}

/// Blends along the shortest arc and wraps the result into `[0, 2*pi)`.
pub fn smooth_articulation(current: Vec3, next: Vec3, weight: f32) -> Vec3 {
    use std::f32::consts::{PI, TAU};

    let mut distance = next - current;
    for axis in 0..3 {
        while distance[axis] > PI {
            distance[axis] -= TAU;
        }
        while distance[axis] < -PI {
            distance[axis] += TAU;
        }
    }
    let mut result = current + distance * weight;
    for axis in 0..3 {
        result[axis] = result[axis].rem_euclid(TAU);
    }
    result
}

pub fn predict_articulation(start: Vec3, rate: Vec3, elapsed: f32) -> Vec3 {
    start + rate * elapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MessageType;
    use crate::codec::ArticulatedParts;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-2
    }

    #[test]
    fn static_snaps_to_last_known() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::Static);
        helper.set_last_known_translation(Vec3::new(1.0, 1.2, 1.3));
        helper.set_last_known_rotation(Vec3::new(0.3, 0.0, 0.0));

        let mut xform = Transform::default();
        let outcome = helper.do_dr(&mut xform);
        assert!(outcome.changed);
        assert_eq!(outcome.ground_clamp, !helper.is_flying());
        assert!(approx(xform.translation, Vec3::new(1.0, 1.2, 1.3)));
        assert!(xform.rotation.angle_between(hpr_to_quat(Vec3::new(0.3, 0.0, 0.0))) < 1e-3);

        helper.clear_updated();
        assert!(!helper.do_dr(&mut xform).changed);

        helper.set_flying(true);
        assert!(!helper.do_dr(&mut xform).ground_clamp);
    }

    #[test]
    fn none_leaves_transform_alone() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::None);
        helper.set_last_known_translation(Vec3::splat(5.0));
        let mut xform = Transform::default();
        assert_eq!(helper.do_dr(&mut xform), DeadReckoningOutcome::default());
        assert_eq!(xform.translation, Vec3::ZERO);
    }

    #[test]
    fn unclamped_type_still_reports_ground_contact() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::Static);
        helper.set_ground_clamp_type(GroundClampType::None);
        helper.set_last_known_translation(Vec3::new(2.0, 3.0, 4.0));

        let mut xform = Transform::default();
        let outcome = helper.do_dr(&mut xform);
        assert!(outcome.changed);
        assert!(outcome.ground_clamp);

        helper.set_flying(true);
        helper.set_last_known_translation(Vec3::new(2.0, 3.0, 5.0));
        assert!(!helper.do_dr(&mut xform).ground_clamp);
    }

    #[test]
    fn velocity_extrapolates_past_smoothing() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::VelocityOnly);
        helper.set_fixed_smoothing_time(Some(0.0));
        helper.set_last_known_translation(Vec3::ZERO);
        helper.set_last_known_velocity(Vec3::new(2.0, 0.0, 0.0));

        let mut xform = Transform::default();
        helper.advance(0.5);
        assert!(helper.do_dr(&mut xform).changed);
        assert!(approx(xform.translation, Vec3::new(1.0, 0.0, 0.0)));
        helper.clear_updated();

        helper.advance(0.5);
        helper.do_dr(&mut xform);
        assert!(approx(xform.translation, Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn acceleration_adds_half_at_squared() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::VelocityAndAcceleration);
        helper.set_fixed_smoothing_time(Some(0.0));
        helper.set_last_known_translation(Vec3::ZERO);
        helper.set_last_known_velocity(Vec3::X);
        helper.set_last_known_acceleration(Vec3::new(0.0, 2.0, 0.0));

        let mut xform = Transform::default();
        helper.advance(1.0);
        helper.do_dr(&mut xform);
        assert!(approx(xform.translation, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn smoothing_blends_from_previous_position() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::VelocityOnly);
        helper.set_fixed_smoothing_time(Some(1.0));
        helper.set_last_known_translation(Vec3::ZERO);

        let mut xform = Transform::default();
        helper.do_dr(&mut xform);
        helper.clear_updated();

        helper.set_last_known_translation(Vec3::new(10.0, 0.0, 0.0));
        helper.advance(0.5);
        helper.do_dr(&mut xform);
        assert!(approx(xform.translation, Vec3::new(5.0, 0.0, 0.0)));
        helper.clear_updated();

        helper.advance(0.5);
        helper.do_dr(&mut xform);
        assert!(approx(xform.translation, Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn stationary_actor_is_left_alone() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_algorithm(DeadReckoningAlgorithm::VelocityOnly);
        helper.set_last_known_translation(Vec3::new(3.0, 0.0, 0.0));
        let mut xform = Transform::default();
        helper.do_dr(&mut xform);
        helper.clear_updated();

        helper.advance(0.1);
        let outcome = helper.do_dr(&mut xform);
        assert!(!outcome.changed);
    }

    #[test]
    fn update_times_are_averaged() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_last_translation_updated_time(2.0);
        assert!((helper.average_translation_interval() - 1.0).abs() < 1e-6);
        helper.set_last_translation_updated_time(3.0);
        assert!((helper.average_translation_interval() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn force_upright_keeps_heading() {
        let mut helper = DeadReckoningHelper::new();
        helper.set_force_upright(true);
        helper.set_last_known_rotation(Vec3::new(1.0, 0.4, 0.2));
        assert_eq!(helper.last_known_rotation(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn force_clamp_countdown() {
        let mut helper = DeadReckoningHelper::new();
        let interval = 8.0;
        helper.set_force_clamp_countdown(interval);

        assert!(!helper.should_force_clamp(1.0, false, interval));
        assert!((helper.force_clamp_countdown() - 7.0).abs() < 1e-6);

        assert!(!helper.should_force_clamp(1.0, true, interval));
        assert!((helper.force_clamp_countdown() - 8.0).abs() < 1e-6);

        assert!(helper.should_force_clamp(interval + 0.1, false, interval));
        assert!((helper.force_clamp_countdown() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn stops_collapse_to_two() {
        let mut helper = DeadReckoningHelper::new();
        for _ in 0..6 {
            helper.add_dof("dof_turret_01", Vec3::ZERO, Vec3::X, "AzimuthRate");
        }
        assert_eq!(helper.dof_stop_count(), 6);

        helper.step_articulations(0.125, 1.0, 1.0);
        assert_eq!(helper.dof_stop_count(), 2);
        let head = &helper.dof_stops("dof_turret_01").unwrap()[0];
        assert!((head.current_time - 0.125).abs() < 1e-6);

        for _ in 0..8 {
            helper.step_articulations(0.125, 1.0, 1.0);
        }
        assert_eq!(helper.dof_stop_count(), 1);

        helper.remove_all_dofs_named("dof_turret_01");
        assert_eq!(helper.dof_stop_count(), 0);
    }

    #[test]
    fn single_stop_predicts_by_rate() {
        let mut helper = DeadReckoningHelper::new();
        helper.add_dof("dof_gun_01", Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0), "AzimuthRate");
        let updates = helper.step_articulations(0.5, 1.0, 1.0);
        assert_eq!(updates.len(), 1);
        assert!(approx(updates[0].1, Vec3::new(0.35, 0.0, 0.0)));
    }

    #[test]
    fn smoothing_takes_the_short_way_round() {
        let current = Vec3::new(0.1, 0.0, 0.0);
        let next = Vec3::new(std::f32::consts::TAU - 0.1, 0.0, 0.0);
        let halfway = smooth_articulation(current, next, 0.5);
        assert!(halfway.x.abs() < 1e-4 || (halfway.x - std::f32::consts::TAU).abs() < 1e-4);
    }

    #[test]
    fn updates_drive_the_helper() {
        let mut helper = DeadReckoningHelper::new();
        let turret = ArticulatedParameter {
            change: 1,
            part_attached_to: 0,
            value: ParameterValue::Articulated(ArticulatedParts::new(
                4096,
                ArticulatedTypeMetric::Azimuth,
                0.75,
            )),
        };
        let message = Message::new(MessageType::ActorUpdated)
            .with_param(DEAD_RECKONING_ALGORITHM, PropertyValue::Enumeration("Velocity Only".into()))
            .with_param(LAST_KNOWN_TRANSLATION, PropertyValue::Vec3(Vec3::new(1.0, 2.0, 3.0)))
            .with_param(VELOCITY_VECTOR, PropertyValue::Vec3(Vec3::X))
            .with_param(FLYING, PropertyValue::Bool(true))
            .with_param(ARTICULATED_PARAMETERS, PropertyValue::Articulations(vec![turret]));
        helper.apply_update(&message);

        assert_eq!(helper.algorithm(), DeadReckoningAlgorithm::VelocityOnly);
        assert_eq!(helper.last_known_translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(helper.last_known_velocity(), Vec3::X);
        assert!(helper.is_flying());
        assert!(helper.is_translation_updated());
        let stops = helper.dof_stops("dof_turret_01").unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].start, Vec3::new(0.75, 0.0, 0.0));
        assert_eq!(stops[0].metric, "Azimuth");
    }

    #[test]
    fn auto_mode_follows_ownership() {
        assert_eq!(UpdateMode::Auto.effective(true), UpdateMode::CalculateAndMoveActor);
        assert_eq!(UpdateMode::Auto.effective(false), UpdateMode::CalculateOnly);
        assert_eq!(UpdateMode::CalculateOnly.effective(true), UpdateMode::CalculateOnly);
    }
}
