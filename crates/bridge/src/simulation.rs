use glam::Vec3;

use fedgate::dead_reckoning::{
    ANGULAR_VELOCITY_VECTOR, ARTICULATED_PARAMETERS, DEAD_RECKONING_ALGORITHM,
    LAST_KNOWN_ROTATION, LAST_KNOWN_TRANSLATION, VELOCITY_VECTOR,
};
use fedgate::{
    ActorId, ArticulatedParameter, ArticulatedParts, ArticulatedTypeMetric, DeadReckoningAlgorithm,
    Message, MessageType, ParameterValue, PropertyValue, Transform,
};

use crate::rpr::tank_type;

const TURRET_CLASS: u32 = 4096;

/// A tank driving a slow circle with its turret sweeping.
#[derive(Debug, Clone)]
pub struct ScriptedVehicle {
    pub actor: ActorId,
    pub position: Vec3,
    pub heading: f32,
    pub speed: f32,
    pub turn_rate: f32,
    pub turret: f32,
    pub turret_rate: f32,
}

impl ScriptedVehicle {
    pub fn new(actor: ActorId, speed: f32, turn_rate: f32, turret_rate: f32) -> Self {
        Self {
            actor,
            position: Vec3::ZERO,
            heading: 0.0,
            speed,
            turn_rate,
            turret: 0.0,
            turret_rate,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::new(-self.heading.sin(), self.heading.cos(), 0.0) * self.speed
    }

    pub fn transform(&self) -> Transform {
        Transform::from_hpr(self.position, Vec3::new(self.heading, 0.0, 0.0))
    }

    pub fn step(&mut self, dt: f32) {
        self.position += self.velocity() * dt;
        self.heading = (self.heading + self.turn_rate * dt).rem_euclid(std::f32::consts::TAU);
        self.turret = (self.turret + self.turret_rate * dt).rem_euclid(std::f32::consts::TAU);
    }

    pub fn created_message(&self, sim_time: f64) -> Message {
        let mut message = self
            .state_message(MessageType::ActorCreated, sim_time)
            .with_param("Name", PropertyValue::String("T-72".into()))
            .with_param("Damage State", PropertyValue::Enumeration("No Damage".into()));
        message.sending_actor_id = Some(self.actor);
        message
    }

    pub fn update_message(&self, sim_time: f64) -> Message {
        self.state_message(MessageType::ActorUpdated, sim_time)
    }

    pub fn deleted_message(&self, sim_time: f64) -> Message {
        let mut message = Message::new(MessageType::ActorDeleted).about(self.actor);
        message.sim_time = sim_time;
        message
    }

    fn state_message(&self, message_type: MessageType, sim_time: f64) -> Message {
        let turret = ArticulatedParameter {
            change: 0,
            part_attached_to: 0,
            value: ParameterValue::Articulated(ArticulatedParts::new(
                TURRET_CLASS,
                ArticulatedTypeMetric::Azimuth,
                self.turret,
            )),
        };
        let mut message = Message::new(message_type)
            .about(self.actor)
            .with_actor_type(tank_type())
            .with_param(LAST_KNOWN_TRANSLATION, PropertyValue::Vec3(self.position))
            .with_param(
                LAST_KNOWN_ROTATION,
                PropertyValue::Vec3(Vec3::new(self.heading, 0.0, 0.0)),
            )
            .with_param(VELOCITY_VECTOR, PropertyValue::Vec3(self.velocity()))
            .with_param(
                ANGULAR_VELOCITY_VECTOR,
                PropertyValue::Vec3(Vec3::new(0.0, 0.0, self.turn_rate)),
            )
            .with_param(
                DEAD_RECKONING_ALGORITHM,
                PropertyValue::Enumeration(DeadReckoningAlgorithm::VelocityOnly.name().into()),
            )
            .with_param(ARTICULATED_PARAMETERS, PropertyValue::Articulations(vec![turret]));
        message.sim_time = sim_time;
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_zero_drives_along_y() {
        let mut vehicle = ScriptedVehicle::new(ActorId(1), 10.0, 0.0, 0.0);
        vehicle.step(0.5);
        assert!((vehicle.position - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn updates_carry_the_kinematic_state() {
        let vehicle = ScriptedVehicle::new(ActorId(3), 4.0, 0.1, 0.5);
        let message = vehicle.update_message(2.0);
        assert_eq!(message.about_actor_id, Some(ActorId(3)));
        assert_eq!(message.sim_time, 2.0);
        assert_eq!(
            message.param(VELOCITY_VECTOR),
            Some(&PropertyValue::Vec3(Vec3::new(0.0, 4.0, 0.0)))
        );
        assert!(matches!(
            message.param(ARTICULATED_PARAMETERS),
            Some(PropertyValue::Articulations(parts)) if parts.len() == 1
        ));
    }
}
