use fedgate::{DeadReckoningConfig, GatewayConfig};
use glam::Vec3;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub tick_rate: u32,
    /// Ticks between attribute updates from the publishing federate.
    pub publish_interval: u32,
    pub vehicle_speed: f32,
    /// Heading change of the scripted vehicle in radians per second.
    pub vehicle_turn_rate: f32,
    pub turret_rate: f32,
    pub vehicle_dimensions: Vec3,
    pub ground_height: f32,
    pub gateway: GatewayConfig,
    pub dead_reckoning: DeadReckoningConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            publish_interval: 5,
            vehicle_speed: 10.0,
            vehicle_turn_rate: 0.1,
            turret_rate: 0.5,
            vehicle_dimensions: Vec3::new(3.5, 7.0, 2.5),
            ground_height: 0.0,
            gateway: GatewayConfig::default(),
            dead_reckoning: DeadReckoningConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Gateway settings for one of the two loopback federates.
    pub fn federate(&self, name: &str, application_id: u16) -> GatewayConfig {
        GatewayConfig {
            federate_name: format!("{}-{}", self.gateway.federate_name, name),
            application_id,
            ..self.gateway.clone()
        }
    }
}
