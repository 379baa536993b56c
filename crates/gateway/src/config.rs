use serde::{Deserialize, Serialize};

use crate::mapping::{InteractionToMessage, ObjectToActor};

pub const DEFAULT_FEDERATION_NAME: &str = "fedgate";
pub const DEFAULT_FOM_FILE: &str = "RPR-FOM.fed";
pub const DEFAULT_ENTITY_TYPE_ATTRIBUTE: &str = "EntityType";
pub const DEFAULT_ENTITY_ID_ATTRIBUTE: &str = "EntityIdentifier";
pub const DEFAULT_FORCE_CLAMP_INTERVAL: f32 = 3.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub federation_name: String,
    pub federate_name: String,
    pub fom_file: String,
    pub site_id: u16,
    pub application_id: u16,
    /// Attribute carrying the DIS entity type when a mapping does not name one.
    pub entity_type_attribute: String,
    /// Attribute carrying the DIS entity identifier when a mapping does not name one.
    pub entity_id_attribute: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            federation_name: DEFAULT_FEDERATION_NAME.to_string(),
            federate_name: "fedgate-federate".to_string(),
            fom_file: DEFAULT_FOM_FILE.to_string(),
            site_id: 1,
            application_id: 1,
            entity_type_attribute: DEFAULT_ENTITY_TYPE_ATTRIBUTE.to_string(),
            entity_id_attribute: DEFAULT_ENTITY_ID_ATTRIBUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadReckoningConfig {
    pub force_clamp_interval: f32,
    /// Actors closer than this to the eye point get three point clamping.
    /// Zero disables the range check.
    pub high_res_clamp_range: f32,
    pub articulation_smooth_time: f32,
    pub articulation_period: f32,
}

impl Default for DeadReckoningConfig {
    fn default() -> Self {
        Self {
            force_clamp_interval: DEFAULT_FORCE_CLAMP_INTERVAL,
            high_res_clamp_range: 0.0,
            articulation_smooth_time: 1.0,
            articulation_period: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub objects: Vec<ObjectToActor>,
    pub interactions: Vec<InteractionToMessage>,
}
