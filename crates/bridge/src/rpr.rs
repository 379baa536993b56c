use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fedgate::dead_reckoning::{
    ACCELERATION_VECTOR, ANGULAR_VELOCITY_VECTOR, ARTICULATED_PARAMETERS,
    DEAD_RECKONING_ALGORITHM, LAST_KNOWN_ROTATION, LAST_KNOWN_TRANSLATION, VELOCITY_VECTOR,
};
use fedgate::mapping::ABOUT_ACTOR_ID;
use fedgate::{
    ActorType, AttributeToPropertyList, EntityType, GameType, InteractionToMessage, MappingConfig,
    MessageType, ObjectToActor, ParameterDefinition, ParameterToParameterList, RprAttributeType,
};

pub const PHYSICAL_ENTITY_CLASS: &str = "BaseEntity.PhysicalEntity";
pub const WEAPON_FIRE_CLASS: &str = "WeaponFire";
pub const WEAPON_FIRED: &str = "WeaponFired";

pub fn tank_type() -> ActorType {
    ActorType::new("Vehicles", "Tank")
}

/// Loads a JSON mapping file, or the built-in RPR set when no path is given.
pub fn load_mappings(path: Option<&Path>) -> Result<MappingConfig> {
    let Some(path) = path else {
        log::info!("Using the built-in RPR mappings");
        return Ok(builtin_mappings());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read mapping file {}", path.display()))?;
    parse_mappings(&data).with_context(|| format!("invalid mapping file {}", path.display()))
}

pub fn parse_mappings(data: &str) -> Result<MappingConfig> {
    Ok(serde_json::from_str(data)?)
}

pub fn builtin_mappings() -> MappingConfig {
    MappingConfig {
        objects: vec![tank_mapping()],
        interactions: vec![weapon_fire_mapping()],
    }
}

fn vec3_attribute(hla_name: &str, hla_type: RprAttributeType, game_name: &str) -> AttributeToPropertyList {
    AttributeToPropertyList::new(hla_name, hla_type)
        .with_parameter(ParameterDefinition::new(game_name, GameType::Vec3))
}

fn tank_mapping() -> ObjectToActor {
    ObjectToActor::new(tank_type(), PHYSICAL_ENTITY_CLASS)
        .with_entity_type(EntityType::new(1, 1, 225, 1, 1, 3, 0))
        .with_attribute(vec3_attribute(
            "WorldLocation",
            RprAttributeType::WorldCoordinate,
            LAST_KNOWN_TRANSLATION,
        ))
        .with_attribute(vec3_attribute(
            "Orientation",
            RprAttributeType::EulerAngles,
            LAST_KNOWN_ROTATION,
        ))
        .with_attribute(vec3_attribute(
            "VelocityVector",
            RprAttributeType::VelocityVector,
            VELOCITY_VECTOR,
        ))
        .with_attribute(vec3_attribute(
            "AccelerationVector",
            RprAttributeType::VelocityVector,
            ACCELERATION_VECTOR,
        ))
        .with_attribute(vec3_attribute(
            "AngularVelocityVector",
            RprAttributeType::AngularVelocityVector,
            ANGULAR_VELOCITY_VECTOR,
        ))
        .with_attribute(
            AttributeToPropertyList::new("DeadReckoningAlgorithm", RprAttributeType::UnsignedChar)
                .with_parameter(
                    ParameterDefinition::new(DEAD_RECKONING_ALGORITHM, GameType::Enumeration)
                        .with_default("Static")
                        .with_enum(1, "Static")
                        .with_enum(2, "Velocity Only")
                        .with_enum(4, "Velocity and Acceleration"),
                ),
        )
        .with_attribute(
            AttributeToPropertyList::new("DamageState", RprAttributeType::UnsignedInt).with_parameter(
                ParameterDefinition::new("Damage State", GameType::Enumeration)
                    .with_default("No Damage")
                    .with_enum(0, "No Damage")
                    .with_enum(1, "Slight Damage")
                    .with_enum(2, "Moderate Damage")
                    .with_enum(3, "Destroyed"),
            ),
        )
        .with_attribute(
            AttributeToPropertyList::new("Marking", RprAttributeType::Marking)
                .with_parameter(ParameterDefinition::new("Name", GameType::String)),
        )
        .with_attribute(
            AttributeToPropertyList::new("ArticulatedParametersArray", RprAttributeType::ArticulatedPart)
                .with_parameter(ParameterDefinition::new(
                    ARTICULATED_PARAMETERS,
                    GameType::Articulations,
                )),
        )
}

fn weapon_fire_mapping() -> InteractionToMessage {
    InteractionToMessage::new(WEAPON_FIRE_CLASS, MessageType::Named(WEAPON_FIRED.into()))
        .with_parameter(
            ParameterToParameterList::new("FiringObjectIdentifier", RprAttributeType::EntityIdentifier)
                .with_parameter(ParameterDefinition::new(ABOUT_ACTOR_ID, GameType::Actor)),
        )
        .with_parameter(
            ParameterToParameterList::new("MunitionType", RprAttributeType::EntityType)
                .with_parameter(ParameterDefinition::new("Munition", GameType::EntityType)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_mappings_survive_json() {
        let mappings = builtin_mappings();
        let json = serde_json::to_string_pretty(&mappings).unwrap();
        let parsed = parse_mappings(&json).unwrap();
        assert_eq!(parsed.objects, mappings.objects);
        assert_eq!(parsed.interactions, mappings.interactions);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(parse_mappings("{\"objects\": 3}").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_mappings(Some(Path::new("/nonexistent/mappings.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mappings.json"));
    }
}
