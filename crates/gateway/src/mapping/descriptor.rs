use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::actor::{ActorType, GameType, MessageType, PropertyValue};
use crate::codec::{EntityType, RprAttributeType};
use crate::rti::{AttributeHandle, InteractionClassHandle, ObjectClassHandle, ParameterHandle};

pub const ABOUT_ACTOR_ID: &str = "ABOUT_ACTOR_ID";
pub const SENDING_ACTOR_ID: &str = "SENDING_ACTOR_ID";

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MappingFlags: u8 {
        /// Fill the game default on every inbound update, not only on creation.
        const REQUIRED_FOR_GAME = 1 << 0;
        /// Send the default on every outbound update, not only on registration.
        const REQUIRED_FOR_HLA = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueMapping {
    pub hla: u32,
    pub game: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub game_name: String,
    pub game_type: GameType,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub flags: MappingFlags,
    #[serde(default)]
    pub enum_mapping: Vec<EnumValueMapping>,
}

impl ParameterDefinition {
    pub fn new(game_name: impl Into<String>, game_type: GameType) -> Self {
        Self {
            game_name: game_name.into(),
            game_type,
            default: None,
            flags: MappingFlags::empty(),
            enum_mapping: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_flags(mut self, flags: MappingFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_enum(mut self, hla: u32, game: impl Into<String>) -> Self {
        self.enum_mapping.push(EnumValueMapping {
            hla,
            game: game.into(),
        });
        self
    }

    pub fn is_about_actor_id(&self) -> bool {
        self.game_name == ABOUT_ACTOR_ID
    }

    pub fn is_sending_actor_id(&self) -> bool {
        self.game_name == SENDING_ACTOR_ID
    }

    pub fn is_special(&self) -> bool {
        self.is_about_actor_id() || self.is_sending_actor_id()
    }

    pub fn required_for_game(&self) -> bool {
        self.flags.contains(MappingFlags::REQUIRED_FOR_GAME)
    }

    pub fn required_for_hla(&self) -> bool {
        self.flags.contains(MappingFlags::REQUIRED_FOR_HLA)
    }

    pub fn default_value(&self) -> Option<PropertyValue> {
        let text = self.default.as_deref()?;
        match PropertyValue::parse(self.game_type, text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Bad default for \"{}\": {}", self.game_name, e);
                None
            }
        }
    }

    /// Falls back to the mapping of the default value, then to zero.
    pub fn hla_enum_value(&self, game: &str) -> u32 {
        let lookup = |name: &str| {
            self.enum_mapping
                .iter()
                .find(|m| m.game == name)
                .map(|m| m.hla)
        };
        lookup(game)
            .or_else(|| self.default.as_deref().and_then(lookup))
            .unwrap_or(0)
    }

    /// Unmapped integers become the default value, if any.
    pub fn game_enum_value(&self, hla: u32) -> Option<String> {
        self.enum_mapping
            .iter()
            .find(|m| m.hla == hla)
            .map(|m| m.game.clone())
            .or_else(|| self.default.clone())
    }
}

/// One federation attribute or parameter feeding one or more game values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneToManyMapping<H> {
    pub hla_name: String,
    pub hla_type: RprAttributeType,
    pub parameters: Vec<ParameterDefinition>,
    #[serde(skip)]
    pub handle: Option<H>,
    #[serde(skip)]
    pub invalid: bool,
}

pub type AttributeToPropertyList = OneToManyMapping<AttributeHandle>;
pub type ParameterToParameterList = OneToManyMapping<ParameterHandle>;

impl<H> OneToManyMapping<H> {
    pub fn new(hla_name: impl Into<String>, hla_type: RprAttributeType) -> Self {
        Self {
            hla_name: hla_name.into(),
            hla_type,
            parameters: Vec::new(),
            handle: None,
            invalid: false,
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn is_special(&self) -> bool {
        self.parameters.first().is_some_and(ParameterDefinition::is_special)
    }

    pub fn first_parameter(&self) -> Option<&ParameterDefinition> {
        self.parameters.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectToActor {
    pub actor_type: ActorType,
    pub object_class_name: String,
    #[serde(default, with = "entity_type_text")]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub entity_id_attribute: Option<String>,
    #[serde(default)]
    pub entity_type_attribute: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeToPropertyList>,
    #[serde(skip)]
    pub class_handle: Option<ObjectClassHandle>,
    #[serde(skip)]
    pub entity_id_handle: Option<AttributeHandle>,
    #[serde(skip)]
    pub entity_type_handle: Option<AttributeHandle>,
}

impl ObjectToActor {
    pub fn new(actor_type: ActorType, object_class_name: impl Into<String>) -> Self {
        Self {
            actor_type,
            object_class_name: object_class_name.into(),
            entity_type: None,
            entity_id_attribute: None,
            entity_type_attribute: None,
            attributes: Vec::new(),
            class_handle: None,
            entity_id_handle: None,
            entity_type_handle: None,
        }
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn with_entity_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.entity_id_attribute = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeToPropertyList) -> Self {
        self.attributes.push(attribute);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionToMessage {
    pub interaction_class_name: String,
    pub message_type: String,
    #[serde(default)]
    pub parameters: Vec<ParameterToParameterList>,
    #[serde(skip)]
    pub class_handle: Option<InteractionClassHandle>,
}

impl InteractionToMessage {
    pub fn new(interaction_class_name: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            interaction_class_name: interaction_class_name.into(),
            message_type: message_type.name().to_string(),
            parameters: Vec::new(),
            class_handle: None,
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterToParameterList) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn message_type(&self) -> MessageType {
        MessageType::from_name(&self.message_type)
    }
}

mod entity_type_text {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::codec::EntityType;

    pub fn serialize<S: Serializer>(value: &Option<EntityType>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(et) => s.serialize_some(&et.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EntityType>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|text| text.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}
