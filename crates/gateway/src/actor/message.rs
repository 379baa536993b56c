use std::collections::BTreeMap;
use std::fmt;

use super::value::PropertyValue;
use super::{ActorId, ActorType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    ActorCreated,
    ActorUpdated,
    ActorDeleted,
    TickLocal,
    TickRemote,
    MapUnloaded,
    /// Any non-persistent message, typically one carried as an interaction.
    Named(String),
}

impl MessageType {
    pub fn name(&self) -> &str {
        match self {
            MessageType::ActorCreated => "ActorCreated",
            MessageType::ActorUpdated => "ActorUpdated",
            MessageType::ActorDeleted => "ActorDeleted",
            MessageType::TickLocal => "TickLocal",
            MessageType::TickRemote => "TickRemote",
            MessageType::MapUnloaded => "MapUnloaded",
            MessageType::Named(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "ActorCreated" => MessageType::ActorCreated,
            "ActorUpdated" => MessageType::ActorUpdated,
            "ActorDeleted" => MessageType::ActorDeleted,
            "TickLocal" => MessageType::TickLocal,
            "TickRemote" => MessageType::TickRemote,
            "MapUnloaded" => MessageType::MapUnloaded,
            other => MessageType::Named(other.to_string()),
        }
    }

    pub fn is_actor_lifecycle(&self) -> bool {
        matches!(
            self,
            MessageType::ActorCreated | MessageType::ActorUpdated | MessageType::ActorDeleted
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub message_type: MessageType,
    pub about_actor_id: Option<ActorId>,
    pub sending_actor_id: Option<ActorId>,
    pub actor_type: Option<ActorType>,
    pub sim_time: f64,
    pub delta_sim_time: f32,
    params: BTreeMap<String, PropertyValue>,
}

impl Message {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            about_actor_id: None,
            sending_actor_id: None,
            actor_type: None,
            sim_time: 0.0,
            delta_sim_time: 0.0,
            params: BTreeMap::new(),
        }
    }

    pub fn tick(message_type: MessageType, delta_sim_time: f32, sim_time: f64) -> Self {
        Self {
            delta_sim_time,
            sim_time,
            ..Self::new(message_type)
        }
    }

    pub fn about(mut self, actor_id: ActorId) -> Self {
        self.about_actor_id = Some(actor_id);
        self
    }

    pub fn with_actor_type(mut self, actor_type: ActorType) -> Self {
        self.actor_type = Some(actor_type);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn param(&self, name: &str) -> Option<&PropertyValue> {
        self.params.get(name)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.params.insert(name.into(), value);
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_names_round_trip() {
        for ty in [
            MessageType::ActorCreated,
            MessageType::TickRemote,
            MessageType::Named("WeaponFired".into()),
        ] {
            assert_eq!(MessageType::from_name(ty.name()), ty);
        }
        assert!(MessageType::ActorDeleted.is_actor_lifecycle());
        assert!(!MessageType::MapUnloaded.is_actor_lifecycle());
    }

    #[test]
    fn builder_sets_params() {
        let msg = Message::new(MessageType::ActorUpdated)
            .about(ActorId(7))
            .with_param("Damage State", PropertyValue::Enumeration("Destroyed".into()));
        assert_eq!(msg.about_actor_id, Some(ActorId(7)));
        assert_eq!(
            msg.param("Damage State").and_then(PropertyValue::as_str),
            Some("Destroyed")
        );
        assert_eq!(msg.param_count(), 1);
    }
}
