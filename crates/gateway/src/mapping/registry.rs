use std::collections::HashMap;

use super::descriptor::{InteractionToMessage, ObjectToActor};
use crate::actor::{ActorType, MessageType};
use crate::codec::EntityType;
use crate::error::GatewayError;
use crate::rti::{InteractionClassHandle, ObjectClassHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectMappingId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionMappingId(pub usize);

/// Loaded mapping descriptors, kept in registration order. The order is what
/// breaks ties between equally ranked entity types.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    objects: Vec<ObjectToActor>,
    interactions: Vec<InteractionToMessage>,
    by_actor_type: HashMap<ActorType, ObjectMappingId>,
    by_message_type: HashMap<MessageType, InteractionMappingId>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Several mappings may share an actor type; outbound updates use the
    /// first one registered.
    pub fn register_object(
        &mut self,
        mapping: ObjectToActor,
    ) -> Result<ObjectMappingId, GatewayError> {
        let duplicate = self.objects.iter().any(|m| {
            m.object_class_name == mapping.object_class_name
                && m.entity_type == mapping.entity_type
                && m.actor_type == mapping.actor_type
        });
        if duplicate {
            return Err(GatewayError::DuplicateMapping(format!(
                "{} -> {}",
                mapping.object_class_name, mapping.actor_type
            )));
        }

        let id = ObjectMappingId(self.objects.len());
        self.by_actor_type
            .entry(mapping.actor_type.clone())
            .or_insert(id);
        self.objects.push(mapping);
        Ok(id)
    }

    pub fn register_interaction(
        &mut self,
        mapping: InteractionToMessage,
    ) -> Result<InteractionMappingId, GatewayError> {
        let message_type = mapping.message_type();
        let duplicate = self.by_message_type.contains_key(&message_type)
            || self
                .interactions
                .iter()
                .any(|m| m.interaction_class_name == mapping.interaction_class_name);
        if duplicate {
            return Err(GatewayError::DuplicateMapping(
                mapping.interaction_class_name.clone(),
            ));
        }

        let id = InteractionMappingId(self.interactions.len());
        self.by_message_type.insert(message_type, id);
        self.interactions.push(mapping);
        Ok(id)
    }

    pub fn object(&self, id: ObjectMappingId) -> Option<&ObjectToActor> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectMappingId) -> Option<&mut ObjectToActor> {
        self.objects.get_mut(id.0)
    }

    pub fn interaction(&self, id: InteractionMappingId) -> Option<&InteractionToMessage> {
        self.interactions.get(id.0)
    }

    pub fn interaction_mut(&mut self, id: InteractionMappingId) -> Option<&mut InteractionToMessage> {
        self.interactions.get_mut(id.0)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectMappingId, &ObjectToActor)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, m)| (ObjectMappingId(i), m))
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut ObjectToActor> {
        self.objects.iter_mut()
    }

    pub fn interactions(&self) -> impl Iterator<Item = (InteractionMappingId, &InteractionToMessage)> {
        self.interactions
            .iter()
            .enumerate()
            .map(|(i, m)| (InteractionMappingId(i), m))
    }

    pub fn interactions_mut(&mut self) -> impl Iterator<Item = &mut InteractionToMessage> {
        self.interactions.iter_mut()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.interactions.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.interactions.clear();
        self.by_actor_type.clear();
        self.by_message_type.clear();
    }

    pub fn object_for_actor_type(&self, actor_type: &ActorType) -> Option<ObjectMappingId> {
        self.by_actor_type.get(actor_type).copied()
    }

    pub fn interaction_for_message_type(
        &self,
        message_type: &MessageType,
    ) -> Option<InteractionMappingId> {
        self.by_message_type.get(message_type).copied()
    }

    pub fn interaction_for_class(
        &self,
        class: InteractionClassHandle,
    ) -> Option<InteractionMappingId> {
        self.interactions()
            .find(|(_, m)| m.class_handle == Some(class))
            .map(|(id, _)| id)
    }

    pub fn objects_for_class(
        &self,
        class: ObjectClassHandle,
    ) -> impl Iterator<Item = (ObjectMappingId, &ObjectToActor)> {
        self.objects()
            .filter(move |(_, m)| m.class_handle == Some(class))
    }

    pub fn is_class_mapped(&self, class: ObjectClassHandle) -> bool {
        self.objects_for_class(class).next().is_some()
    }

    pub fn class_has_entity_types(&self, class: ObjectClassHandle) -> bool {
        self.objects_for_class(class)
            .any(|(_, m)| m.entity_type.is_some())
    }

    /// Exact lookup by class name and entity type.
    pub fn object_mapping(
        &self,
        class_name: &str,
        entity_type: Option<&EntityType>,
    ) -> Option<ObjectMappingId> {
        self.objects()
            .find(|(_, m)| {
                m.object_class_name == class_name && m.entity_type.as_ref() == entity_type
            })
            .map(|(id, _)| id)
    }

    /// First mapping of the class that is not keyed by entity type.
    pub fn default_object_mapping(&self, class: ObjectClassHandle) -> Option<ObjectMappingId> {
        self.objects_for_class(class)
            .find(|(_, m)| m.entity_type.is_none())
            .map(|(id, _)| id)
    }

    /// Highest `rank_match` among the class's entity-type mappings. Only a
    /// strictly better rank replaces the current pick, so the earliest
    /// registered mapping wins a tie.
    pub fn best_object_mapping(
        &self,
        class: ObjectClassHandle,
        entity_type: &EntityType,
    ) -> Option<ObjectMappingId> {
        let mut best: Option<(ObjectMappingId, i32)> = None;
        for (id, mapping) in self.objects_for_class(class) {
            let Some(candidate) = mapping.entity_type.as_ref() else {
                continue;
            };
            let rank = candidate.rank_match(entity_type);
            if rank < 0 {
                continue;
            }
            if best.is_none_or(|(_, best_rank)| rank > best_rank) {
                best = Some((id, rank));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATFORM: ObjectClassHandle = ObjectClassHandle(10);

    fn mapping(name: &str, et: Option<EntityType>) -> ObjectToActor {
        let mut m = ObjectToActor::new(ActorType::new("Entity", name), "BaseEntity.PhysicalEntity.Platform");
        m.entity_type = et;
        m.class_handle = Some(PLATFORM);
        m
    }

    #[test]
    fn best_match_prefers_specific_entries() {
        let mut registry = MappingRegistry::new();
        let generic = registry
            .register_object(mapping("Vehicle", Some(EntityType::new(1, 1, 0, 0, 0, 0, 0))))
            .unwrap();
        let tank = registry
            .register_object(mapping("Tank", Some(EntityType::new(1, 1, 225, 1, 1, 3, 0))))
            .unwrap();

        let t72 = EntityType::new(1, 1, 225, 1, 1, 3, 0);
        assert_eq!(registry.best_object_mapping(PLATFORM, &t72), Some(tank));

        let truck = EntityType::new(1, 1, 225, 6, 1, 0, 0);
        assert_eq!(registry.best_object_mapping(PLATFORM, &truck), Some(generic));

        let aircraft = EntityType::new(1, 2, 225, 1, 0, 0, 0);
        assert_eq!(registry.best_object_mapping(PLATFORM, &aircraft), None);
    }

    #[test]
    fn ties_go_to_first_registered() {
        let mut registry = MappingRegistry::new();
        let first = registry
            .register_object(mapping("A", Some(EntityType::new(1, 1, 225, 0, 0, 0, 0))))
            .unwrap();
        registry
            .register_object(mapping("B", Some(EntityType::new(1, 1, 0, 1, 0, 0, 0))))
            .unwrap();

        let et = EntityType::new(1, 1, 225, 1, 0, 0, 0);
        assert_eq!(registry.best_object_mapping(PLATFORM, &et), Some(first));
    }

    #[test]
    fn default_mapping_skips_entity_typed_entries() {
        let mut registry = MappingRegistry::new();
        registry
            .register_object(mapping("Tank", Some(EntityType::new(1, 1, 225, 1, 1, 3, 0))))
            .unwrap();
        let plain = registry.register_object(mapping("Unknown", None)).unwrap();

        assert_eq!(registry.default_object_mapping(PLATFORM), Some(plain));
        assert!(registry.class_has_entity_types(PLATFORM));
        assert!(!registry.is_class_mapped(ObjectClassHandle(11)));
    }

    #[test]
    fn exact_lookup_matches_class_and_entity_type() {
        let mut registry = MappingRegistry::new();
        let t72 = EntityType::new(1, 1, 225, 1, 1, 3, 0);
        let tank = registry.register_object(mapping("Tank", Some(t72))).unwrap();
        let plain = registry.register_object(mapping("Unknown", None)).unwrap();

        let class = "BaseEntity.PhysicalEntity.Platform";
        assert_eq!(registry.object_mapping(class, Some(&t72)), Some(tank));
        assert_eq!(registry.object_mapping(class, None), Some(plain));

        let truck = EntityType::new(1, 1, 225, 6, 1, 0, 0);
        assert_eq!(registry.object_mapping(class, Some(&truck)), None);
        assert_eq!(registry.object_mapping("BaseEntity.PhysicalEntity", Some(&t72)), None);
    }

    #[test]
    fn shared_actor_type_keeps_first_for_outbound() {
        let mut registry = MappingRegistry::new();
        let first = registry
            .register_object(mapping("Tank", Some(EntityType::new(1, 1, 225, 1, 1, 3, 0))))
            .unwrap();
        registry
            .register_object(mapping("Tank", Some(EntityType::new(1, 1, 222, 1, 1, 1, 0))))
            .unwrap();
        assert_eq!(
            registry.object_for_actor_type(&ActorType::new("Entity", "Tank")),
            Some(first)
        );
        assert!(registry
            .register_object(mapping("Tank", Some(EntityType::new(1, 1, 225, 1, 1, 3, 0))))
            .is_err());
    }

    #[test]
    fn interactions_are_unique_per_message_type() {
        let mut registry = MappingRegistry::new();
        let fire = MessageType::Named("WeaponFired".into());
        let id = registry
            .register_interaction(InteractionToMessage::new("WeaponFire", fire.clone()))
            .unwrap();
        assert_eq!(registry.interaction_for_message_type(&fire), Some(id));
        assert!(registry
            .register_interaction(InteractionToMessage::new("Other", fire))
            .is_err());
    }
}
