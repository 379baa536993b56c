use std::collections::HashMap;

use super::registry::ObjectMappingId;
use crate::actor::ActorId;
use crate::codec::EntityIdentifier;
use crate::rti::ObjectHandle;

/// Every facet the federation knows one live object by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveObject {
    pub handle: Option<ObjectHandle>,
    pub rti_id: Option<String>,
    pub entity_id: Option<EntityIdentifier>,
    pub mapping: Option<ObjectMappingId>,
}

/// Identity table between federation objects and local actors. Records are
/// keyed by actor id; the other keys are secondary indices into the same
/// record, so a removal by any key drops all of them together.
#[derive(Debug, Default)]
pub struct IdentityTable {
    objects: HashMap<ActorId, LiveObject>,
    by_handle: HashMap<ObjectHandle, ActorId>,
    by_rti_id: HashMap<String, ActorId>,
    by_entity_id: HashMap<EntityIdentifier, ActorId>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_handle(&mut self, handle: ObjectHandle, actor: ActorId) -> bool {
        if self.by_handle.contains_key(&handle) || self.facet(actor, |o| o.handle.is_some()) {
            return false;
        }
        self.by_handle.insert(handle, actor);
        self.objects.entry(actor).or_default().handle = Some(handle);
        true
    }

    pub fn put_rti_id(&mut self, rti_id: impl Into<String>, actor: ActorId) -> bool {
        let rti_id = rti_id.into();
        if self.by_rti_id.contains_key(&rti_id) || self.facet(actor, |o| o.rti_id.is_some()) {
            return false;
        }
        self.by_rti_id.insert(rti_id.clone(), actor);
        self.objects.entry(actor).or_default().rti_id = Some(rti_id);
        true
    }

    pub fn put_entity_id(&mut self, entity_id: EntityIdentifier, actor: ActorId) -> bool {
        if self.by_entity_id.contains_key(&entity_id)
            || self.facet(actor, |o| o.entity_id.is_some())
        {
            return false;
        }
        self.by_entity_id.insert(entity_id, actor);
        self.objects.entry(actor).or_default().entity_id = Some(entity_id);
        true
    }

    /// The handle must already be mapped to an actor.
    pub fn put_mapping(&mut self, handle: ObjectHandle, mapping: ObjectMappingId) -> bool {
        let Some(actor) = self.by_handle.get(&handle) else {
            return false;
        };
        match self.objects.get_mut(actor) {
            Some(object) if object.mapping.is_none() => {
                object.mapping = Some(mapping);
                true
            }
            _ => false,
        }
    }

    pub fn get_id(&self, handle: ObjectHandle) -> Option<ActorId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn get_id_by_rti_id(&self, rti_id: &str) -> Option<ActorId> {
        self.by_rti_id.get(rti_id).copied()
    }

    pub fn get_id_by_entity_id(&self, entity_id: &EntityIdentifier) -> Option<ActorId> {
        self.by_entity_id.get(entity_id).copied()
    }

    pub fn get_handle(&self, actor: ActorId) -> Option<ObjectHandle> {
        self.objects.get(&actor).and_then(|o| o.handle)
    }

    pub fn get_rti_id(&self, actor: ActorId) -> Option<&str> {
        self.objects.get(&actor).and_then(|o| o.rti_id.as_deref())
    }

    pub fn get_entity_id(&self, actor: ActorId) -> Option<EntityIdentifier> {
        self.objects.get(&actor).and_then(|o| o.entity_id)
    }

    pub fn get_mapping(&self, handle: ObjectHandle) -> Option<ObjectMappingId> {
        self.get_id(handle)
            .and_then(|actor| self.objects.get(&actor))
            .and_then(|o| o.mapping)
    }

    pub fn get(&self, actor: ActorId) -> Option<&LiveObject> {
        self.objects.get(&actor)
    }

    pub fn remove_actor(&mut self, actor: ActorId) -> Option<LiveObject> {
        let object = self.objects.remove(&actor)?;
        if let Some(handle) = object.handle {
            self.by_handle.remove(&handle);
        }
        if let Some(rti_id) = &object.rti_id {
            self.by_rti_id.remove(rti_id);
        }
        if let Some(entity_id) = object.entity_id {
            self.by_entity_id.remove(&entity_id);
        }
        Some(object)
    }

    pub fn remove_handle(&mut self, handle: ObjectHandle) -> Option<ActorId> {
        let actor = self.get_id(handle)?;
        self.remove_actor(actor);
        Some(actor)
    }

    pub fn remove_entity_id(&mut self, entity_id: &EntityIdentifier) -> Option<ActorId> {
        let actor = self.get_id_by_entity_id(entity_id)?;
        self.remove_actor(actor);
        Some(actor)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.by_handle.clear();
        self.by_rti_id.clear();
        self.by_entity_id.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &LiveObject)> {
        self.objects.iter().map(|(id, o)| (*id, o))
    }

    fn facet(&self, actor: ActorId, occupied: impl Fn(&LiveObject) -> bool) -> bool {
        self.objects.get(&actor).is_some_and(occupied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consistent(table: &IdentityTable) -> bool {
        let indexed = table.by_handle.len() + table.by_rti_id.len() + table.by_entity_id.len();
        let facets: usize = table
            .objects
            .values()
            .map(|o| {
                o.handle.is_some() as usize
                    + o.rti_id.is_some() as usize
                    + o.entity_id.is_some() as usize
            })
            .sum();
        indexed == facets
            && table.by_handle.iter().all(|(h, a)| table.get_handle(*a) == Some(*h))
            && table
                .by_entity_id
                .iter()
                .all(|(e, a)| table.get_entity_id(*a) == Some(*e))
    }

    #[test]
    fn put_get_remove_handle() {
        let mut table = IdentityTable::new();
        let handle = ObjectHandle(4);
        let id = ActorId(1);
        let eid = EntityIdentifier::new(3, 3, 1);

        assert!(table.put_handle(handle, id));
        assert!(table.put_entity_id(eid, id));
        assert_eq!(table.get_id(handle), Some(id));
        assert_eq!(table.get_id_by_entity_id(&eid), Some(id));

        assert_eq!(table.remove_handle(handle), Some(id));
        assert_eq!(table.get_id(handle), None);
        assert_eq!(table.get_id_by_entity_id(&eid), None);
        assert!(table.is_empty());
        assert!(consistent(&table));
    }

    #[test]
    fn second_put_is_rejected_without_change() {
        let mut table = IdentityTable::new();
        assert!(table.put_handle(ObjectHandle(1), ActorId(1)));
        assert!(!table.put_handle(ObjectHandle(1), ActorId(2)));
        assert!(!table.put_handle(ObjectHandle(2), ActorId(1)));
        assert_eq!(table.get_id(ObjectHandle(1)), Some(ActorId(1)));
        assert_eq!(table.get_id(ObjectHandle(2)), None);
        assert!(table.get(ActorId(2)).is_none());

        assert!(table.put_rti_id("tank-1", ActorId(1)));
        assert!(!table.put_rti_id("tank-1", ActorId(2)));
        assert!(!table.put_rti_id("tank-2", ActorId(1)));
        assert_eq!(table.get_rti_id(ActorId(1)), Some("tank-1"));
        assert!(consistent(&table));
    }

    #[test]
    fn mapping_needs_a_mapped_handle() {
        let mut table = IdentityTable::new();
        assert!(!table.put_mapping(ObjectHandle(9), ObjectMappingId(0)));
        table.put_handle(ObjectHandle(9), ActorId(5));
        assert!(table.put_mapping(ObjectHandle(9), ObjectMappingId(0)));
        assert!(!table.put_mapping(ObjectHandle(9), ObjectMappingId(1)));
        assert_eq!(table.get_mapping(ObjectHandle(9)), Some(ObjectMappingId(0)));

        table.remove_actor(ActorId(5));
        assert_eq!(table.get_mapping(ObjectHandle(9)), None);
    }

    #[test]
    fn removal_by_entity_id_cascades() {
        let mut table = IdentityTable::new();
        let eid = EntityIdentifier::new(1, 2, 3);
        table.put_handle(ObjectHandle(7), ActorId(3));
        table.put_rti_id("x", ActorId(3));
        table.put_entity_id(eid, ActorId(3));

        assert_eq!(table.remove_entity_id(&eid), Some(ActorId(3)));
        assert_eq!(table.get_id_by_rti_id("x"), None);
        assert_eq!(table.get_id(ObjectHandle(7)), None);
        assert_eq!(table.remove_entity_id(&eid), None);
        assert!(consistent(&table));
    }

    #[test]
    fn clear_empties_everything() {
        let mut table = IdentityTable::new();
        for i in 0..4 {
            table.put_handle(ObjectHandle(i), ActorId(i as u64));
        }
        assert_eq!(table.len(), 4);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
        assert!(consistent(&table));
    }
}
