use std::collections::{BTreeMap, HashMap, VecDeque};

use glam::{EulerRot, Quat, Vec3};

use super::message::{Message, MessageType};
use super::value::PropertyValue;
use super::{ActorId, ActorType};

/// Where the gateway sends the messages it produces. Actor creation,
/// update and deletion all travel as messages through this sink.
pub trait MessageSink {
    fn send(&mut self, message: Message);

    fn allocate_actor_id(&mut self) -> ActorId;
}

pub trait PropertyContainer {
    fn property(&self, name: &str) -> Option<&PropertyValue>;

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Option<PropertyValue>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Heading about Z, pitch about X, roll about Y, in radians.
    pub fn from_hpr(translation: Vec3, hpr: Vec3) -> Self {
        Self::new(translation, hpr_to_quat(hpr))
    }

    pub fn hpr(&self) -> Vec3 {
        let (h, p, r) = self.rotation.to_euler(EulerRot::ZXY);
        Vec3::new(h, p, r)
    }
}

pub fn hpr_to_quat(hpr: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZXY, hpr.x, hpr.y, hpr.z)
}

#[derive(Debug, Clone)]
pub struct ActorRecord {
    pub id: ActorId,
    pub actor_type: ActorType,
    pub remote: bool,
    pub transform: Transform,
    pub dofs: BTreeMap<String, Vec3>,
    properties: BTreeMap<String, PropertyValue>,
}

impl ActorRecord {
    pub fn new(id: ActorId, actor_type: ActorType, remote: bool) -> Self {
        Self {
            id,
            actor_type,
            remote,
            transform: Transform::default(),
            dofs: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn apply_params(&mut self, message: &Message) {
        for (name, value) in message.params() {
            self.properties.insert(name.to_string(), value.clone());
        }
    }
}

impl PropertyContainer for ActorRecord {
    fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Option<PropertyValue> {
        self.properties.insert(name.to_string(), value)
    }
}

/// In-memory actor registry. Remote actors are created, updated and deleted
/// by the lifecycle messages queued through its `MessageSink` side.
#[derive(Debug)]
pub struct ActorStore {
    actors: HashMap<ActorId, ActorRecord>,
    inbox: VecDeque<Message>,
    next_id: u64,
}

impl Default for ActorStore {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ActorStore {
    pub fn new(first_id: u64) -> Self {
        Self {
            actors: HashMap::new(),
            inbox: VecDeque::new(),
            next_id: first_id,
        }
    }

    pub fn spawn_local(&mut self, actor_type: ActorType) -> ActorId {
        let id = self.allocate_actor_id();
        self.actors
            .insert(id, ActorRecord::new(id, actor_type, false));
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorRecord> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut ActorRecord> {
        self.actors.get_mut(&id)
    }

    pub fn remove(&mut self, id: ActorId) -> Option<ActorRecord> {
        self.actors.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorRecord> {
        self.actors.values()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn pending_messages(&self) -> usize {
        self.inbox.len()
    }

    /// Applies queued lifecycle messages and hands every queued message back
    /// so other components can see them too.
    pub fn process_messages(&mut self) -> Vec<Message> {
        let messages: Vec<Message> = self.inbox.drain(..).collect();
        for message in &messages {
            self.apply(message);
        }
        messages
    }

    fn apply(&mut self, message: &Message) {
        let Some(id) = message.about_actor_id else {
            if message.message_type.is_actor_lifecycle() {
                log::warn!("{} message without an actor id", message.message_type);
            }
            return;
        };

        match message.message_type {
            MessageType::ActorCreated => {
                let actor_type = message.actor_type.clone().unwrap_or_default();
                let record = self
                    .actors
                    .entry(id)
                    .or_insert_with(|| ActorRecord::new(id, actor_type, true));
                record.apply_params(message);
                log::debug!("Created remote actor {} ({})", id, record.actor_type);
            }
            MessageType::ActorUpdated => match self.actors.get_mut(&id) {
                Some(record) => record.apply_params(message),
                None => log::warn!("Update for unknown actor {}", id),
            },
            MessageType::ActorDeleted => {
                if self.actors.remove(&id).is_some() {
                    log::debug!("Deleted actor {}", id);
                }
            }
            _ => {}
        }
    }
}

impl MessageSink for ActorStore {
    fn send(&mut self, message: Message) {
        self.inbox.push_back(message);
    }

    fn allocate_actor_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank() -> ActorType {
        ActorType::new("Vehicles", "Tank")
    }

    #[test]
    fn lifecycle_messages_drive_records() {
        let mut store = ActorStore::new(100);
        let id = store.allocate_actor_id();
        assert_eq!(id, ActorId(100));

        store.send(
            Message::new(MessageType::ActorCreated)
                .about(id)
                .with_actor_type(tank())
                .with_param("Damage State", PropertyValue::Enumeration("NoDamage".into())),
        );
        store.send(
            Message::new(MessageType::ActorUpdated)
                .about(id)
                .with_param("Damage State", PropertyValue::Enumeration("Destroyed".into())),
        );
        let processed = store.process_messages();
        assert_eq!(processed.len(), 2);

        let record = store.get(id).unwrap();
        assert!(record.remote);
        assert_eq!(record.actor_type, tank());
        assert_eq!(
            record.property("Damage State"),
            Some(&PropertyValue::Enumeration("Destroyed".into()))
        );

        store.send(Message::new(MessageType::ActorDeleted).about(id));
        store.process_messages();
        assert!(store.get(id).is_none());
    }

    #[test]
    fn local_actors_are_not_remote() {
        let mut store = ActorStore::default();
        let id = store.spawn_local(tank());
        assert!(!store.get(id).unwrap().remote);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn hpr_round_trip() {
        let hpr = Vec3::new(0.5, 0.2, -0.1);
        let xform = Transform::from_hpr(Vec3::ZERO, hpr);
        assert!((xform.hpr() - hpr).length() < 0.001);
    }
}
