use fedgate::{ActorId, EntityIdentifier};

#[derive(Debug, Clone)]
pub enum BridgeEvent {
    VehiclePublished {
        actor: ActorId,
        entity_id: Option<EntityIdentifier>,
    },
    RemoteDiscovered {
        actor: ActorId,
    },
    RemoteRemoved {
        actor: ActorId,
    },
    /// Distance between the published vehicle and its dead reckoned copy.
    Drift {
        actor: ActorId,
        distance: f32,
    },
    Error {
        message: String,
    },
}
