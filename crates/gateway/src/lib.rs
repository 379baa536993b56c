pub mod actor;
pub mod codec;
pub mod config;
pub mod dead_reckoning;
pub mod error;
pub mod gateway;
pub mod mapping;
pub mod rti;

pub use actor::{
    ActorId, ActorRecord, ActorStore, ActorType, GameType, Message, MessageSink, MessageType,
    PropertyContainer, PropertyValue, Transform,
};
pub use codec::{
    ArticulatedParameter, ArticulatedParts, ArticulatedTypeMetric, AttachedParts, DamageState,
    EntityIdentifier, EntityKind, EntityType, EulerAngles, EventIdentifier, ParameterValue,
    PlatformDomain, RprAttributeType, Tag, VelocityVector, WireReader, WireValue, WireWriter,
    WorldCoordinate,
};
pub use config::{DeadReckoningConfig, GatewayConfig, MappingConfig};
pub use dead_reckoning::{
    DeadReckoningAlgorithm, DeadReckoningComponent, DeadReckoningHelper, DeadReckoningScene,
    FlatGround, GroundClampType, GroundQuery, UpdateMode,
};
pub use error::{CodecError, DeadReckoningError, GatewayError, RtiError};
pub use gateway::{FederationState, HlaGateway, ParameterTranslator};
pub use mapping::{
    AttributeToPropertyList, IdentityTable, InteractionToMessage, MappingFlags, MappingRegistry,
    ObjectToActor, ParameterDefinition, ParameterToParameterList,
};
pub use rti::{
    AttributeHandle, AttributeValues, FederateAmbassador, InteractionClassHandle, LoopbackRti,
    ObjectClassHandle, ObjectHandle, ParameterHandle, ParameterValues, RtiAmbassador, RtiCall,
};
