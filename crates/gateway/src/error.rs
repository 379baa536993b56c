use crate::actor::ActorId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("buffer too short: needed {needed} bytes, {available} available")]
    BufferTooShort { needed: usize, available: usize },
    #[error("value of {len} bytes exceeds the {max} byte limit")]
    TooLong { len: usize, max: usize },
    #[error("{hla_type} value of {actual} bytes, expected {expected}")]
    WrongLength {
        hla_type: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unknown parameter value discriminator {0}")]
    BadDiscriminator(u32),
    #[error("invalid tag digit 0x{0:02x}")]
    BadTagDigit(u8),
    #[error("{value} is not a valid {kind}")]
    UnknownEnumValue { kind: &'static str, value: u32 },
    #[error("cannot parse \"{0}\"")]
    Parse(String),
    #[error("{hla_type} cannot carry a {game_type} value")]
    TypeMismatch {
        hla_type: &'static str,
        game_type: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtiError {
    #[error("federation execution \"{0}\" already exists")]
    FederationExecutionAlreadyExists(String),
    #[error("federation execution \"{0}\" does not exist")]
    FederationExecutionDoesNotExist(String),
    #[error("federate is not an execution member")]
    FederateNotExecutionMember,
    #[error("federate is already an execution member")]
    FederateAlreadyExecutionMember,
    #[error("name \"{0}\" not found")]
    NameNotFound(String),
    #[error("object {0} is not known")]
    ObjectNotKnown(u32),
    #[error("object name \"{0}\" is already registered")]
    ObjectAlreadyRegistered(String),
    #[error("RTI internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Rti(#[from] RtiError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("not joined to a federation")]
    NotJoined,
    #[error("already joined to federation \"{0}\"")]
    AlreadyJoined(String),
    #[error("mappings cannot be registered while joined to a federation")]
    MappingLocked,
    #[error("a mapping for \"{0}\" is already registered")]
    DuplicateMapping(String),
    #[error("actor {0} has no actor type")]
    UnknownActorType(ActorId),
    #[error("every entity number for this site and application is in use")]
    EntityIdsExhausted,
    #[error("no federation handle resolved for \"{0}\"")]
    UnresolvedHandle(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeadReckoningError {
    #[error("actor {0} is already registered for dead reckoning")]
    AlreadyRegistered(ActorId),
}
