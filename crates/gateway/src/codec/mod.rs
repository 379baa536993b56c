mod cursor;
mod entity;
mod enums;
mod kinematic;
mod parts;
mod rpr;
mod tag;

pub use cursor::{WireReader, WireValue, WireWriter};
pub use entity::{EntityIdentifier, EntityType, EventIdentifier};
pub use enums::{ArticulatedTypeMetric, DamageState, EntityKind, PlatformDomain};
pub use kinematic::{EulerAngles, VelocityVector, WorldCoordinate};
pub use parts::{ArticulatedParameter, ArticulatedParts, AttachedParts, ParameterValue};
pub use rpr::{RprAttributeType, decode_marking, encode_marking};
pub use tag::Tag;
