mod descriptor;
mod registry;
mod table;

pub use descriptor::{
    ABOUT_ACTOR_ID, AttributeToPropertyList, EnumValueMapping, InteractionToMessage, MappingFlags,
    ObjectToActor, OneToManyMapping, ParameterDefinition, ParameterToParameterList,
    SENDING_ACTOR_ID,
};
pub use registry::{InteractionMappingId, MappingRegistry, ObjectMappingId};
pub use table::{IdentityTable, LiveObject};
