mod loopback;

use std::collections::BTreeMap;

pub use loopback::{LoopbackRti, RtiCall};

use crate::error::RtiError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHandle(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectClassHandle(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeHandle(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InteractionClassHandle(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterHandle(pub u32);

pub type AttributeValues = BTreeMap<AttributeHandle, Vec<u8>>;
pub type ParameterValues = BTreeMap<ParameterHandle, Vec<u8>>;

/// Outbound side of the federation bus.
pub trait RtiAmbassador {
    fn create_federation_execution(&mut self, federation: &str, fom: &str) -> Result<(), RtiError>;

    fn join_federation_execution(&mut self, federate: &str, federation: &str)
    -> Result<(), RtiError>;

    fn resign_federation_execution(&mut self) -> Result<(), RtiError>;

    fn object_class_handle(&self, name: &str) -> Result<ObjectClassHandle, RtiError>;

    fn attribute_handle(
        &self,
        name: &str,
        class: ObjectClassHandle,
    ) -> Result<AttributeHandle, RtiError>;

    fn interaction_class_handle(&self, name: &str) -> Result<InteractionClassHandle, RtiError>;

    fn parameter_handle(
        &self,
        name: &str,
        class: InteractionClassHandle,
    ) -> Result<ParameterHandle, RtiError>;

    fn publish_object_class(
        &mut self,
        class: ObjectClassHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    fn subscribe_object_class_attributes(
        &mut self,
        class: ObjectClassHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    fn publish_interaction_class(&mut self, class: InteractionClassHandle) -> Result<(), RtiError>;

    fn subscribe_interaction_class(&mut self, class: InteractionClassHandle)
    -> Result<(), RtiError>;

    fn register_object_instance(
        &mut self,
        class: ObjectClassHandle,
        name: &str,
    ) -> Result<ObjectHandle, RtiError>;

    fn update_attribute_values(
        &mut self,
        object: ObjectHandle,
        values: &AttributeValues,
        tag: &[u8],
    ) -> Result<(), RtiError>;

    fn send_interaction(
        &mut self,
        class: InteractionClassHandle,
        values: &ParameterValues,
        tag: &[u8],
    ) -> Result<(), RtiError>;

    fn delete_object_instance(&mut self, object: ObjectHandle, tag: &[u8]) -> Result<(), RtiError>;

    fn tick(&mut self) -> Result<(), RtiError>;
}

/// Call-ins the federation bus makes while it is being ticked.
pub trait FederateAmbassador {
    fn discover_object_instance(
        &mut self,
        object: ObjectHandle,
        class: ObjectClassHandle,
        name: &str,
    );

    fn reflect_attribute_values(&mut self, object: ObjectHandle, values: &AttributeValues, tag: &[u8]);

    fn remove_object_instance(&mut self, object: ObjectHandle, tag: &[u8]);

    fn receive_interaction(
        &mut self,
        class: InteractionClassHandle,
        values: &ParameterValues,
        tag: &[u8],
    );
}
