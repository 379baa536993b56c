use std::collections::{HashMap, HashSet};

use super::{
    AttributeHandle, AttributeValues, FederateAmbassador, InteractionClassHandle, ObjectClassHandle,
    ObjectHandle, ParameterHandle, ParameterValues, RtiAmbassador,
};
use crate::error::RtiError;

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;
const OBJECT_HANDLE_STRIDE: u32 = 1 << 20;

fn fnv1a(seed: u32, name: &str) -> u32 {
    name.bytes()
        .fold(seed, |hash, b| (hash ^ b as u32).wrapping_mul(FNV_PRIME))
}

#[derive(Debug, Clone, PartialEq)]
pub enum RtiCall {
    Registered {
        object: ObjectHandle,
        class: ObjectClassHandle,
        name: String,
    },
    Updated {
        object: ObjectHandle,
        values: AttributeValues,
        tag: Vec<u8>,
    },
    Interaction {
        class: InteractionClassHandle,
        values: ParameterValues,
        tag: Vec<u8>,
    },
    Deleted {
        object: ObjectHandle,
        tag: Vec<u8>,
    },
}

impl RtiCall {
    /// Replays the call as the call-in a peer federate would receive.
    pub fn deliver_to(&self, federate: &mut impl FederateAmbassador) {
        match self {
            RtiCall::Registered {
                object,
                class,
                name,
            } => federate.discover_object_instance(*object, *class, name),
            RtiCall::Updated {
                object,
                values,
                tag,
            } => federate.reflect_attribute_values(*object, values, tag),
            RtiCall::Interaction { class, values, tag } => {
                federate.receive_interaction(*class, values, tag)
            }
            RtiCall::Deleted { object, tag } => federate.remove_object_instance(*object, tag),
        }
    }
}

/// In-process federation bus. Handles are derived from names, so every
/// loopback federate agrees on them without a shared FOM.
#[derive(Debug)]
pub struct LoopbackRti {
    federation: Option<String>,
    joined_as: Option<String>,
    declared_classes: HashMap<String, HashSet<String>>,
    objects: HashMap<ObjectHandle, ObjectClassHandle>,
    object_names: HashSet<String>,
    next_object: u32,
    published: HashSet<ObjectClassHandle>,
    published_interactions: HashSet<InteractionClassHandle>,
    calls: Vec<RtiCall>,
    ticks: u64,
}

impl LoopbackRti {
    pub fn new(federate_index: u32) -> Self {
        Self {
            federation: None,
            joined_as: None,
            declared_classes: HashMap::new(),
            objects: HashMap::new(),
            object_names: HashSet::new(),
            next_object: federate_index * OBJECT_HANDLE_STRIDE + 1,
            published: HashSet::new(),
            published_interactions: HashSet::new(),
            calls: Vec::new(),
            ticks: 0,
        }
    }

    /// Restricts name lookups to declared classes once any class is declared.
    pub fn declare_class(&mut self, class: &str, members: &[&str]) {
        self.declared_classes.insert(
            class.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
    }

    pub fn is_joined(&self) -> bool {
        self.joined_as.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn calls(&self) -> &[RtiCall] {
        &self.calls
    }

    pub fn drain_calls(&mut self) -> Vec<RtiCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn check_joined(&self) -> Result<(), RtiError> {
        if self.joined_as.is_some() {
            Ok(())
        } else {
            Err(RtiError::FederateNotExecutionMember)
        }
    }

    fn check_class(&self, class: &str) -> Result<(), RtiError> {
        if self.declared_classes.is_empty() || self.declared_classes.contains_key(class) {
            Ok(())
        } else {
            Err(RtiError::NameNotFound(class.to_string()))
        }
    }

    fn check_member(&self, class_hash: u32, name: &str) -> Result<(), RtiError> {
        if self.declared_classes.is_empty() {
            return Ok(());
        }
        let known = self
            .declared_classes
            .iter()
            .any(|(class, members)| fnv1a(FNV_OFFSET, class) == class_hash && members.contains(name));
        if known {
            Ok(())
        } else {
            Err(RtiError::NameNotFound(name.to_string()))
        }
    }
}

impl RtiAmbassador for LoopbackRti {
    fn create_federation_execution(&mut self, federation: &str, _fom: &str) -> Result<(), RtiError> {
        if self.federation.as_deref() == Some(federation) {
            return Err(RtiError::FederationExecutionAlreadyExists(
                federation.to_string(),
            ));
        }
        self.federation = Some(federation.to_string());
        Ok(())
    }

    fn join_federation_execution(
        &mut self,
        federate: &str,
        federation: &str,
    ) -> Result<(), RtiError> {
        if self.joined_as.is_some() {
            return Err(RtiError::FederateAlreadyExecutionMember);
        }
        if self.federation.as_deref() != Some(federation) {
            return Err(RtiError::FederationExecutionDoesNotExist(
                federation.to_string(),
            ));
        }
        self.joined_as = Some(federate.to_string());
        Ok(())
    }

    fn resign_federation_execution(&mut self) -> Result<(), RtiError> {
        self.check_joined()?;
        self.joined_as = None;
        self.objects.clear();
        self.object_names.clear();
        self.published.clear();
        self.published_interactions.clear();
        Ok(())
    }

    fn object_class_handle(&self, name: &str) -> Result<ObjectClassHandle, RtiError> {
        self.check_class(name)?;
        Ok(ObjectClassHandle(fnv1a(FNV_OFFSET, name)))
    }

    fn attribute_handle(
        &self,
        name: &str,
        class: ObjectClassHandle,
    ) -> Result<AttributeHandle, RtiError> {
        self.check_member(class.0, name)?;
        Ok(AttributeHandle(fnv1a(class.0, name)))
    }

    fn interaction_class_handle(&self, name: &str) -> Result<InteractionClassHandle, RtiError> {
        self.check_class(name)?;
        Ok(InteractionClassHandle(fnv1a(FNV_OFFSET, name)))
    }

    fn parameter_handle(
        &self,
        name: &str,
        class: InteractionClassHandle,
    ) -> Result<ParameterHandle, RtiError> {
        self.check_member(class.0, name)?;
        Ok(ParameterHandle(fnv1a(class.0, name)))
    }

    fn publish_object_class(
        &mut self,
        class: ObjectClassHandle,
        _attributes: &[AttributeHandle],
    ) -> Result<(), RtiError> {
        self.check_joined()?;
        self.published.insert(class);
        Ok(())
    }

    fn subscribe_object_class_attributes(
        &mut self,
        _class: ObjectClassHandle,
        _attributes: &[AttributeHandle],
    ) -> Result<(), RtiError> {
        self.check_joined()
    }

    fn publish_interaction_class(&mut self, class: InteractionClassHandle) -> Result<(), RtiError> {
        self.check_joined()?;
        self.published_interactions.insert(class);
        Ok(())
    }

    fn subscribe_interaction_class(
        &mut self,
        _class: InteractionClassHandle,
    ) -> Result<(), RtiError> {
        self.check_joined()
    }

    fn register_object_instance(
        &mut self,
        class: ObjectClassHandle,
        name: &str,
    ) -> Result<ObjectHandle, RtiError> {
        self.check_joined()?;
        if !self.published.contains(&class) {
            return Err(RtiError::Internal(format!(
                "object class {} is not published",
                class.0
            )));
        }
        if !name.is_empty() && !self.object_names.insert(name.to_string()) {
            return Err(RtiError::ObjectAlreadyRegistered(name.to_string()));
        }

        let object = ObjectHandle(self.next_object);
        self.next_object += 1;
        self.objects.insert(object, class);
        self.calls.push(RtiCall::Registered {
            object,
            class,
            name: name.to_string(),
        });
        Ok(object)
    }

    fn update_attribute_values(
        &mut self,
        object: ObjectHandle,
        values: &AttributeValues,
        tag: &[u8],
    ) -> Result<(), RtiError> {
        self.check_joined()?;
        if !self.objects.contains_key(&object) {
            return Err(RtiError::ObjectNotKnown(object.0));
        }
        self.calls.push(RtiCall::Updated {
            object,
            values: values.clone(),
            tag: tag.to_vec(),
        });
        Ok(())
    }

    fn send_interaction(
        &mut self,
        class: InteractionClassHandle,
        values: &ParameterValues,
        tag: &[u8],
    ) -> Result<(), RtiError> {
        self.check_joined()?;
        if !self.published_interactions.contains(&class) {
            return Err(RtiError::Internal(format!(
                "interaction class {} is not published",
                class.0
            )));
        }
        self.calls.push(RtiCall::Interaction {
            class,
            values: values.clone(),
            tag: tag.to_vec(),
        });
        Ok(())
    }

    fn delete_object_instance(&mut self, object: ObjectHandle, tag: &[u8]) -> Result<(), RtiError> {
        self.check_joined()?;
        if self.objects.remove(&object).is_none() {
            return Err(RtiError::ObjectNotKnown(object.0));
        }
        self.calls.push(RtiCall::Deleted {
            object,
            tag: tag.to_vec(),
        });
        Ok(())
    }

    fn tick(&mut self) -> Result<(), RtiError> {
        self.ticks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(index: u32) -> LoopbackRti {
        let mut rti = LoopbackRti::new(index);
        rti.create_federation_execution("fed", "rpr.fed").unwrap();
        rti.join_federation_execution("federate", "fed").unwrap();
        rti
    }

    #[test]
    fn handles_are_stable_across_federates() {
        let a = LoopbackRti::new(0);
        let b = LoopbackRti::new(1);
        let class_a = a.object_class_handle("BaseEntity.PhysicalEntity").unwrap();
        let class_b = b.object_class_handle("BaseEntity.PhysicalEntity").unwrap();
        assert_eq!(class_a, class_b);
        assert_eq!(
            a.attribute_handle("WorldLocation", class_a).unwrap(),
            b.attribute_handle("WorldLocation", class_b).unwrap()
        );
        assert_ne!(
            a.attribute_handle("WorldLocation", class_a).unwrap(),
            a.attribute_handle("Orientation", class_a).unwrap()
        );
    }

    #[test]
    fn declared_fom_rejects_unknown_names() {
        let mut rti = LoopbackRti::new(0);
        rti.declare_class("Platform", &["Marking"]);
        let class = rti.object_class_handle("Platform").unwrap();
        assert!(rti.attribute_handle("Marking", class).is_ok());
        assert!(rti.attribute_handle("Nope", class).is_err());
        assert!(rti.object_class_handle("Other").is_err());
    }

    #[test]
    fn register_update_delete_are_recorded() {
        let mut rti = joined(2);
        let class = rti.object_class_handle("Platform").unwrap();
        rti.publish_object_class(class, &[]).unwrap();

        let object = rti.register_object_instance(class, "tank-1").unwrap();
        assert_eq!(object.0, 2 * OBJECT_HANDLE_STRIDE + 1);
        assert!(matches!(
            rti.register_object_instance(class, "tank-1"),
            Err(RtiError::ObjectAlreadyRegistered(_))
        ));

        rti.update_attribute_values(object, &AttributeValues::new(), b"")
            .unwrap();
        rti.delete_object_instance(object, b"").unwrap();
        assert_eq!(
            rti.delete_object_instance(object, b""),
            Err(RtiError::ObjectNotKnown(object.0))
        );
        assert_eq!(rti.drain_calls().len(), 3);
        assert!(rti.calls().is_empty());
    }

    #[test]
    fn calls_require_membership() {
        let mut rti = LoopbackRti::new(0);
        assert_eq!(
            rti.tick().and_then(|_| rti.resign_federation_execution()),
            Err(RtiError::FederateNotExecutionMember)
        );
    }
}
