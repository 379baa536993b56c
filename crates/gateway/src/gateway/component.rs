use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::translator::ParameterTranslator;
use crate::actor::{ActorId, Message, MessageSink, MessageType, PropertyValue};
use crate::codec::{EntityIdentifier, EntityType, Tag, WireValue};
use crate::config::{GatewayConfig, MappingConfig};
use crate::error::{GatewayError, RtiError};
use crate::mapping::{
    IdentityTable, InteractionMappingId, InteractionToMessage, MappingRegistry, ObjectMappingId,
    ObjectToActor, ParameterDefinition,
};
use crate::rti::{
    AttributeHandle, AttributeValues, FederateAmbassador, InteractionClassHandle,
    ObjectClassHandle, ObjectHandle, ParameterValues, RtiAmbassador,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederationState {
    Disconnected,
    Joined,
}

/// A discovered object. It stays uncreated until a reflection resolves its
/// mapping and the first actor-created message goes out.
#[derive(Debug, Clone, Copy)]
struct RemoteObject {
    class: ObjectClassHandle,
    created: bool,
}

/// Translates between federation objects and interactions on one side and
/// actor messages on the other.
pub struct HlaGateway<R, S> {
    rti: R,
    sink: S,
    config: GatewayConfig,
    registry: MappingRegistry,
    table: IdentityTable,
    state: FederationState,
    /// `None` once every entity number has been handed out.
    next_entity_number: Option<u16>,
    remote: HashMap<ObjectHandle, RemoteObject>,
}

impl<R: RtiAmbassador, S: MessageSink> HlaGateway<R, S> {
    pub fn new(rti: R, sink: S, config: GatewayConfig) -> Self {
        Self {
            rti,
            sink,
            config,
            registry: MappingRegistry::new(),
            table: IdentityTable::new(),
            state: FederationState::Disconnected,
            next_entity_number: Some(1),
            remote: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> FederationState {
        self.state
    }

    pub fn is_joined(&self) -> bool {
        self.state == FederationState::Joined
    }

    pub fn rti(&self) -> &R {
        &self.rti
    }

    pub fn rti_mut(&mut self) -> &mut R {
        &mut self.rti
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    pub fn table(&self) -> &IdentityTable {
        &self.table
    }

    /// Discovered objects whose actor has not been created yet.
    pub fn pending_object_count(&self) -> usize {
        self.remote.values().filter(|o| !o.created).count()
    }

    pub fn register_object_mapping(
        &mut self,
        mapping: ObjectToActor,
    ) -> Result<ObjectMappingId, GatewayError> {
        if self.is_joined() {
            return Err(GatewayError::MappingLocked);
        }
        self.registry.register_object(mapping)
    }

    pub fn register_interaction_mapping(
        &mut self,
        mapping: InteractionToMessage,
    ) -> Result<InteractionMappingId, GatewayError> {
        if self.is_joined() {
            return Err(GatewayError::MappingLocked);
        }
        self.registry.register_interaction(mapping)
    }

    pub fn load_mappings(&mut self, mappings: MappingConfig) -> Result<(), GatewayError> {
        for mapping in mappings.objects {
            self.register_object_mapping(mapping)?;
        }
        for mapping in mappings.interactions {
            self.register_interaction_mapping(mapping)?;
        }
        log::info!(
            "Loaded {} object and {} interaction mappings",
            self.registry.object_count(),
            self.registry.interaction_count()
        );
        Ok(())
    }

    pub fn join_federation(&mut self) -> Result<(), GatewayError> {
        if self.is_joined() {
            return Err(GatewayError::AlreadyJoined(
                self.config.federation_name.clone(),
            ));
        }

        let federation = self.config.federation_name.clone();
        match self
            .rti
            .create_federation_execution(&federation, &self.config.fom_file)
        {
            Ok(()) => log::info!("Created federation execution \"{}\"", federation),
            Err(RtiError::FederationExecutionAlreadyExists(_)) => {
                log::debug!("Federation execution \"{}\" already exists", federation)
            }
            Err(e) => return Err(e.into()),
        }
        self.rti
            .join_federation_execution(&self.config.federate_name, &federation)?;

        self.resolve_handles();
        self.publish_subscribe()?;

        self.state = FederationState::Joined;
        log::info!(
            "Joined federation \"{}\" as \"{}\"",
            federation,
            self.config.federate_name
        );
        Ok(())
    }

    pub fn leave_federation(&mut self) -> Result<(), GatewayError> {
        if !self.is_joined() {
            return Err(GatewayError::NotJoined);
        }
        self.rti.resign_federation_execution()?;
        self.table.clear();
        self.remote.clear();
        self.state = FederationState::Disconnected;
        log::info!("Resigned from federation \"{}\"", self.config.federation_name);
        Ok(())
    }

    /// Sends a local actor or message change out to the federation.
    pub fn dispatch_network_message(&mut self, message: &Message) -> Result<(), GatewayError> {
        if !self.is_joined() {
            return Err(GatewayError::NotJoined);
        }
        match message.message_type {
            MessageType::ActorDeleted => self.dispatch_delete(message),
            MessageType::ActorCreated | MessageType::ActorUpdated => self.dispatch_update(message),
            _ => self.dispatch_interaction(message),
        }
    }

    pub fn process_message(&mut self, message: &Message) -> Result<(), GatewayError> {
        match message.message_type {
            MessageType::TickLocal if self.is_joined() => self.rti.tick()?,
            MessageType::MapUnloaded => {
                log::debug!("Map unloaded, dropping {} object mappings", self.table.len());
                self.table.clear();
                self.remote.clear();
            }
            _ => {}
        }
        Ok(())
    }

    pub fn dispatch_update(&mut self, message: &Message) -> Result<(), GatewayError> {
        let Some(actor) = message.about_actor_id else {
            log::warn!("{} message without an actor id", message.message_type);
            return Ok(());
        };
        let actor_type = message
            .actor_type
            .as_ref()
            .ok_or(GatewayError::UnknownActorType(actor))?;
        let Some(mapping_id) = self.registry.object_for_actor_type(actor_type) else {
            log::info!(
                "Ignoring actor {} with type {}, no mapping defined for it",
                actor,
                actor_type
            );
            return Ok(());
        };

        let existing = self.table.get_handle(actor);
        let (class, values) = self.prepare_update(message, actor, mapping_id, existing.is_none())?;

        let handle = match existing {
            Some(handle) => handle,
            None => {
                let name = self
                    .table
                    .get_rti_id(actor)
                    .map(str::to_string)
                    .unwrap_or_else(|| actor.to_string());
                let handle = self.rti.register_object_instance(class, &name)?;
                if !self.table.put_handle(handle, actor) {
                    log::warn!("Object {} is already mapped to another actor", handle.0);
                }
                log::debug!("Registered actor {} as object {} \"{}\"", actor, handle.0, name);
                handle
            }
        };

        if !values.is_empty() {
            log::trace!("Sending {} attributes for actor {}", values.len(), actor);
            self.rti
                .update_attribute_values(handle, &values, &Tag(message.sim_time).to_bytes())?;
        }
        Ok(())
    }

    pub fn dispatch_interaction(&mut self, message: &Message) -> Result<(), GatewayError> {
        let Some(mapping_id) = self
            .registry
            .interaction_for_message_type(&message.message_type)
        else {
            log::debug!(
                "No interaction mapped for message type {}",
                message.message_type
            );
            return Ok(());
        };

        let (class, values) = self.prepare_interaction(message, mapping_id)?;
        if !values.is_empty() {
            log::debug!(
                "Sending interaction {} for message {}",
                class.0,
                message.message_type
            );
            self.rti
                .send_interaction(class, &values, &Tag(message.sim_time).to_bytes())?;
        }
        Ok(())
    }

    pub fn dispatch_delete(&mut self, message: &Message) -> Result<(), GatewayError> {
        let Some(actor) = message.about_actor_id else {
            return Ok(());
        };
        let Some(handle) = self.table.get_handle(actor) else {
            log::info!("Ignoring delete of actor {}, it is not published", actor);
            return Ok(());
        };

        // Unmap first so an RTI failure cannot leave a stale entry behind.
        self.table.remove_actor(actor);
        self.rti
            .delete_object_instance(handle, &Tag(message.sim_time).to_bytes())?;
        log::debug!("Deleted object {} for actor {}", handle.0, actor);
        Ok(())
    }

    /// Attribute set for one outbound actor message. Defaults only go out
    /// with a new object unless the definition is required for HLA.
    fn prepare_update(
        &mut self,
        message: &Message,
        actor: ActorId,
        mapping_id: ObjectMappingId,
        new_object: bool,
    ) -> Result<(ObjectClassHandle, AttributeValues), GatewayError> {
        let Self {
            registry,
            table,
            config,
            next_entity_number,
            ..
        } = self;
        let mapping = registry
            .object(mapping_id)
            .ok_or_else(|| GatewayError::UnresolvedHandle(format!("mapping {}", mapping_id.0)))?;
        let class = mapping
            .class_handle
            .ok_or_else(|| GatewayError::UnresolvedHandle(mapping.object_class_name.clone()))?;

        let mut values = AttributeValues::new();

        if let Some(handle) = mapping.entity_id_handle {
            let entity_id = match table.get_entity_id(actor) {
                Some(entity_id) => entity_id,
                None => {
                    let entity_id = allocate_entity_id(table, config, next_entity_number)?;
                    if !table.put_entity_id(entity_id, actor) {
                        log::warn!("Actor {} already carries an entity id", actor);
                    }
                    log::debug!("Created entity id \"{}\" for actor {}", entity_id, actor);
                    entity_id
                }
            };
            values.insert(handle, entity_id.to_bytes());
        }

        if new_object && table.get_rti_id(actor).is_none() {
            let name = unique_object_name(table, actor);
            if !table.put_rti_id(name.clone(), actor) {
                log::warn!("Object name \"{}\" could not be mapped to actor {}", name, actor);
            }
        }

        if let (Some(entity_type), Some(handle)) = (mapping.entity_type, mapping.entity_type_handle)
        {
            values.insert(handle, entity_type.to_bytes());
        }

        let translator = ParameterTranslator::new(&*table);
        for attribute in &mapping.attributes {
            if attribute.invalid {
                continue;
            }
            let Some(handle) = attribute.handle else {
                continue;
            };
            let (inputs, send) = outbound_values(&attribute.parameters, message, new_object);
            if !send {
                continue;
            }
            match translator.encode(attribute.hla_type, &inputs, &attribute.parameters) {
                Ok(Some(bytes)) => {
                    values.insert(handle, bytes);
                }
                Ok(None) => {}
                Err(e) => log::warn!(
                    "Cannot encode attribute \"{}\" for actor {}: {}",
                    attribute.hla_name,
                    actor,
                    e
                ),
            }
        }

        Ok((class, values))
    }

    fn prepare_interaction(
        &self,
        message: &Message,
        mapping_id: InteractionMappingId,
    ) -> Result<(InteractionClassHandle, ParameterValues), GatewayError> {
        let mapping = self
            .registry
            .interaction(mapping_id)
            .ok_or_else(|| GatewayError::UnresolvedHandle(format!("mapping {}", mapping_id.0)))?;
        let class = mapping.class_handle.ok_or_else(|| {
            GatewayError::UnresolvedHandle(mapping.interaction_class_name.clone())
        })?;

        let translator = ParameterTranslator::new(&self.table);
        let mut values = ParameterValues::new();
        for parameter in &mapping.parameters {
            if parameter.invalid {
                continue;
            }
            let Some(handle) = parameter.handle else {
                continue;
            };
            let (inputs, send) = outbound_values(&parameter.parameters, message, false);
            if !send {
                continue;
            }
            match translator.encode(parameter.hla_type, &inputs, &parameter.parameters) {
                Ok(Some(bytes)) => {
                    values.insert(handle, bytes);
                }
                Ok(None) => {}
                Err(e) => log::warn!(
                    "Cannot encode parameter \"{}\" of {}: {}",
                    parameter.hla_name,
                    mapping.interaction_class_name,
                    e
                ),
            }
        }
        Ok((class, values))
    }

    fn resolve_handles(&mut self) {
        let Self {
            rti,
            registry,
            config,
            ..
        } = self;
        for mapping in registry.objects_mut() {
            resolve_object_handles(rti, config, mapping);
        }
        for mapping in registry.interactions_mut() {
            resolve_interaction_handles(rti, mapping);
        }
    }

    fn publish_subscribe(&mut self) -> Result<(), GatewayError> {
        let mut classes: BTreeMap<ObjectClassHandle, BTreeSet<AttributeHandle>> = BTreeMap::new();
        for (_, mapping) in self.registry.objects() {
            let Some(class) = mapping.class_handle else {
                continue;
            };
            let attributes = classes.entry(class).or_default();
            attributes.extend(mapping.entity_id_handle);
            attributes.extend(mapping.entity_type_handle);
            attributes.extend(
                mapping
                    .attributes
                    .iter()
                    .filter(|a| !a.invalid)
                    .filter_map(|a| a.handle),
            );
        }
        for (class, attributes) in &classes {
            let attributes: Vec<AttributeHandle> = attributes.iter().copied().collect();
            self.rti.publish_object_class(*class, &attributes)?;
            self.rti
                .subscribe_object_class_attributes(*class, &attributes)?;
        }

        let interactions: BTreeSet<InteractionClassHandle> = self
            .registry
            .interactions()
            .filter_map(|(_, m)| m.class_handle)
            .collect();
        for class in interactions {
            self.rti.publish_interaction_class(class)?;
            self.rti.subscribe_interaction_class(class)?;
        }

        log::debug!(
            "Published {} object classes, {} interaction classes",
            classes.len(),
            self.registry.interaction_count()
        );
        Ok(())
    }

    /// Picks the mapping for a discovered object from its entity type, or
    /// the class's plain mapping when no entity type was sent. An entity
    /// type nothing matches drops the object.
    fn resolve_mapping(
        &mut self,
        object: ObjectHandle,
        class: ObjectClassHandle,
        values: &AttributeValues,
    ) -> Option<ObjectMappingId> {
        let entity_type = self
            .registry
            .objects_for_class(class)
            .filter_map(|(_, m)| m.entity_type_handle)
            .find_map(|handle| values.get(&handle))
            .and_then(|bytes| match EntityType::from_bytes(bytes) {
                Ok(entity_type) if bytes.len() == EntityType::ENCODED_LENGTH => Some(entity_type),
                Ok(_) => {
                    log::warn!("Entity type of object {} has {} bytes", object.0, bytes.len());
                    None
                }
                Err(e) => {
                    log::warn!("Bad entity type on object {}: {}", object.0, e);
                    None
                }
            });

        let resolved = match entity_type {
            Some(entity_type) => {
                let best = self.registry.best_object_mapping(class, &entity_type);
                if best.is_none() {
                    log::info!(
                        "No mapping matches entity type \"{}\", dropping object {}",
                        entity_type,
                        object.0
                    );
                    self.table.remove_handle(object);
                    self.remote.remove(&object);
                }
                best
            }
            None => {
                let fallback = self.registry.default_object_mapping(class);
                if fallback.is_none() {
                    log::debug!("Object {} has no entity type yet, waiting", object.0);
                }
                fallback
            }
        }?;

        if !self.table.put_mapping(object, resolved) {
            log::warn!("Object {} could not be bound to mapping {}", object.0, resolved.0);
        }
        Some(resolved)
    }
}

impl<R: RtiAmbassador, S: MessageSink> FederateAmbassador for HlaGateway<R, S> {
    fn discover_object_instance(
        &mut self,
        object: ObjectHandle,
        class: ObjectClassHandle,
        name: &str,
    ) {
        if !self.registry.is_class_mapped(class) {
            log::debug!("Ignoring object {} of unmapped class {}", object.0, class.0);
            return;
        }

        let actor = self.sink.allocate_actor_id();
        if !self.table.put_handle(object, actor) {
            log::warn!("Object {} discovered twice", object.0);
            return;
        }
        if !name.is_empty() && !self.table.put_rti_id(name, actor) {
            log::warn!("RTI id \"{}\" is already mapped", name);
        }

        if !self.registry.class_has_entity_types(class) {
            if let Some(mapping) = self.registry.default_object_mapping(class) {
                self.table.put_mapping(object, mapping);
            }
        }

        self.remote.insert(
            object,
            RemoteObject {
                class,
                created: false,
            },
        );
        log::debug!("Discovered object {} \"{}\" as actor {}", object.0, name, actor);
    }

    fn reflect_attribute_values(&mut self, object: ObjectHandle, values: &AttributeValues, tag: &[u8]) {
        trace_tag(tag);

        let Some(actor) = self.table.get_id(object) else {
            log::trace!("Reflection for unknown object {}", object.0);
            return;
        };
        let Some(remote) = self.remote.get(&object).copied() else {
            return;
        };
        let mapping_id = match self.table.get_mapping(object) {
            Some(mapping_id) => mapping_id,
            None => match self.resolve_mapping(object, remote.class, values) {
                Some(mapping_id) => mapping_id,
                None => return,
            },
        };
        let Some(mapping) = self.registry.object(mapping_id) else {
            return;
        };

        let new_object = !remote.created;
        if new_object {
            let entity_id = mapping
                .entity_id_handle
                .and_then(|handle| values.get(&handle))
                .map(|bytes| EntityIdentifier::from_bytes(bytes).map(|id| (id, bytes.len())));
            match entity_id {
                Some(Ok((_, len))) if len != EntityIdentifier::ENCODED_LENGTH => log::error!(
                    "Bad entity id on object {}: {} bytes, expected {}",
                    object.0,
                    len,
                    EntityIdentifier::ENCODED_LENGTH
                ),
                Some(Ok((entity_id, _))) => {
                    if !self.table.put_entity_id(entity_id, actor) {
                        log::warn!("Entity id \"{}\" is already mapped", entity_id);
                    }
                }
                Some(Err(e)) => log::error!("Bad entity id on object {}: {}", object.0, e),
                None => {}
            }
        }

        let message_type = if new_object {
            MessageType::ActorCreated
        } else {
            MessageType::ActorUpdated
        };
        let mut message = Message::new(message_type)
            .about(actor)
            .with_actor_type(mapping.actor_type.clone());

        let translator = ParameterTranslator::new(&self.table);
        for attribute in &mapping.attributes {
            if attribute.invalid {
                continue;
            }
            match attribute.handle.and_then(|handle| values.get(&handle)) {
                Some(bytes) => {
                    match translator.decode(attribute.hla_type, bytes, &attribute.parameters) {
                        Ok(decoded) => apply_decoded(&attribute.parameters, decoded, &mut message),
                        Err(e) => log::error!(
                            "Skipping attribute \"{}\" of object {}: {}",
                            attribute.hla_name,
                            object.0,
                            e
                        ),
                    }
                }
                None => fill_defaults(&attribute.parameters, &mut message, new_object),
            }
        }
        message.about_actor_id = Some(actor);

        if let Some(remote) = self.remote.get_mut(&object) {
            remote.created = true;
        }
        self.sink.send(message);
    }

    fn remove_object_instance(&mut self, object: ObjectHandle, tag: &[u8]) {
        trace_tag(tag);
        self.remote.remove(&object);
        match self.table.remove_handle(object) {
            Some(actor) => {
                log::debug!("Removed object {}, deleting actor {}", object.0, actor);
                self.sink
                    .send(Message::new(MessageType::ActorDeleted).about(actor));
            }
            None => log::debug!("Remove for unknown object {}", object.0),
        }
    }

    fn receive_interaction(
        &mut self,
        class: InteractionClassHandle,
        values: &ParameterValues,
        tag: &[u8],
    ) {
        trace_tag(tag);
        let Some(mapping) = self
            .registry
            .interaction_for_class(class)
            .and_then(|id| self.registry.interaction(id))
        else {
            log::debug!("Ignoring unmapped interaction class {}", class.0);
            return;
        };

        let mut message = Message::new(mapping.message_type());
        let translator = ParameterTranslator::new(&self.table);
        for parameter in &mapping.parameters {
            if parameter.invalid {
                continue;
            }
            let Some(bytes) = parameter.handle.and_then(|handle| values.get(&handle)) else {
                continue;
            };
            match translator.decode(parameter.hla_type, bytes, &parameter.parameters) {
                Ok(decoded) => apply_decoded(&parameter.parameters, decoded, &mut message),
                Err(e) => log::error!(
                    "Skipping parameter \"{}\" of {}: {}",
                    parameter.hla_name,
                    mapping.interaction_class_name,
                    e
                ),
            }
        }
        self.sink.send(message);
    }
}

fn resolve_object_handles<R: RtiAmbassador>(
    rti: &R,
    config: &GatewayConfig,
    mapping: &mut ObjectToActor,
) {
    let class = match rti.object_class_handle(&mapping.object_class_name) {
        Ok(class) => class,
        Err(e) => {
            log::warn!("Object class \"{}\" is unusable: {}", mapping.object_class_name, e);
            mapping.class_handle = None;
            for attribute in &mut mapping.attributes {
                attribute.invalid = true;
            }
            return;
        }
    };
    mapping.class_handle = Some(class);

    let entity_id_name = mapping
        .entity_id_attribute
        .as_deref()
        .unwrap_or(config.entity_id_attribute.as_str());
    mapping.entity_id_handle = optional_attribute(rti, entity_id_name, class);
    let entity_type_name = mapping
        .entity_type_attribute
        .as_deref()
        .unwrap_or(config.entity_type_attribute.as_str());
    mapping.entity_type_handle = optional_attribute(rti, entity_type_name, class);

    for attribute in &mut mapping.attributes {
        match rti.attribute_handle(&attribute.hla_name, class) {
            Ok(handle) => {
                attribute.handle = Some(handle);
                attribute.invalid = false;
            }
            Err(e) => {
                log::warn!(
                    "Attribute \"{}\" of \"{}\" is unusable: {}",
                    attribute.hla_name,
                    mapping.object_class_name,
                    e
                );
                attribute.handle = None;
                attribute.invalid = true;
            }
        }
    }
}

fn resolve_interaction_handles<R: RtiAmbassador>(rti: &R, mapping: &mut InteractionToMessage) {
    let class = match rti.interaction_class_handle(&mapping.interaction_class_name) {
        Ok(class) => class,
        Err(e) => {
            log::warn!(
                "Interaction class \"{}\" is unusable: {}",
                mapping.interaction_class_name,
                e
            );
            mapping.class_handle = None;
            for parameter in &mut mapping.parameters {
                parameter.invalid = true;
            }
            return;
        }
    };
    mapping.class_handle = Some(class);

    for parameter in &mut mapping.parameters {
        match rti.parameter_handle(&parameter.hla_name, class) {
            Ok(handle) => {
                parameter.handle = Some(handle);
                parameter.invalid = false;
            }
            Err(e) => {
                log::warn!(
                    "Parameter \"{}\" of \"{}\" is unusable: {}",
                    parameter.hla_name,
                    mapping.interaction_class_name,
                    e
                );
                parameter.handle = None;
                parameter.invalid = true;
            }
        }
    }
}

fn optional_attribute<R: RtiAmbassador>(
    rti: &R,
    name: &str,
    class: ObjectClassHandle,
) -> Option<AttributeHandle> {
    if name.is_empty() {
        return None;
    }
    match rti.attribute_handle(name, class) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::debug!("No \"{}\" attribute on class {}: {}", name, class.0, e);
            None
        }
    }
}

/// Next entity number not already held by a discovered object.
fn allocate_entity_id(
    table: &IdentityTable,
    config: &GatewayConfig,
    next: &mut Option<u16>,
) -> Result<EntityIdentifier, GatewayError> {
    while let Some(number) = *next {
        *next = number.checked_add(1);
        let entity_id = EntityIdentifier::new(config.site_id, config.application_id, number);
        if table.get_id_by_entity_id(&entity_id).is_none() {
            return Ok(entity_id);
        }
        log::debug!("Entity id \"{}\" is taken, skipping it", entity_id);
    }
    Err(GatewayError::EntityIdsExhausted)
}

/// The actor id as text, suffixed when a discovered object already uses it.
fn unique_object_name(table: &IdentityTable, actor: ActorId) -> String {
    let base = actor.to_string();
    let mut name = base.clone();
    let mut suffix = 1u32;
    while table.get_id_by_rti_id(&name).is_some() {
        name = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    name
}

/// Values aligned with `definitions`, and whether anything in them is worth
/// sending. Message values always are; defaults only when `send_defaults`
/// or the definition is required for HLA.
fn outbound_values(
    definitions: &[ParameterDefinition],
    message: &Message,
    send_defaults: bool,
) -> (Vec<Option<PropertyValue>>, bool) {
    let mut send = false;
    let values = definitions
        .iter()
        .map(|def| {
            let value = if def.is_about_actor_id() {
                message.about_actor_id.map(PropertyValue::Actor)
            } else if def.is_sending_actor_id() {
                message.sending_actor_id.map(PropertyValue::Actor)
            } else {
                message.param(&def.game_name).cloned()
            };
            if value.is_some() {
                send = true;
                return value;
            }
            let default = def.default_value();
            if default.is_some() && (send_defaults || def.required_for_hla()) {
                send = true;
            }
            default
        })
        .collect();
    (values, send)
}

fn apply_decoded(
    definitions: &[ParameterDefinition],
    decoded: Vec<Option<PropertyValue>>,
    message: &mut Message,
) {
    for (def, value) in definitions.iter().zip(decoded) {
        let Some(value) = value else {
            continue;
        };
        match value {
            PropertyValue::Actor(id) if def.is_about_actor_id() => message.about_actor_id = Some(id),
            PropertyValue::Actor(id) if def.is_sending_actor_id() => {
                message.sending_actor_id = Some(id)
            }
            value => message.set_param(def.game_name.clone(), value),
        }
    }
}

fn fill_defaults(definitions: &[ParameterDefinition], message: &mut Message, new_object: bool) {
    for def in definitions {
        if def.is_special() || !(new_object || def.required_for_game()) {
            continue;
        }
        if let Some(value) = def.default_value() {
            message.set_param(def.game_name.clone(), value);
        }
    }
}

fn trace_tag(tag: &[u8]) {
    if tag.len() == Tag::ENCODED_LENGTH && log::log_enabled!(log::Level::Trace) {
        match Tag::from_bytes(tag) {
            Ok(Tag(time)) => log::trace!("Tagged at sim time {:.3}", time),
            Err(e) => log::trace!("Unreadable tag: {}", e),
        }
    }
}
