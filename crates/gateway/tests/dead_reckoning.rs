use fedgate::actor::{ActorId, ActorStore, ActorType, Message, MessageSink, MessageType, PropertyValue};
use fedgate::codec::{ArticulatedParameter, ArticulatedParts, ArticulatedTypeMetric, ParameterValue};
use fedgate::config::DeadReckoningConfig;
use fedgate::dead_reckoning::{
    ARTICULATED_PARAMETERS, DEAD_RECKONING_ALGORITHM, DeadReckoningAlgorithm,
    DeadReckoningComponent, DeadReckoningHelper, FlatGround, GROUND_CLAMP_TYPE, GROUND_OFFSET,
    LAST_KNOWN_TRANSLATION, VELOCITY_VECTOR,
};
use glam::Vec3;

fn remote_tank(store: &mut ActorStore) -> ActorId {
    let id = store.allocate_actor_id();
    store.send(
        Message::new(MessageType::ActorCreated)
            .about(id)
            .with_actor_type(ActorType::new("Vehicles", "Tank")),
    );
    store.process_messages();
    id
}

fn registered(store: &mut ActorStore, dr: &mut DeadReckoningComponent) -> ActorId {
    let id = remote_tank(store);
    dr.register_actor(id, DeadReckoningHelper::new(), store).unwrap();
    id
}

fn azimuth(class: u32, value: f32) -> ArticulatedParameter {
    ArticulatedParameter {
        change: 0,
        part_attached_to: 0,
        value: ParameterValue::Articulated(ArticulatedParts::new(
            class,
            ArticulatedTypeMetric::Azimuth,
            value,
        )),
    }
}

fn close(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).length() < tolerance
}

#[test]
fn static_update_places_the_actor() {
    let mut store = ActorStore::default();
    let mut dr = DeadReckoningComponent::default();
    let id = registered(&mut store, &mut dr);

    let update = Message::new(MessageType::ActorUpdated)
        .about(id)
        .with_param(LAST_KNOWN_TRANSLATION, PropertyValue::Vec3(Vec3::new(1.0, 1.2, 1.3)));
    dr.process_message(&update, &mut store);
    assert!(dr.helper(id).unwrap().is_updated());

    dr.process_message(&Message::tick(MessageType::TickRemote, 0.1, 1.0), &mut store);
    let xform = store.get(id).unwrap().transform;
    assert!(close(xform.translation, Vec3::new(1.0, 1.2, 1.3), 1e-2));
    assert!(!dr.helper(id).unwrap().is_updated());
}

#[test]
fn velocity_update_extrapolates_across_ticks() {
    let mut store = ActorStore::default();
    let mut dr = DeadReckoningComponent::default();
    let id = registered(&mut store, &mut dr);

    let update = Message::new(MessageType::ActorUpdated)
        .about(id)
        .with_param(DEAD_RECKONING_ALGORITHM, PropertyValue::String("Velocity Only".into()))
        .with_param(GROUND_CLAMP_TYPE, PropertyValue::String("None".into()))
        .with_param(LAST_KNOWN_TRANSLATION, PropertyValue::Vec3(Vec3::ZERO))
        .with_param(VELOCITY_VECTOR, PropertyValue::Vec3(Vec3::new(10.0, 0.0, 0.0)));
    dr.process_message(&update, &mut store);
    assert_eq!(
        dr.helper(id).unwrap().algorithm(),
        DeadReckoningAlgorithm::VelocityOnly
    );

    dr.process_message(&Message::tick(MessageType::TickRemote, 0.5, 1.0), &mut store);
    let first = store.get(id).unwrap().transform.translation;
    assert!(close(first, Vec3::new(5.0, 0.0, 0.0), 1e-3), "{first}");

    dr.process_message(&Message::tick(MessageType::TickRemote, 0.5, 1.5), &mut store);
    let second = store.get(id).unwrap().transform.translation;
    assert!(close(second, Vec3::new(10.0, 0.0, 0.0), 1e-3), "{second}");
}

#[test]
fn keep_above_lifts_sunken_actors() {
    let mut store = ActorStore::default();
    let mut dr = DeadReckoningComponent::default();
    dr.set_terrain(FlatGround { height: 5.0 });
    let low = registered(&mut store, &mut dr);
    let high = registered(&mut store, &mut dr);

    for (id, z) in [(low, 1.0), (high, 20.0)] {
        let update = Message::new(MessageType::ActorUpdated)
            .about(id)
            .with_param(GROUND_OFFSET, PropertyValue::Float(0.25))
            .with_param(LAST_KNOWN_TRANSLATION, PropertyValue::Vec3(Vec3::new(0.0, 0.0, z)));
        dr.process_message(&update, &mut store);
    }
    dr.tick_remote(0.1, 1.0, &mut store);

    assert_eq!(store.get(low).unwrap().transform.translation.z, 5.25);
    assert_eq!(store.get(high).unwrap().transform.translation.z, 20.0);
}

#[test]
fn articulations_turn_the_turret() {
    let mut store = ActorStore::default();
    let mut dr = DeadReckoningComponent::new(DeadReckoningConfig {
        articulation_smooth_time: 1.0,
        articulation_period: 1.0,
        ..DeadReckoningConfig::default()
    });
    let id = registered(&mut store, &mut dr);

    let turret = |value: f32| {
        Message::new(MessageType::ActorUpdated).about(id).with_param(
            ARTICULATED_PARAMETERS,
            PropertyValue::Articulations(vec![azimuth(4096, value)]),
        )
    };

    dr.process_message(&turret(1.0), &mut store);
    dr.tick_remote(0.25, 1.0, &mut store);
    let dof = store.get(id).unwrap().dofs["dof_turret_01"];
    assert!(close(dof, Vec3::new(1.0, 0.0, 0.0), 1e-5), "{dof}");

    dr.process_message(&turret(2.0), &mut store);
    dr.tick_remote(0.25, 1.25, &mut store);
    let dof = store.get(id).unwrap().dofs["dof_turret_01"];
    assert!(close(dof, Vec3::new(1.25, 0.0, 0.0), 1e-4), "{dof}");

    // Unmapped classes are ignored.
    dr.process_message(
        &Message::new(MessageType::ActorUpdated).about(id).with_param(
            ARTICULATED_PARAMETERS,
            PropertyValue::Articulations(vec![azimuth(9999, 3.0)]),
        ),
        &mut store,
    );
    assert!(dr.helper(id).unwrap().dof_stops("dof_turret_01").is_some());
    assert_eq!(store.get(id).unwrap().dofs.len(), 1);
}

#[test]
fn six_stops_collapse_after_one_tick() {
    let mut store = ActorStore::default();
    let mut dr = DeadReckoningComponent::default();
    let id = remote_tank(&mut store);

    let mut helper = DeadReckoningHelper::new();
    for step in 0..6 {
        helper.add_dof("dof_gun_01", Vec3::new(0.1 * step as f32, 0.0, 0.0), Vec3::ZERO, "Azimuth");
    }
    assert_eq!(helper.dof_stop_count(), 6);
    dr.register_actor(id, helper, &mut store).unwrap();

    dr.tick_remote(0.1, 1.0, &mut store);
    assert_eq!(dr.helper(id).unwrap().dof_stops("dof_gun_01").unwrap().len(), 2);

    for _ in 0..20 {
        dr.tick_remote(0.1, 1.0, &mut store);
        assert!(dr.helper(id).unwrap().dof_stop_count() <= 2);
    }
    assert_eq!(dr.helper(id).unwrap().dof_stop_count(), 1);
}

#[test]
fn unloading_drops_every_helper() {
    let mut store = ActorStore::default();
    let mut dr = DeadReckoningComponent::default();
    let first = registered(&mut store, &mut dr);
    registered(&mut store, &mut dr);
    dr.set_eye_point_actor(Some(first));
    assert_eq!(dr.len(), 2);

    dr.process_message(&Message::new(MessageType::ActorDeleted).about(first), &mut store);
    assert_eq!(dr.len(), 1);
    assert_eq!(dr.eye_point_actor(), None);

    dr.process_message(&Message::new(MessageType::MapUnloaded), &mut store);
    assert!(dr.is_empty());
}
