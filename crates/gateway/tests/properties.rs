use fedgate::actor::ActorId;
use fedgate::codec::{
    ArticulatedParameter, ArticulatedParts, AttachedParts, EntityIdentifier, EntityType,
    EulerAngles, ParameterValue, Tag, VelocityVector, WireValue, WorldCoordinate,
};
use fedgate::mapping::IdentityTable;
use fedgate::rti::ObjectHandle;
use glam::{DVec3, Vec3};
use proptest::prelude::*;

fn entity_id_strategy() -> impl Strategy<Value = EntityIdentifier> {
    (any::<u16>(), any::<u16>(), any::<u16>()).prop_map(|(s, a, e)| EntityIdentifier::new(s, a, e))
}

fn entity_type_strategy() -> impl Strategy<Value = EntityType> {
    (
        0u8..4,
        0u8..4,
        prop_oneof![Just(0u16), Just(225u16), Just(222u16)],
        0u8..4,
        0u8..4,
        0u8..4,
        0u8..4,
    )
        .prop_map(|(k, d, c, cat, sub, spec, extra)| EntityType::new(k, d, c, cat, sub, spec, extra))
}

fn vec3_strategy() -> impl Strategy<Value = Vec3> {
    (-1e6f32..1e6, -1e6f32..1e6, -1e6f32..1e6).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn parameter_strategy() -> impl Strategy<Value = ArticulatedParameter> {
    let articulated = (any::<u32>(), 1u32..=16, -1e3f32..1e3)
        .prop_map(|(class, metric, value)| {
            ParameterValue::Articulated(ArticulatedParts {
                class,
                type_metric: metric,
                value,
            })
        });
    let attached = (any::<u32>(), entity_type_strategy()).prop_map(|(station, store_type)| {
        ParameterValue::Attached(AttachedParts { station, store_type })
    });
    (any::<u8>(), any::<u16>(), prop_oneof![articulated, attached]).prop_map(
        |(change, part_attached_to, value)| ArticulatedParameter {
            change,
            part_attached_to,
            value,
        },
    )
}

proptest! {
    #[test]
    fn prop_entity_identifier_round_trips(id in entity_id_strategy()) {
        let bytes = id.to_bytes();
        prop_assert_eq!(bytes.len(), EntityIdentifier::ENCODED_LENGTH);
        prop_assert_eq!(EntityIdentifier::from_bytes(&bytes).unwrap(), id);
    }

    #[test]
    fn prop_entity_type_round_trips(et in entity_type_strategy()) {
        prop_assert_eq!(EntityType::from_bytes(&et.to_bytes()).unwrap(), et);
        prop_assert_eq!(et.to_string().parse::<EntityType>().unwrap(), et);
    }

    #[test]
    fn prop_kinematics_round_trip(
        v in vec3_strategy(),
        x in -1e9f64..1e9,
        y in -1e9f64..1e9,
        z in -1e9f64..1e9,
    ) {
        let world = WorldCoordinate(DVec3::new(x, y, z));
        prop_assert_eq!(WorldCoordinate::from_bytes(&world.to_bytes()).unwrap(), world);
        let angles = EulerAngles::from(v);
        prop_assert_eq!(EulerAngles::from_bytes(&angles.to_bytes()).unwrap(), angles);
        let velocity = VelocityVector(v);
        prop_assert_eq!(VelocityVector::from_bytes(&velocity.to_bytes()).unwrap(), velocity);
    }

    #[test]
    fn prop_articulated_parameter_round_trips(parameter in parameter_strategy()) {
        let bytes = parameter.to_bytes();
        prop_assert_eq!(bytes.len(), ArticulatedParameter::ENCODED_LENGTH);
        prop_assert_eq!(ArticulatedParameter::from_bytes(&bytes).unwrap(), parameter);
    }

    #[test]
    fn prop_tag_round_trips(time in -1e12f64..1e12) {
        prop_assert_eq!(Tag::from_bytes(&Tag(time).to_bytes()).unwrap(), Tag(time));
    }

    #[test]
    fn prop_rank_match_is_commutative(a in entity_type_strategy(), b in entity_type_strategy()) {
        prop_assert_eq!(a.rank_match(&b), b.rank_match(&a));
    }

    #[test]
    fn prop_rank_match_rejects_conflicting_fields(
        a in entity_type_strategy(),
        kind in 1u8..4,
    ) {
        let mut b = a;
        b.kind = if a.kind == kind { kind % 3 + 1 } else { kind };
        prop_assume!(a.kind != 0 && b.kind != 0 && a.kind != b.kind);
        prop_assert_eq!(a.rank_match(&b), -1);
    }

    #[test]
    fn prop_put_rejects_a_second_actor(handle in any::<u32>(), first in 1u64..1000, second in 1000u64..2000) {
        let mut table = IdentityTable::new();
        prop_assert!(table.put_handle(ObjectHandle(handle), ActorId(first)));
        prop_assert!(!table.put_handle(ObjectHandle(handle), ActorId(second)));
        prop_assert_eq!(table.get_id(ObjectHandle(handle)), Some(ActorId(first)));
    }

    #[test]
    fn prop_entity_id_put_rejects_a_second_actor(
        id in entity_id_strategy(),
        first in 1u64..1000,
        second in 1000u64..2000,
    ) {
        let mut table = IdentityTable::new();
        prop_assert!(table.put_entity_id(id, ActorId(first)));
        prop_assert!(!table.put_entity_id(id, ActorId(second)));
        prop_assert_eq!(table.get_id_by_entity_id(&id), Some(ActorId(first)));
    }

    #[test]
    fn prop_remove_is_idempotent(handles in proptest::collection::btree_set(any::<u32>(), 1..8), pick in any::<prop::sample::Index>()) {
        let handles: Vec<u32> = handles.into_iter().collect();
        let mut table = IdentityTable::new();
        for (i, handle) in handles.iter().enumerate() {
            table.put_handle(ObjectHandle(*handle), ActorId(i as u64 + 1));
        }
        let target = ObjectHandle(handles[pick.index(handles.len())]);

        table.remove_handle(target);
        let once: Vec<_> = table.iter().map(|(id, object)| (id, object.clone())).collect();
        prop_assert!(table.remove_handle(target).is_none());
        let twice: Vec<_> = table.iter().map(|(id, object)| (id, object.clone())).collect();
        prop_assert_eq!(once, twice);
        prop_assert!(table.get_id(target).is_none());
    }
}

#[test]
fn entity_identifier_scenario() {
    let id = EntityIdentifier::new(3, 3, 1);
    let decoded = EntityIdentifier::from_bytes(&id.to_bytes()).unwrap();
    assert_eq!(decoded, id);

    let mut table = IdentityTable::new();
    let handle = ObjectHandle(12);
    assert!(table.put_handle(handle, ActorId(1)));
    assert!(table.put_entity_id(decoded, ActorId(1)));
    assert_eq!(table.get_id(handle), Some(ActorId(1)));
    assert_eq!(table.get_entity_id(ActorId(1)), Some(id));

    assert_eq!(table.remove_handle(handle), Some(ActorId(1)));
    assert_eq!(table.get_id(handle), None);
    assert_eq!(table.get_id_by_entity_id(&id), None);
}
