use reflectrs::{EnumValue, Instance, InstanceMut, ReflectError};

use crate::common::{self, Faction, Leaf, LeafRecorder, SuperGuy};

fn faction_property() -> &'static reflectrs::PropertyDescriptor {
    common::registry()
        .get::<SuperGuy>()
        .descriptor()
        .require_structure()
        .expect("SuperGuy is sealed")
        .find_property("faction")
        .expect("faction exists")
}

#[test]
fn registered_values_dump_their_label() {
    let registry = common::registry();
    let guy = SuperGuy {
        faction: Faction::GOOD_GUY,
        ..SuperGuy::default()
    };
    let property = faction_property();
    let text = property
        .debug_dump(Instance::new(registry, &guy), 0)
        .expect("dump succeeds");
    assert!(text.contains("Enum: GoodGuy"), "{text}");
    assert_eq!(property.enum_label(Instance::new(registry, &guy)), Ok("GoodGuy"));
}

#[test]
fn unregistered_values_stay_explicit() {
    // 99 has no label; visits report it raw and typed reads refuse it
    let registry = common::registry();
    let guy = SuperGuy {
        faction: Faction(99),
        ..SuperGuy::default()
    };
    let property = faction_property();
    assert_eq!(
        property.enum_value(Instance::new(registry, &guy)),
        Ok(EnumValue::Unknown(99))
    );
    assert_eq!(
        property.enum_label(Instance::new(registry, &guy)),
        Err(ReflectError::UnknownEnumValue {
            ty: "Faction".into(),
            value: 99
        })
    );
    let mut recorder = LeafRecorder::default();
    property
        .visit(Instance::new(registry, &guy), &mut recorder)
        .expect("unknown values do not fail the visit");
    assert_eq!(recorder.leaves, vec![Leaf::Enum(None, 99)]);
    let text = property
        .debug_dump(Instance::new(registry, &guy), 0)
        .expect("dump succeeds");
    assert!(text.contains("Enum: <unknown 99>"), "{text}");
}

#[test]
fn labels_write_the_registered_value() {
    let registry = common::registry();
    let mut guy = SuperGuy::default();
    let property = faction_property();
    property
        .set_enum_by_name(InstanceMut::new(registry, &mut guy), "Unknown")
        .expect("Unknown is a registered label");
    assert_eq!(guy.faction, Faction::UNKNOWN);
    assert!(matches!(
        property.set_enum_by_name(InstanceMut::new(registry, &mut guy), "Neutral"),
        Err(ReflectError::UnknownEnumName { .. })
    ));
    assert_eq!(guy.faction, Faction::UNKNOWN, "a failed write leaves the field alone");
}
