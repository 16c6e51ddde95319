use reflectrs::Instance;

use crate::common::{self, GuyTest, LeafRecorder, PlayerData, SuperGuy};

#[test]
fn derived_properties_come_before_base_properties() {
    let registry = common::registry();
    let guy = common::sample_guy();
    let mut recorder = LeafRecorder::default();
    registry
        .get::<SuperGuy>()
        .require_structure()
        .expect("SuperGuy is sealed")
        .visit(Instance::new(registry, &guy), &mut recorder)
        .expect("visit succeeds");
    let own = recorder
        .properties
        .iter()
        .position(|name| name == "health")
        .expect("own property visited");
    let inherited = recorder
        .properties
        .iter()
        .position(|name| name == "X")
        .expect("inherited property visited");
    assert!(own < inherited, "derived-before-base: {:?}", recorder.properties);
}

#[test]
fn derivation_is_reflexive_and_one_way() {
    let registry = common::registry();
    let guy = registry.get::<SuperGuy>();
    let base = registry.get::<GuyTest>();
    assert!(registry.is_derived_from(guy, guy));
    assert!(registry.is_derived_from(guy, base));
    assert!(!registry.is_derived_from(base, guy));
    assert!(!registry.is_derived_from(guy, registry.get::<PlayerData>()));
    assert_eq!(guy.base_offset(base), Some(std::mem::offset_of!(SuperGuy, guy)));
}

#[test]
fn names_resolve_after_registration() {
    let registry = common::registry();
    assert_eq!(registry.get_by_name("SuperGuy"), Some(registry.get::<SuperGuy>()));
    assert!(registry.get_by_name("Vec<Box<PlayerFighters>>").is_some());
    assert!(registry.get_by_name("NeverRegistered").is_none());
}

#[test]
fn schema_listing_names_the_parent() {
    let registry = common::registry();
    let schema = reflectrs::describe_schema(registry.get::<SuperGuy>()).to_string();
    assert!(schema.contains("parent GuyTest"), "{schema}");
    assert!(schema.contains("fn CopyX(*const GuyTest) -> f32"), "{schema}");
}
