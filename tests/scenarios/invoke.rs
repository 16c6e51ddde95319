use reflectrs::{InstanceMut, ReflectError};

use crate::common::{self, GuyTest, PlayerFighters, SuperGuy};

fn super_guy() -> &'static reflectrs::StructureDescriptor {
    common::registry()
        .get::<SuperGuy>()
        .descriptor()
        .require_structure()
        .expect("SuperGuy is sealed")
}

#[test]
fn inherited_methods_run_on_the_embedded_base() {
    let registry = common::registry();
    let mut guy = SuperGuy::default();
    guy.guy.x = 1.0;
    let jumped: f32 = super_guy().invoke(
        InstanceMut::new(registry, &mut guy),
        "DoJump",
        &(2.5f32, String::from("Test")),
    );
    assert_eq!(jumped, 3.5);
    assert_eq!(guy.guy.x, 3.5, "the instance itself is mutated");
}

#[test]
fn mismatched_calls_fall_back_to_default() {
    let registry = common::registry();
    let mut guy = SuperGuy::default();
    let jumped: f32 = super_guy().invoke(
        InstanceMut::new(registry, &mut guy),
        "DoJump",
        &(2.5f64, String::from("Test")),
    );
    assert_eq!(jumped, 0.0, "f64 is not convertible to f32");
    let err = super_guy()
        .try_invoke::<i32, _>(
            InstanceMut::new(registry, &mut guy),
            "DoJump",
            &(2.5f32, String::from("Test")),
        )
        .unwrap_err();
    assert_eq!(
        err,
        ReflectError::NoMatchingMethod {
            ty: "SuperGuy".into(),
            name: "DoJump".into()
        },
        "return types must match exactly"
    );
    assert_eq!(guy.guy.x, 0.0, "no candidate ran");
}

#[test]
fn references_are_read_through() {
    let registry = common::registry();
    let mut guy = common::sample_guy();
    let greeting: &'static String = Box::leak(Box::new(String::from("hello")));
    let greeted: String = super_guy().invoke(InstanceMut::new(registry, &mut guy), "Greet", &(greeting,));
    assert_eq!(greeted, "hello yoyoyo");
}

#[test]
fn pointer_arguments_upcast_to_the_parameter_class() {
    // a *const SuperGuy lands on its embedded GuyTest before CopyX reads it
    let registry = common::registry();
    let source = SuperGuy {
        guy: GuyTest {
            x: 7.0,
            ..GuyTest::default()
        },
        ..SuperGuy::default()
    };
    let mut target = SuperGuy::default();
    let pointer: *const SuperGuy = &source;
    let copied: f32 = super_guy().invoke(InstanceMut::new(registry, &mut target), "CopyX", &(pointer,));
    assert_eq!(copied, 7.0);
    assert_eq!(target.guy.x, 7.0);

    let unrelated: *const PlayerFighters = std::ptr::null();
    let outcome = super_guy().try_invoke::<f32, _>(
        InstanceMut::new(registry, &mut target),
        "CopyX",
        &(unrelated,),
    );
    assert!(outcome.is_err(), "unrelated pointees never convert");
}

#[test]
fn unit_requests_discard_the_result() {
    let registry = common::registry();
    let mut guy = SuperGuy::default();
    let outcome: Result<(), _> = super_guy().try_invoke(
        InstanceMut::new(registry, &mut guy),
        "DoJump",
        &(1.0f32, String::new()),
    );
    assert_eq!(outcome, Ok(()));
    assert_eq!(guy.guy.x, 1.0);
}

#[test]
fn constructors_allocate_instances() {
    let registry = common::registry();
    let structure = registry
        .get::<PlayerFighters>()
        .require_structure()
        .expect("PlayerFighters is sealed");
    let built: Box<PlayerFighters> = structure
        .invoke_constructor(registry, &(String::from("JOJO"), 12.23f32))
        .expect("constructor matches");
    assert_eq!(built.name, "JOJO");
    assert_eq!(built.health, 12.23);
    assert!(
        structure
            .invoke_constructor::<Box<PlayerFighters>, _>(registry, &(12.23f32,))
            .is_none(),
        "arity must match"
    );
    assert_eq!(
        structure.try_invoke_constructor::<Box<PlayerFighters>, _>(registry, &()),
        Err(ReflectError::NoMatchingConstructor {
            ty: "PlayerFighters".into()
        })
    );
}

#[test]
fn factories_build_defaults_for_growth() {
    let registry = common::registry();
    let mut guy = SuperGuy::default();
    let players = super_guy().find_property("Players").expect("Players exists");
    let err = players
        .resize_array(InstanceMut::new(registry, &mut guy), 1)
        .unwrap_err();
    assert_eq!(
        err,
        ReflectError::NotConstructible {
            ty: "Box<PlayerFighters>".into()
        },
        "boxes have no default factory"
    );
    assert!(guy.players.is_empty(), "failed growth leaves the array untouched");
    let stamps = super_guy().find_property("timeStamps").expect("inherited array");
    stamps
        .resize_array(InstanceMut::new(registry, &mut guy), 3)
        .expect("i32 has a factory");
    assert_eq!(guy.guy.time_stamps, vec![0, 0, 0]);
}
