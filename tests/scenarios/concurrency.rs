use std::sync::Arc;
use std::thread;

use reflectrs::{InstanceMut, Type, TypeRegistry};

use crate::common::{self, PlayerFighters, SuperGuy};

#[test]
fn racing_registrations_agree_on_one_descriptor() {
    let registry = Arc::new(TypeRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get::<Vec<Box<PlayerFighters>>>())
        })
        .collect();
    let types: Vec<Type> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread finishes"))
        .collect();
    assert!(
        types.windows(2).all(|pair| pair[0] == pair[1]),
        "every thread must observe the same descriptor"
    );
    let names: Vec<String> = registry.types().iter().map(|ty| ty.name().to_string()).collect();
    assert_eq!(
        names,
        vec!["PlayerFighters", "Box<PlayerFighters>", "Vec<Box<PlayerFighters>>"],
        "elements register before their containers"
    );
}

#[test]
fn sealed_structures_are_shared_across_threads() {
    let registry = common::registry();
    let handles: Vec<_> = (0..4)
        .map(|step| {
            thread::spawn(move || {
                let mut guy = SuperGuy::default();
                let structure = registry
                    .get::<SuperGuy>()
                    .require_structure()
                    .expect("SuperGuy is sealed");
                let jumped: f32 = structure.invoke(
                    InstanceMut::new(registry, &mut guy),
                    "DoJump",
                    &(step as f32, String::new()),
                );
                jumped
            })
        })
        .collect();
    let results: Vec<f32> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread finishes"))
        .collect();
    assert_eq!(results, vec![0.0, 1.0, 2.0, 3.0]);
}
