use std::mem::offset_of;

use reflectrs::{Instance, InstanceMut, NumericValue, PropertyWalker};

use crate::common::{self, Leaf, LeafRecorder, PlayerFighters, SuperGuy};

#[test]
fn pair_visit_reports_leaves_in_declaration_order() {
    let registry = common::registry();
    let pair = PlayerFighters {
        name: "JOJO".into(),
        health: 12.23,
    };
    let mut recorder = LeafRecorder::default();
    registry
        .get::<PlayerFighters>()
        .require_structure()
        .expect("PlayerFighters is sealed")
        .visit(Instance::new(registry, &pair), &mut recorder)
        .expect("visit succeeds");
    assert_eq!(
        recorder.leaves,
        vec![
            Leaf::Str("JOJO".into()),
            Leaf::Number(NumericValue::F32(12.23))
        ],
        "exactly one callback per property, name before health"
    );
}

#[test]
fn typed_access_writes_through_offsets() {
    let registry = common::registry();
    let mut pair = PlayerFighters::default();
    let structure = registry
        .get::<PlayerFighters>()
        .require_structure()
        .expect("PlayerFighters is sealed");
    structure
        .find_property("name")
        .expect("name exists")
        .set(InstanceMut::new(registry, &mut pair), String::from("James"))
        .expect("String matches");
    *structure
        .find_property("health")
        .expect("health exists")
        .value_mut::<f32>(InstanceMut::new(registry, &mut pair))
        .expect("f32 matches") = 0.5;
    assert_eq!(
        pair,
        PlayerFighters {
            name: "James".into(),
            health: 0.5
        }
    );
}

#[test]
fn super_guy_dump_lists_properties_in_order() {
    let registry = common::registry();
    let guy = common::sample_guy();
    let text = registry
        .get::<SuperGuy>()
        .require_structure()
        .expect("SuperGuy is sealed")
        .dump(Instance::new(registry, &guy), 0)
        .expect("dump succeeds");
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    let top_level: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.strip_prefix("NAME: "))
        .filter_map(|rest| rest.split(' ').next())
        .collect();
    assert_eq!(
        top_level,
        [
            "health",
            "data",
            "HitMe",
            "Players",
            "faction",
            "sidekick",
            "playerCount",
            "X",
            "timeStamps",
            "GuyName"
        ],
        "own properties first, then GuyTest's"
    );

    let players_at = lines
        .iter()
        .position(|line| line.starts_with("NAME: Players "))
        .expect("Players is dumped");
    let name_offset = offset_of!(PlayerFighters, name);
    let health_offset = offset_of!(PlayerFighters, health);
    let expected = [
        format!("NAME: Players OFFSET: {}", offset_of!(SuperGuy, players)),
        "  ARRAY: size: 2".to_string(),
        "    IDX: 0".to_string(),
        "      STRUCT: PlayerFighters".to_string(),
        format!("        NAME: name OFFSET: {name_offset}"),
        "          String: JOJO".to_string(),
        format!("        NAME: health OFFSET: {health_offset}"),
        "          Number: 12.23".to_string(),
        "    IDX: 1".to_string(),
        "      STRUCT: PlayerFighters".to_string(),
        format!("        NAME: name OFFSET: {name_offset}"),
        "          String: James".to_string(),
        format!("        NAME: health OFFSET: {health_offset}"),
        "          Number: 0.123".to_string(),
        format!("NAME: faction OFFSET: {}", offset_of!(SuperGuy, faction)),
        "  Enum: GoodGuy".to_string(),
    ];
    assert_eq!(
        &lines[players_at..players_at + expected.len()],
        expected.as_slice(),
        "each index is followed by its own element:\n{text}"
    );
    assert!(lines.contains(&"NAME: playerCount COMPUTED".to_string()), "{text}");
}

#[test]
fn log_out_emits_the_dump_line_by_line() {
    let registry = common::registry();
    let guy = common::sample_guy();
    let structure = registry
        .get::<SuperGuy>()
        .require_structure()
        .expect("SuperGuy is sealed");
    let dumped = structure
        .dump(Instance::new(registry, &guy), 1)
        .expect("dump succeeds");
    let logged = common::capture_logs(|| {
        structure
            .log_out(Instance::new(registry, &guy), 1)
            .expect("log_out succeeds");
    });
    let dumped: Vec<&str> = dumped.lines().collect();
    assert_eq!(logged.len(), dumped.len(), "one event per dump line:\n{logged:#?}");
    for (event, line) in logged.iter().zip(&dumped) {
        assert!(event.contains(line.trim()), "`{event}` should carry `{line}`");
    }
    let health = logged
        .iter()
        .position(|event| event.contains("NAME: health"))
        .expect("health is logged");
    let x = logged
        .iter()
        .position(|event| event.contains("NAME: X "))
        .expect("X is logged");
    assert!(health < x, "derived properties are logged before GuyTest's");
}

#[test]
fn static_walk_lists_nested_paths() {
    let registry = common::registry();
    let structure = registry
        .get::<SuperGuy>()
        .require_structure()
        .expect("SuperGuy is sealed");
    let paths: Vec<String> = PropertyWalker::new(structure)
        .map(|entry| entry.path.to_string())
        .collect();
    assert!(paths.iter().any(|path| path == "data.TAG"), "{paths:?}");
    assert!(paths.iter().any(|path| path == "GuyName"), "inherited members are walked");
}
