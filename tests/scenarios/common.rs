//! Game-object fixtures shared by the scenario tests.

use std::io;
use std::sync::{Arc, Once};

use parking_lot::Mutex;
use reflectrs::{
    EnumValue, NumericValue, Object, PropertyDescriptor, PropertyVisitor, ReflectEnum,
    ReflectResult, TypeInfo, TypeRegistry, field, reflect_struct,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerData {
    pub guid: i32,
    pub tag: String,
}

reflect_struct!(PlayerData as "PlayerData");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerFighters {
    pub name: String,
    pub health: f32,
}

reflect_struct!(PlayerFighters as "PlayerFighters");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuyTest {
    pub x: f32,
    pub time_stamps: Vec<i32>,
    pub guy_name: String,
}

impl GuyTest {
    pub fn do_jump(&mut self, how_high: f32, _test_out: String) -> f32 {
        self.x += how_high;
        self.x
    }
}

reflect_struct!(GuyTest as "GuyTest");

/// Open enum: any `u8` is representable, only three values are named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Faction(pub u8);

impl Faction {
    pub const BAD_GUY: Faction = Faction(0);
    pub const GOOD_GUY: Faction = Faction(1);
    pub const UNKNOWN: Faction = Faction(2);
}

// SAFETY: `repr(transparent)` over `u8`, so the discriminant is the whole value.
unsafe impl reflectrs::Reflect for Faction {
    fn type_info(_registry: &TypeRegistry) -> TypeInfo {
        TypeInfo::enumeration_repr::<Faction, u8>("Faction")
    }
}

// SAFETY: `to_raw` returns the stored byte.
unsafe impl ReflectEnum for Faction {
    fn to_raw(self) -> i64 {
        i64::from(self.0)
    }
}

pub struct SuperGuy {
    pub guy: GuyTest,
    pub health: i32,
    pub data: PlayerData,
    pub hit_me: Box<String>,
    pub players: Vec<Box<PlayerFighters>>,
    pub faction: Faction,
    pub sidekick: Box<dyn Object>,
}

impl Default for SuperGuy {
    fn default() -> Self {
        Self {
            guy: GuyTest::default(),
            health: 0,
            data: PlayerData::default(),
            hit_me: Box::default(),
            players: Vec::new(),
            faction: Faction::BAD_GUY,
            sidekick: Box::new(PlayerData::default()),
        }
    }
}

reflect_struct!(SuperGuy as "SuperGuy" : GuyTest => guy);

pub fn register_game(registry: &TypeRegistry) -> ReflectResult<()> {
    registry
        .enumeration::<Faction>()
        .value(Faction::BAD_GUY, "BadGuy")
        .value(Faction::GOOD_GUY, "GoodGuy")
        .value(Faction::UNKNOWN, "Unknown")
        .finish()?;

    registry
        .class::<PlayerFighters>()
        .property("name", field!(PlayerFighters, name))
        .property("health", field!(PlayerFighters, health))
        .constructor(|name: String, health: f32| PlayerFighters { name, health })
        .default_factory()
        .finish()?;

    registry
        .class::<PlayerData>()
        .property("GUID", field!(PlayerData, guid))
        .property("TAG", field!(PlayerData, tag))
        .default_factory()
        .finish()?;

    registry
        .class::<GuyTest>()
        .property("X", field!(GuyTest, x))
        .property("timeStamps", field!(GuyTest, time_stamps))
        .property("GuyName", field!(GuyTest, guy_name))
        .method("DoJump", |guy: &mut GuyTest, how_high: f32, test_out: String| {
            guy.do_jump(how_high, test_out)
        })
        .method("Greet", |guy: &GuyTest, greeting: String| {
            format!("{greeting} {}", guy.guy_name)
        })
        .finish()?;

    registry
        .class::<SuperGuy>()
        .property("health", field!(SuperGuy, health))
        .property("data", field!(SuperGuy, data))
        .property("HitMe", field!(SuperGuy, hit_me))
        .property("Players", field!(SuperGuy, players))
        .property("faction", field!(SuperGuy, faction))
        .property("sidekick", field!(SuperGuy, sidekick))
        .accessor("playerCount", |guy: &SuperGuy| guy.players.len())
        .method("CopyX", |guy: &mut SuperGuy, source: *const GuyTest| {
            // SAFETY: callers pass a pointer to a live `GuyTest` or a type embedding one.
            guy.guy.x = unsafe { (*source).x };
            guy.guy.x
        })
        .finish()?;

    Ok(())
}

/// The global registry with the game classes installed exactly once.
pub fn registry() -> &'static TypeRegistry {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        init_tracing();
        TypeRegistry::global()
            .install(&[register_game])
            .expect("game classes register");
    });
    TypeRegistry::global()
}

/// Routes library diagnostics to the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory sink for formatted events.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `run` under a thread-local subscriber and returns the `info` events it emitted,
/// one formatted line per event.
pub fn capture_logs(run: impl FnOnce()) -> Vec<String> {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .finish();
    tracing::subscriber::with_default(subscriber, run);
    let bytes = captured.0.lock().clone();
    let text = String::from_utf8_lossy(&bytes);
    text.lines().map(str::to_string).collect()
}

pub fn sample_guy() -> SuperGuy {
    SuperGuy {
        guy: GuyTest {
            x: 321.1,
            time_stamps: vec![4, 5],
            guy_name: "yoyoyo".into(),
        },
        health: 123,
        data: PlayerData {
            guid: 123456,
            tag: "DATATAG".into(),
        },
        hit_me: Box::new("AHHHHHHH 123".into()),
        players: vec![
            Box::new(PlayerFighters {
                name: "JOJO".into(),
                health: 12.23,
            }),
            Box::new(PlayerFighters {
                name: "James".into(),
                health: 0.123,
            }),
        ],
        faction: Faction::GOOD_GUY,
        sidekick: Box::new(PlayerFighters::default()),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    Number(NumericValue),
    Str(String),
    Enum(Option<String>, i64),
    Null,
}

/// Keeps leaf values only, in visit order.
#[derive(Debug, Default)]
pub struct LeafRecorder {
    pub leaves: Vec<Leaf>,
    pub properties: Vec<String>,
}

impl PropertyVisitor for LeafRecorder {
    fn begin_property(&mut self, property: &PropertyDescriptor) {
        self.properties.push(property.name().to_string());
    }

    fn visit_number(&mut self, _property: &PropertyDescriptor, value: NumericValue) {
        self.leaves.push(Leaf::Number(value));
    }

    fn visit_string(&mut self, _property: &PropertyDescriptor, value: &str) {
        self.leaves.push(Leaf::Str(value.to_string()));
    }

    fn visit_enum(&mut self, _property: &PropertyDescriptor, value: EnumValue<'_>) {
        self.leaves
            .push(Leaf::Enum(value.label().map(str::to_string), value.raw()));
    }

    fn visit_null(&mut self, _property: &PropertyDescriptor) {
        self.leaves.push(Leaf::Null);
    }
}
