//! Fixture classes and a recording visitor shared by the unit tests.

use std::mem::offset_of;

use super::descriptor::Type;
use super::enumeration::EnumValue;
use super::error::ReflectResult;
use super::object::Object;
use super::property::PropertyDescriptor;
use super::registry::TypeRegistry;
use super::scalar::NumericValue;
use super::structure::StructureDescriptor;
use super::visitor::PropertyVisitor;
use crate::{field, reflect_enum, reflect_struct};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Base {
    pub x: i32,
}

reflect_struct!(Base as "Base");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Derived {
    pub base: Base,
    pub y: i32,
}

reflect_struct!(Derived as "Derived" : Base => base);

impl Derived {
    pub fn base_offset() -> usize {
        offset_of!(Derived, base)
    }
}

/// Declares `Base` as its parent but is never part of `register_fixtures`.
#[allow(dead_code)]
pub struct Orphan {
    pub base: Base,
}

reflect_struct!(Orphan as "Orphan" : Base => base);

reflect_enum! {
    #[repr(u8)]
    pub enum Tone {
        Quiet = 0,
        Loud = 1,
    }
}

/// One field per property kind plus a computed total.
pub struct Sample {
    pub count: u32,
    pub label: String,
    pub tone: Tone,
    pub nested: Base,
    pub scores: Vec<i32>,
    pub maybe: Option<String>,
    pub object: Box<dyn Object>,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            count: 0,
            label: String::new(),
            tone: Tone::Quiet,
            nested: Base::default(),
            scores: Vec::new(),
            maybe: None,
            object: Box::new(Base::default()),
        }
    }
}

reflect_struct!(Sample);

pub fn register_fixtures(registry: &TypeRegistry) -> ReflectResult<()> {
    registry
        .enumeration::<Tone>()
        .value(Tone::Quiet, "Quiet")
        .value(Tone::Loud, "Loud")
        .finish()?;
    registry
        .class::<Base>()
        .property("x", field!(Base, x))
        .method("bump", |base: &mut Base, by: i32| {
            base.x += by;
            base.x
        })
        .constructor(|x: i32| Base { x })
        .default_factory()
        .finish()?;
    registry
        .class::<Derived>()
        .property("y", field!(Derived, y))
        .default_factory()
        .finish()?;
    registry
        .class::<Sample>()
        .property("count", field!(Sample, count))
        .property("label", field!(Sample, label))
        .property("tone", field!(Sample, tone))
        .property("nested", field!(Sample, nested))
        .property("scores", field!(Sample, scores))
        .property("maybe", field!(Sample, maybe))
        .property("object", field!(Sample, object))
        .accessor("total", |sample: &Sample| sample.scores.iter().sum::<i32>())
        .finish()?;
    registry.finalize()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Number(String),
    Str(String),
    Enum(String),
    Null,
    BeginStruct(String),
    EndStruct,
    BeginObject(String),
    EndObject,
    BeginArray(usize),
    BeginItem(usize),
    EndItem(usize),
    EndArray,
}

/// Records every callback; `properties` only tracks the structure-level property hooks.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub properties: Vec<String>,
}

impl PropertyVisitor for Recorder {
    fn begin_property(&mut self, property: &PropertyDescriptor) {
        self.properties.push(property.name().to_string());
    }

    fn visit_number(&mut self, _property: &PropertyDescriptor, value: NumericValue) {
        self.events.push(Event::Number(value.to_string()));
    }

    fn visit_string(&mut self, _property: &PropertyDescriptor, value: &str) {
        self.events.push(Event::Str(value.to_string()));
    }

    fn visit_enum(&mut self, _property: &PropertyDescriptor, value: EnumValue<'_>) {
        self.events.push(Event::Enum(value.to_string()));
    }

    fn visit_null(&mut self, _property: &PropertyDescriptor) {
        self.events.push(Event::Null);
    }

    fn begin_struct(&mut self, _property: &PropertyDescriptor, structure: &StructureDescriptor) {
        self.events.push(Event::BeginStruct(structure.name().to_string()));
    }

    fn end_struct(&mut self, _property: &PropertyDescriptor, _structure: &StructureDescriptor) {
        self.events.push(Event::EndStruct);
    }

    fn begin_object(&mut self, _property: &PropertyDescriptor, dynamic: Type) {
        self.events.push(Event::BeginObject(dynamic.name().to_string()));
    }

    fn end_object(&mut self, _property: &PropertyDescriptor, _dynamic: Type) {
        self.events.push(Event::EndObject);
    }

    fn begin_array(&mut self, _property: &PropertyDescriptor, len: usize) {
        self.events.push(Event::BeginArray(len));
    }

    fn begin_array_item(&mut self, _property: &PropertyDescriptor, index: usize) {
        self.events.push(Event::BeginItem(index));
    }

    fn end_array_item(&mut self, _property: &PropertyDescriptor, index: usize) {
        self.events.push(Event::EndItem(index));
    }

    fn end_array(&mut self, _property: &PropertyDescriptor) {
        self.events.push(Event::EndArray);
    }
}
