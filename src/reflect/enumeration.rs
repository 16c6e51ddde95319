//! Name and value tables for reflected fieldless enums.

use std::fmt;

use smallvec::SmallVec;

use super::reflect::Reflect;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    pub label: Box<str>,
    pub value: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumTable {
    variants: SmallVec<[EnumVariant; 4]>,
}

impl EnumTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_variant(&mut self, variant: EnumVariant) {
        self.variants.push(variant);
    }

    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    pub fn label_for(&self, value: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.label.as_ref())
    }

    pub fn value_for(&self, label: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|entry| entry.label.as_ref() == label)
            .map(|entry| entry.value)
    }

    /// Maps a raw discriminant to a visitor-facing value.
    pub fn resolve(&self, value: i64) -> EnumValue<'_> {
        match self.label_for(value) {
            Some(label) => EnumValue::Known { value, label },
            None => EnumValue::Unknown(value),
        }
    }
}

/// An enum leaf as seen by visitors; unmatched discriminants stay explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumValue<'a> {
    Known { value: i64, label: &'a str },
    Unknown(i64),
}

impl EnumValue<'_> {
    pub fn raw(&self) -> i64 {
        match *self {
            EnumValue::Known { value, .. } | EnumValue::Unknown(value) => value,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            EnumValue::Known { label, .. } => Some(label),
            EnumValue::Unknown(_) => None,
        }
    }
}

impl fmt::Display for EnumValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Known { label, .. } => f.write_str(label),
            EnumValue::Unknown(value) => write!(f, "<unknown {value}>"),
        }
    }
}

/// Fieldless enums whose variants can be registered by value.
///
/// # Safety
/// `to_raw` must return the value exactly as it is stored, so that writing it back through
/// the type's `#[repr]` width yields `self` again.
pub unsafe trait ReflectEnum: Reflect + Copy {
    fn to_raw(self) -> i64;
}
