//! Error type shared by registration, access and invocation.

use thiserror::Error;

pub type ReflectResult<T> = Result<T, ReflectError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error("type `{ty}` has no registered structure")]
    MissingStructure { ty: String },

    #[error("structure for `{ty}` was already sealed")]
    AlreadySealed { ty: String },

    #[error("enum table for `{ty}` was already registered")]
    EnumAlreadyRegistered { ty: String },

    #[error("parent `{parent}` of `{ty}` was never registered")]
    UnregisteredParent { ty: String, parent: String },

    #[error("property `{property}` of `{ty}` has unsupported type `{field}`")]
    UnsupportedProperty {
        ty: String,
        property: String,
        field: String,
    },

    #[error("property `{property}` of `{ty}` references unregistered structure `{field}`")]
    UnresolvedNestedStruct {
        ty: String,
        property: String,
        field: String,
    },

    #[error("no method `{name}` on `{ty}` matches the supplied signature")]
    NoMatchingMethod { ty: String, name: String },

    #[error("no constructor on `{ty}` matches the supplied signature")]
    NoMatchingConstructor { ty: String },

    #[error("value {value} is not a registered variant of `{ty}`")]
    UnknownEnumValue { ty: String, value: i64 },

    #[error("`{name}` is not a registered variant of `{ty}`")]
    UnknownEnumName { ty: String, name: String },

    #[error("property `{property}` has type `{expected}`, not `{requested}`")]
    TypeMismatch {
        property: String,
        expected: String,
        requested: String,
    },

    #[error("instance of `{actual}` is not `{expected}` or derived from it")]
    InstanceMismatch { expected: String, actual: String },

    #[error("instance of `{ty}` was described by a different registry")]
    ForeignRegistry { ty: String },

    #[error("property `{property}` is computed and has no storage")]
    ComputedProperty { property: String },

    #[error("property `{property}` is not {expected}")]
    WrongPropertyKind {
        property: String,
        expected: &'static str,
    },

    #[error("`{ty}` has no default factory")]
    NotConstructible { ty: String },

    #[error("no property named `{name}` on `{ty}`")]
    MissingProperty { ty: String, name: String },
}
