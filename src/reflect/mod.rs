//! Runtime reflection: a registry of canonical type descriptors, class structures with
//! properties and methods, and the visitors and walkers that read instances through them.

pub mod argument;
pub mod builder;
pub mod descriptor;
pub mod dump;
pub mod enumeration;
pub mod error;
pub mod fmt;
pub mod instance;
pub mod macros;
pub mod manipulator;
pub mod method;
pub mod object;
pub mod property;
pub mod reflect;
pub mod registry;
pub mod scalar;
pub mod structure;
pub mod visitor;
pub mod walker;

#[cfg(test)]
pub(crate) mod test_support;

pub use argument::{Argument, ArgumentList, ReturnSlot};
pub use builder::{ClassBuilder, EnumBuilder, Field};
pub use descriptor::{Conversion, Factory, Type, TypeDescriptor, TypeIndex, TypeShape, TypeTraits};
pub use dump::DumpVisitor;
pub use enumeration::{EnumTable, EnumValue, EnumVariant, ReflectEnum};
pub use error::{ReflectError, ReflectResult};
pub use fmt::{SchemaFormatter, TypeFormatter, describe_registry, describe_schema, describe_type};
pub use instance::{Instance, InstanceMut};
pub use manipulator::{ArrayManipulator, BoxManipulator, OptionManipulator, VecManipulator, WrapManipulator};
pub use method::{ByMut, ByRef, ConstructorFn, MethodDescriptor, MethodFn, MethodKind};
pub use object::Object;
pub use property::{INNER_PROPERTY, NumericAccessor, PropertyDescriptor, PropertyKind};
pub use reflect::{Reflect, TypeInfo};
pub use registry::{Registration, RegistryOptions, TypeRegistry};
pub use scalar::{EnumRepr, IntRepr, Numeric, NumericKind, NumericValue};
pub use structure::{FieldRef, Lineage, ParentLink, ReflectClass, StructureDescriptor};
pub use visitor::PropertyVisitor;
pub use walker::{PropertyPath, PropertyWalker, WalkEntry};
