//! Formatting helpers for debugging and schema logs.

use std::fmt;

use super::descriptor::Type;
use super::property::PropertyDescriptor;
use super::registry::TypeRegistry;

/// One-line summary of a descriptor: name, shape, layout and traits.
pub struct TypeFormatter {
    ty: Type,
}

impl TypeFormatter {
    pub fn new(ty: Type) -> Self {
        Self { ty }
    }
}

impl fmt::Display for TypeFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.ty;
        write!(f, "{} | {:?}", ty.name(), ty.shape())?;
        write!(f, " [{} bytes, align {}]", ty.size(), ty.align())?;
        if ty.pointer_depth() > 0 {
            write!(f, " depth {}", ty.pointer_depth())?;
        }
        if !ty.traits().is_empty() {
            write!(f, " {:?}", ty.traits())?;
        }
        Ok(())
    }
}

pub fn describe_type(ty: Type) -> TypeFormatter {
    TypeFormatter::new(ty)
}

/// Multi-line listing of a class: parent, properties, methods and constructors.
///
/// Types without a sealed structure print their one-line summary only.
pub struct SchemaFormatter {
    ty: Type,
}

impl SchemaFormatter {
    pub fn new(ty: Type) -> Self {
        Self { ty }
    }

    fn write_property(f: &mut fmt::Formatter<'_>, property: &PropertyDescriptor, indent: usize) -> fmt::Result {
        write!(
            f,
            "\n{:indent$}{}: {} ({})",
            "",
            property.name(),
            property.ty(),
            property.kind().label()
        )?;
        if property.is_computed() {
            f.write_str(" computed")
        } else {
            write!(f, " @{}", property.offset())
        }
    }
}

impl fmt::Display for SchemaFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe_type(self.ty))?;
        let Some(structure) = self.ty.structure() else {
            return Ok(());
        };
        if let Some(parent) = structure.parent().or(structure.declared_parent()) {
            write!(f, "\n  parent {} @{}", parent.ty, parent.offset)?;
        }
        for property in structure.properties() {
            Self::write_property(f, property, 2)?;
            if let Some(inner) = property.inner() {
                Self::write_property(f, inner, 4)?;
            }
        }
        for method in structure.methods() {
            write!(f, "\n  fn {method}")?;
        }
        for constructor in structure.constructors() {
            write!(f, "\n  new {constructor}")?;
        }
        Ok(())
    }
}

pub fn describe_schema(ty: Type) -> SchemaFormatter {
    SchemaFormatter::new(ty)
}

/// Every registered class's schema, in registration order.
pub fn describe_registry(registry: &TypeRegistry) -> String {
    let mut blocks = Vec::new();
    registry.for_each(|ty| {
        if ty.is_class() {
            blocks.push(describe_schema(ty).to_string());
        }
    });
    blocks.join("\n")
}
