//! Field descriptors: classification by shape, offset-based reads and recursive visits.

use std::fmt;
use std::ptr::NonNull;

use tracing::warn;

use super::descriptor::{Type, TypeShape};
use super::dump::DumpVisitor;
use super::enumeration::EnumValue;
use super::error::{ReflectError, ReflectResult};
use super::instance::{Instance, InstanceMut};
use super::object::Object;
use super::reflect::Reflect;
use super::scalar::{IntRepr, NumericKind, NumericValue};
use super::visitor::{PropertyVisitor, dispatch_number};

/// Getter backing a computed numeric property.
pub type NumericAccessor = Box<dyn Fn(Instance<'_>) -> NumericValue + Send + Sync>;

/// Name given to the element descriptor inside arrays and wrappers.
pub const INNER_PROPERTY: &str = "inner";

pub enum PropertyKind {
    /// `accessor` replaces the offset read for computed values.
    Numeric {
        kind: NumericKind,
        accessor: Option<NumericAccessor>,
    },
    String,
    Enum { repr: IntRepr },
    /// Structure is looked up on the field type at use time.
    NestedStruct,
    DynamicArray { inner: Box<PropertyDescriptor> },
    OwnedOptional { inner: Box<PropertyDescriptor> },
    ObjectPointer,
}

impl PropertyKind {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyKind::Numeric { .. } => "numeric",
            PropertyKind::String => "string",
            PropertyKind::Enum { .. } => "enum",
            PropertyKind::NestedStruct => "struct",
            PropertyKind::DynamicArray { .. } => "array",
            PropertyKind::OwnedOptional { .. } => "optional",
            PropertyKind::ObjectPointer => "object",
        }
    }
}

impl fmt::Debug for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Numeric { kind, accessor } => f
                .debug_struct("Numeric")
                .field("kind", kind)
                .field("computed", &accessor.is_some())
                .finish(),
            PropertyKind::Enum { repr } => f.debug_struct("Enum").field("repr", repr).finish(),
            PropertyKind::DynamicArray { inner } => {
                f.debug_struct("DynamicArray").field("inner", inner).finish()
            }
            PropertyKind::OwnedOptional { inner } => {
                f.debug_struct("OwnedOptional").field("inner", inner).finish()
            }
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug)]
pub struct PropertyDescriptor {
    name: Box<str>,
    offset: usize,
    ty: Type,
    owner: Option<Type>,
    kind: PropertyKind,
}

impl PropertyDescriptor {
    /// Builds the descriptor matching `ty`'s shape; containers recurse into an inner descriptor.
    pub fn classify(
        name: &str,
        offset: usize,
        ty: Type,
        owner: Option<Type>,
    ) -> ReflectResult<Self> {
        let context = owner.map(|owner| owner.name().to_string()).unwrap_or_default();
        let kind = Self::kind_for(ty, &context, name)?;
        Ok(Self {
            name: name.into(),
            offset,
            ty,
            owner,
            kind,
        })
    }

    fn kind_for(ty: Type, context: &str, property: &str) -> ReflectResult<PropertyKind> {
        let inner = |element: Type| -> ReflectResult<Box<PropertyDescriptor>> {
            let kind = Self::kind_for(element, context, property)?;
            Ok(Box::new(PropertyDescriptor {
                name: INNER_PROPERTY.into(),
                offset: 0,
                ty: element,
                owner: None,
                kind,
            }))
        };
        let kind = match ty.shape() {
            TypeShape::Numeric(kind) => PropertyKind::Numeric {
                kind,
                accessor: None,
            },
            TypeShape::String => PropertyKind::String,
            TypeShape::Enum(repr) => PropertyKind::Enum { repr },
            TypeShape::Struct => PropertyKind::NestedStruct,
            TypeShape::Array { element } => PropertyKind::DynamicArray {
                inner: inner(element)?,
            },
            TypeShape::Wrap { inner: wrapped } => PropertyKind::OwnedOptional {
                inner: inner(wrapped)?,
            },
            TypeShape::Object => PropertyKind::ObjectPointer,
            TypeShape::Void
            | TypeShape::Pointer { .. }
            | TypeShape::Reference { .. }
            | TypeShape::Opaque => {
                return Err(ReflectError::UnsupportedProperty {
                    ty: context.to_string(),
                    property: property.to_string(),
                    field: ty.name().to_string(),
                });
            }
        };
        Ok(kind)
    }

    /// A numeric property with no storage; `visit` reports whatever `accessor` returns.
    pub fn computed(name: &str, ty: Type, owner: Type, accessor: NumericAccessor) -> ReflectResult<Self> {
        let TypeShape::Numeric(kind) = ty.shape() else {
            return Err(ReflectError::UnsupportedProperty {
                ty: owner.name().to_string(),
                property: name.to_string(),
                field: ty.name().to_string(),
            });
        };
        Ok(Self {
            name: name.into(),
            offset: 0,
            ty,
            owner: Some(owner),
            kind: PropertyKind::Numeric {
                kind,
                accessor: Some(accessor),
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn owner(&self) -> Option<Type> {
        self.owner
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn is_computed(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::Numeric {
                accessor: Some(_),
                ..
            }
        )
    }

    /// Element descriptor of an array or wrapper property.
    pub fn inner(&self) -> Option<&PropertyDescriptor> {
        match &self.kind {
            PropertyKind::DynamicArray { inner } | PropertyKind::OwnedOptional { inner } => {
                Some(inner)
            }
            _ => None,
        }
    }

    /// Offset of this property's owner inside an instance of `ty`.
    ///
    /// Owner-less descriptors describe the instance itself.
    fn owner_offset(&self, ty: Type) -> ReflectResult<usize> {
        match self.owner {
            Some(owner) => ty.instance_offset(owner),
            None if ty == self.ty && self.offset == 0 => Ok(0),
            None => Err(ReflectError::InstanceMismatch {
                expected: self.ty.name().to_string(),
                actual: ty.name().to_string(),
            }),
        }
    }

    /// Retypes `instance` to this property's owner, stepping into the embedded base if needed.
    fn owner_view<'a>(&self, instance: Instance<'a>) -> ReflectResult<Instance<'a>> {
        let base = self.owner_offset(instance.ty())?;
        Ok(match self.owner {
            Some(owner) if owner != instance.ty() => {
                // SAFETY: the owner is embedded at `base` inside the derived instance.
                unsafe { instance.field(base, owner) }
            }
            _ => instance,
        })
    }

    fn field<'a>(&self, instance: Instance<'a>) -> ReflectResult<Instance<'a>> {
        let owner = self.owner_view(instance)?;
        // SAFETY: offsets come from `offset_of!` on the owner.
        Ok(unsafe { owner.field(self.offset, self.ty) })
    }

    fn field_mut<'a>(&self, instance: InstanceMut<'a>) -> ReflectResult<InstanceMut<'a>> {
        let base = self.owner_offset(instance.ty())?;
        // SAFETY: see `field`.
        Ok(unsafe { instance.field(base + self.offset, self.ty) })
    }

    /// Sends this property's value in `instance` to `visitor`.
    pub fn visit(&self, instance: Instance<'_>, visitor: &mut dyn PropertyVisitor) -> ReflectResult<()> {
        if let PropertyKind::Numeric {
            accessor: Some(get),
            ..
        } = &self.kind
        {
            dispatch_number(visitor, self, get(self.owner_view(instance)?));
            return Ok(());
        }
        self.visit_value(self.field(instance)?, visitor)
    }

    /// Visits a value that already sits at this descriptor's field address.
    fn visit_value(&self, value: Instance<'_>, visitor: &mut dyn PropertyVisitor) -> ReflectResult<()> {
        let ptr = value.as_ptr();
        let registry = value.registry();
        match &self.kind {
            PropertyKind::Numeric { kind, .. } => {
                // SAFETY: the field type's shape is this numeric kind.
                let number = unsafe { kind.read(ptr) };
                dispatch_number(visitor, self, number);
            }
            PropertyKind::String => {
                // SAFETY: string-shaped descriptors only come from `String`.
                let text = unsafe { &*ptr.cast::<String>() };
                visitor.visit_string(self, text);
            }
            PropertyKind::Enum { repr } => {
                // SAFETY: the enum was registered with this discriminant width.
                let raw = unsafe { repr.read(ptr) };
                let value = self.resolve_enum(raw);
                if matches!(value, EnumValue::Unknown(_)) && registry.options().warn_unknown_enums {
                    warn!(
                        target: "reflect::property",
                        property = self.name(),
                        ty = self.ty.name(),
                        value = raw,
                        "unknown enum value"
                    );
                }
                visitor.visit_enum(self, value);
            }
            PropertyKind::NestedStruct => {
                let structure = self.ty.require_structure()?;
                visitor.begin_struct(self, structure);
                structure.visit(value, visitor)?;
                visitor.end_struct(self, structure);
            }
            PropertyKind::DynamicArray { inner } => {
                let manipulator = self.ty.array_manipulator();
                // SAFETY: array-shaped descriptors carry the manipulator for this container.
                let len = unsafe { manipulator.len(ptr) };
                visitor.begin_array(self, len);
                for index in 0..len {
                    // SAFETY: index < len and the container is borrowed for the visit.
                    let Some(item) = (unsafe { manipulator.element(ptr, index) }) else {
                        break;
                    };
                    visitor.begin_array_item(self, index);
                    inner.visit_value(Self::view(value, inner.ty, item), visitor)?;
                    visitor.end_array_item(self, index);
                }
                visitor.end_array(self);
            }
            PropertyKind::OwnedOptional { inner } => {
                // SAFETY: wrap-shaped descriptors carry the manipulator for this container.
                match unsafe { self.ty.wrap_manipulator().value(ptr) } {
                    Some(item) => inner.visit_value(Self::view(value, inner.ty, item), visitor)?,
                    None => visitor.visit_null(self),
                }
            }
            PropertyKind::ObjectPointer => {
                // SAFETY: object-shaped descriptors only come from `Box<dyn Object>`.
                let object: &dyn Object = unsafe { &**ptr.cast::<Box<dyn Object>>() };
                let pointee = Instance::from_object(registry, object);
                let dynamic = pointee.ty();
                visitor.begin_object(self, dynamic);
                match dynamic.structure() {
                    Some(structure) => structure.visit(pointee, visitor)?,
                    None => {
                        let transient = PropertyDescriptor::classify(INNER_PROPERTY, 0, dynamic, None)?;
                        transient.visit_value(pointee, visitor)?;
                    }
                }
                visitor.end_object(self, dynamic);
            }
        }
        Ok(())
    }

    fn view<'a>(parent: Instance<'a>, ty: Type, ptr: *const u8) -> Instance<'a> {
        // SAFETY: manipulators return pointers into the container borrowed by `parent`.
        unsafe { Instance::from_raw(parent.registry(), ty, NonNull::new_unchecked(ptr.cast_mut())) }
    }

    fn resolve_enum(&self, raw: i64) -> EnumValue<'_> {
        match self.ty.enum_table() {
            Some(table) => table.resolve(raw),
            None => EnumValue::Unknown(raw),
        }
    }

    /// Human-readable dump of this property, one line per value.
    pub fn debug_dump(&self, instance: Instance<'_>, indent: usize) -> ReflectResult<String> {
        let mut dump = DumpVisitor::new(indent);
        dump.begin_property(self);
        self.visit(instance, &mut dump)?;
        dump.end_property(self);
        Ok(dump.finish())
    }

    fn check_stored<F: Reflect>(&self, requested: Type) -> ReflectResult<()> {
        if self.is_computed() {
            return Err(ReflectError::ComputedProperty {
                property: self.name.to_string(),
            });
        }
        if requested != self.ty {
            return Err(ReflectError::TypeMismatch {
                property: self.name.to_string(),
                expected: self.ty.name().to_string(),
                requested: requested.name().to_string(),
            });
        }
        Ok(())
    }

    fn expect_kind(&self, matches: bool, expected: &'static str) -> ReflectResult<()> {
        if matches {
            Ok(())
        } else {
            Err(ReflectError::WrongPropertyKind {
                property: self.name.to_string(),
                expected,
            })
        }
    }

    pub fn value<'a, F: Reflect>(&self, instance: Instance<'a>) -> ReflectResult<&'a F> {
        self.check_stored::<F>(instance.registry().get::<F>())?;
        let field = self.field(instance)?;
        // SAFETY: the field descriptor is `F`'s descriptor.
        Ok(unsafe { &*field.as_ptr().cast::<F>() })
    }

    pub fn value_mut<'a, F: Reflect>(&self, instance: InstanceMut<'a>) -> ReflectResult<&'a mut F> {
        self.check_stored::<F>(instance.registry().get::<F>())?;
        let mut field = self.field_mut(instance)?;
        // SAFETY: the field descriptor is `F`'s descriptor and the view is exclusive.
        Ok(unsafe { &mut *field.as_mut_ptr().cast::<F>() })
    }

    pub fn set<F: Reflect>(&self, instance: InstanceMut<'_>, value: F) -> ReflectResult<()> {
        *self.value_mut::<F>(instance)? = value;
        Ok(())
    }

    /// Current value of a numeric property, stored or computed.
    pub fn numeric_value(&self, instance: Instance<'_>) -> ReflectResult<NumericValue> {
        let PropertyKind::Numeric { kind, accessor } = &self.kind else {
            return Err(ReflectError::WrongPropertyKind {
                property: self.name.to_string(),
                expected: "numeric",
            });
        };
        if let Some(get) = accessor {
            return Ok(get(self.owner_view(instance)?));
        }
        let field = self.field(instance)?;
        // SAFETY: the field type's shape is this numeric kind.
        Ok(unsafe { kind.read(field.as_ptr()) })
    }

    pub fn enum_value(&self, instance: Instance<'_>) -> ReflectResult<EnumValue<'_>> {
        let PropertyKind::Enum { repr } = &self.kind else {
            return Err(ReflectError::WrongPropertyKind {
                property: self.name.to_string(),
                expected: "enum",
            });
        };
        let field = self.field(instance)?;
        // SAFETY: the enum was registered with this discriminant width.
        let raw = unsafe { repr.read(field.as_ptr()) };
        Ok(self.resolve_enum(raw))
    }

    pub fn enum_label(&self, instance: Instance<'_>) -> ReflectResult<&str> {
        match self.enum_value(instance)? {
            EnumValue::Known { label, .. } => Ok(label),
            EnumValue::Unknown(value) => Err(ReflectError::UnknownEnumValue {
                ty: self.ty.name().to_string(),
                value,
            }),
        }
    }

    pub fn set_enum_by_name(&self, instance: InstanceMut<'_>, label: &str) -> ReflectResult<()> {
        let PropertyKind::Enum { repr } = &self.kind else {
            return Err(ReflectError::WrongPropertyKind {
                property: self.name.to_string(),
                expected: "enum",
            });
        };
        let value = self
            .ty
            .enum_table()
            .and_then(|table| table.value_for(label))
            .ok_or_else(|| ReflectError::UnknownEnumName {
                ty: self.ty.name().to_string(),
                name: label.to_string(),
            })?;
        let mut field = self.field_mut(instance)?;
        // SAFETY: table values come from real variants of this enum via `ReflectEnum::to_raw`.
        unsafe { repr.write(field.as_mut_ptr(), value) };
        Ok(())
    }

    pub fn array_len(&self, instance: Instance<'_>) -> ReflectResult<usize> {
        self.expect_kind(matches!(self.kind, PropertyKind::DynamicArray { .. }), "array")?;
        let field = self.field(instance)?;
        // SAFETY: array-shaped descriptors carry the manipulator for this container.
        Ok(unsafe { self.ty.array_manipulator().len(field.as_ptr()) })
    }

    pub fn resize_array(&self, instance: InstanceMut<'_>, len: usize) -> ReflectResult<()> {
        self.expect_kind(matches!(self.kind, PropertyKind::DynamicArray { .. }), "array")?;
        let mut field = self.field_mut(instance)?;
        // SAFETY: array-shaped descriptors carry the manipulator for this container.
        unsafe { self.ty.array_manipulator().resize(field.as_mut_ptr(), len) }
    }

    /// Empties an optional; `Ok(false)` for wrappers that cannot be empty.
    pub fn clear_optional(&self, instance: InstanceMut<'_>) -> ReflectResult<bool> {
        self.expect_kind(matches!(self.kind, PropertyKind::OwnedOptional { .. }), "optional")?;
        let mut field = self.field_mut(instance)?;
        // SAFETY: wrap-shaped descriptors carry the manipulator for this container.
        Ok(unsafe { self.ty.wrap_manipulator().clear(field.as_mut_ptr()) })
    }

    /// First struct-typed field, at any nesting depth, whose structure was never sealed.
    pub(crate) fn unresolved_structure(&self) -> Option<Type> {
        match &self.kind {
            PropertyKind::NestedStruct if self.ty.structure().is_none() => Some(self.ty),
            PropertyKind::DynamicArray { inner } | PropertyKind::OwnedOptional { inner } => {
                inner.unresolved_structure()
            }
            _ => None,
        }
    }
}
