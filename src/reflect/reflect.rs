//! The `Reflect` trait and descriptor drafts for built-in types.
//!
//! Every type the registry can describe implements [`Reflect`]. Its `type_info` produces a
//! [`TypeInfo`] draft that the registry turns into the canonical descriptor on first use.
//! Containers request their element types from the same registry so composed names such as
//! `Vec<Option<f32>>` come out of the recursion.

use super::descriptor::{Factory, Type, TypeShape, TypeTraits};
use super::manipulator::{ArrayManipulator, BoxManipulator, OptionManipulator, VecManipulator, WrapManipulator};
use super::object::Object;
use super::registry::TypeRegistry;
use super::scalar::{EnumRepr, IntRepr, Numeric, NumericKind, NumericValue};

/// # Safety
/// The registry trusts the returned [`TypeInfo`] when it reads and writes values of `Self`
/// through erased pointers. Its shape must describe `Self` exactly: numeric and enum shapes
/// must name `Self`'s own width, container shapes must come with manipulators for `Self`,
/// and names must not be claimed by another Rust type.
pub unsafe trait Reflect: 'static {
    fn type_info(registry: &TypeRegistry) -> TypeInfo;
}

/// Unsealed description of a type, consumed by the registry.
pub struct TypeInfo {
    pub(crate) name: String,
    pub(crate) size: usize,
    pub(crate) align: usize,
    pub(crate) pointer_depth: usize,
    pub(crate) traits: TypeTraits,
    pub(crate) shape: TypeShape,
    pub(crate) raw: Option<Type>,
    pub(crate) array: Option<Box<dyn ArrayManipulator>>,
    pub(crate) wrap: Option<Box<dyn WrapManipulator>>,
    pub(crate) factory: Option<Factory>,
}

impl TypeInfo {
    pub(crate) fn of<T>(name: impl Into<String>, shape: TypeShape, traits: TypeTraits) -> Self {
        Self {
            name: name.into(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            pointer_depth: 0,
            traits,
            shape,
            raw: None,
            array: None,
            wrap: None,
            factory: None,
        }
    }

    /// A user structure; properties are attached later by a `ClassBuilder`.
    pub fn class<T>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, TypeShape::Struct, TypeTraits::CLASS)
    }

    pub(crate) fn enumeration<T: 'static>(name: impl Into<String>, repr: IntRepr) -> Self {
        Self::of::<T>(name, TypeShape::Enum(repr), TypeTraits::ENUM)
    }

    /// A user enum whose `#[repr]` is the integer type `R`.
    ///
    /// # Panics
    /// When `T` and `R` differ in size.
    pub fn enumeration_repr<T: 'static, R: EnumRepr>(name: impl Into<String>) -> Self {
        assert_eq!(
            size_of::<T>(),
            R::REPR.byte_size(),
            "enum `{}` is not stored as its declared repr",
            std::any::type_name::<T>()
        );
        Self::enumeration::<T>(name, R::REPR)
    }

    pub fn with_traits(mut self, traits: TypeTraits) -> Self {
        self.traits |= traits;
        self
    }

    pub(crate) fn with_raw(mut self, raw: Type) -> Self {
        self.raw = Some(raw);
        self
    }

    pub(crate) fn with_pointer_depth(mut self, depth: usize) -> Self {
        self.pointer_depth = depth;
        self
    }

    pub(crate) fn with_array(mut self, manipulator: impl ArrayManipulator + 'static) -> Self {
        self.array = Some(Box::new(manipulator));
        self
    }

    pub(crate) fn with_wrap(mut self, manipulator: impl WrapManipulator + 'static) -> Self {
        self.wrap = Some(Box::new(manipulator));
        self
    }

    pub(crate) fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

macro_rules! impl_numeric {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            // SAFETY: each kind names the width of `$ty`.
            unsafe impl Reflect for $ty {
                fn type_info(_registry: &TypeRegistry) -> TypeInfo {
                    let kind = NumericKind::$kind;
                    TypeInfo::of::<$ty>(stringify!($ty), TypeShape::Numeric(kind), kind.traits())
                        .with_factory(Factory::of::<$ty>())
                }
            }

            impl Numeric for $ty {
                const KIND: NumericKind = NumericKind::$kind;

                fn into_value(self) -> NumericValue {
                    NumericValue::$kind(self)
                }
            }
        )*
    };
}

impl_numeric!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    f32 => F32,
    f64 => F64,
);

// SAFETY: the string shape is only ever produced here.
unsafe impl Reflect for String {
    fn type_info(_registry: &TypeRegistry) -> TypeInfo {
        TypeInfo::of::<String>("String", TypeShape::String, TypeTraits::STRING)
            .with_factory(Factory::of::<String>())
    }
}

// SAFETY: void-shaped values are never read.
unsafe impl Reflect for () {
    fn type_info(_registry: &TypeRegistry) -> TypeInfo {
        TypeInfo::of::<()>("()", TypeShape::Void, TypeTraits::VOID)
    }
}

// SAFETY: the manipulator and layout are those of `Vec<T>`.
unsafe impl<T: Reflect> Reflect for Vec<T> {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let element = registry.get::<T>();
        TypeInfo::of::<Vec<T>>(
            format!("Vec<{}>", element.name()),
            TypeShape::Array { element },
            TypeTraits::ARRAY,
        )
        .with_array(VecManipulator::<T>::new(element))
        .with_factory(Factory::of::<Vec<T>>())
    }
}

// SAFETY: the manipulator and layout are those of `Option<T>`.
unsafe impl<T: Reflect> Reflect for Option<T> {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let inner = registry.get::<T>();
        TypeInfo::of::<Option<T>>(
            format!("Option<{}>", inner.name()),
            TypeShape::Wrap { inner },
            TypeTraits::WRAPPER,
        )
        .with_wrap(OptionManipulator::<T>::new())
        .with_factory(Factory::of::<Option<T>>())
    }
}

// SAFETY: the manipulator and layout are those of `Box<T>`.
unsafe impl<T: Reflect> Reflect for Box<T> {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let inner = registry.get::<T>();
        TypeInfo::of::<Box<T>>(
            format!("Box<{}>", inner.name()),
            TypeShape::Wrap { inner },
            TypeTraits::WRAPPER,
        )
        .with_wrap(BoxManipulator::<T>::new())
    }
}

// SAFETY: the object shape is only ever produced here.
unsafe impl Reflect for Box<dyn Object> {
    fn type_info(_registry: &TypeRegistry) -> TypeInfo {
        TypeInfo::of::<Box<dyn Object>>(
            "Box<dyn Object>",
            TypeShape::Object,
            TypeTraits::OBJECT | TypeTraits::POINTER,
        )
        .with_pointer_depth(1)
    }
}

// SAFETY: pointer and reference shapes are rejected as properties and only passed as arguments.
unsafe impl<T: Reflect> Reflect for &'static T {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let referent = registry.get::<T>();
        TypeInfo::of::<&'static T>(
            format!("&{}", referent.name()),
            TypeShape::Reference { referent },
            TypeTraits::REFERENCE | TypeTraits::CONST,
        )
        .with_raw(referent)
    }
}

unsafe impl<T: Reflect> Reflect for &'static mut T {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let referent = registry.get::<T>();
        TypeInfo::of::<&'static mut T>(
            format!("&mut {}", referent.name()),
            TypeShape::Reference { referent },
            TypeTraits::REFERENCE,
        )
        .with_raw(referent)
    }
}

unsafe impl<T: Reflect> Reflect for *const T {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let pointee = registry.get::<T>();
        let unqualified = registry.get::<*mut T>();
        TypeInfo::of::<*const T>(
            format!("*const {}", pointee.name()),
            TypeShape::Pointer { pointee },
            TypeTraits::POINTER | TypeTraits::CONST,
        )
        .with_pointer_depth(pointee.pointer_depth() + 1)
        .with_raw(unqualified)
    }
}

unsafe impl<T: Reflect> Reflect for *mut T {
    fn type_info(registry: &TypeRegistry) -> TypeInfo {
        let pointee = registry.get::<T>();
        TypeInfo::of::<*mut T>(
            format!("*mut {}", pointee.name()),
            TypeShape::Pointer { pointee },
            TypeTraits::POINTER,
        )
        .with_pointer_depth(pointee.pointer_depth() + 1)
    }
}
