//! Declarative helpers that keep offsets and type names next to the types they describe.

/// Builds a [`Field`](crate::Field) for `Owner::field` with its offset and type checked by the compiler.
#[macro_export]
macro_rules! field {
    ($owner:ty, $field:ident) => {
        // SAFETY: the offset and the witness closure name the same field.
        unsafe {
            $crate::Field::<$owner, _>::new(
                ::core::mem::offset_of!($owner, $field),
                |owner: &$owner| &owner.$field,
            )
        }
    };
}

/// Implements `Reflect` and `ReflectClass` for a struct.
///
/// The registered name is the module-qualified path of the struct unless one is given with
/// `as "Name"`. `reflect_struct!(Child : Parent => field)` declares that `Child` embeds its
/// parent class by value in `field`. Explicit names must stay unique per registry.
#[macro_export]
macro_rules! reflect_struct {
    (@class $ty:ident, $name:expr) => {
        // SAFETY: a class shape over `$ty`'s own layout.
        unsafe impl $crate::Reflect for $ty {
            fn type_info(_registry: &$crate::TypeRegistry) -> $crate::TypeInfo {
                $crate::TypeInfo::class::<$ty>($name)
            }
        }
    };
    (@parent $ty:ident, $parent:ty, $field:ident) => {
        // SAFETY: `_embedded` proves `$field` is a `$parent`; the offset is `offset_of!`.
        unsafe impl $crate::ReflectClass for $ty {
            fn parent(registry: &$crate::TypeRegistry) -> Option<$crate::ParentLink> {
                let _embedded: fn(&$ty) -> &$parent = |child| &child.$field;
                Some($crate::ParentLink::new(
                    registry.get::<$parent>(),
                    ::core::mem::offset_of!($ty, $field),
                ))
            }
        }
    };
    ($ty:ident) => {
        $crate::reflect_struct!(@class $ty, concat!(module_path!(), "::", stringify!($ty)));
        // SAFETY: no parent.
        unsafe impl $crate::ReflectClass for $ty {}
    };
    ($ty:ident as $name:literal) => {
        $crate::reflect_struct!(@class $ty, $name);
        // SAFETY: no parent.
        unsafe impl $crate::ReflectClass for $ty {}
    };
    ($ty:ident : $parent:ty => $field:ident) => {
        $crate::reflect_struct!(@class $ty, concat!(module_path!(), "::", stringify!($ty)));
        $crate::reflect_struct!(@parent $ty, $parent, $field);
    };
    ($ty:ident as $name:literal : $parent:ty => $field:ident) => {
        $crate::reflect_struct!(@class $ty, $name);
        $crate::reflect_struct!(@parent $ty, $parent, $field);
    };
}

/// Declares a fieldless enum with an explicit `#[repr]` and implements `ReflectEnum` for it.
///
/// The registered name is module-qualified like [`reflect_struct!`]. Variant labels still
/// have to be registered through `TypeRegistry::enumeration`.
#[macro_export]
macro_rules! reflect_enum {
    (
        #[repr($repr:ident)]
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        #[repr($repr)]
        $vis enum $name {
            $($(#[$variant_meta])* $variant = $value),*
        }

        // SAFETY: the declared `#[repr]` is the discriminant width.
        unsafe impl $crate::Reflect for $name {
            fn type_info(_registry: &$crate::TypeRegistry) -> $crate::TypeInfo {
                $crate::TypeInfo::enumeration_repr::<$name, $repr>(concat!(
                    module_path!(),
                    "::",
                    stringify!($name)
                ))
            }
        }

        // SAFETY: `as` on a fieldless enum yields the stored discriminant.
        unsafe impl $crate::ReflectEnum for $name {
            fn to_raw(self) -> i64 {
                self as $repr as i64
            }
        }
    };
}
