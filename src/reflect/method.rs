//! Registered callables: signature capture and the erased call thunk.

use std::fmt;

use smallvec::{SmallVec, smallvec};

use super::argument::{Argument, ReturnSlot, match_arguments};
use super::descriptor::{Conversion, Type};
use super::instance::InstanceMut;
use super::reflect::Reflect;
use super::registry::TypeRegistry;

/// Marker for methods taking `&mut self`.
pub struct ByMut;
/// Marker for methods taking `&self`.
pub struct ByRef;

/// A Rust callable usable as a reflected method of `T`.
///
/// `Marker` only disambiguates the blanket impls and is always inferred.
pub trait MethodFn<T, Marker>: Send + Sync + 'static {
    type Output: Reflect;

    fn parameter_types(registry: &TypeRegistry) -> SmallVec<[Type; 4]>;

    /// # Safety
    /// `args` must hold exactly one argument per parameter, each of the parameter's Rust type.
    unsafe fn call(&self, target: &mut T, args: &[Argument<'_>]) -> Self::Output;
}

/// A Rust callable usable as a reflected constructor of `T`.
pub trait ConstructorFn<T, Marker>: Send + Sync + 'static {
    fn parameter_types(registry: &TypeRegistry) -> SmallVec<[Type; 4]>;

    /// # Safety
    /// Same contract as [`MethodFn::call`].
    unsafe fn call(&self, args: &[Argument<'_>]) -> T;
}

macro_rules! impl_callables {
    ($($arg:ident),*) => {
        impl<T, F, R, $($arg,)*> MethodFn<T, (ByMut, fn($($arg),*))> for F
        where
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
            R: Reflect,
            $($arg: Reflect + Clone,)*
        {
            type Output = R;

            fn parameter_types(registry: &TypeRegistry) -> SmallVec<[Type; 4]> {
                let _ = registry;
                smallvec![$(registry.get::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            unsafe fn call(&self, target: &mut T, args: &[Argument<'_>]) -> R {
                let mut args = args.iter();
                $(
                    let $arg = match args.next() {
                        // SAFETY: forwarded caller contract.
                        Some(argument) => unsafe { argument.read::<$arg>() },
                        None => panic!("argument count checked before the call"),
                    };
                )*
                (self)(target, $($arg),*)
            }
        }

        impl<T, F, R, $($arg,)*> MethodFn<T, (ByRef, fn($($arg),*))> for F
        where
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            R: Reflect,
            $($arg: Reflect + Clone,)*
        {
            type Output = R;

            fn parameter_types(registry: &TypeRegistry) -> SmallVec<[Type; 4]> {
                let _ = registry;
                smallvec![$(registry.get::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            unsafe fn call(&self, target: &mut T, args: &[Argument<'_>]) -> R {
                let mut args = args.iter();
                $(
                    let $arg = match args.next() {
                        // SAFETY: forwarded caller contract.
                        Some(argument) => unsafe { argument.read::<$arg>() },
                        None => panic!("argument count checked before the call"),
                    };
                )*
                (self)(&*target, $($arg),*)
            }
        }

        impl<T, F, $($arg,)*> ConstructorFn<T, fn($($arg),*)> for F
        where
            F: Fn($($arg),*) -> T + Send + Sync + 'static,
            $($arg: Reflect + Clone,)*
        {
            fn parameter_types(registry: &TypeRegistry) -> SmallVec<[Type; 4]> {
                let _ = registry;
                smallvec![$(registry.get::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            unsafe fn call(&self, args: &[Argument<'_>]) -> T {
                let mut args = args.iter();
                $(
                    let $arg = match args.next() {
                        // SAFETY: forwarded caller contract.
                        Some(argument) => unsafe { argument.read::<$arg>() },
                        None => panic!("argument count checked before the call"),
                    };
                )*
                (self)($($arg),*)
            }
        }
    };
}

impl_callables!();
impl_callables!(A);
impl_callables!(A, B);
impl_callables!(A, B, C);
impl_callables!(A, B, C, D);
impl_callables!(A, B, C, D, E);
impl_callables!(A, B, C, D, E, G);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Constructor,
}

/// Erased call: instance (methods only), result destination, converted arguments.
pub type MethodThunk =
    Box<dyn Fn(Option<InstanceMut<'_>>, &mut ReturnSlot<'_>, &[Argument<'_>]) + Send + Sync>;

pub struct MethodDescriptor {
    name: Box<str>,
    return_type: Type,
    params: SmallVec<[Type; 4]>,
    kind: MethodKind,
    thunk: MethodThunk,
}

impl MethodDescriptor {
    pub fn method<T, M, F>(registry: &TypeRegistry, name: &str, callable: F) -> Self
    where
        T: Reflect,
        M: 'static,
        F: MethodFn<T, M>,
    {
        let return_type = registry.get::<F::Output>();
        let thunk: MethodThunk = Box::new(
            move |instance: Option<InstanceMut<'_>>,
                  slot: &mut ReturnSlot<'_>,
                  args: &[Argument<'_>]| {
                let Some(target) = instance.and_then(|instance| instance.downcast_mut::<T>())
                else {
                    panic!("method thunk called without an instance of its owner");
                };
                // SAFETY: arguments were matched and converted against `parameter_types`.
                let value = unsafe { callable.call(target, args) };
                slot.store(value, return_type);
            },
        );
        Self {
            name: name.into(),
            return_type,
            params: F::parameter_types(registry),
            kind: MethodKind::Method,
            thunk,
        }
    }

    /// Constructors return `Box<T>` and are named after the type they build.
    pub fn constructor<T, M, F>(registry: &TypeRegistry, callable: F) -> Self
    where
        T: Reflect,
        M: 'static,
        F: ConstructorFn<T, M>,
    {
        let return_type = registry.get::<Box<T>>();
        let thunk: MethodThunk = Box::new(
            move |_instance: Option<InstanceMut<'_>>,
                  slot: &mut ReturnSlot<'_>,
                  args: &[Argument<'_>]| {
                // SAFETY: arguments were matched and converted against `parameter_types`.
                let value = unsafe { callable.call(args) };
                slot.store(Box::new(value), return_type);
            },
        );
        Self {
            name: registry.get::<T>().name().into(),
            return_type,
            params: F::parameter_types(registry),
            kind: MethodKind::Constructor,
            thunk,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Type {
        self.return_type
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// Conversions needed to call with `args`, if the call would return `requested`.
    ///
    /// `unit` is the registry's `()` descriptor; requesting it accepts any return type.
    pub fn accepts(
        &self,
        requested: Type,
        unit: Type,
        args: &[Argument<'_>],
    ) -> Option<SmallVec<[Conversion; 4]>> {
        if self.return_type != requested && requested != unit {
            return None;
        }
        match_arguments(&self.params, args)
    }

    /// # Safety
    /// `args` must already be converted to exactly `params`, and `instance` must be an
    /// instance of the owning type for methods.
    pub(crate) unsafe fn call(
        &self,
        instance: Option<InstanceMut<'_>>,
        slot: &mut ReturnSlot<'_>,
        args: &[Argument<'_>],
    ) {
        (self.thunk)(instance, slot, args);
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}
