//! Transient argument and return-value slots for dynamic calls.

use std::marker::PhantomData;
use std::ptr::NonNull;

use smallvec::SmallVec;

use super::descriptor::{Conversion, Type};
use super::reflect::Reflect;
use super::registry::TypeRegistry;

/// One call argument: its runtime type and a pointer to the value.
#[derive(Clone, Copy, Debug)]
pub struct Argument<'a> {
    ty: Type,
    ptr: NonNull<u8>,
    _borrow: PhantomData<&'a ()>,
}

impl<'a> Argument<'a> {
    pub fn new<T: Reflect>(registry: &TypeRegistry, value: &'a T) -> Self {
        Self {
            ty: registry.get::<T>(),
            ptr: NonNull::from(value).cast(),
            _borrow: PhantomData,
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Clones the pointee out as `T`.
    ///
    /// # Safety
    /// `T` must be the Rust type behind this argument's descriptor.
    pub unsafe fn read<T: Clone>(&self) -> T {
        // SAFETY: forwarded caller contract.
        unsafe { self.ptr.cast::<T>().as_ref() }.clone()
    }
}

/// Values that can be passed positionally to `invoke`.
pub trait ArgumentList {
    fn arguments<'a>(&'a self, registry: &TypeRegistry) -> SmallVec<[Argument<'a>; 4]>;
}

impl ArgumentList for [Argument<'_>] {
    fn arguments<'a>(&'a self, _registry: &TypeRegistry) -> SmallVec<[Argument<'a>; 4]> {
        self.iter().copied().collect()
    }
}

impl<const N: usize> ArgumentList for [Argument<'_>; N] {
    fn arguments<'a>(&'a self, _registry: &TypeRegistry) -> SmallVec<[Argument<'a>; 4]> {
        self.iter().copied().collect()
    }
}

macro_rules! impl_argument_list {
    ($($arg:ident . $index:tt),*) => {
        impl<$($arg: Reflect,)*> ArgumentList for ($($arg,)*) {
            #[allow(unused_variables)]
            fn arguments<'a>(&'a self, registry: &TypeRegistry) -> SmallVec<[Argument<'a>; 4]> {
                SmallVec::from_iter([$(Argument::new(registry, &self.$index)),*])
            }
        }
    };
}

impl_argument_list!();
impl_argument_list!(A.0);
impl_argument_list!(A.0, B.1);
impl_argument_list!(A.0, B.1, C.2);
impl_argument_list!(A.0, B.1, C.2, D.3);
impl_argument_list!(A.0, B.1, C.2, D.3, E.4);
impl_argument_list!(A.0, B.1, C.2, D.3, E.4, F.5);

/// Matches each argument against its parameter; `None` if any position is not convertible.
pub(crate) fn match_arguments(
    params: &[Type],
    args: &[Argument<'_>],
) -> Option<SmallVec<[Conversion; 4]>> {
    if params.len() != args.len() {
        return None;
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| arg.ty.conversion_to(*param))
        .collect()
}

/// Applies matched conversions, so that every argument has exactly its parameter's type.
pub(crate) struct ConvertedArguments<'a> {
    args: SmallVec<[Argument<'a>; 4]>,
}

impl<'a> ConvertedArguments<'a> {
    /// `scratch` receives adjusted pointer values and must outlive the converted arguments.
    ///
    /// # Safety
    /// `conversions` must come from [`match_arguments`] for these `params` and `args`.
    pub(crate) unsafe fn new(
        params: &[Type],
        args: &[Argument<'a>],
        conversions: &[Conversion],
        scratch: &'a mut SmallVec<[*const u8; 4]>,
    ) -> Self {
        scratch.clear();
        for (arg, conversion) in args.iter().zip(conversions) {
            // SAFETY: pointer and reference arguments point at a pointer-sized value.
            let adjusted = match conversion {
                Conversion::Identity => arg.ptr.as_ptr().cast_const(),
                Conversion::Dereference => unsafe { arg.ptr.cast::<*const u8>().read() },
                Conversion::Upcast { offset } => unsafe {
                    arg.ptr.cast::<*const u8>().read().wrapping_add(*offset)
                },
            };
            scratch.push(adjusted);
        }
        let scratch: &'a SmallVec<[*const u8; 4]> = scratch;
        let args = params
            .iter()
            .zip(args)
            .zip(conversions)
            .enumerate()
            .map(|(index, ((param, arg), conversion))| {
                let ptr = match conversion {
                    Conversion::Identity => arg.ptr,
                    // SAFETY: references are never null.
                    Conversion::Dereference => unsafe {
                        NonNull::new_unchecked(scratch[index].cast_mut())
                    },
                    Conversion::Upcast { .. } => NonNull::from(&scratch[index]).cast(),
                };
                Argument {
                    ty: *param,
                    ptr,
                    _borrow: PhantomData,
                }
            })
            .collect();
        Self { args }
    }

    pub(crate) fn as_slice(&self) -> &[Argument<'a>] {
        &self.args
    }
}

/// Untyped destination for a call's result.
pub struct ReturnSlot<'a> {
    ty: Type,
    ptr: NonNull<u8>,
    _borrow: PhantomData<&'a mut ()>,
}

impl<'a> ReturnSlot<'a> {
    pub fn new<R: Reflect>(registry: &TypeRegistry, slot: &'a mut Option<R>) -> Self {
        Self {
            ty: registry.get::<R>(),
            ptr: NonNull::from(slot).cast(),
            _borrow: PhantomData,
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Writes `value` if the slot expects `produced`; a unit slot silently drops it.
    pub fn store<R: Reflect>(&mut self, value: R, produced: Type) {
        if self.ty != produced {
            return;
        }
        // SAFETY: descriptor identity means the slot is an `Option<R>`.
        unsafe { *self.ptr.cast::<Option<R>>().as_ptr() = Some(value) };
    }
}
