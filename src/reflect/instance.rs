//! Type-erased borrowed views over reflected values.

use std::any::TypeId as RustTypeId;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::descriptor::Type;
use super::object::Object;
use super::reflect::Reflect;
use super::registry::TypeRegistry;

/// Shared view of a value whose type is known only through its descriptor.
#[derive(Clone, Copy)]
pub struct Instance<'a> {
    ptr: NonNull<u8>,
    ty: Type,
    registry: &'a TypeRegistry,
    _borrow: PhantomData<&'a ()>,
}

impl<'a> Instance<'a> {
    pub fn new<T: Reflect>(registry: &'a TypeRegistry, value: &'a T) -> Self {
        Self {
            ptr: NonNull::from(value).cast(),
            ty: registry.get::<T>(),
            registry,
            _borrow: PhantomData,
        }
    }

    /// Views a polymorphic value through its dynamic type.
    pub fn from_object(registry: &'a TypeRegistry, object: &'a dyn Object) -> Self {
        Self {
            ptr: NonNull::from(object).cast(),
            ty: object.object_type(registry),
            registry,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must point to a live value of type `ty` that outlives `'a` and is not mutated
    /// for that lifetime.
    pub unsafe fn from_raw(registry: &'a TypeRegistry, ty: Type, ptr: NonNull<u8>) -> Self {
        Self {
            ptr,
            ty,
            registry,
            _borrow: PhantomData,
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// # Safety
    /// A value of type `ty` must live at `offset` bytes into this instance.
    pub unsafe fn field(self, offset: usize, ty: Type) -> Instance<'a> {
        // SAFETY: forwarded caller contract keeps the offset inside the allocation.
        let ptr = unsafe { self.ptr.add(offset) };
        Instance { ptr, ty, ..self }
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&'a T> {
        if self.ty.rust_type_id() != RustTypeId::of::<T>() {
            return None;
        }
        // SAFETY: the descriptor was produced by `T`, so the pointee is a `T`.
        Some(unsafe { self.ptr.cast::<T>().as_ref() })
    }
}

impl fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("ty", &self.ty)
            .field("ptr", &self.ptr)
            .finish()
    }
}

/// Exclusive counterpart of [`Instance`].
pub struct InstanceMut<'a> {
    ptr: NonNull<u8>,
    ty: Type,
    registry: &'a TypeRegistry,
    _borrow: PhantomData<&'a mut ()>,
}

impl<'a> InstanceMut<'a> {
    pub fn new<T: Reflect>(registry: &'a TypeRegistry, value: &'a mut T) -> Self {
        Self {
            ptr: NonNull::from(value).cast(),
            ty: registry.get::<T>(),
            registry,
            _borrow: PhantomData,
        }
    }

    pub fn from_object(registry: &'a TypeRegistry, object: &'a mut dyn Object) -> Self {
        let ty = (*object).object_type(registry);
        Self {
            ptr: NonNull::from(object).cast(),
            ty,
            registry,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must point to a live value of type `ty` that is exclusively borrowed for `'a`.
    pub unsafe fn from_raw(registry: &'a TypeRegistry, ty: Type, ptr: NonNull<u8>) -> Self {
        Self {
            ptr,
            ty,
            registry,
            _borrow: PhantomData,
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn reborrow(&mut self) -> InstanceMut<'_> {
        InstanceMut {
            ptr: self.ptr,
            ty: self.ty,
            registry: self.registry,
            _borrow: PhantomData,
        }
    }

    pub fn as_ref(&self) -> Instance<'_> {
        Instance {
            ptr: self.ptr,
            ty: self.ty,
            registry: self.registry,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    /// A value of type `ty` must live at `offset` bytes into this instance.
    pub unsafe fn field(self, offset: usize, ty: Type) -> InstanceMut<'a> {
        // SAFETY: forwarded caller contract keeps the offset inside the allocation.
        let ptr = unsafe { self.ptr.add(offset) };
        InstanceMut { ptr, ty, ..self }
    }

    pub fn downcast_mut<T: Reflect>(self) -> Option<&'a mut T> {
        if self.ty.rust_type_id() != RustTypeId::of::<T>() {
            return None;
        }
        // SAFETY: the descriptor was produced by `T` and the view holds the exclusive borrow.
        Some(unsafe { self.ptr.cast::<T>().as_mut() })
    }
}

impl fmt::Debug for InstanceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceMut")
            .field("ty", &self.ty)
            .field("ptr", &self.ptr)
            .finish()
    }
}
