//! Polymorphic instances that report their own runtime type.

use std::any::Any;

use super::descriptor::Type;
use super::reflect::Reflect;
use super::registry::TypeRegistry;

/// A value whose concrete reflected type is only known at runtime.
///
/// Implemented for every [`Reflect`] type. Call through `&dyn Object` to get the dynamic type;
/// calling on a `Box<dyn Object>` directly resolves to the box itself.
pub trait Object: Any {
    fn object_type(&self, registry: &TypeRegistry) -> Type;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Reflect> Object for T {
    fn object_type(&self, registry: &TypeRegistry) -> Type {
        registry.get::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Object {
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn downcast<T: Object>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }
}
