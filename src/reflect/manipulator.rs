//! Type-erased strategies for dynamic arrays and single-value wrappers.

use std::marker::PhantomData;

use super::descriptor::Type;
use super::error::{ReflectError, ReflectResult};
use super::reflect::Reflect;

/// Operations on a growable sequence whose element type is erased.
///
/// Every method takes a pointer to the container itself, never to its buffer.
pub trait ArrayManipulator: Send + Sync {
    /// # Safety
    /// `container` must point to a live value of the container type this manipulator was built for.
    unsafe fn len(&self, container: *const u8) -> usize;

    /// # Safety
    /// See [`ArrayManipulator::len`].
    unsafe fn element(&self, container: *const u8, index: usize) -> Option<*const u8>;

    /// # Safety
    /// See [`ArrayManipulator::len`]; the container must also be exclusively borrowed.
    unsafe fn element_mut(&self, container: *mut u8, index: usize) -> Option<*mut u8>;

    /// Truncates or grows to `len`; growth default-constructs through the element factory.
    ///
    /// # Safety
    /// See [`ArrayManipulator::element_mut`].
    unsafe fn resize(&self, container: *mut u8, len: usize) -> ReflectResult<()>;
}

/// Operations on an owned or optional single value.
pub trait WrapManipulator: Send + Sync {
    /// # Safety
    /// `container` must point to a live value of the wrapper type this manipulator was built for.
    unsafe fn is_present(&self, container: *const u8) -> bool;

    /// # Safety
    /// See [`WrapManipulator::is_present`].
    unsafe fn value(&self, container: *const u8) -> Option<*const u8>;

    /// # Safety
    /// See [`WrapManipulator::is_present`]; the container must also be exclusively borrowed.
    unsafe fn value_mut(&self, container: *mut u8) -> Option<*mut u8>;

    /// Empties the wrapper; returns `false` when the wrapper cannot be empty.
    ///
    /// # Safety
    /// See [`WrapManipulator::value_mut`].
    unsafe fn clear(&self, container: *mut u8) -> bool;
}

pub struct VecManipulator<T> {
    element: Type,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> VecManipulator<T> {
    pub fn new(element: Type) -> Self {
        Self {
            element,
            _marker: PhantomData,
        }
    }

    fn construct(&self) -> ReflectResult<T> {
        let not_constructible = || ReflectError::NotConstructible {
            ty: self.element.name().to_string(),
        };
        let created = self.element.create_default().ok_or_else(not_constructible)?;
        created
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| not_constructible())
    }
}

impl<T: Reflect> ArrayManipulator for VecManipulator<T> {
    unsafe fn len(&self, container: *const u8) -> usize {
        // SAFETY: forwarded caller contract.
        unsafe { &*container.cast::<Vec<T>>() }.len()
    }

    unsafe fn element(&self, container: *const u8, index: usize) -> Option<*const u8> {
        // SAFETY: forwarded caller contract.
        let vec = unsafe { &*container.cast::<Vec<T>>() };
        vec.get(index).map(|item| (item as *const T).cast())
    }

    unsafe fn element_mut(&self, container: *mut u8, index: usize) -> Option<*mut u8> {
        // SAFETY: forwarded caller contract.
        let vec = unsafe { &mut *container.cast::<Vec<T>>() };
        vec.get_mut(index).map(|item| (item as *mut T).cast())
    }

    unsafe fn resize(&self, container: *mut u8, len: usize) -> ReflectResult<()> {
        // SAFETY: forwarded caller contract.
        let vec = unsafe { &mut *container.cast::<Vec<T>>() };
        if len <= vec.len() {
            vec.truncate(len);
            return Ok(());
        }
        let mut grown = Vec::with_capacity(len - vec.len());
        for _ in vec.len()..len {
            grown.push(self.construct()?);
        }
        vec.extend(grown);
        Ok(())
    }
}

pub struct OptionManipulator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> OptionManipulator<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for OptionManipulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> WrapManipulator for OptionManipulator<T> {
    unsafe fn is_present(&self, container: *const u8) -> bool {
        // SAFETY: forwarded caller contract.
        unsafe { &*container.cast::<Option<T>>() }.is_some()
    }

    unsafe fn value(&self, container: *const u8) -> Option<*const u8> {
        // SAFETY: forwarded caller contract.
        let option = unsafe { &*container.cast::<Option<T>>() };
        option.as_ref().map(|value| (value as *const T).cast())
    }

    unsafe fn value_mut(&self, container: *mut u8) -> Option<*mut u8> {
        // SAFETY: forwarded caller contract.
        let option = unsafe { &mut *container.cast::<Option<T>>() };
        option.as_mut().map(|value| (value as *mut T).cast())
    }

    unsafe fn clear(&self, container: *mut u8) -> bool {
        // SAFETY: forwarded caller contract.
        unsafe { &mut *container.cast::<Option<T>>() }.take();
        true
    }
}

pub struct BoxManipulator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BoxManipulator<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BoxManipulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> WrapManipulator for BoxManipulator<T> {
    unsafe fn is_present(&self, _container: *const u8) -> bool {
        true
    }

    unsafe fn value(&self, container: *const u8) -> Option<*const u8> {
        // SAFETY: forwarded caller contract.
        let boxed = unsafe { &*container.cast::<Box<T>>() };
        Some((boxed.as_ref() as *const T).cast())
    }

    unsafe fn value_mut(&self, container: *mut u8) -> Option<*mut u8> {
        // SAFETY: forwarded caller contract.
        let boxed = unsafe { &mut *container.cast::<Box<T>>() };
        Some((boxed.as_mut() as *mut T).cast())
    }

    unsafe fn clear(&self, _container: *mut u8) -> bool {
        false
    }
}
