//! Numeric leaf values and enum discriminant storage widths.

use std::fmt;

use super::descriptor::TypeTraits;
use super::reflect::Reflect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    Usize,
    I8,
    I16,
    I32,
    I64,
    Isize,
    F32,
    F64,
}

impl NumericKind {
    pub fn byte_size(self) -> usize {
        match self {
            NumericKind::Bool | NumericKind::U8 | NumericKind::I8 => 1,
            NumericKind::U16 | NumericKind::I16 => 2,
            NumericKind::U32 | NumericKind::I32 | NumericKind::F32 => 4,
            NumericKind::U64 | NumericKind::I64 | NumericKind::F64 => 8,
            NumericKind::Usize | NumericKind::Isize => size_of::<usize>(),
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            NumericKind::I8
                | NumericKind::I16
                | NumericKind::I32
                | NumericKind::I64
                | NumericKind::Isize
                | NumericKind::F32
                | NumericKind::F64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, NumericKind::F32 | NumericKind::F64)
    }

    /// Trait bits every type of this kind carries.
    pub fn traits(self) -> TypeTraits {
        let mut traits = TypeTraits::ARITHMETIC;
        match self {
            NumericKind::Bool => traits |= TypeTraits::BOOLEAN | TypeTraits::INTEGRAL,
            NumericKind::F32 | NumericKind::F64 => traits |= TypeTraits::FLOATING,
            _ => traits |= TypeTraits::INTEGRAL,
        }
        if self.is_signed() {
            traits |= TypeTraits::SIGNED;
        }
        traits
    }

    /// Reads a value of this kind.
    ///
    /// # Safety
    /// `ptr` must point to a live, aligned value of the Rust type matching this kind.
    pub(crate) unsafe fn read(self, ptr: *const u8) -> NumericValue {
        // SAFETY: the caller guarantees the pointee type matches `self`.
        unsafe {
            match self {
                NumericKind::Bool => NumericValue::Bool(ptr.cast::<bool>().read()),
                NumericKind::U8 => NumericValue::U8(ptr.read()),
                NumericKind::U16 => NumericValue::U16(ptr.cast::<u16>().read()),
                NumericKind::U32 => NumericValue::U32(ptr.cast::<u32>().read()),
                NumericKind::U64 => NumericValue::U64(ptr.cast::<u64>().read()),
                NumericKind::Usize => NumericValue::Usize(ptr.cast::<usize>().read()),
                NumericKind::I8 => NumericValue::I8(ptr.cast::<i8>().read()),
                NumericKind::I16 => NumericValue::I16(ptr.cast::<i16>().read()),
                NumericKind::I32 => NumericValue::I32(ptr.cast::<i32>().read()),
                NumericKind::I64 => NumericValue::I64(ptr.cast::<i64>().read()),
                NumericKind::Isize => NumericValue::Isize(ptr.cast::<isize>().read()),
                NumericKind::F32 => NumericValue::F32(ptr.cast::<f32>().read()),
                NumericKind::F64 => NumericValue::F64(ptr.cast::<f64>().read()),
            }
        }
    }
}

/// A numeric leaf copied out of an instance or produced by an accessor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    F32(f32),
    F64(f64),
}

impl NumericValue {
    pub fn kind(&self) -> NumericKind {
        match self {
            NumericValue::Bool(_) => NumericKind::Bool,
            NumericValue::U8(_) => NumericKind::U8,
            NumericValue::U16(_) => NumericKind::U16,
            NumericValue::U32(_) => NumericKind::U32,
            NumericValue::U64(_) => NumericKind::U64,
            NumericValue::Usize(_) => NumericKind::Usize,
            NumericValue::I8(_) => NumericKind::I8,
            NumericValue::I16(_) => NumericKind::I16,
            NumericValue::I32(_) => NumericKind::I32,
            NumericValue::I64(_) => NumericKind::I64,
            NumericValue::Isize(_) => NumericKind::Isize,
            NumericValue::F32(_) => NumericKind::F32,
            NumericValue::F64(_) => NumericKind::F64,
        }
    }

    /// Lossy widening used by tooling that only cares about magnitude.
    pub fn as_f64(&self) -> f64 {
        match *self {
            NumericValue::Bool(value) => f64::from(u8::from(value)),
            NumericValue::U8(value) => f64::from(value),
            NumericValue::U16(value) => f64::from(value),
            NumericValue::U32(value) => f64::from(value),
            NumericValue::U64(value) => value as f64,
            NumericValue::Usize(value) => value as f64,
            NumericValue::I8(value) => f64::from(value),
            NumericValue::I16(value) => f64::from(value),
            NumericValue::I32(value) => f64::from(value),
            NumericValue::I64(value) => value as f64,
            NumericValue::Isize(value) => value as f64,
            NumericValue::F32(value) => f64::from(value),
            NumericValue::F64(value) => value,
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Bool(value) => write!(f, "{value}"),
            NumericValue::U8(value) => write!(f, "{value}"),
            NumericValue::U16(value) => write!(f, "{value}"),
            NumericValue::U32(value) => write!(f, "{value}"),
            NumericValue::U64(value) => write!(f, "{value}"),
            NumericValue::Usize(value) => write!(f, "{value}"),
            NumericValue::I8(value) => write!(f, "{value}"),
            NumericValue::I16(value) => write!(f, "{value}"),
            NumericValue::I32(value) => write!(f, "{value}"),
            NumericValue::I64(value) => write!(f, "{value}"),
            NumericValue::Isize(value) => write!(f, "{value}"),
            NumericValue::F32(value) => write!(f, "{value}"),
            NumericValue::F64(value) => write!(f, "{value}"),
        }
    }
}

/// Rust primitives that can back a numeric property.
pub trait Numeric: Reflect + Copy {
    const KIND: NumericKind;

    fn into_value(self) -> NumericValue;
}

/// Storage width of a fieldless enum's discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntRepr {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntRepr {
    pub fn byte_size(self) -> usize {
        match self {
            IntRepr::I8 | IntRepr::U8 => 1,
            IntRepr::I16 | IntRepr::U16 => 2,
            IntRepr::I32 | IntRepr::U32 => 4,
            IntRepr::I64 | IntRepr::U64 => 8,
        }
    }

    /// # Safety
    /// `ptr` must point to a live enum declared with this `#[repr]`.
    pub(crate) unsafe fn read(self, ptr: *const u8) -> i64 {
        // SAFETY: the caller guarantees the discriminant width.
        unsafe {
            match self {
                IntRepr::I8 => i64::from(ptr.cast::<i8>().read()),
                IntRepr::I16 => i64::from(ptr.cast::<i16>().read()),
                IntRepr::I32 => i64::from(ptr.cast::<i32>().read()),
                IntRepr::I64 => ptr.cast::<i64>().read(),
                IntRepr::U8 => i64::from(ptr.read()),
                IntRepr::U16 => i64::from(ptr.cast::<u16>().read()),
                IntRepr::U32 => i64::from(ptr.cast::<u32>().read()),
                IntRepr::U64 => ptr.cast::<u64>().read() as i64,
            }
        }
    }

    /// # Safety
    /// `ptr` must point to a live enum declared with this `#[repr]` and `raw` must be the
    /// discriminant of one of its variants.
    pub(crate) unsafe fn write(self, ptr: *mut u8, raw: i64) {
        // SAFETY: the caller guarantees the width and that `raw` names a real variant.
        unsafe {
            match self {
                IntRepr::I8 => ptr.cast::<i8>().write(raw as i8),
                IntRepr::I16 => ptr.cast::<i16>().write(raw as i16),
                IntRepr::I32 => ptr.cast::<i32>().write(raw as i32),
                IntRepr::I64 => ptr.cast::<i64>().write(raw),
                IntRepr::U8 => ptr.write(raw as u8),
                IntRepr::U16 => ptr.cast::<u16>().write(raw as u16),
                IntRepr::U32 => ptr.cast::<u32>().write(raw as u32),
                IntRepr::U64 => ptr.cast::<u64>().write(raw as u64),
            }
        }
    }
}

/// Integer types usable as `#[repr(..)]` of a reflected enum.
pub trait EnumRepr: Copy {
    const REPR: IntRepr;
}

macro_rules! impl_enum_repr {
    ($($ty:ty => $repr:ident),* $(,)?) => {
        $(
            impl EnumRepr for $ty {
                const REPR: IntRepr = IntRepr::$repr;
            }
        )*
    };
}

impl_enum_repr!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);
