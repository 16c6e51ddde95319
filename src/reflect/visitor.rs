//! Callback surface for walking the values behind a structure's properties.

use super::descriptor::Type;
use super::enumeration::EnumValue;
use super::property::PropertyDescriptor;
use super::scalar::NumericValue;
use super::structure::StructureDescriptor;

/// Receives one callback per leaf plus bracketing hooks for composite values.
///
/// Every method defaults to a no-op. The per-width numeric callbacks forward to
/// [`PropertyVisitor::visit_number`], so a visitor that does not care about widths
/// only implements that one.
#[allow(unused_variables)]
pub trait PropertyVisitor {
    /// Called by a structure visit before each of its own properties.
    fn begin_property(&mut self, property: &PropertyDescriptor) {}
    fn end_property(&mut self, property: &PropertyDescriptor) {}

    fn visit_number(&mut self, property: &PropertyDescriptor, value: NumericValue) {}

    fn visit_bool(&mut self, property: &PropertyDescriptor, value: bool) {
        self.visit_number(property, NumericValue::Bool(value));
    }
    fn visit_u8(&mut self, property: &PropertyDescriptor, value: u8) {
        self.visit_number(property, NumericValue::U8(value));
    }
    fn visit_u16(&mut self, property: &PropertyDescriptor, value: u16) {
        self.visit_number(property, NumericValue::U16(value));
    }
    fn visit_u32(&mut self, property: &PropertyDescriptor, value: u32) {
        self.visit_number(property, NumericValue::U32(value));
    }
    fn visit_u64(&mut self, property: &PropertyDescriptor, value: u64) {
        self.visit_number(property, NumericValue::U64(value));
    }
    fn visit_usize(&mut self, property: &PropertyDescriptor, value: usize) {
        self.visit_number(property, NumericValue::Usize(value));
    }
    fn visit_i8(&mut self, property: &PropertyDescriptor, value: i8) {
        self.visit_number(property, NumericValue::I8(value));
    }
    fn visit_i16(&mut self, property: &PropertyDescriptor, value: i16) {
        self.visit_number(property, NumericValue::I16(value));
    }
    fn visit_i32(&mut self, property: &PropertyDescriptor, value: i32) {
        self.visit_number(property, NumericValue::I32(value));
    }
    fn visit_i64(&mut self, property: &PropertyDescriptor, value: i64) {
        self.visit_number(property, NumericValue::I64(value));
    }
    fn visit_isize(&mut self, property: &PropertyDescriptor, value: isize) {
        self.visit_number(property, NumericValue::Isize(value));
    }
    fn visit_f32(&mut self, property: &PropertyDescriptor, value: f32) {
        self.visit_number(property, NumericValue::F32(value));
    }
    fn visit_f64(&mut self, property: &PropertyDescriptor, value: f64) {
        self.visit_number(property, NumericValue::F64(value));
    }

    fn visit_string(&mut self, property: &PropertyDescriptor, value: &str) {}

    fn visit_enum(&mut self, property: &PropertyDescriptor, value: EnumValue<'_>) {}

    /// An empty optional.
    fn visit_null(&mut self, property: &PropertyDescriptor) {}

    fn begin_struct(&mut self, property: &PropertyDescriptor, structure: &StructureDescriptor) {}
    fn end_struct(&mut self, property: &PropertyDescriptor, structure: &StructureDescriptor) {}

    /// `dynamic` is the pointee's runtime type, not the field type.
    fn begin_object(&mut self, property: &PropertyDescriptor, dynamic: Type) {}
    fn end_object(&mut self, property: &PropertyDescriptor, dynamic: Type) {}

    fn begin_array(&mut self, property: &PropertyDescriptor, len: usize) {}
    fn begin_array_item(&mut self, property: &PropertyDescriptor, index: usize) {}
    fn end_array_item(&mut self, property: &PropertyDescriptor, index: usize) {}
    fn end_array(&mut self, property: &PropertyDescriptor) {}
}

/// Routes a numeric leaf to its width-specific callback.
pub(crate) fn dispatch_number(
    visitor: &mut dyn PropertyVisitor,
    property: &PropertyDescriptor,
    value: NumericValue,
) {
    match value {
        NumericValue::Bool(value) => visitor.visit_bool(property, value),
        NumericValue::U8(value) => visitor.visit_u8(property, value),
        NumericValue::U16(value) => visitor.visit_u16(property, value),
        NumericValue::U32(value) => visitor.visit_u32(property, value),
        NumericValue::U64(value) => visitor.visit_u64(property, value),
        NumericValue::Usize(value) => visitor.visit_usize(property, value),
        NumericValue::I8(value) => visitor.visit_i8(property, value),
        NumericValue::I16(value) => visitor.visit_i16(property, value),
        NumericValue::I32(value) => visitor.visit_i32(property, value),
        NumericValue::I64(value) => visitor.visit_i64(property, value),
        NumericValue::Isize(value) => visitor.visit_isize(property, value),
        NumericValue::F32(value) => visitor.visit_f32(property, value),
        NumericValue::F64(value) => visitor.visit_f64(property, value),
    }
}
