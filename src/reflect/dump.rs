//! Text rendering of a visit, used by `debug_dump`, `dump` and `log_out`.

use std::fmt::Write as _;

use super::descriptor::Type;
use super::enumeration::EnumValue;
use super::property::PropertyDescriptor;
use super::scalar::NumericValue;
use super::structure::StructureDescriptor;
use super::visitor::PropertyVisitor;

const INDENT: &str = "  ";

/// Collects one line per visited value, indented by nesting depth.
#[derive(Debug, Default)]
pub struct DumpVisitor {
    depth: usize,
    lines: Vec<String>,
}

impl DumpVisitor {
    pub fn new(indent: usize) -> Self {
        Self {
            depth: indent,
            lines: Vec::new(),
        }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let mut line = INDENT.repeat(self.depth);
        let _ = line.write_fmt(args);
        self.lines.push(line);
    }

    fn outdent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// All lines joined with trailing newlines.
    pub fn finish(self) -> String {
        let mut out = String::new();
        for line in self.lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl PropertyVisitor for DumpVisitor {
    fn begin_property(&mut self, property: &PropertyDescriptor) {
        if property.is_computed() {
            self.line(format_args!("NAME: {} COMPUTED", property.name()));
        } else {
            self.line(format_args!("NAME: {} OFFSET: {}", property.name(), property.offset()));
        }
        self.depth += 1;
    }

    fn end_property(&mut self, _property: &PropertyDescriptor) {
        self.outdent();
    }

    fn visit_number(&mut self, _property: &PropertyDescriptor, value: NumericValue) {
        self.line(format_args!("Number: {value}"));
    }

    fn visit_string(&mut self, _property: &PropertyDescriptor, value: &str) {
        self.line(format_args!("String: {value}"));
    }

    fn visit_enum(&mut self, _property: &PropertyDescriptor, value: EnumValue<'_>) {
        self.line(format_args!("Enum: {value}"));
    }

    fn visit_null(&mut self, _property: &PropertyDescriptor) {
        self.line(format_args!("NULL"));
    }

    fn begin_struct(&mut self, _property: &PropertyDescriptor, structure: &StructureDescriptor) {
        self.line(format_args!("STRUCT: {}", structure.name()));
        self.depth += 1;
    }

    fn end_struct(&mut self, _property: &PropertyDescriptor, _structure: &StructureDescriptor) {
        self.outdent();
    }

    fn begin_object(&mut self, _property: &PropertyDescriptor, dynamic: Type) {
        self.line(format_args!("OBJECT: {dynamic}"));
        self.depth += 1;
    }

    fn end_object(&mut self, _property: &PropertyDescriptor, _dynamic: Type) {
        self.outdent();
    }

    fn begin_array(&mut self, _property: &PropertyDescriptor, len: usize) {
        self.line(format_args!("ARRAY: size: {len}"));
        self.depth += 1;
    }

    fn begin_array_item(&mut self, _property: &PropertyDescriptor, index: usize) {
        self.line(format_args!("IDX: {index}"));
        self.depth += 1;
    }

    fn end_array_item(&mut self, _property: &PropertyDescriptor, _index: usize) {
        self.outdent();
    }

    fn end_array(&mut self, _property: &PropertyDescriptor) {
        self.outdent();
    }
}
