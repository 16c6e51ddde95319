//! Depth-first traversal of a structure's static layout, without an instance.

use std::fmt;

use smallvec::SmallVec;

use super::property::{PropertyDescriptor, PropertyKind};
use super::structure::StructureDescriptor;

/// Dotted member path from the walk root, e.g. `stats.health`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyPath {
    segments: SmallVec<[Box<str>; 4]>,
}

impl PropertyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push_member(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(name.into());
        next
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|segment| segment.as_ref())
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct WalkEntry<'s> {
    pub path: PropertyPath,
    pub property: &'s PropertyDescriptor,
    /// Byte offset from the root instance; `None` for computed properties.
    pub absolute_offset: Option<usize>,
}

struct CursorFrame<'s> {
    members: SmallVec<[(&'s PropertyDescriptor, usize); 8]>,
    index: usize,
    path: PropertyPath,
}

impl<'s> CursorFrame<'s> {
    fn new(structure: &'s StructureDescriptor, base: usize, path: PropertyPath) -> Self {
        let members = structure
            .lineage()
            .flat_map(|(level, offset)| {
                level
                    .properties()
                    .iter()
                    .map(move |property| (property, base + offset))
            })
            .collect();
        Self {
            members,
            index: 0,
            path,
        }
    }
}

/// Yields every property of a structure, its ancestors and its nested structures.
///
/// Arrays, optionals and object pointers are reported but not entered since their contents
/// only exist per instance.
pub struct PropertyWalker<'s> {
    stack: SmallVec<[CursorFrame<'s>; 4]>,
}

impl<'s> PropertyWalker<'s> {
    pub fn new(root: &'s StructureDescriptor) -> Self {
        let mut stack = SmallVec::new();
        stack.push(CursorFrame::new(root, 0, PropertyPath::root()));
        Self { stack }
    }
}

impl<'s> Iterator for PropertyWalker<'s> {
    type Item = WalkEntry<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.last_mut() {
            let Some(&(property, owner_base)) = frame.members.get(frame.index) else {
                self.stack.pop();
                continue;
            };
            frame.index += 1;
            let path = frame.path.push_member(property.name());
            if property.is_computed() {
                return Some(WalkEntry {
                    path,
                    property,
                    absolute_offset: None,
                });
            }
            let absolute = owner_base + property.offset();
            if matches!(property.kind(), PropertyKind::NestedStruct) {
                if let Some(nested) = property.ty().descriptor().structure() {
                    self.stack.push(CursorFrame::new(nested, absolute, path.clone()));
                }
            }
            return Some(WalkEntry {
                path,
                property,
                absolute_offset: Some(absolute),
            });
        }
        None
    }
}
