//! Object tree
//!
//! An object is a header plus a data field. The data field is an opaque
//! payload, a list of sub-objects, or both. Sub-objects are scanned when the
//! header says the object only contains sub-objects.

use crate::core::header::ObjectHeader;
use crate::core::registry::ObjectKind;
use serde::Serialize;
use std::fmt;

/// One object of an EventIO file, with its sub-objects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventIoObject {
    pub header: ObjectHeader,
    /// Absolute offset of the first header byte (the sync marker for
    /// top-level objects)
    pub first_byte: u64,
    pub kind: ObjectKind,
    pub children: Vec<EventIoObject>,
}

impl EventIoObject {
    pub fn new(header: ObjectHeader, first_byte: u64, children: Vec<EventIoObject>) -> Self {
        let kind = ObjectKind::from_type(header.object_type);
        Self {
            header,
            first_byte,
            kind,
            children,
        }
    }

    pub fn object_type(&self) -> u32 {
        self.header.object_type
    }

    pub fn id(&self) -> u32 {
        self.header.id
    }

    pub fn is_container(&self) -> bool {
        self.header.only_sub_objects
    }

    /// Number of sub-objects
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&EventIoObject> {
        self.children.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventIoObject> {
        self.children.iter()
    }

    pub fn telescope_id(&self) -> Option<u32> {
        self.kind.telescope_id()
    }

    /// Depth-first walk over this object and all of its descendants
    pub fn walk(&self) -> Vec<&EventIoObject> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(object) = stack.pop() {
            out.push(object);
            stack.extend(object.children.iter().rev());
        }
        out
    }
}

impl<'a> IntoIterator for &'a EventIoObject {
    type Item = &'a EventIoObject;
    type IntoIter = std::slice::Iter<'a, EventIoObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl fmt::Display for EventIoObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if self.kind.shows_type() {
            write!(f, "[{}]", self.header.object_type)?;
        }
        write!(f, "(")?;
        if let Some(telescope_id) = self.telescope_id() {
            write!(f, "telescope_id={}, ", telescope_id)?;
        }
        write!(f, "first={}, length={}", self.first_byte, self.header.length)?;
        if !self.children.is_empty() {
            write!(f, ", subitems={}", self.children.len())?;
        }
        write!(f, ")")
    }
}
