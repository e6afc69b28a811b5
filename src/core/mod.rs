//! Core EventIO container format
//!
//! This module decodes object headers, scans the object tree of a file and
//! gives access to the raw data fields.

pub mod config;
pub mod file;
pub mod header;
pub mod object;
pub mod reader;
pub mod registry;

pub use file::*;
pub use header::{Endianness, ObjectHeader};
pub use object::*;
pub use reader::*;
pub use registry::ObjectKind;
