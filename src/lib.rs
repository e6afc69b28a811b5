//! eventio - read-only access to EventIO files (sim_telarray, CORSIKA IACT)

pub mod cli;
pub mod core;
pub mod error;
pub mod iact;
pub mod simtel;

// Re-export commonly used types
pub use crate::core::{EventIoFile, EventIoObject, ObjectHeader, ObjectKind, ObjectReader};
pub use crate::core::config::ReaderConfig;
pub use error::{EventIoError, Result};
pub use iact::{IactEvent, IactFile};
pub use simtel::{Event, EventKind, McEvent, SimTelFile, SimTelOptions};
