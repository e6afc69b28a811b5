//! CORSIKA IACT objects and event grouping

pub mod file;
pub mod objects;

pub use file::{IactEvent, IactEvents, IactFile};
pub use objects::{CorsikaEventHeader, CorsikaRunHeader, TelescopePositions};
