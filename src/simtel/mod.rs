//! sim_telarray objects and event assembly

pub mod file;
pub mod objects;

pub use file::{Event, EventKind, Events, McEvent, McEvents, SimTelFile, SimTelOptions};
pub use objects::{CameraSettings, HistoryEntry, HistoryKind};
