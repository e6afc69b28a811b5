//! CLI output formatting

use crate::core::{EventIoFile, EventIoObject, ObjectKind};
use crate::iact::{CorsikaEventHeader, IactEvent};
use crate::simtel::{Event, EventKind, HistoryEntry, HistoryKind, McEvent};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");

/// Create a spinner shown while a file is scanned
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Indented lines of the object tree, down to `max_depth` if given
pub fn structure_lines(objects: &[EventIoObject], max_depth: Option<u32>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<&EventIoObject> = objects.iter().rev().collect();
    while let Some(object) = stack.pop() {
        if max_depth.is_some_and(|depth| object.header.level > depth) {
            continue;
        }
        let indent = " ".repeat(object.header.level as usize * 2);
        lines.push(format!("{}{}", indent, object));
        stack.extend(object.children.iter().rev());
    }
    lines
}

/// Per-type statistics over all objects of a file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInformation {
    #[serde(rename = "type")]
    pub object_type: u32,
    pub name: String,
    pub count: usize,
    pub total_length: u64,
    pub mean_length: f64,
    pub levels: BTreeSet<u32>,
}

/// Collect [`ObjectInformation`] for every type found, sorted by type
pub fn object_information(file: &EventIoFile) -> Vec<ObjectInformation> {
    let mut by_type: BTreeMap<u32, ObjectInformation> = BTreeMap::new();

    for object in file.iter().flat_map(|o| o.walk()) {
        let info = by_type
            .entry(object.object_type())
            .or_insert_with(|| ObjectInformation {
                object_type: object.object_type(),
                name: info_name(&object.kind),
                count: 0,
                total_length: 0,
                mean_length: 0.0,
                levels: BTreeSet::new(),
            });
        info.count += 1;
        info.total_length += object.header.length;
        info.levels.insert(object.header.level);
    }

    by_type
        .into_values()
        .map(|mut info| {
            info.mean_length = info.total_length as f64 / info.count as f64;
            info
        })
        .collect()
}

fn info_name(kind: &ObjectKind) -> String {
    match kind.telescope_id() {
        Some(telescope_id) => format!("{}[{}]", kind.name(), telescope_id),
        None => kind.name().to_string(),
    }
}

/// Format the object information as an aligned table
pub fn format_object_information(rows: &[ObjectInformation]) -> String {
    let mut out = format!(
        "{:>6}  {:<28} {:>8} {:>14} {:>12}  {}\n",
        "type", "name", "count", "total bytes", "mean bytes", "levels"
    );
    for row in rows {
        let levels: Vec<String> = row.levels.iter().map(|l| l.to_string()).collect();
        out.push_str(&format!(
            "{:>6}  {:<28} {:>8} {:>14} {:>12.1}  {}\n",
            row.object_type,
            row.name,
            row.count,
            row.total_length,
            row.mean_length,
            levels.join(",")
        ));
    }
    out
}

/// Format a history entry for display
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    let kind = match entry.kind {
        HistoryKind::CommandLine => style("cmdline").cyan().to_string(),
        HistoryKind::Config => style("config ").dim().to_string(),
    };
    let time = entry
        .time
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| entry.timestamp.to_string());
    format!("{} {} {}", style(time).dim(), kind, entry.text)
}

/// Compact, serializable view of an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub kind: EventKind,
    pub event_id: i64,
    pub telescopes: Vec<u32>,
    pub has_mc_shower: bool,
    pub has_mc_event: bool,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            kind: event.kind,
            event_id: event.event_id,
            telescopes: event.telescope_ids(),
            has_mc_shower: event.mc_shower.is_some(),
            has_mc_event: event.mc_event.is_some(),
        }
    }
}

/// Format an event for display
pub fn format_event(summary: &EventSummary) -> String {
    let kind = match summary.kind {
        EventKind::Data => style("data").green().to_string(),
        EventKind::Calibration { calibration_type } => {
            style(format!("calibration({})", calibration_type)).yellow().to_string()
        }
    };
    let telescopes: Vec<String> = summary.telescopes.iter().map(|t| t.to_string()).collect();
    let mc = if summary.has_mc_event { "mc" } else { "-" };
    format!(
        "{:>10} {} telescopes=[{}] {}",
        summary.event_id,
        kind,
        telescopes.join(","),
        style(mc).dim()
    )
}

/// Compact, serializable view of an MC event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McEventSummary {
    pub event_id: u32,
    pub mc_shower_id: Option<u32>,
    pub has_telescope_data: bool,
}

impl From<&McEvent> for McEventSummary {
    fn from(event: &McEvent) -> Self {
        Self {
            event_id: event.event_id,
            mc_shower_id: event.mc_shower.as_ref().map(EventIoObject::id),
            has_telescope_data: event.telescope_data.is_some(),
        }
    }
}

pub fn format_mc_event(summary: &McEventSummary) -> String {
    let shower = summary
        .mc_shower_id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let photons = if summary.has_telescope_data { "photons" } else { "-" };
    format!(
        "{:>10} shower={} {}",
        summary.event_id,
        shower,
        style(photons).dim()
    )
}

/// Compact, serializable view of one reuse of a CORSIKA shower
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IactEventSummary {
    pub event_id: u32,
    pub reuse: u32,
    pub photon_bunches: usize,
    pub total_energy: f32,
    pub zenith_angle: f32,
    pub azimuth_angle: f32,
}

impl IactEventSummary {
    pub fn new(event: &IactEvent, header: &CorsikaEventHeader) -> Self {
        Self {
            event_id: event.event_id,
            reuse: event.reuse,
            photon_bunches: event.photon_bunches().len(),
            total_energy: header.total_energy,
            zenith_angle: header.zenith_angle,
            azimuth_angle: header.azimuth_angle,
        }
    }
}

pub fn format_iact_event(summary: &IactEventSummary) -> String {
    format!(
        "{:>8} reuse={} energy={:.3} GeV zenith={:.4} azimuth={:.4} bunches={}",
        summary.event_id,
        summary.reuse,
        summary.total_energy,
        summary.zenith_angle,
        summary.azimuth_angle,
        style(summary.photon_bunches).cyan()
    )
}
