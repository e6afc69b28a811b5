//! Event assembly for sim_telarray files
//!
//! A sim_telarray file starts with run level metadata (history, run
//! headers, per-telescope descriptions) followed by a stream of MC showers,
//! MC events and array events. An array event is laid out as
//!
//! ```text
//! ArrayEvent[2010]
//!   TriggerInformation[2009]      first, carries the event id
//!   TelescopeEvent[2201..]        one per telescope with data
//!   TrackingPosition[2101..]      one per tracked telescope
//!   StereoReconstruction[2015]
//! ```

use crate::core::config::ReaderConfig;
use crate::core::{EventIoFile, EventIoObject, ObjectKind};
use crate::error::{EventIoError, Result};
use crate::simtel::objects::{check_kind, CameraSettings, HistoryEntry};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Object kinds describing a single telescope, keyed by the header id
pub const TELESCOPE_DESCRIPTION_KINDS: [ObjectKind; 7] = [
    ObjectKind::CameraSettings,
    ObjectKind::CameraOrganization,
    ObjectKind::PixelSettings,
    ObjectKind::DisabledPixels,
    ObjectKind::CameraSoftwareSettings,
    ObjectKind::DriveSettings,
    ObjectKind::PointingCorrection,
];

/// Options for event assembly
#[derive(Debug, Clone, Default)]
pub struct SimTelOptions {
    pub allowed_telescopes: Option<BTreeSet<u32>>,
    pub skip_calibration: bool,
}

impl From<&ReaderConfig> for SimTelOptions {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            allowed_telescopes: config.allowed_telescopes.clone(),
            skip_calibration: config.skip_calibration,
        }
    }
}

impl SimTelOptions {
    fn allows(&self, telescope_id: u32) -> bool {
        self.allowed_telescopes
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&telescope_id))
    }
}

/// Whether an event was triggered by a shower or a calibration source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Data,
    Calibration { calibration_type: u32 },
}

/// One assembled array event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    /// Trigger id for data events, negated array event id for calibration
    /// events so the two never collide
    pub event_id: i64,
    pub trigger: EventIoObject,
    pub telescope_events: BTreeMap<u32, EventIoObject>,
    pub tracking_positions: BTreeMap<u32, EventIoObject>,
    pub mc_shower: Option<EventIoObject>,
    pub mc_event: Option<EventIoObject>,
    /// CORSIKA photon data written with the same event id
    pub telescope_data: Option<EventIoObject>,
    pub photoelectron_sums: Option<EventIoObject>,
    /// Latest camera monitoring seen for each telescope of the event
    pub camera_monitorings: BTreeMap<u32, EventIoObject>,
    /// Latest laser calibration seen for each telescope of the event
    pub laser_calibrations: BTreeMap<u32, EventIoObject>,
}

impl Event {
    pub fn telescope_ids(&self) -> Vec<u32> {
        self.telescope_events.keys().copied().collect()
    }

    pub fn is_calibration(&self) -> bool {
        matches!(self.kind, EventKind::Calibration { .. })
    }
}

/// An MC event with its shower, independent of any triggered array event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McEvent {
    pub event_id: u32,
    pub mc_shower: Option<EventIoObject>,
    pub mc_event: EventIoObject,
    /// Photon data directly following the MC event
    pub telescope_data: Option<EventIoObject>,
}

struct ArrayEventParts {
    event_id: u32,
    trigger: EventIoObject,
    telescope_events: BTreeMap<u32, EventIoObject>,
    tracking_positions: BTreeMap<u32, EventIoObject>,
}

/// Split an array event into trigger, telescope events and tracking
/// positions, keeping only allowed telescopes
fn parse_array_event(array_event: &EventIoObject, options: &SimTelOptions) -> Result<ArrayEventParts> {
    check_kind(array_event, ObjectKind::ArrayEvent)?;

    let mut children = array_event.iter();
    let trigger = children.next().ok_or_else(|| EventIoError::Malformed {
        kind: ObjectKind::ArrayEvent.name().to_string(),
        reason: "no trigger information".to_string(),
    })?;
    check_kind(trigger, ObjectKind::TriggerInformation)?;

    let mut telescope_events = BTreeMap::new();
    let mut tracking_positions = BTreeMap::new();

    for object in children {
        match object.kind {
            ObjectKind::TelescopeEvent { telescope_id } if options.allows(telescope_id) => {
                telescope_events.insert(telescope_id, object.clone());
            }
            ObjectKind::TrackingPosition { telescope_id } if options.allows(telescope_id) => {
                tracking_positions.insert(telescope_id, object.clone());
            }
            _ => {}
        }
    }

    let missing: Vec<u32> = telescope_events
        .keys()
        .filter(|id| !tracking_positions.contains_key(*id))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(EventIoError::NoTrackingPositions(missing));
    }

    Ok(ArrayEventParts {
        event_id: trigger.id(),
        trigger: trigger.clone(),
        telescope_events,
        tracking_positions,
    })
}

fn is_run_metadata(kind: ObjectKind) -> bool {
    matches!(
        kind,
        ObjectKind::History | ObjectKind::RunHeader | ObjectKind::MCRunHeader
    ) || TELESCOPE_DESCRIPTION_KINDS.contains(&kind)
}

/// A sim_telarray file with its run level metadata
#[derive(Debug)]
pub struct SimTelFile {
    file: EventIoFile,
    options: SimTelOptions,
    history: Vec<HistoryEntry>,
    run_header: Option<EventIoObject>,
    mc_run_headers: Vec<EventIoObject>,
    camera_settings: BTreeMap<u32, CameraSettings>,
    telescope_descriptions: BTreeMap<u32, BTreeMap<String, EventIoObject>>,
}

impl SimTelFile {
    pub fn open<P: AsRef<Path>>(path: P, options: SimTelOptions) -> Result<Self> {
        Self::from_file(EventIoFile::open(path)?, options)
    }

    /// Read the run level metadata of an already opened file
    pub fn from_file(mut file: EventIoFile, options: SimTelOptions) -> Result<Self> {
        let mut history = Vec::new();
        let mut run_header = None;
        let mut mc_run_headers = Vec::new();
        let mut camera_settings = BTreeMap::new();
        let mut telescope_descriptions: BTreeMap<u32, BTreeMap<String, EventIoObject>> =
            BTreeMap::new();

        for index in 0..file.len() {
            let object = match file.get(index) {
                Some(object) if is_run_metadata(object.kind) => object.clone(),
                _ => continue,
            };
            match object.kind {
                ObjectKind::History => {
                    for sub in &object {
                        match sub.kind {
                            ObjectKind::HistoryCommandLine | ObjectKind::HistoryConfig => {
                                history.push(HistoryEntry::parse(&mut file, sub)?);
                            }
                            _ => warn!("Unexpected sub-object {} in {}, ignoring", sub, object),
                        }
                    }
                }
                ObjectKind::RunHeader => run_header = Some(object),
                ObjectKind::MCRunHeader => mc_run_headers.push(object),
                kind => {
                    let telescope_id = object.id();
                    if kind == ObjectKind::CameraSettings {
                        camera_settings.insert(telescope_id, CameraSettings::parse(&mut file, &object)?);
                    }
                    telescope_descriptions
                        .entry(telescope_id)
                        .or_default()
                        .insert(kind.snake_name(), object);
                }
            }
        }

        info!(
            "Found {} history entries and descriptions of {} telescopes",
            history.len(),
            telescope_descriptions.len()
        );

        Ok(Self {
            file,
            options,
            history,
            run_header,
            mc_run_headers,
            camera_settings,
            telescope_descriptions,
        })
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn run_header(&self) -> Option<&EventIoObject> {
        self.run_header.as_ref()
    }

    pub fn mc_run_headers(&self) -> &[EventIoObject] {
        &self.mc_run_headers
    }

    pub fn camera_settings(&self) -> &BTreeMap<u32, CameraSettings> {
        &self.camera_settings
    }

    pub fn telescope_descriptions(&self) -> &BTreeMap<u32, BTreeMap<String, EventIoObject>> {
        &self.telescope_descriptions
    }

    pub fn options(&self) -> &SimTelOptions {
        &self.options
    }

    /// The underlying file, for raw access to data fields
    pub fn file_mut(&mut self) -> &mut EventIoFile {
        &mut self.file
    }

    /// Iterate over the assembled array and calibration events
    pub fn events(&self) -> Events<'_> {
        Events {
            objects: self.file.objects(),
            options: &self.options,
            index: 0,
            current_mc_shower: None,
            current_mc_event: None,
            current_telescope_data: None,
            current_photoelectron_sums: None,
            camera_monitorings: BTreeMap::new(),
            laser_calibrations: BTreeMap::new(),
        }
    }

    /// Iterate over the MC events, triggered or not
    pub fn mc_events(&self) -> McEvents<'_> {
        McEvents {
            objects: self.file.objects(),
            index: 0,
            current_mc_shower: None,
        }
    }
}

/// Iterator over the MC events of a [`SimTelFile`]
pub struct McEvents<'a> {
    objects: &'a [EventIoObject],
    index: usize,
    current_mc_shower: Option<&'a EventIoObject>,
}

impl<'a> Iterator for McEvents<'a> {
    type Item = McEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let objects = self.objects;
        while let Some(object) = objects.get(self.index) {
            self.index += 1;
            match object.kind {
                ObjectKind::MCShower => self.current_mc_shower = Some(object),
                ObjectKind::MCEvent => {
                    let telescope_data = match objects.get(self.index) {
                        Some(next) if next.kind == ObjectKind::TelescopeData => {
                            self.index += 1;
                            Some(next.clone())
                        }
                        _ => None,
                    };
                    return Some(McEvent {
                        event_id: object.id(),
                        mc_shower: self.current_mc_shower.cloned(),
                        mc_event: object.clone(),
                        telescope_data,
                    });
                }
                _ => {}
            }
        }
        None
    }
}

/// Iterator over the events of a [`SimTelFile`]
pub struct Events<'a> {
    objects: &'a [EventIoObject],
    options: &'a SimTelOptions,
    index: usize,
    current_mc_shower: Option<&'a EventIoObject>,
    current_mc_event: Option<&'a EventIoObject>,
    current_telescope_data: Option<&'a EventIoObject>,
    current_photoelectron_sums: Option<&'a EventIoObject>,
    camera_monitorings: BTreeMap<u32, &'a EventIoObject>,
    laser_calibrations: BTreeMap<u32, &'a EventIoObject>,
}

/// Clone the entries of `latest` for the telescopes in `telescope_events`
fn for_telescopes(
    latest: &BTreeMap<u32, &EventIoObject>,
    telescope_events: &BTreeMap<u32, EventIoObject>,
) -> BTreeMap<u32, EventIoObject> {
    telescope_events
        .keys()
        .filter_map(|id| latest.get(id).map(|object| (*id, (*object).clone())))
        .collect()
}

fn matching_id(object: Option<&EventIoObject>, event_id: i64) -> Option<EventIoObject> {
    object.filter(|o| o.id() as i64 == event_id).cloned()
}

impl<'a> Events<'a> {
    fn build_data_event(&self, object: &EventIoObject) -> Result<Option<Event>> {
        let parts = parse_array_event(object, self.options)?;
        if self.options.allowed_telescopes.is_some() && parts.telescope_events.is_empty() {
            debug!("Dropping event {} without allowed telescopes", parts.event_id);
            return Ok(None);
        }

        let event_id = parts.event_id as i64;
        let (mc_shower, mc_event) = match self.current_mc_event {
            Some(mc_event) if mc_event.id() as i64 == event_id => {
                (self.current_mc_shower.cloned(), Some(mc_event.clone()))
            }
            _ => (None, None),
        };

        Ok(Some(Event {
            kind: EventKind::Data,
            event_id,
            trigger: parts.trigger,
            camera_monitorings: for_telescopes(&self.camera_monitorings, &parts.telescope_events),
            laser_calibrations: for_telescopes(&self.laser_calibrations, &parts.telescope_events),
            telescope_events: parts.telescope_events,
            tracking_positions: parts.tracking_positions,
            mc_shower,
            mc_event,
            telescope_data: matching_id(self.current_telescope_data, event_id),
            photoelectron_sums: matching_id(self.current_photoelectron_sums, event_id),
        }))
    }

    fn build_calibration_event(&self, object: &EventIoObject) -> Result<Option<Event>> {
        let array_event = object.get(0).ok_or_else(|| EventIoError::Malformed {
            kind: ObjectKind::CalibrationEvent.name().to_string(),
            reason: "no array event".to_string(),
        })?;
        let parts = parse_array_event(array_event, self.options)?;
        if self.options.allowed_telescopes.is_some() && parts.telescope_events.is_empty() {
            return Ok(None);
        }

        Ok(Some(Event {
            kind: EventKind::Calibration {
                calibration_type: object.id(),
            },
            event_id: -(array_event.id() as i64),
            trigger: parts.trigger,
            camera_monitorings: for_telescopes(&self.camera_monitorings, &parts.telescope_events),
            laser_calibrations: for_telescopes(&self.laser_calibrations, &parts.telescope_events),
            telescope_events: parts.telescope_events,
            tracking_positions: parts.tracking_positions,
            mc_shower: None,
            mc_event: None,
            telescope_data: None,
            photoelectron_sums: None,
        }))
    }
}

impl<'a> Iterator for Events<'a> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let objects = self.objects;
        while let Some(object) = objects.get(self.index) {
            self.index += 1;

            let built = match object.kind {
                ObjectKind::MCShower => {
                    self.current_mc_shower = Some(object);
                    continue;
                }
                ObjectKind::MCEvent => {
                    self.current_mc_event = Some(object);
                    continue;
                }
                ObjectKind::TelescopeData => {
                    self.current_telescope_data = Some(object);
                    continue;
                }
                ObjectKind::MCPhotoelectronSum => {
                    self.current_photoelectron_sums = Some(object);
                    continue;
                }
                ObjectKind::CameraMonitoring => {
                    self.camera_monitorings.insert(object.id(), object);
                    continue;
                }
                ObjectKind::LaserCalibration => {
                    self.laser_calibrations.insert(object.id(), object);
                    continue;
                }
                ObjectKind::ArrayEvent => self.build_data_event(object),
                ObjectKind::CalibrationEvent => {
                    if self.options.skip_calibration {
                        continue;
                    }
                    self.build_calibration_event(object)
                }
                ObjectKind::Unknown(object_type) => {
                    warn!(
                        "Unhandled object type {} ({}), skipping",
                        object_type, object
                    );
                    continue;
                }
                _ => {
                    debug!("Skipping {}", object);
                    continue;
                }
            };

            match built {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
