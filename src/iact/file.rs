//! Event grouping for CORSIKA IACT files
//!
//! A CORSIKA IACT file holds the run header, input card and telescope
//! definition, then one block per shower:
//!
//! ```text
//! IactEventHeader[1202]
//! ArrayOffsets[1203]
//! TelescopeData[1204]      one per reuse of the shower
//!   Photons[1205]          one per telescope
//! Longitudinal[1211]       optional
//! IactEventEnd[1209]
//! ```
//!
//! Every reuse of a shower becomes its own [`IactEvent`].

use crate::core::{EventIoFile, EventIoObject, ObjectKind};
use crate::error::Result;
use crate::iact::objects::{CorsikaEventHeader, CorsikaRunHeader, TelescopePositions};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, info, warn};

/// One reuse of a CORSIKA shower
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IactEvent {
    pub event_id: u32,
    /// 1-based reuse number
    pub reuse: u32,
    pub header: EventIoObject,
    pub array_offsets: Option<EventIoObject>,
    pub telescope_data: Option<EventIoObject>,
    pub longitudinal: Option<EventIoObject>,
    pub end: Option<EventIoObject>,
}

impl IactEvent {
    /// Photon bunch objects, one per telescope
    pub fn photon_bunches(&self) -> Vec<&EventIoObject> {
        self.telescope_data
            .iter()
            .flat_map(|data| data.iter())
            .filter(|o| o.kind == ObjectKind::Photons)
            .collect()
    }
}

fn is_run_level(kind: ObjectKind) -> bool {
    matches!(
        kind,
        ObjectKind::IactRunHeader
            | ObjectKind::TelescopeDefinition
            | ObjectKind::InputCard
            | ObjectKind::IactRunEnd
    )
}

/// A CORSIKA IACT file with its run level metadata
#[derive(Debug)]
pub struct IactFile {
    file: EventIoFile,
    run_header: Option<CorsikaRunHeader>,
    input_card: Option<EventIoObject>,
    telescope_positions: Option<TelescopePositions>,
    run_end: Option<EventIoObject>,
}

impl IactFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file(EventIoFile::open(path)?)
    }

    pub fn from_file(mut file: EventIoFile) -> Result<Self> {
        let mut run_header = None;
        let mut input_card = None;
        let mut telescope_positions = None;
        let mut run_end = None;

        for index in 0..file.len() {
            let object = match file.get(index) {
                Some(object) if is_run_level(object.kind) => object.clone(),
                _ => continue,
            };
            match object.kind {
                ObjectKind::IactRunHeader => {
                    run_header = Some(CorsikaRunHeader::parse(&mut file, &object)?);
                }
                ObjectKind::TelescopeDefinition => {
                    telescope_positions = Some(TelescopePositions::parse(&mut file, &object)?);
                }
                ObjectKind::InputCard => input_card = Some(object),
                _ => run_end = Some(object),
            }
        }

        if run_header.is_none() {
            warn!("No CORSIKA run header found");
        }
        info!(
            "CORSIKA run with {} telescopes",
            telescope_positions.as_ref().map_or(0, TelescopePositions::len)
        );

        Ok(Self {
            file,
            run_header,
            input_card,
            telescope_positions,
            run_end,
        })
    }

    pub fn run_header(&self) -> Option<&CorsikaRunHeader> {
        self.run_header.as_ref()
    }

    pub fn input_card(&self) -> Option<&EventIoObject> {
        self.input_card.as_ref()
    }

    pub fn telescope_positions(&self) -> Option<&TelescopePositions> {
        self.telescope_positions.as_ref()
    }

    pub fn n_telescopes(&self) -> usize {
        self.telescope_positions
            .as_ref()
            .map_or(0, TelescopePositions::len)
    }

    pub fn run_end(&self) -> Option<&EventIoObject> {
        self.run_end.as_ref()
    }

    pub fn file_mut(&mut self) -> &mut EventIoFile {
        &mut self.file
    }

    /// Decode the CORSIKA event header of an event
    pub fn event_header(&mut self, event: &IactEvent) -> Result<CorsikaEventHeader> {
        CorsikaEventHeader::parse(&mut self.file, &event.header)
    }

    pub fn events(&self) -> IactEvents<'_> {
        IactEvents {
            objects: self.file.objects(),
            index: 0,
            pending: VecDeque::new(),
        }
    }
}

/// Iterator over the events of an [`IactFile`]
pub struct IactEvents<'a> {
    objects: &'a [EventIoObject],
    index: usize,
    pending: VecDeque<IactEvent>,
}

impl<'a> IactEvents<'a> {
    /// Collect the block that starts with `header` into one event per reuse
    fn read_shower(&mut self, header: &'a EventIoObject) {
        let mut array_offsets = None;
        let mut telescope_data = Vec::new();
        let mut longitudinal = None;
        let mut end = None;

        let objects = self.objects;
        while let Some(object) = objects.get(self.index) {
            match object.kind {
                ObjectKind::IactEventHeader | ObjectKind::IactRunEnd => break,
                ObjectKind::ArrayOffsets => array_offsets = Some(object),
                ObjectKind::TelescopeData => telescope_data.push(object),
                ObjectKind::Longitudinal => longitudinal = Some(object),
                ObjectKind::IactEventEnd => {
                    end = Some(object);
                    self.index += 1;
                    break;
                }
                _ => debug!("Skipping {} in event {}", object, header.id()),
            }
            self.index += 1;
        }

        let event = |reuse: u32, data: Option<&EventIoObject>| IactEvent {
            event_id: header.id(),
            reuse,
            header: header.clone(),
            array_offsets: array_offsets.cloned(),
            telescope_data: data.cloned(),
            longitudinal: longitudinal.cloned(),
            end: end.cloned(),
        };

        if telescope_data.is_empty() {
            self.pending.push_back(event(1, None));
        }
        for (i, data) in telescope_data.into_iter().enumerate() {
            self.pending.push_back(event(i as u32 + 1, Some(data)));
        }
    }
}

impl<'a> Iterator for IactEvents<'a> {
    type Item = IactEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let objects = self.objects;
            let object = objects.get(self.index)?;
            self.index += 1;
            if object.kind == ObjectKind::IactEventHeader {
                self.read_shower(object);
            }
        }
    }
}
