//! Known object types
//!
//! Maps EventIO type numbers to named kinds. Tracking positions and
//! telescope events have no single type number: the telescope id is folded
//! into the type as `base + id % 100 + 1000 * (id / 100)`, so type 2105 is
//! the tracking position of telescope 5 and 3105 the one of telescope 105.

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Type base for per-telescope tracking positions
pub const TRACKING_POSITION_BASE: u32 = 2100;

/// Type base for per-telescope events
pub const TELESCOPE_EVENT_BASE: u32 = 2200;

/// Largest telescope id that fits the type encoding
pub const MAX_TELESCOPE_ID: u32 = 999;

/// Convert a telescope-coded type number back to the telescope id
pub fn type_to_telescope_id(object_type: u32, base: u32) -> u32 {
    let offset = object_type - base;
    100 * (offset / 1000) + offset % 1000
}

/// Fold a telescope id into a type number
pub fn telescope_id_to_type(telescope_id: u32, base: u32) -> u32 {
    base + telescope_id % 100 + 1000 * (telescope_id / 100)
}

fn coded_telescope_id(object_type: u32, base: u32) -> Option<u32> {
    let max_type = telescope_id_to_type(MAX_TELESCOPE_ID, base);
    if object_type < base || object_type > max_type {
        return None;
    }
    if (object_type - base) % 1000 >= 100 {
        return None;
    }
    Some(type_to_telescope_id(object_type, base))
}

/// Kind of an EventIO object, derived from its type number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Histograms,

    // history
    History,
    HistoryCommandLine,
    HistoryConfig,

    // CORSIKA IACT
    IactRunHeader,
    TelescopeDefinition,
    IactEventHeader,
    ArrayOffsets,
    TelescopeData,
    Photons,
    CameraLayout,
    TriggerTime,
    PhotoElectrons,
    IactEventEnd,
    IactRunEnd,
    Longitudinal,
    InputCard,

    // sim_telarray
    RunHeader,
    MCRunHeader,
    CameraSettings,
    CameraOrganization,
    PixelSettings,
    DisabledPixels,
    CameraSoftwareSettings,
    PointingCorrection,
    DriveSettings,
    TriggerInformation,
    ArrayEvent,
    TelescopeEventHeader,
    ADCSums,
    ADCSamples,
    ImageParameters,
    StereoReconstruction,
    PixelTiming,
    PixelCalibration,
    MCShower,
    MCEvent,
    CameraMonitoring,
    LaserCalibration,
    RunStatistics,
    MCRunStatistics,
    MCPhotoelectronSum,
    PixelList,
    CalibrationEvent,
    TrackingPosition { telescope_id: u32 },
    TelescopeEvent { telescope_id: u32 },

    Unknown(u32),
}

impl ObjectKind {
    /// Look up the kind for a type number
    pub fn from_type(object_type: u32) -> Self {
        use ObjectKind::*;
        match object_type {
            70 => History,
            71 => HistoryCommandLine,
            72 => HistoryConfig,
            100 => Histograms,
            1200 => IactRunHeader,
            1201 => TelescopeDefinition,
            1202 => IactEventHeader,
            1203 => ArrayOffsets,
            1204 => TelescopeData,
            1205 => Photons,
            1206 => CameraLayout,
            1207 => TriggerTime,
            1208 => PhotoElectrons,
            1209 => IactEventEnd,
            1210 => IactRunEnd,
            1211 => Longitudinal,
            1212 => InputCard,
            2000 => RunHeader,
            2001 => MCRunHeader,
            2002 => CameraSettings,
            2003 => CameraOrganization,
            2004 => PixelSettings,
            2005 => DisabledPixels,
            2006 => CameraSoftwareSettings,
            2007 => PointingCorrection,
            2008 => DriveSettings,
            2009 => TriggerInformation,
            2010 => ArrayEvent,
            2011 => TelescopeEventHeader,
            2012 => ADCSums,
            2013 => ADCSamples,
            2014 => ImageParameters,
            2015 => StereoReconstruction,
            2016 => PixelTiming,
            2017 => PixelCalibration,
            2020 => MCShower,
            2021 => MCEvent,
            2022 => CameraMonitoring,
            2023 => LaserCalibration,
            2024 => RunStatistics,
            2025 => MCRunStatistics,
            2026 => MCPhotoelectronSum,
            2027 => PixelList,
            2028 => CalibrationEvent,
            t => {
                if let Some(telescope_id) = coded_telescope_id(t, TRACKING_POSITION_BASE) {
                    TrackingPosition { telescope_id }
                } else if let Some(telescope_id) = coded_telescope_id(t, TELESCOPE_EVENT_BASE) {
                    TelescopeEvent { telescope_id }
                } else {
                    Unknown(t)
                }
            }
        }
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        use ObjectKind::*;
        match self {
            Histograms => "Histograms",
            History => "History",
            HistoryCommandLine => "HistoryCommandLine",
            HistoryConfig => "HistoryConfig",
            IactRunHeader => "IactRunHeader",
            TelescopeDefinition => "TelescopeDefinition",
            IactEventHeader => "IactEventHeader",
            ArrayOffsets => "ArrayOffsets",
            TelescopeData => "TelescopeData",
            Photons => "Photons",
            CameraLayout => "CameraLayout",
            TriggerTime => "TriggerTime",
            PhotoElectrons => "PhotoElectrons",
            IactEventEnd => "IactEventEnd",
            IactRunEnd => "IactRunEnd",
            Longitudinal => "Longitudinal",
            InputCard => "InputCard",
            RunHeader => "RunHeader",
            MCRunHeader => "MCRunHeader",
            CameraSettings => "CameraSettings",
            CameraOrganization => "CameraOrganization",
            PixelSettings => "PixelSettings",
            DisabledPixels => "DisabledPixels",
            CameraSoftwareSettings => "CameraSoftwareSettings",
            PointingCorrection => "PointingCorrection",
            DriveSettings => "DriveSettings",
            TriggerInformation => "TriggerInformation",
            ArrayEvent => "ArrayEvent",
            TelescopeEventHeader => "TelescopeEventHeader",
            ADCSums => "ADCSums",
            ADCSamples => "ADCSamples",
            ImageParameters => "ImageParameters",
            StereoReconstruction => "StereoReconstruction",
            PixelTiming => "PixelTiming",
            PixelCalibration => "PixelCalibration",
            MCShower => "MCShower",
            MCEvent => "MCEvent",
            CameraMonitoring => "CameraMonitoring",
            LaserCalibration => "LaserCalibration",
            RunStatistics => "RunStatistics",
            MCRunStatistics => "MCRunStatistics",
            MCPhotoelectronSum => "MCPhotoelectronSum",
            PixelList => "PixelList",
            CalibrationEvent => "CalibrationEvent",
            TrackingPosition { .. } => "TrackingPosition",
            TelescopeEvent { .. } => "TelescopeEvent",
            Unknown(_) => "UnknownObject",
        }
    }

    /// Name converted to snake_case, e.g. `camera_settings`
    pub fn snake_name(&self) -> String {
        camel_to_snake(self.name())
    }

    /// Telescope id for kinds that encode one in their type number
    pub fn telescope_id(&self) -> Option<u32> {
        match self {
            ObjectKind::TrackingPosition { telescope_id }
            | ObjectKind::TelescopeEvent { telescope_id } => Some(*telescope_id),
            _ => None,
        }
    }

    /// Whether the type number alone does not identify the kind
    pub fn shows_type(&self) -> bool {
        matches!(
            self,
            ObjectKind::Unknown(_)
                | ObjectKind::TrackingPosition { .. }
                | ObjectKind::TelescopeEvent { .. }
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialized as `{"name": ..}`, plus `telescope_id` for telescope-coded kinds
impl Serialize for ObjectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let telescope_id = self.telescope_id();
        let mut map = serializer.serialize_map(Some(1 + telescope_id.is_some() as usize))?;
        map.serialize_entry("name", self.name())?;
        if let Some(telescope_id) = telescope_id {
            map.serialize_entry("telescope_id", &telescope_id)?;
        }
        map.end()
    }
}

/// Convert a CamelCase identifier to snake_case
pub fn camel_to_snake(name: &str) -> String {
    static FIRST: OnceLock<Regex> = OnceLock::new();
    static SECOND: OnceLock<Regex> = OnceLock::new();

    let first = FIRST.get_or_init(|| Regex::new("(.)([A-Z][a-z]+)").expect("valid regex"));
    let second = SECOND.get_or_init(|| Regex::new("([a-z0-9])([A-Z])").expect("valid regex"));

    let s1 = first.replace_all(name, "${1}_${2}");
    second.replace_all(&s1, "${1}_${2}").to_lowercase()
}
