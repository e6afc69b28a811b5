//! Byte-level writer for synthetic EventIO test files

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SYNC: [u8; 4] = [0x37, 0x8A, 0x1F, 0xD4];

/// An object to be encoded, with payload and sub-objects
#[derive(Debug, Clone)]
pub struct Obj {
    pub object_type: u32,
    pub version: u32,
    pub id: u32,
    pub payload: Vec<u8>,
    pub children: Vec<Obj>,
}

impl Obj {
    pub fn new(object_type: u32, id: u32) -> Self {
        Self {
            object_type,
            version: 0,
            id,
            payload: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn child(mut self, child: Obj) -> Self {
        self.children.push(child);
        self
    }

    fn encode(&self, toplevel: bool) -> Vec<u8> {
        let mut data = Vec::new();
        for child in &self.children {
            data.extend(child.encode(false));
        }
        data.extend(&self.payload);

        let mut length = data.len() as u32;
        if !self.children.is_empty() && self.payload.is_empty() {
            length |= 1 << 30;
        }

        let mut bytes = Vec::new();
        if toplevel {
            bytes.extend(SYNC);
        }
        bytes.extend((self.object_type | (self.version << 20)).to_le_bytes());
        bytes.extend(self.id.to_le_bytes());
        bytes.extend(length.to_le_bytes());
        bytes.extend(data);
        bytes
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.encode(true)
    }
}

/// Concatenate top-level objects into a file body
pub fn file_bytes(objects: &[Obj]) -> Vec<u8> {
    objects.iter().flat_map(Obj::bytes).collect()
}

pub fn write_plain(dir: &Path, name: &str, objects: &[Obj]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, file_bytes(objects)).unwrap();
    path
}

pub fn write_gzip(dir: &Path, name: &str, objects: &[Obj]) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&file_bytes(objects)).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

pub fn history_payload(timestamp: i32, text: &str) -> Vec<u8> {
    let mut data = timestamp.to_le_bytes().to_vec();
    data.extend((text.len() as i16).to_le_bytes());
    data.extend(text.as_bytes());
    data
}

pub fn camera_settings_payload(focal_length: f32, pixel_x: &[f32], pixel_y: &[f32]) -> Vec<u8> {
    let mut data = (pixel_x.len() as i32).to_le_bytes().to_vec();
    data.extend(focal_length.to_le_bytes());
    for v in pixel_x.iter().chain(pixel_y) {
        data.extend(v.to_le_bytes());
    }
    data
}

pub fn tracking(telescope_id: u32) -> Obj {
    Obj::new(2100 + telescope_id % 100 + 1000 * (telescope_id / 100), telescope_id)
        .payload(vec![0; 8])
}

pub fn telescope_event(telescope_id: u32, event_id: u32) -> Obj {
    Obj::new(2200 + telescope_id % 100 + 1000 * (telescope_id / 100), event_id)
        .child(Obj::new(2011, telescope_id).payload(vec![0; 4]))
}

/// Array event with trigger, telescope events and tracking positions
pub fn array_event(event_id: u32, telescopes: &[u32]) -> Obj {
    let mut event = Obj::new(2010, event_id).child(Obj::new(2009, event_id).payload(vec![0; 4]));
    for &telescope_id in telescopes {
        event = event.child(telescope_event(telescope_id, event_id));
    }
    for &telescope_id in telescopes {
        event = event.child(tracking(telescope_id));
    }
    event.child(Obj::new(2015, event_id).payload(vec![0; 4]))
}

/// A small but complete sim_telarray run
pub fn simtel_run() -> Vec<Obj> {
    vec![
        Obj::new(70, 0)
            .child(Obj::new(71, 0).payload(history_payload(1_500_000_000, "sim_telarray -c cta.cfg")))
            .child(Obj::new(72, 0).payload(history_payload(1_500_000_001, "echo=on"))),
        Obj::new(2000, 1).payload(vec![0; 16]),
        Obj::new(2001, 1).version(4).payload(vec![0; 32]),
        Obj::new(2002, 1).payload(camera_settings_payload(28.0, &[0.0, 0.1], &[0.0, -0.1])),
        Obj::new(2003, 1).payload(vec![0; 8]),
        Obj::new(2002, 2).payload(camera_settings_payload(16.0, &[0.5], &[0.5])),
        Obj::new(2020, 100).payload(vec![0; 12]),
        Obj::new(2021, 10001).payload(vec![0; 12]),
        array_event(10001, &[1, 2]),
        Obj::new(2021, 10002).payload(vec![0; 12]),
        Obj::new(2028, 3).child(array_event(5, &[1])),
        Obj::new(9999, 0).payload(vec![0; 4]),
        array_event(10003, &[2]),
    ]
}

/// Array event surrounded by per-telescope monitoring and MC objects
pub fn monitored_run() -> Vec<Obj> {
    vec![
        Obj::new(2022, 1).version(1).payload(vec![1; 8]),
        Obj::new(2023, 1).payload(vec![0; 8]),
        Obj::new(2022, 2).version(1).payload(vec![2; 8]),
        Obj::new(2020, 7).payload(vec![0; 12]),
        Obj::new(2021, 700).payload(vec![0; 12]),
        iact_telescope_data(700, 2),
        Obj::new(2026, 700).payload(vec![0; 8]),
        array_event(700, &[1, 2]),
        Obj::new(2022, 1).version(1).payload(vec![3; 8]),
        Obj::new(2021, 701).payload(vec![0; 12]),
        Obj::new(2021, 702).payload(vec![0; 12]),
        array_event(702, &[1]),
    ]
}

/// CORSIKA `RUNH`/`EVTH` style block of 273 words
pub fn corsika_block(words: &[(usize, f32)]) -> Vec<u8> {
    let mut values = vec![0f32; 273];
    for &(index, value) in words {
        values[index] = value;
    }
    let mut data = 273i32.to_le_bytes().to_vec();
    for v in values {
        data.extend(v.to_le_bytes());
    }
    data
}

pub fn telescope_definition(positions: &[[f32; 4]]) -> Vec<u8> {
    let mut data = (positions.len() as i32).to_le_bytes().to_vec();
    for column in 0..4 {
        for position in positions {
            data.extend(position[column].to_le_bytes());
        }
    }
    data
}

/// Photon data of one shower reuse with a bunch block per telescope
pub fn iact_telescope_data(event_id: u32, n_telescopes: u32) -> Obj {
    let mut data = Obj::new(1204, event_id);
    for telescope in 0..n_telescopes {
        data = data.child(Obj::new(1205, telescope).payload(vec![0; 16]));
    }
    data
}

/// A CORSIKA IACT run: two telescopes, shower 1 reused twice, shower 2
/// without photon data
pub fn iact_run() -> Vec<Obj> {
    vec![
        Obj::new(1200, 1).payload(corsika_block(&[(1, 1.0), (15, -2.7), (16, 5.0), (17, 100.0)])),
        Obj::new(1212, 0).payload(b"PRMPAR 1".to_vec()),
        Obj::new(1201, 2).payload(telescope_definition(&[
            [0.0, 0.0, 100.0, 1250.0],
            [5000.0, 0.0, 100.0, 1250.0],
        ])),
        Obj::new(1202, 1).payload(corsika_block(&[(1, 1.0), (2, 1.0), (3, 9.25), (10, 0.5)])),
        Obj::new(1203, 1).payload(vec![0; 8]),
        iact_telescope_data(1, 2),
        iact_telescope_data(1, 2),
        Obj::new(1211, 1).payload(vec![0; 8]),
        Obj::new(1209, 1).payload(corsika_block(&[])),
        Obj::new(1202, 2).payload(corsika_block(&[(1, 2.0), (2, 14.0), (3, 20.0)])),
        Obj::new(1203, 2).payload(vec![0; 8]),
        Obj::new(1209, 2).payload(corsika_block(&[])),
        Obj::new(1210, 1).payload(corsika_block(&[])),
    ]
}

/// `depth` nested history containers around a single command line
pub fn deeply_nested(depth: usize) -> Obj {
    let mut object = Obj::new(71, 0).payload(history_payload(0, "x"));
    for _ in 0..depth {
        object = Obj::new(70, 0).child(object);
    }
    object
}
