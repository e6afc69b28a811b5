//! Integration tests: reading synthetic EventIO files from disk

mod helpers;

use eventio::core::{is_eventio, is_gzip, MAX_NESTING_DEPTH};
use eventio::simtel::HistoryKind;
use eventio::{
    EventIoError, EventIoFile, EventKind, IactFile, ObjectKind, SimTelFile, SimTelOptions,
};
use helpers::*;
use std::collections::BTreeSet;

fn options(telescopes: Option<&[u32]>, skip_calibration: bool) -> SimTelOptions {
    SimTelOptions {
        allowed_telescopes: telescopes.map(|t| t.iter().copied().collect::<BTreeSet<u32>>()),
        skip_calibration,
    }
}

#[test]
fn test_open_plain_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.simtel", &simtel_run());

    assert!(!is_gzip(&path).unwrap());
    assert!(is_eventio(&path).unwrap());

    let file = EventIoFile::open(&path).unwrap();
    assert_eq!(file.len(), simtel_run().len());
    assert_eq!(file.get(0).unwrap().kind, ObjectKind::History);
    assert_eq!(file.get(0).unwrap().len(), 2);
}

#[test]
fn test_open_gzip_file_matches_plain() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write_plain(dir.path(), "run.simtel", &simtel_run());
    let gzip = write_gzip(dir.path(), "run.simtel.gz", &simtel_run());

    assert!(is_gzip(&gzip).unwrap());
    assert!(is_eventio(&gzip).unwrap());

    let plain = EventIoFile::open(&plain).unwrap();
    let gzip = EventIoFile::open(&gzip).unwrap();
    assert_eq!(plain.objects(), gzip.objects());
    assert_eq!(plain.size(), gzip.size());
}

#[test]
fn test_open_non_eventio_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "just some text").unwrap();

    assert!(!is_eventio(&path).unwrap());
    let err = EventIoFile::open(&path).unwrap_err();
    assert!(matches!(err, EventIoError::NotEventIo(_)));
}

#[test]
fn test_open_empty_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.dat");
    std::fs::write(&path, b"").unwrap();

    assert!(!is_gzip(&path).unwrap());
    assert!(matches!(
        EventIoFile::open(&path).unwrap_err(),
        EventIoError::NotEventIo(_)
    ));
}

#[test]
fn test_big_endian_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.dat");
    let mut bytes = vec![0xD4, 0x1F, 0x8A, 0x37];
    bytes.extend([0u8; 12]);
    std::fs::write(&path, bytes).unwrap();

    assert!(is_eventio(&path).unwrap());
    assert!(matches!(
        EventIoFile::open(&path).unwrap_err(),
        EventIoError::BigEndianUnsupported
    ));
}

#[test]
fn test_truncated_file_keeps_complete_objects() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = file_bytes(&simtel_run());
    bytes.truncate(bytes.len() - 10);
    let path = dir.path().join("truncated.simtel");
    std::fs::write(&path, bytes).unwrap();

    let file = EventIoFile::open(&path).unwrap();
    assert_eq!(file.len(), simtel_run().len() - 1);
}

#[test]
fn test_nested_structure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.simtel", &simtel_run());
    let file = EventIoFile::open(&path).unwrap();

    let array_event = file.get(8).unwrap();
    assert_eq!(array_event.kind, ObjectKind::ArrayEvent);
    let kinds: Vec<ObjectKind> = array_event.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::TriggerInformation,
            ObjectKind::TelescopeEvent { telescope_id: 1 },
            ObjectKind::TelescopeEvent { telescope_id: 2 },
            ObjectKind::TrackingPosition { telescope_id: 1 },
            ObjectKind::TrackingPosition { telescope_id: 2 },
            ObjectKind::StereoReconstruction,
        ]
    );

    let telescope_event = array_event.get(1).unwrap();
    assert_eq!(telescope_event.header.level, 1);
    assert_eq!(telescope_event.get(0).unwrap().header.level, 2);
    assert_eq!(
        telescope_event.get(0).unwrap().kind,
        ObjectKind::TelescopeEventHeader
    );
}

#[test]
fn test_simtel_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gzip(dir.path(), "run.simtel.gz", &simtel_run());
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let history = simtel.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, HistoryKind::CommandLine);
    assert_eq!(history[0].text, "sim_telarray -c cta.cfg");
    assert_eq!(history[1].kind, HistoryKind::Config);
    assert_eq!(history[1].text, "echo=on");

    assert!(simtel.run_header().is_some());
    assert_eq!(simtel.mc_run_headers().len(), 1);
    assert_eq!(simtel.mc_run_headers()[0].header.version, 4);

    let cameras = simtel.camera_settings();
    assert_eq!(cameras.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(cameras[&1].n_pixels, 2);
    assert_eq!(cameras[&1].focal_length, 28.0);
    assert_eq!(cameras[&2].pixel_x, vec![0.5]);

    let descriptions = simtel.telescope_descriptions();
    assert!(descriptions[&1].contains_key("camera_settings"));
    assert!(descriptions[&1].contains_key("camera_organization"));
    assert_eq!(descriptions[&2].len(), 1);
}

#[test]
fn test_simtel_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.simtel", &simtel_run());
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let events: Vec<_> = simtel.events().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(events.len(), 3);

    assert_eq!(events[0].kind, EventKind::Data);
    assert_eq!(events[0].event_id, 10001);
    assert_eq!(events[0].telescope_ids(), vec![1, 2]);
    assert_eq!(events[0].mc_event.as_ref().unwrap().id(), 10001);
    assert_eq!(events[0].mc_shower.as_ref().unwrap().id(), 100);

    assert_eq!(
        events[1].kind,
        EventKind::Calibration { calibration_type: 3 }
    );
    assert_eq!(events[1].event_id, -5);
    assert!(events[1].is_calibration());
    assert!(events[1].mc_event.is_none());

    assert_eq!(events[2].event_id, 10003);
    assert_eq!(events[2].telescope_ids(), vec![2]);
    assert!(events[2].mc_event.is_none(), "MC event 10002 belongs to no array event");
}

#[test]
fn test_simtel_events_allowed_telescopes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.simtel", &simtel_run());
    let simtel = SimTelFile::open(&path, options(Some(&[1]), false)).unwrap();

    let events: Vec<_> = simtel.events().collect::<Result<Vec<_>, _>>().unwrap();
    let ids: Vec<i64> = events.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![10001, -5]);
    assert_eq!(events[0].telescope_ids(), vec![1]);
    assert_eq!(
        events[0].tracking_positions.keys().copied().collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn test_simtel_events_skip_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.simtel", &simtel_run());
    let simtel = SimTelFile::open(&path, options(None, true)).unwrap();

    let ids: Vec<i64> = simtel.events().map(|e| e.unwrap().event_id).collect();
    assert_eq!(ids, vec![10001, 10003]);
}

#[test]
fn test_missing_tracking_position_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let broken = Obj::new(2010, 7)
        .child(Obj::new(2009, 7).payload(vec![0; 4]))
        .child(telescope_event(4, 7))
        .child(telescope_event(5, 7))
        .child(tracking(4));
    let path = write_plain(dir.path(), "broken.simtel", &[broken, array_event(8, &[1])]);
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let mut events = simtel.events();
    match events.next() {
        Some(Err(EventIoError::NoTrackingPositions(ids))) => assert_eq!(ids, vec![5]),
        other => panic!("Expected NoTrackingPositions, got {:?}", other),
    }
    // iteration continues with the next event
    assert_eq!(events.next().unwrap().unwrap().event_id, 8);
    assert!(events.next().is_none());
}

#[test]
fn test_array_event_without_trigger_first_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let broken = Obj::new(2010, 7)
        .child(tracking(1))
        .child(Obj::new(2009, 7).payload(vec![0; 4]));
    let path = write_plain(dir.path(), "broken.simtel", &[broken]);
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let result = simtel.events().next().unwrap();
    assert!(matches!(result, Err(EventIoError::WrongType { .. })));
}

#[test]
fn test_high_telescope_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "large.simtel", &[array_event(1, &[105, 250])]);
    let file = EventIoFile::open(&path).unwrap();
    assert_eq!(file.get(0).unwrap().get(1).unwrap().object_type(), 3205);

    let simtel = SimTelFile::from_file(file, SimTelOptions::default()).unwrap();
    let event = simtel.events().next().unwrap().unwrap();
    assert_eq!(event.telescope_ids(), vec![105, 250]);
}

#[test]
fn test_corrupt_gzip_is_not_eventio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.simtel.gz");
    std::fs::write(&path, [0x1f, 0x8b, 0x00, 0xff, 0x13, 0x37, 0x00, 0x00]).unwrap();

    assert!(is_gzip(&path).unwrap());
    assert!(!is_eventio(&path).unwrap());
    assert!(matches!(
        EventIoFile::open(&path).unwrap_err(),
        EventIoError::NotEventIo(_)
    ));
}

#[test]
fn test_deeply_nested_file_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(
        dir.path(),
        "deep.dat",
        &[deeply_nested(2000), Obj::new(2000, 1).payload(vec![0; 8])],
    );
    let file = EventIoFile::open(&path).unwrap();

    assert_eq!(file.len(), 2);
    let max_level = file
        .get(0)
        .unwrap()
        .walk()
        .iter()
        .map(|o| o.header.level)
        .max()
        .unwrap();
    assert_eq!(max_level, MAX_NESTING_DEPTH);
    assert_eq!(file.get(1).unwrap().kind, ObjectKind::RunHeader);
}

#[test]
fn test_events_attach_latest_monitoring() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "monitored.simtel", &monitored_run());
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let events = simtel.events().collect::<Result<Vec<_>, _>>().unwrap();
    let ids: Vec<i64> = events.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![700, 702]);

    let first = &events[0];
    assert_eq!(first.camera_monitorings.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(first.laser_calibrations.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(first.telescope_data.as_ref().unwrap().id(), 700);
    assert_eq!(first.telescope_data.as_ref().unwrap().len(), 2);
    assert!(first.photoelectron_sums.is_some());

    // the second monitoring block of telescope 1 replaced the first one
    let second = &events[1];
    assert_eq!(second.camera_monitorings.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert!(second.camera_monitorings[&1].first_byte > first.camera_monitorings[&1].first_byte);
    assert_eq!(
        second.laser_calibrations[&1].first_byte,
        first.laser_calibrations[&1].first_byte
    );
    assert!(second.telescope_data.is_none());
    assert!(second.photoelectron_sums.is_none());
}

#[test]
fn test_events_monitoring_follows_telescope_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "monitored.simtel", &monitored_run());
    let simtel = SimTelFile::open(&path, options(Some(&[2]), false)).unwrap();

    let events = simtel.events().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].camera_monitorings.keys().copied().collect::<Vec<_>>(), vec![2]);
    assert!(events[0].laser_calibrations.is_empty());
}

#[test]
fn test_mc_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "monitored.simtel", &monitored_run());
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let events: Vec<_> = simtel.mc_events().collect();
    let ids: Vec<u32> = events.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![700, 701, 702]);
    assert!(events.iter().all(|e| e.mc_shower.as_ref().unwrap().id() == 7));
    assert_eq!(events[0].telescope_data.as_ref().unwrap().kind, ObjectKind::TelescopeData);
    assert!(events[1].telescope_data.is_none());
}

#[test]
fn test_mc_events_include_untriggered() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.simtel", &simtel_run());
    let simtel = SimTelFile::open(&path, SimTelOptions::default()).unwrap();

    let ids: Vec<u32> = simtel.mc_events().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![10001, 10002]);
}

#[test]
fn test_iact_file_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gzip(dir.path(), "shower.dat.gz", &iact_run());
    let iact = IactFile::open(&path).unwrap();

    let header = iact.run_header().unwrap();
    assert_eq!(header.run_number, 1);
    assert_eq!(header.energy_range, (5.0, 100.0));
    assert_eq!(header.energy_slope, -2.7);

    assert_eq!(iact.n_telescopes(), 2);
    assert_eq!(iact.telescope_positions().unwrap().x, vec![0.0, 5000.0]);
    assert!(iact.input_card().is_some());
    assert_eq!(iact.run_end().unwrap().kind, ObjectKind::IactRunEnd);
}

#[test]
fn test_iact_events_with_reuse() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "shower.dat", &iact_run());
    let mut iact = IactFile::open(&path).unwrap();

    let events: Vec<_> = iact.events().collect();
    let ids: Vec<(u32, u32)> = events.iter().map(|e| (e.event_id, e.reuse)).collect();
    assert_eq!(ids, vec![(1, 1), (1, 2), (2, 1)]);

    assert_eq!(events[0].photon_bunches().len(), 2);
    assert!(events[0].longitudinal.is_some());
    assert!(events[1].end.is_some());
    assert!(events[2].telescope_data.is_none());
    assert!(events[2].photon_bunches().is_empty());

    let header = iact.event_header(&events[0]).unwrap();
    assert_eq!(header.event_number, 1);
    assert_eq!(header.total_energy, 9.25);
    assert_eq!(header.zenith_angle, 0.5);
    assert_eq!(iact.event_header(&events[2]).unwrap().particle_id, 14);
}
