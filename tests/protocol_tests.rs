#![cfg(feature = "std")]

use naval_battle::{
    protocol::{decode_shot, encode_shot},
    random_board, FleetLayout, Message, ProtocolError, Role, ShipKind, ShipRecord, NUM_SHIPS,
};
use rand::{rngs::SmallRng, SeedableRng};

fn sample_layout() -> FleetLayout {
    let mut rng = SmallRng::seed_from_u64(99);
    FleetLayout::from_board(&random_board(&mut rng).unwrap()).unwrap()
}

#[test]
fn test_shot_is_two_ascii_digits() {
    assert_eq!(&encode_shot((3, 7)).unwrap(), b"37");
    assert_eq!(&encode_shot((0, 0)).unwrap(), b"00");
    assert_eq!(decode_shot(b"94").unwrap(), (9, 4));
    assert!(encode_shot((10, 0)).is_err());
}

#[test]
fn test_bad_shots_are_rejected() {
    let bad_shots: [&[u8]; 6] = [b"1", b"123", b"a1", b"-1", b" 1", b""];
    for bad in bad_shots {
        assert!(
            matches!(decode_shot(bad), Err(ProtocolError::InvalidShot(_))),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_message_decode_dispatch() {
    assert_eq!(Message::decode(b"55").unwrap(), Message::Shot((5, 5)));
    assert!(matches!(Message::decode(b""), Err(ProtocolError::EmptyFrame)));
    assert!(matches!(Message::decode(b"[1,"), Err(ProtocolError::Json(_))));
    let layout = sample_layout();
    let bytes = Message::FleetLayout(layout.clone()).encode().unwrap();
    assert_eq!(Message::decode(&bytes).unwrap(), Message::FleetLayout(layout));
}

#[test]
fn test_layout_json_shape() {
    let layout = FleetLayout(vec![ShipRecord {
        kind: ShipKind::Destroyer,
        coordinates: vec![(0, 0), (0, 1)],
    }]);
    let json = serde_json::to_string(&layout).unwrap();
    assert_eq!(json, r#"[{"type":"destroyer","coordinates":[[0,0],[0,1]]}]"#);
}

#[test]
fn test_layout_from_board_covers_fleet() {
    let layout = sample_layout();
    assert_eq!(layout.records().len(), NUM_SHIPS);
    layout.validate().unwrap();
    let carriers = layout
        .records()
        .iter()
        .filter(|r| r.kind == ShipKind::Carrier)
        .count();
    assert_eq!(carriers, 1);
    for record in layout.records() {
        assert_eq!(record.coordinates.len(), record.kind.length());
    }
}

#[test]
fn test_layout_validation_failures() {
    let good = sample_layout();

    let mut short = good.clone();
    short.0.pop();
    assert!(matches!(short.validate(), Err(ProtocolError::MalformedLayout(_))));

    let mut off_board = good.clone();
    off_board.0[0].coordinates[0] = (10, 2);
    assert!(matches!(off_board.validate(), Err(ProtocolError::MalformedLayout(_))));

    let mut overlap = good.clone();
    let taken = overlap.0[0].coordinates[0];
    overlap.0[1].coordinates[0] = taken;
    assert!(matches!(overlap.validate(), Err(ProtocolError::MalformedLayout(_))));

    let mut empty = good;
    empty.0[2].coordinates.clear();
    assert!(matches!(empty.validate(), Err(ProtocolError::MalformedLayout(_))));
}

#[test]
fn test_registry_labels_follow_record_order() {
    let layout = sample_layout();
    let records = layout.records().to_vec();
    let registry = layout.into_registry();
    assert_eq!(registry.len(), NUM_SHIPS);
    for (i, record) in records.iter().enumerate() {
        let label = format!("ship #{} {}", i, record.kind);
        assert_eq!(registry.ships().get(&label), Some(&record.coordinates));
    }
}

#[test]
fn test_only_listener_moves_first() {
    assert!(Role::Listener.first_mover());
    assert!(!Role::Initiator.first_mover());
}
