//! Step-by-step encoding of a single participant through spawn, idle, change,
//! and despawn, plus a despawn/respawn cycle.

use framedelta_common::{EquipmentId, ParticipantId, StableKey};
use framedelta_kernel::{EncodedMatch, IterSource, Observation, Timeline};
use glam::DVec3;
use std::collections::BTreeSet;

fn encode(steps: Vec<Vec<Observation>>) -> EncodedMatch {
    let encoded = Timeline::run(IterSource::from_steps(steps)).unwrap();
    encoded.validate().unwrap();
    encoded
}

fn pids(raw: &[u32]) -> BTreeSet<ParticipantId> {
    raw.iter().map(|&r| ParticipantId(r)).collect()
}

fn four_steps() -> Vec<Vec<Observation>> {
    vec![
        vec![Observation::new(100, "x", DVec3::ZERO, ["ak47"])],
        vec![Observation::new(100, "x", DVec3::ZERO, ["ak47"])],
        vec![Observation::new(100, "x", DVec3::new(1.0, 0.0, 0.0), ["knife"])],
        vec![],
    ]
}

#[test]
fn first_sighting_spawns_with_full_state() {
    let encoded = encode(four_steps()[..1].to_vec());

    assert_eq!(encoded.players.len(), 1);
    let record = encoded.players.record(ParticipantId(1)).unwrap();
    assert_eq!(record.stable_key, StableKey(100));
    assert_eq!(record.name, "x");
    assert_eq!(encoded.equipment.get("ak47"), Some(EquipmentId(1)));
    assert_eq!(encoded.equipment.len(), 1);

    assert_eq!(encoded.frames.len(), 1);
    let frame = &encoded.frames[0];
    assert_eq!(frame.spawned, pids(&[1]));
    assert!(frame.despawned.is_empty());
    assert_eq!(frame.position_changes.len(), 1);
    assert_eq!(frame.position_changes[&ParticipantId(1)], DVec3::ZERO);
    assert_eq!(frame.equipment_changes.len(), 1);
    assert_eq!(frame.equipment_changes[&ParticipantId(1)], vec![EquipmentId(1)]);
}

#[test]
fn identical_step_produces_empty_delta() {
    let encoded = encode(four_steps()[..2].to_vec());
    assert!(encoded.frames[1].is_empty());
}

#[test]
fn move_and_swap_weapon() {
    let encoded = encode(four_steps()[..3].to_vec());
    let frame = &encoded.frames[2];

    assert!(frame.spawned.is_empty());
    assert!(frame.despawned.is_empty());
    assert_eq!(frame.position_changes.len(), 1);
    assert_eq!(
        frame.position_changes[&ParticipantId(1)],
        DVec3::new(1.0, 0.0, 0.0)
    );

    let changed: BTreeSet<_> = frame.equipment_changes[&ParticipantId(1)]
        .iter()
        .copied()
        .collect();
    assert_eq!(changed, BTreeSet::from([EquipmentId(1), EquipmentId(2)]));
    assert_eq!(encoded.equipment.name(EquipmentId(2)), Some("knife"));
}

#[test]
fn empty_step_despawns_and_keeps_record() {
    let encoded = encode(four_steps());
    let frame = &encoded.frames[3];

    assert_eq!(frame.despawned, pids(&[1]));
    assert!(frame.spawned.is_empty());
    assert!(frame.position_changes.is_empty());
    assert!(frame.equipment_changes.is_empty());
    assert!(encoded.players.record(ParticipantId(1)).is_some());
    assert_eq!(encoded.frames.len(), 4);
}

#[test]
fn respawn_reuses_surrogate() {
    let encoded = encode(vec![
        vec![
            Observation::new(555, "a", DVec3::ZERO, ["glock"]),
            Observation::new(777, "b", DVec3::ONE, ["usp"]),
        ],
        vec![Observation::new(777, "b", DVec3::ONE, ["usp"])],
        vec![
            Observation::new(777, "b", DVec3::ONE, ["usp"]),
            Observation::new(555, "a", DVec3::new(4.0, 4.0, 0.0), ["glock"]),
        ],
    ]);

    assert_eq!(encoded.frames[1].despawned, pids(&[1]));
    assert_eq!(encoded.frames[2].spawned, pids(&[1]));
    assert_eq!(encoded.players.len(), 2);
    assert_eq!(encoded.players.get(StableKey(555)), Some(ParticipantId(1)));
    // a respawn is a full delta even if nothing changed since the despawn
    assert_eq!(
        encoded.frames[2].equipment_changes[&ParticipantId(1)],
        vec![EquipmentId(1)]
    );
}

#[test]
fn later_name_change_is_ignored() {
    let encoded = encode(vec![
        vec![Observation::new(9, "first", DVec3::ZERO, Vec::<String>::new())],
        vec![Observation::new(9, "second", DVec3::ZERO, Vec::<String>::new())],
    ]);
    assert_eq!(encoded.players.record(ParticipantId(1)).unwrap().name, "first");
    assert!(encoded.frames[1].is_empty());
}

#[test]
fn empty_stream_gives_empty_match() {
    let encoded = encode(vec![]);
    assert!(encoded.frames.is_empty());
    assert!(encoded.players.is_empty());
    assert!(encoded.equipment.is_empty());
}
