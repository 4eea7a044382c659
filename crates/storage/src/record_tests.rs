// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mb_core::{Player, PlayerPool, Roster};

#[test]
fn absent_pools_and_rosters_stay_absent() {
    let profile = MatchProfile::new("1v1", r#"{"mode":"ranked"}"#);
    let record = encode_profile(&profile).unwrap();

    assert!(!record.contains_key(fields::POOLS));
    assert!(!record.contains_key(fields::ROSTERS));
    assert_eq!(decode_profile(&record).unwrap(), profile);
}

#[test]
fn structured_fields_survive_encoding() {
    let profile = MatchProfile {
        pools: Some(vec![PlayerPool {
            name: "everyone".to_string(),
            filters: vec![],
        }]),
        rosters: Some(vec![Roster::new("red", vec![Player::new("p1")])]),
        ..MatchProfile::new("1v1", "{}")
    };
    let record = encode_profile(&profile).unwrap();
    assert_eq!(decode_profile(&record).unwrap(), profile);
}

#[test]
fn decode_reports_broken_rosters() {
    let mut record = encode_profile(&MatchProfile::new("1v1", "{}")).unwrap();
    record.insert(fields::ROSTERS.to_string(), "[{".to_string());

    let err = decode_profile(&record).unwrap_err();
    assert!(err.to_string().contains("rosters"));
}

#[test]
fn decode_ignores_status_marker() {
    let mut record = encode_profile(&MatchProfile::new("1v1", "{}")).unwrap();
    record.insert(fields::STATUS.to_string(), "done".to_string());
    assert_eq!(decode_profile(&record).unwrap().id, "1v1");
}
