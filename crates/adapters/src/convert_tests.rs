// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mb_core::{Filter, Player};
use serde_json::json;
use yare::parameterized;

const LEGACY_PROPERTIES: &str = r#"{
    "properties": {
        "pools": [
            {"name": "defaultPool", "filters": [{"name": "mmr", "attribute": "mmr.rating", "minv": 100, "maxv": 999}]}
        ],
        "rosters": [
            {"name": "red", "players": [{"id": "p1"}, {"id": "p2"}]}
        ]
    }
}"#;

fn shim(pools: Option<&str>, rosters: Option<&str>) -> LegacyShim<JsonPathConverter> {
    LegacyShim::new(
        JsonPathConverter,
        JsonKeys {
            pools: pools.map(String::from),
            rosters: rosters.map(String::from),
        },
    )
}

#[parameterized(
    top_level = { r#"{"a": 1}"#, "a", Some(json!(1)) },
    nested = { r#"{"a": {"b": "x"}}"#, "a.b", Some(json!("x")) },
    array_index = { r#"{"a": [{"c": 1}, {"c": 2}]}"#, "a.1.c", Some(json!(2)) },
    whole_document = { r#"{"a": 1}"#, "", Some(json!({"a": 1})) },
    missing_key = { r#"{"a": 1}"#, "b", None },
    index_out_of_range = { r#"{"a": [1]}"#, "a.3", None },
    index_not_a_number = { r#"{"a": [1]}"#, "a.x", None },
    through_a_scalar = { r#"{"a": 1}"#, "a.b", None },
    invalid_document = { "not json", "a", None },
)]
fn json_path_extraction(properties: &str, path: &str, expected: Option<Value>) {
    assert_eq!(JsonPathConverter.try_extract(properties, path), expected);
}

#[test]
fn apply_fills_absent_fields() {
    let mut profile = MatchProfile::new("1v1", LEGACY_PROPERTIES);
    shim(Some("properties.pools"), Some("properties.rosters")).apply(&mut profile);

    assert_eq!(
        profile.pools,
        Some(vec![PlayerPool {
            name: "defaultPool".to_string(),
            filters: vec![Filter {
                name: "mmr".to_string(),
                attribute: "mmr.rating".to_string(),
                minv: 100,
                maxv: 999,
            }],
        }])
    );
    assert_eq!(
        profile.rosters,
        Some(vec![Roster::new("red", vec![Player::new("p1"), Player::new("p2")])])
    );
}

#[test]
fn apply_keeps_supplied_fields() {
    let mut profile = MatchProfile::new("1v1", LEGACY_PROPERTIES);
    profile.pools = Some(vec![]);
    shim(Some("properties.pools"), None).apply(&mut profile);

    assert_eq!(profile.pools, Some(vec![]));
    assert_eq!(profile.rosters, None);
}

#[test]
fn apply_without_keys_is_a_no_op() {
    let mut profile = MatchProfile::new("1v1", LEGACY_PROPERTIES);
    shim(None, None).apply(&mut profile);
    assert_eq!(profile, MatchProfile::new("1v1", LEGACY_PROPERTIES));
}

#[test]
fn apply_leaves_field_absent_when_path_is_missing() {
    let mut profile = MatchProfile::new("1v1", "{}");
    shim(Some("properties.pools"), Some("properties.rosters")).apply(&mut profile);
    assert_eq!(profile.pools, None);
    assert_eq!(profile.rosters, None);
}

#[test]
fn decode_failure_is_reported_and_not_applied() {
    let properties = r#"{"pools": "not a list"}"#;
    let shim = shim(Some("pools"), None);

    let err = shim.extract_pools(properties).unwrap_err();
    assert!(err.to_string().contains("pools"), "got: {}", err);

    let mut profile = MatchProfile::new("1v1", properties);
    shim.apply(&mut profile);
    assert_eq!(profile.pools, None);
}
