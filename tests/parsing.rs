use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};

use ladder_digest::history::normalize_history;
use ladder_digest::model::{MATCH_TYPE_1V1, QUEUE_1V1};
use ladder_digest::provider::{best_match, parse_history_json, parse_search_json, search_score};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_search_fixture() {
    let raw = read_fixture("pulse_search.json");
    let profiles = parse_search_json(&raw).expect("fixture should parse");
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[1].members.character.id, 315071);
    assert_eq!(profiles[1].members.account.battle_tag, "Pop101#1282");
    assert_eq!(profiles[1].current_rating(), Some(3190));
    assert_eq!(profiles[1].rating_max, Some(3412));
    assert_eq!(profiles[1].league_max, Some(5));

    let identity = profiles[1].identity();
    assert_eq!(identity.player_name, "Pop");
    assert_eq!(identity.player_id, 315071);
}

#[test]
fn best_match_prefers_exact_battle_tag() {
    let raw = read_fixture("pulse_search.json");
    let profiles = parse_search_json(&raw).expect("fixture should parse");
    let best = best_match("Pop101#1282", profiles).expect("a candidate");
    assert_eq!(best.members.character.id, 315071);
}

#[test]
fn best_match_on_short_character_tag() {
    let raw = read_fixture("pulse_search.json");
    let profiles = parse_search_json(&raw).expect("fixture should parse");
    assert!((search_score("Pop", &profiles[1]) - 0.65).abs() < 1e-12);
    assert!(search_score("Pop", &profiles[0]) < 0.65);
    let best = best_match("Pop", profiles).expect("a candidate");
    assert_eq!(best.members.character.name, "Pop#245");
}

#[test]
fn best_match_of_nothing_is_none() {
    assert!(best_match("anyone", Vec::new()).is_none());
}

#[test]
fn parses_history_fixture() {
    let raw = read_fixture("pulse_history.json");
    let history = parse_history_json(&raw).expect("fixture should parse");
    let matches = history.matches();
    assert_eq!(matches.len(), 5);
    assert_eq!(matches[0].info.match_type, MATCH_TYPE_1V1);
    assert_eq!(matches[0].duration_secs(), Some(1500));
    // duration only at the top level
    assert_eq!(matches[1].duration_secs(), Some(600));
    assert!(matches[1].participants[0].won());
    assert_eq!(matches[1].participants[1].league_type(), Some(3));
    assert_eq!(matches[2].info.match_type, "_2V2");
    assert_eq!(
        matches[0].timestamp(),
        Utc.with_ymd_and_hms(2024, 3, 7, 20, 0, 0).unwrap()
    );
}

#[test]
fn history_columns_normalize_with_cutoff() {
    let raw = read_fixture("pulse_history.json");
    let history = parse_history_json(&raw).expect("fixture should parse");
    let columns = history.columns();

    // minimum cutoff keeps every ladder row, even the unparsable one
    let all = normalize_history(&columns, DateTime::<Utc>::MIN_UTC, QUEUE_1V1);
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].race.as_deref(), Some("terran"));
    assert_eq!(all[3].rating, Some(3190));
    assert_eq!(all[4].timestamp, DateTime::<Utc>::MIN_UTC);
    assert_eq!(all[4].rating, None);

    let cutoff = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let recent = normalize_history(&columns, cutoff, QUEUE_1V1);
    let races: Vec<_> = recent.iter().map(|s| s.race.as_deref()).collect();
    assert_eq!(races, vec![Some("protoss"), Some("protoss"), Some("zerg")]);
    assert!(recent.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn cutoff_past_every_row_yields_nothing() {
    let raw = read_fixture("pulse_history.json");
    let history = parse_history_json(&raw).expect("fixture should parse");
    let cutoff = Utc.with_ymd_and_hms(2024, 3, 7, 20, 0, 1).unwrap();
    assert!(normalize_history(&history.columns(), cutoff, QUEUE_1V1).is_empty());
}

#[test]
fn missing_sections_default_to_empty() {
    let history = parse_history_json(r#"{"matches": null}"#).expect("valid json");
    assert!(history.matches().is_empty());
    assert!(history.columns().date_time.is_empty());
    assert!(parse_history_json("{not json").is_err());
}
