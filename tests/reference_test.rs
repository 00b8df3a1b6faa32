//! Tests for the bundled reference datasets

use std::io::Write;
use std::path::Path;

use geotriage::config::ReferenceConfig;
use geotriage::models::BoundingBox;
use geotriage::reference::ReferenceData;
use geotriage::utils::error::ReferenceError;

fn bundled() -> ReferenceData {
    ReferenceData::load(&ReferenceConfig::in_dir("data")).unwrap()
}

#[test]
fn test_bundled_data_loads() {
    let data = bundled();
    assert!(data.country_count() > 20);
    assert!(data.is_country("United Kingdom"));
    assert!(data.is_country("côte d'ivoire"));
}

#[test]
fn test_subdivisions_are_not_countries() {
    let data = bundled();
    assert!(!data.is_country("Puerto Rico"));
    assert!(!data.is_country("England"));
    assert!(!data.is_country("Texas"));
}

#[test]
fn test_common_acronyms() {
    let data = bundled();
    assert_eq!(data.resolve_acronym("UK"), Some("united kingdom"));
    assert_eq!(data.resolve_acronym("US"), Some("united states"));
    assert_eq!(data.resolve_acronym("Us"), None);
    assert_eq!(data.resolve_acronym("us"), None);
}

#[test]
fn test_non_latin_and_diacritic_acronyms() {
    let data = bundled();
    assert_eq!(data.resolve_acronym("Россия"), Some("russia"));
    assert_eq!(data.resolve_acronym("中国"), Some("china"));
    assert_eq!(data.resolve_acronym("Ivory Coast"), Some("côte d'ivoire"));
    assert_eq!(data.resolve_acronym("España"), Some("spain"));
    assert_eq!(
        data.canonical_country("États-Unis").as_deref(),
        Some("united states")
    );
}

#[test]
fn test_neighbors() {
    let data = bundled();
    assert!(data.neighbors("Belgium").iter().any(|c| c == "France"));
    assert!(data.neighbors("united states").iter().any(|c| c == "Canada"));
    assert!(data.neighbors("Atlantis").is_empty());
}

#[test]
fn test_blacklist() {
    let data = bundled();
    assert!(data.is_blacklisted("Europe"));
    assert!(data.is_blacklisted("middle east"));
    assert!(!data.is_blacklisted("Paris"));
}

#[test]
fn test_reverse_geocode_with_bundled_boxes() {
    let data = bundled();
    let tokyo = BoundingBox::new(139.56, 35.53, 139.92, 35.82);
    assert_eq!(data.reverse_geocode_bounding_box(&tokyo), vec!["japan"]);
}

fn write(dir: &Path, name: &str, content: &str) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

#[test]
fn test_duplicate_alias_fails_loading() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "countries_bbox.json", r#"{"united kingdom": [0, 0, 1, 1], "ukraine": [2, 2, 3, 3]}"#);
    write(dir.path(), "country_neighbors.json", "{}");
    write(
        dir.path(),
        "country_acronyms.json",
        r#"{"united kingdom": ["UK"], "ukraine": ["UK"]}"#,
    );
    write(dir.path(), "blacklist.txt", "");

    let result = ReferenceData::load(&ReferenceConfig::in_dir(dir.path()));
    assert!(matches!(result, Err(ReferenceError::DuplicateAlias { .. })));
}

#[test]
fn test_missing_file_fails_loading() {
    let dir = tempfile::tempdir().unwrap();
    let result = ReferenceData::load(&ReferenceConfig::in_dir(dir.path()));
    assert!(matches!(result, Err(ReferenceError::Io { .. })));
}

#[test]
fn test_invalid_json_fails_loading() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "countries_bbox.json", r#"{"france": [1, 2]}"#);

    let result = ReferenceData::load(&ReferenceConfig::in_dir(dir.path()));
    assert!(matches!(result, Err(ReferenceError::Json { .. })));
}
