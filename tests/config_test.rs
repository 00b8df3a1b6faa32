//! Tests for config module

use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;

use geotriage::config::{Config, DegeneratePolicy, ValidationPolicy};
use geotriage::error::{Error, ErrorCategory, GeoErrorTrait};
use geotriage::geometry::DistanceFunction;

const ENV_VARS: &[&str] = &[
    "PHOTON_SERVER",
    "GEONAMES_SERVER",
    "GEOTRIAGE_LANG",
    "GEOTRIAGE_OSM_TAG",
    "GEOTRIAGE_CONNECT_TIMEOUT",
    "GEOTRIAGE_REQUEST_TIMEOUT",
    "GEOTRIAGE_VALIDATION_POLICY",
    "GEOTRIAGE_DATA_DIR",
    "GEOTRIAGE_DISTANCE_FUNCTION",
    "GEOTRIAGE_TOP_COUNTRIES",
    "GEOTRIAGE_DEGENERATE_POLICY",
    "GEOTRIAGE_MAX_CONCURRENT_LOOKUPS",
    "GEOTRIAGE_LOG_LEVEL",
    "GEOTRIAGE_LOG_FORMAT",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_requires_photon_server() {
    clear_env();
    std::env::set_var("GEONAMES_SERVER", "http://localhost:8000");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(err.category(), ErrorCategory::Config);
    assert!(err.to_string().contains("PHOTON_SERVER"));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_requires_geonames_server() {
    clear_env();
    std::env::set_var("PHOTON_SERVER", "http://localhost:2322");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("GEONAMES_SERVER"));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_with_overrides() {
    clear_env();
    std::env::set_var("PHOTON_SERVER", "http://photon:2322");
    std::env::set_var("GEONAMES_SERVER", "http://geonames:8000");
    std::env::set_var("GEOTRIAGE_LANG", "de");
    std::env::set_var("GEOTRIAGE_REQUEST_TIMEOUT", "10");
    std::env::set_var("GEOTRIAGE_VALIDATION_POLICY", "reject_on_any_failure");
    std::env::set_var("GEOTRIAGE_DATA_DIR", "/srv/geotriage");
    std::env::set_var("GEOTRIAGE_DISTANCE_FUNCTION", "Haversine");
    std::env::set_var("GEOTRIAGE_TOP_COUNTRIES", "3");
    std::env::set_var("GEOTRIAGE_DEGENERATE_POLICY", "continue");
    std::env::set_var("GEOTRIAGE_MAX_CONCURRENT_LOOKUPS", "8");

    let config = Config::from_env().unwrap();
    assert_eq!(config.geocoder.photon_url, "http://photon:2322");
    assert_eq!(config.geocoder.lang, "de");
    assert_eq!(config.geocoder.request_timeout_secs, 10);
    assert_eq!(
        config.geocoder.validation_policy,
        ValidationPolicy::RejectOnAnyFailure
    );
    assert_eq!(
        config.reference.countries_bbox_path,
        PathBuf::from("/srv/geotriage/countries_bbox.json")
    );
    assert_eq!(config.reference.distance_function, DistanceFunction::Haversine);
    assert_eq!(config.disambiguation.top_countries, Some(3));
    assert_eq!(config.disambiguation.degenerate_policy, DegeneratePolicy::Continue);
    assert_eq!(config.disambiguation.max_concurrent_lookups, 8);
    assert!(config.validate().is_ok());

    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_bad_numbers() {
    clear_env();
    std::env::set_var("PHOTON_SERVER", "http://photon:2322");
    std::env::set_var("GEONAMES_SERVER", "http://geonames:8000");
    std::env::set_var("GEOTRIAGE_MAX_CONCURRENT_LOOKUPS", "many");

    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_distance_function() {
    clear_env();
    std::env::set_var("PHOTON_SERVER", "http://photon:2322");
    std::env::set_var("GEONAMES_SERVER", "http://geonames:8000");
    std::env::set_var("GEOTRIAGE_DISTANCE_FUNCTION", "manhattan");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("GEOTRIAGE_DISTANCE_FUNCTION"));

    clear_env();
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[geocoder]
photon_url = "http://photon:2322"
geonames_url = "http://geonames:8000"
validation_policy = "reject_on_any_failure"

[reference]
distance_function = "harvesin"

[disambiguation]
top_countries = 2
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(
        config.reference.blacklist_path,
        PathBuf::from("data/blacklist.txt")
    );
    assert_eq!(config.geocoder.geonames_url, "http://geonames:8000");
    assert_eq!(config.geocoder.lang, "en");
    assert_eq!(config.disambiguation.top_countries, Some(2));
    assert_eq!(
        config.reference.distance_function,
        DistanceFunction::Haversine
    );
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_from_file_rejects_unknown_policy() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[geocoder]
photon_url = "http://photon:2322"
geonames_url = "http://geonames:8000"
validation_policy = "sometimes"
"#
    )
    .unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Config);
}

#[test]
fn test_from_missing_file() {
    assert!(Config::from_file(std::path::Path::new("does/not/exist.toml")).is_err());
}

#[test]
fn test_project_config_is_valid() {
    let config = Config::from_file(std::path::Path::new("config.toml")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.disambiguation.max_concurrent_lookups, 1);
}
