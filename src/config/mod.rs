//! Configuration management for geotriage
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. A [`Config`] is built once at process start and
//! handed by reference to the geocoder and disambiguator constructors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::geometry::DistanceFunction;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream geocoder and gazetteer endpoints
    pub geocoder: GeocoderConfig,

    /// Reference dataset locations
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Disambiguation engine policies
    #[serde(default)]
    pub disambiguation: DisambiguationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream geocoding services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Photon search server base URL
    pub photon_url: String,

    /// Geonames validation server base URL
    pub geonames_url: String,

    /// Photon search path
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Geonames lookup path
    #[serde(default = "default_geonames_endpoint")]
    pub geonames_endpoint: String,

    /// Result language
    #[serde(default = "default_lang")]
    pub lang: String,

    /// OSM tag filter applied to searches
    #[serde(default = "default_osm_tag")]
    pub osm_tag: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// What to do with search hits the gazetteer cannot confirm
    #[serde(default)]
    pub validation_policy: ValidationPolicy,
}

/// Reference dataset paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub countries_bbox_path: PathBuf,
    pub country_neighbors_path: PathBuf,
    pub country_acronyms_path: PathBuf,
    pub blacklist_path: PathBuf,

    /// Distance strategy for the reference bounding-box helpers
    pub distance_function: DistanceFunction,
}

/// Disambiguation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisambiguationConfig {
    /// Cap on the number of candidate reference countries
    pub top_countries: Option<usize>,

    /// Behaviour when the batch has no real majority and starts malformed
    pub degenerate_policy: DegeneratePolicy,

    /// Concurrent re-resolution lookups (1 = sequential)
    pub max_concurrent_lookups: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Policy for geocoder hits that fail the gazetteer cross-check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Return the hits that validated, drop the others
    #[default]
    KeepValidated,
    /// Return nothing when any hit fails validation
    RejectOnAnyFailure,
}

impl FromStr for ValidationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep_validated" => Ok(Self::KeepValidated),
            "reject_on_any_failure" => Ok(Self::RejectOnAnyFailure),
            other => Err(Error::config(format!("unknown validation policy '{other}'"))),
        }
    }
}

/// Policy for the no-majority guard that runs before edge-case selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Short-circuit to empty records when the first entry has no name
    #[default]
    EmptyOnMalformed,
    /// Never short-circuit; malformed entries still come out empty
    Continue,
}

impl FromStr for DegeneratePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "empty_on_malformed" => Ok(Self::EmptyOnMalformed),
            "continue" => Ok(Self::Continue),
            other => Err(Error::config(format!("unknown degenerate policy '{other}'"))),
        }
    }
}

fn default_search_endpoint() -> String {
    String::from("/api")
}

fn default_geonames_endpoint() -> String {
    String::from("/locations/")
}

fn default_lang() -> String {
    String::from("en")
}

fn default_osm_tag() -> String {
    String::from("place")
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

impl GeocoderConfig {
    /// Endpoint configuration with defaults for everything but the two servers
    pub fn new(photon_url: impl Into<String>, geonames_url: impl Into<String>) -> Self {
        Self {
            photon_url: photon_url.into(),
            geonames_url: geonames_url.into(),
            search_endpoint: default_search_endpoint(),
            geonames_endpoint: default_geonames_endpoint(),
            lang: default_lang(),
            osm_tag: default_osm_tag(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            validation_policy: ValidationPolicy::default(),
        }
    }

    /// Get connect timeout as Duration
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ReferenceConfig {
    /// All four datasets under one directory, with their conventional file names
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            countries_bbox_path: dir.join("countries_bbox.json"),
            country_neighbors_path: dir.join("country_neighbors.json"),
            country_acronyms_path: dir.join("country_acronyms.json"),
            blacklist_path: dir.join("blacklist.txt"),
            distance_function: DistanceFunction::default(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            top_countries: None,
            degenerate_policy: DegeneratePolicy::default(),
            max_concurrent_lookups: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Configuration with default policies for the two given servers
    pub fn new(photon_url: impl Into<String>, geonames_url: impl Into<String>) -> Self {
        Self {
            geocoder: GeocoderConfig::new(photon_url, geonames_url),
            reference: ReferenceConfig::default(),
            disambiguation: DisambiguationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `PHOTON_SERVER` and `GEONAMES_SERVER` are required.
    pub fn from_env() -> Result<Self> {
        let photon_url = required_env("PHOTON_SERVER")?;
        let geonames_url = required_env("GEONAMES_SERVER")?;

        let mut config = Self::new(photon_url, geonames_url);

        if let Ok(lang) = std::env::var("GEOTRIAGE_LANG") {
            config.geocoder.lang = lang;
        }
        if let Ok(tag) = std::env::var("GEOTRIAGE_OSM_TAG") {
            config.geocoder.osm_tag = tag;
        }
        if let Some(secs) = parsed_env::<u64>("GEOTRIAGE_CONNECT_TIMEOUT")? {
            config.geocoder.connect_timeout_secs = secs;
        }
        if let Some(secs) = parsed_env::<u64>("GEOTRIAGE_REQUEST_TIMEOUT")? {
            config.geocoder.request_timeout_secs = secs;
        }
        if let Ok(policy) = std::env::var("GEOTRIAGE_VALIDATION_POLICY") {
            config.geocoder.validation_policy = policy.parse()?;
        }

        if let Ok(dir) = std::env::var("GEOTRIAGE_DATA_DIR") {
            config.reference = ReferenceConfig::in_dir(dir);
        }
        if let Some(function) = parsed_env::<DistanceFunction>("GEOTRIAGE_DISTANCE_FUNCTION")? {
            config.reference.distance_function = function;
        }

        if let Some(top) = parsed_env::<usize>("GEOTRIAGE_TOP_COUNTRIES")? {
            config.disambiguation.top_countries = Some(top);
        }
        if let Ok(policy) = std::env::var("GEOTRIAGE_DEGENERATE_POLICY") {
            config.disambiguation.degenerate_policy = policy.parse()?;
        }
        if let Some(n) = parsed_env::<usize>("GEOTRIAGE_MAX_CONCURRENT_LOOKUPS")? {
            config.disambiguation.max_concurrent_lookups = n;
        }

        if let Ok(level) = std::env::var("GEOTRIAGE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("GEOTRIAGE_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::with_source(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse TOML config file {}: {e}",
                path.display()
            ))
        })?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_server_url("photon_url", &self.geocoder.photon_url)?;
        validate_server_url("geonames_url", &self.geocoder.geonames_url)?;

        if self.geocoder.connect_timeout_secs == 0 || self.geocoder.request_timeout_secs == 0 {
            return Err(Error::config("timeouts must be greater than 0"));
        }

        if self.disambiguation.max_concurrent_lookups == 0 {
            return Err(Error::config("max_concurrent_lookups must be greater than 0"));
        }

        if self.disambiguation.top_countries == Some(0) {
            return Err(Error::config("top_countries must be greater than 0 when set"));
        }

        Ok(())
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::config(format!(
            "The environment variable {name} has not been specified"
        ))),
    }
}

fn parsed_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::config(format!("{name} has an invalid value: '{raw}'"))),
        Err(_) => Ok(None),
    }
}

fn validate_server_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| Error::config(format!("{field} '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::config(format!(
            "{field} must use http or https, got '{scheme}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config::new("http://localhost:2322", "http://localhost:8000")
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_invalid_server_scheme() {
        let mut config = sample();
        config.geocoder.photon_url = "ftp://localhost".to_string();
        assert!(config.validate().is_err());

        config.geocoder.photon_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_concurrency_and_top_countries() {
        let mut config = sample();
        config.disambiguation.max_concurrent_lookups = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.disambiguation.top_countries = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = sample();
        assert_eq!(config.geocoder.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.geocoder.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "reject_on_any_failure".parse::<ValidationPolicy>().unwrap(),
            ValidationPolicy::RejectOnAnyFailure
        );
        assert_eq!(
            "Continue".parse::<DegeneratePolicy>().unwrap(),
            DegeneratePolicy::Continue
        );
        assert!("sometimes".parse::<DegeneratePolicy>().is_err());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [geocoder]
            photon_url = "http://photon:2322"
            geonames_url = "http://geonames:8000"
            "#,
        )
        .unwrap();

        assert_eq!(config.geocoder.search_endpoint, "/api");
        assert_eq!(config.geocoder.validation_policy, ValidationPolicy::KeepValidated);
        assert_eq!(config.reference.blacklist_path, PathBuf::from("data/blacklist.txt"));
        assert_eq!(config.disambiguation.max_concurrent_lookups, 1);
        assert_eq!(config.logging.format, "text");
    }
}
