//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use geotriage::config::DisambiguationConfig;
use geotriage::disambiguation::Disambiguator;
use geotriage::geocoder::GeoLookup;
use geotriage::models::{BatchEntry, BoundingBox, LocationRecord, NerTag};
use geotriage::reference::ReferenceData;

const TEXAS_BOX: [f64; 4] = [-106.6458459, 36.5004529, -93.5078217, 25.83706];
const SAN_ANTONIO_BOX: [f64; 4] = [-98.8131865, 29.7309623, -98.2230029, 29.1862572];

fn record(name: &str, country: &str, coordinates: [f64; 2], bbox: [f64; 4]) -> LocationRecord {
    LocationRecord::new(name, country, coordinates).with_bounding_box(bbox.into())
}

pub fn old_paris() -> LocationRecord {
    record(
        "Paris",
        "France",
        [2.3514616, 48.8566969],
        [2.224122, 48.902156, 2.4697602, 48.8155755],
    )
}

pub fn new_paris() -> LocationRecord {
    record(
        "Paris",
        "United States",
        [-95.555513, 33.6617962],
        [-95.6279396, 33.7383866, -95.4354115, 33.6206345],
    )
}

pub fn san_antonio() -> LocationRecord {
    record("San Antonio", "United States", [-98.4951405, 29.4246002], SAN_ANTONIO_BOX)
}

pub fn texas() -> LocationRecord {
    record("Texas", "United States", [-99.5120986, 31.8160381], TEXAS_BOX)
}

pub fn united_states() -> LocationRecord {
    record("United States", "United States", [-98.4951405, 29.4246002], SAN_ANTONIO_BOX)
}

pub fn belgium() -> LocationRecord {
    record("Belgium", "Belgium", [-98.4951405, 29.4246002], SAN_ANTONIO_BOX)
}

pub fn brussels() -> LocationRecord {
    record(
        "Brussels",
        "Belgium",
        [2.3514616, 48.8566969],
        [2.224122, 48.902156, 2.4697602, 48.8155755],
    )
}

pub fn london_us() -> LocationRecord {
    record("London", "United States", [-99.5120986, 31.8160381], TEXAS_BOX)
}

pub fn london_uk() -> LocationRecord {
    record("London", "United Kingdom", [-0.1276474, 51.5073219], TEXAS_BOX)
}

pub fn crewe_us() -> LocationRecord {
    record("Crewe", "United States", [-78.1333, 37.1776], TEXAS_BOX)
}

pub fn crewe_uk() -> LocationRecord {
    record("Crewe", "United Kingdom", [-2.4416, 53.0998], TEXAS_BOX)
}

pub fn tewkesbury_uk() -> LocationRecord {
    record("Tewkesbury", "United Kingdom", [-2.1577, 51.9924], TEXAS_BOX)
}

pub fn eastville_uk() -> LocationRecord {
    record("Eastville", "United Kingdom", [-2.5660, 51.4700], TEXAS_BOX)
}

pub fn london_ca() -> LocationRecord {
    record("London", "Canada", [-81.2453, 42.9849], [-81.39, 42.83, -81.11, 43.07])
}

pub fn london_fr() -> LocationRecord {
    record("London", "France", [4.85, 45.76], [4.80, 45.70, 4.90, 45.80])
}

pub fn crewe_fr() -> LocationRecord {
    record("Crewe", "France", [4.86, 45.77], [4.81, 45.71, 4.91, 45.81])
}

pub fn france() -> LocationRecord {
    record("France", "France", [2.2137, 46.2276], [-5.14, 41.33, 9.56, 51.15])
}

pub fn united_kingdom() -> LocationRecord {
    record("United Kingdom", "United Kingdom", [-3.2766, 54.7023], TEXAS_BOX)
}

/// Wrap records as single-record batch entries
pub fn batch(records: &[LocationRecord]) -> Vec<BatchEntry> {
    records.iter().cloned().map(BatchEntry::Single).collect()
}

pub fn tags(names: &[&str]) -> Vec<NerTag> {
    names.iter().map(|name| NerTag::location(*name)).collect()
}

/// Small country table covering the fixtures
pub fn reference() -> Arc<ReferenceData> {
    Arc::new(
        ReferenceData::builder()
            .country("united states", BoundingBox::new(-171.79, 18.91, -66.96, 71.36))
            .country("united kingdom", BoundingBox::new(-7.57, 49.96, 1.68, 58.64))
            .country("france", BoundingBox::new(-5.14, 41.33, 9.56, 51.15))
            .country("belgium", BoundingBox::new(2.51, 49.53, 6.16, 51.48))
            .country("spain", BoundingBox::new(-9.39, 35.95, 3.04, 43.75))
            .acronyms("united kingdom", ["UK", "U.K.", "Britain"])
            .acronyms("united states", ["US", "USA"])
            .blacklist(vec!["earth".to_string()])
            .build()
            .expect("fixture reference data"),
    )
}

type Key = (String, Option<String>);

/// Scripted in-memory geocoder.
///
/// Answers are keyed on the lowercased name and country constraint; anything
/// unscripted resolves to nothing. Every call is recorded.
#[derive(Default)]
pub struct MockGeoLookup {
    answers: HashMap<Key, Vec<LocationRecord>>,
    calls: Mutex<Vec<Key>>,
}

impl MockGeoLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `name` constrained to `country` with `records`
    pub fn answer(mut self, name: &str, country: Option<&str>, records: Vec<LocationRecord>) -> Self {
        self.answers.insert(key(name, country), records);
        self
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn key(name: &str, country: Option<&str>) -> Key {
    (name.to_lowercase(), country.map(str::to_lowercase))
}

#[async_trait]
impl GeoLookup for MockGeoLookup {
    async fn lookup(
        &self,
        name: &str,
        best_matching: bool,
        country: Option<&str>,
    ) -> Vec<LocationRecord> {
        let key = key(name, country);
        self.calls.lock().unwrap().push(key.clone());

        let mut records = self.answers.get(&key).cloned().unwrap_or_default();
        if best_matching {
            records.truncate(1);
        }
        records
    }

    async fn validate(&self, name: &str, country: &str) -> Vec<LocationRecord> {
        self.answers
            .get(&key(name, Some(country)))
            .cloned()
            .unwrap_or_default()
    }
}

/// Engine over `lookup` with default policies
pub fn engine(lookup: Arc<MockGeoLookup>) -> Disambiguator {
    engine_with(lookup, DisambiguationConfig::default())
}

pub fn engine_with(lookup: Arc<MockGeoLookup>, config: DisambiguationConfig) -> Disambiguator {
    Disambiguator::new(lookup, reference(), config)
}
