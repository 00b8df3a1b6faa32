//! Country extraction over a batch

use std::collections::HashMap;

use super::majority::FrequencyTable;
use crate::models::{BatchEntry, LocationRecord};

/// Name -> assigned country, iterated in first-insertion order.
///
/// Re-inserting a name overwrites its country but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryMapping {
    order: Vec<String>,
    countries: HashMap<String, String>,
}

impl CountryMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, country: &str) {
        if self
            .countries
            .insert(name.to_string(), country.to_string())
            .is_none()
        {
            self.order.push(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.countries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.countries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names in first-insertion order
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// `(name, country)` pairs in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().filter_map(move |name| {
            self.countries
                .get(name)
                .map(|country| (name.as_str(), country.as_str()))
        })
    }
}

/// Everything derived from a batch before any voting happens
#[derive(Debug, Clone, Default)]
pub struct CountryExtraction {
    /// One country per complete record, duplicates kept
    pub countries: Vec<String>,

    /// Counts of records that are themselves country mentions
    pub only_countries: FrequencyTable,

    /// Name -> country, last write wins
    pub mapping: CountryMapping,
}

impl CountryExtraction {
    fn record(&mut self, record: &LocationRecord) {
        self.countries.push(record.country.clone());
        self.mapping.insert(&record.name, &record.country);
        if record.is_country_mention() {
            self.only_countries.add(&record.country);
        }
    }
}

/// Scan a batch; candidate lists contribute every inner record
pub fn extract_countries(batch: &[BatchEntry]) -> CountryExtraction {
    let mut extraction = CountryExtraction::default();

    for entry in batch {
        for record in entry.records() {
            if record.name.is_empty() || record.country.is_empty() {
                continue;
            }
            extraction.record(record);
        }
    }

    extraction
}
