//! Static reference datasets
//!
//! Country bounding boxes (also the "is this a country" test), the country
//! neighbor graph, the alias/acronym table and the blacklist of names that
//! must never be geocoded. Loaded once at startup; any unreadable file is a
//! fatal [`ReferenceError`].

use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::ReferenceConfig;
use crate::geometry::{self, DistanceFunction};
use crate::models::BoundingBox;
use crate::utils::error::ReferenceError;
use crate::utils::normalize_key;

/// Read-only reference tables shared by the geocoder and the disambiguator
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// Lowercase country name -> bounding box
    country_bbox: HashMap<String, BoundingBox>,

    /// Country name -> neighboring country names
    neighbors: HashMap<String, Vec<String>>,

    /// Exact alias -> canonical lowercase country name
    acronyms: HashMap<String, String>,

    /// Lowercase names that are never geocoded
    blacklist: HashSet<String>,

    distance_function: DistanceFunction,
}

impl ReferenceData {
    /// Create a new builder for hand-assembled reference data
    pub fn builder() -> ReferenceDataBuilder {
        ReferenceDataBuilder::default()
    }

    /// Load every dataset named in the configuration
    pub fn load(config: &ReferenceConfig) -> Result<Self, ReferenceError> {
        let country_bbox: HashMap<String, BoundingBox> = read_json(&config.countries_bbox_path)?;
        let neighbors: HashMap<String, Vec<String>> = read_json(&config.country_neighbors_path)?;
        let acronyms: HashMap<String, Vec<String>> = read_json(&config.country_acronyms_path)?;

        let blacklist = std::fs::read_to_string(&config.blacklist_path).map_err(|source| {
            ReferenceError::Io {
                path: config.blacklist_path.clone(),
                source,
            }
        })?;

        let data = Self::builder()
            .countries(country_bbox)
            .neighbors(neighbors)
            .blacklist(blacklist.lines().map(str::to_string))
            .acronym_table(acronyms)
            .distance_function(config.distance_function)
            .build()?;

        tracing::info!(
            countries = data.country_bbox.len(),
            aliases = data.acronyms.len(),
            blacklisted = data.blacklist.len(),
            distance = %data.distance_function,
            "Reference data loaded"
        );

        Ok(data)
    }

    /// Case-insensitive membership in the country bounding-box table
    pub fn is_country(&self, name: &str) -> bool {
        self.country_bbox.contains_key(&normalize_key(name))
    }

    /// Bounding box of a country, case-insensitive
    pub fn country_bbox(&self, country: &str) -> Option<BoundingBox> {
        self.country_bbox.get(&normalize_key(country)).copied()
    }

    /// Countries sharing a border with `country`; empty when unknown
    pub fn neighbors(&self, country: &str) -> &[String] {
        self.neighbors
            .get(country)
            .or_else(|| {
                let key = normalize_key(country);
                self.neighbors
                    .iter()
                    .find(|(name, _)| normalize_key(name) == key)
                    .map(|(_, list)| list)
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Expand an alias to its canonical lowercase country name.
    ///
    /// Matching is exact: "US" expands, the word "Us" does not.
    pub fn resolve_acronym(&self, alias: &str) -> Option<&str> {
        self.acronyms.get(alias.trim()).map(String::as_str)
    }

    /// Canonical country for a free-text mention: the name itself when it is
    /// a known country, otherwise its alias expansion
    pub fn canonical_country(&self, mention: &str) -> Option<String> {
        if self.is_country(mention) {
            return Some(normalize_key(mention));
        }
        self.resolve_acronym(mention)
            .filter(|canonical| self.is_country(canonical))
            .map(str::to_string)
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(&normalize_key(name))
    }

    /// Countries whose bounding box intersects `bbox`, sorted by name
    pub fn reverse_geocode_bounding_box(&self, bbox: &BoundingBox) -> Vec<String> {
        let mut countries: Vec<String> = self
            .country_bbox
            .iter()
            .filter(|(_, country_box)| geometry::check_intersection(bbox, country_box))
            .map(|(name, _)| name.clone())
            .collect();
        countries.sort();
        countries
    }

    /// Countries intersecting `bbox` once it is grown to span at least
    /// `min_extent` meters corner to corner
    pub fn countries_around(&self, bbox: &BoundingBox, min_extent: f64) -> Vec<String> {
        self.reverse_geocode_bounding_box(&self.enlarge_bounding_box(bbox, min_extent))
    }

    /// Grow `bbox` until its diagonal reaches `distance` meters
    pub fn enlarge_bounding_box(&self, bbox: &BoundingBox, distance: f64) -> BoundingBox {
        geometry::enlarge_bounding_box(bbox, distance, self.distance_function)
    }

    /// Distance in meters between two `[lon, lat]` points
    pub fn distance(&self, a: [f64; 2], b: [f64; 2]) -> f64 {
        geometry::calculate_distance(a, b, self.distance_function)
    }

    pub fn distance_function(&self) -> DistanceFunction {
        self.distance_function
    }

    pub fn country_count(&self) -> usize {
        self.country_bbox.len()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReferenceError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ReferenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Builder for ReferenceData with fluent API
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataBuilder {
    country_bbox: HashMap<String, BoundingBox>,
    neighbors: HashMap<String, Vec<String>>,
    acronyms: Vec<(String, Vec<String>)>,
    blacklist: HashSet<String>,
    distance_function: DistanceFunction,
}

impl ReferenceDataBuilder {
    /// Add one country and its bounding box
    pub fn country(mut self, name: &str, bbox: BoundingBox) -> Self {
        self.country_bbox.insert(normalize_key(name), bbox);
        self
    }

    pub fn countries(mut self, table: HashMap<String, BoundingBox>) -> Self {
        for (name, bbox) in table {
            self.country_bbox.insert(normalize_key(&name), bbox);
        }
        self
    }

    pub fn neighbors(mut self, table: HashMap<String, Vec<String>>) -> Self {
        self.neighbors.extend(table);
        self
    }

    /// Register aliases for one canonical country
    pub fn acronyms<I, S>(mut self, canonical: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.acronyms.push((
            normalize_key(canonical),
            aliases.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn acronym_table(mut self, table: HashMap<String, Vec<String>>) -> Self {
        let mut entries: Vec<_> = table.into_iter().collect();
        // deterministic duplicate reporting
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (canonical, aliases) in entries {
            self = self.acronyms(&canonical, aliases);
        }
        self
    }

    pub fn blacklist<I: IntoIterator<Item = String>>(mut self, names: I) -> Self {
        self.blacklist.extend(
            names
                .into_iter()
                .map(|n| normalize_key(&n))
                .filter(|n| !n.is_empty()),
        );
        self
    }

    /// Distance strategy for the bounding-box helpers
    pub fn distance_function(mut self, function: DistanceFunction) -> Self {
        self.distance_function = function;
        self
    }

    /// Build, rejecting aliases claimed by more than one country
    pub fn build(self) -> Result<ReferenceData, ReferenceError> {
        let mut acronyms: HashMap<String, String> = HashMap::new();

        for (canonical, aliases) in self.acronyms {
            for alias in aliases {
                let alias = alias.trim().to_string();
                if alias.is_empty() {
                    continue;
                }
                match acronyms.get(&alias) {
                    Some(existing) if *existing != canonical => {
                        return Err(ReferenceError::DuplicateAlias {
                            alias,
                            first: existing.clone(),
                            second: canonical,
                        });
                    }
                    Some(_) => {}
                    None => {
                        acronyms.insert(alias, canonical.clone());
                    }
                }
            }
        }

        Ok(ReferenceData {
            country_bbox: self.country_bbox,
            neighbors: self.neighbors,
            acronyms,
            blacklist: self.blacklist,
            distance_function: self.distance_function,
        })
    }
}
