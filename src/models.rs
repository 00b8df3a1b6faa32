// Core data structures for geotriage

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Axis-aligned geographic box: `[min_lon, min_lat, max_lon, max_lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Build from a slice; anything other than four values means "unknown"
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d] => Some(Self::new(*a, *b, *c, *d)),
            _ => None,
        }
    }

    /// First corner as `[lon, lat]`
    pub fn lower_corner(&self) -> [f64; 2] {
        [self.min_lon, self.min_lat]
    }

    /// Second corner as `[lon, lat]`
    pub fn upper_corner(&self) -> [f64; 2] {
        [self.max_lon, self.max_lat]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}

/// A geocoded place: canonical name, owning country, point and extent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub country: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    #[serde(
        default,
        deserialize_with = "deserialize_optional_bbox",
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_box: Option<BoundingBox>,
}

impl LocationRecord {
    pub fn new(name: impl Into<String>, country: impl Into<String>, coordinates: [f64; 2]) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            coordinates,
            bounding_box: None,
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    /// True when the place itself is a country mention ("Belgium" in Belgium)
    pub fn is_country_mention(&self) -> bool {
        self.name == self.country
    }

    /// Lenient conversion from an arbitrary JSON object.
    ///
    /// Returns `None` for incomplete records: missing or empty `name`, or a
    /// `country` that is not a non-empty string. Missing coordinates default
    /// to `[0.0, 0.0]`; a bounding box that isn't four numbers is dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let name = obj.get("name")?.as_str()?.trim();
        let country = obj.get("country")?.as_str()?.trim();
        if name.is_empty() || country.is_empty() {
            return None;
        }

        let coordinates = obj
            .get("coordinates")
            .and_then(numeric_array)
            .and_then(|v| match v.as_slice() {
                [lon, lat] => Some([*lon, *lat]),
                _ => None,
            })
            .unwrap_or([0.0, 0.0]);

        let bounding_box = obj
            .get("bounding_box")
            .and_then(numeric_array)
            .and_then(|v| BoundingBox::from_slice(&v));

        Some(Self {
            name: name.to_string(),
            country: country.to_string(),
            coordinates,
            bounding_box,
        })
    }
}

fn numeric_array(value: &Value) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

fn deserialize_optional_bbox<'de, D>(deserializer: D) -> Result<Option<BoundingBox>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<f64>> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| BoundingBox::from_slice(&v)))
}

/// One position of a batch: nothing, one record, or a ranked candidate list
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BatchEntry {
    /// Unresolved or incomplete location; serialized as `{}`
    #[default]
    Empty,
    Single(LocationRecord),
    /// Multi-candidate lookup result, best match first. Never empty.
    Candidates(Vec<LocationRecord>),
}

impl BatchEntry {
    /// Wrap a lookup result: no hits is `Empty`, otherwise `Candidates`
    pub fn from_candidates(records: Vec<LocationRecord>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Candidates(records)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The record reresolution works on: the single record or the best candidate
    pub fn primary(&self) -> Option<&LocationRecord> {
        match self {
            Self::Empty => None,
            Self::Single(record) => Some(record),
            Self::Candidates(records) => records.first(),
        }
    }

    /// Every complete record in this position, in order
    pub fn records(&self) -> &[LocationRecord] {
        match self {
            Self::Empty => &[],
            Self::Single(record) => std::slice::from_ref(record),
            Self::Candidates(records) => records,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                Self::from_candidates(items.iter().filter_map(LocationRecord::from_value).collect())
            }
            other => LocationRecord::from_value(other)
                .map(Self::Single)
                .unwrap_or(Self::Empty),
        }
    }
}

impl From<LocationRecord> for BatchEntry {
    fn from(record: LocationRecord) -> Self {
        Self::Single(record)
    }
}

impl Serialize for BatchEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_map(Some(0))?.end(),
            Self::Single(record) => record.serialize(serializer),
            Self::Candidates(records) => records.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BatchEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Named entity recognised in the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerTag {
    #[serde(alias = "tag")]
    pub name: String,
    #[serde(alias = "category")]
    pub label: String,
}

impl NerTag {
    pub const LOCATION_LABEL: &'static str = "location";

    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Tag with the `location` label
    pub fn location(name: impl Into<String>) -> Self {
        Self::new(name, Self::LOCATION_LABEL)
    }

    pub fn is_location(&self) -> bool {
        self.label.eq_ignore_ascii_case(Self::LOCATION_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_roundtrips_original_layout() {
        let value = json!({
            "name": "Paris",
            "country": "France",
            "coordinates": [2.3514616, 48.8566969],
            "bounding_box": [2.224122, 48.902156, 2.4697602, 48.8155755]
        });

        let record = LocationRecord::from_value(&value).unwrap();
        assert_eq!(record.name, "Paris");
        assert_eq!(record.coordinates, [2.3514616, 48.8566969]);
        assert_eq!(record.bounding_box.unwrap().max_lat, 48.8155755);
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_incomplete_records_are_empty() {
        assert_eq!(BatchEntry::from_value(&json!({})), BatchEntry::Empty);
        assert_eq!(
            BatchEntry::from_value(&json!({"country": "Spain", "coodinates": [0, 0]})),
            BatchEntry::Empty
        );
        assert_eq!(
            BatchEntry::from_value(&json!({"name": "Nowhere", "country": []})),
            BatchEntry::Empty
        );
        assert_eq!(BatchEntry::from_value(&json!([{}])), BatchEntry::Empty);
    }

    #[test]
    fn test_candidate_list_skips_incomplete_entries() {
        let entry = BatchEntry::from_value(&json!([
            {},
            {"name": "Sydney", "country": "Australia", "coordinates": ["151.2", "-33.8"]}
        ]));

        let records = entry.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].coordinates, [151.2, -33.8]);
        assert_eq!(entry.primary().unwrap().name, "Sydney");
    }

    #[test]
    fn test_empty_entry_serializes_as_empty_object() {
        let out = serde_json::to_string(&vec![BatchEntry::Empty]).unwrap();
        assert_eq!(out, "[{}]");
    }

    #[test]
    fn test_empty_bbox_array_is_unknown() {
        let record: LocationRecord = serde_json::from_value(json!({
            "name": "Texas",
            "country": "United States",
            "coordinates": [-99.5, 31.8],
            "bounding_box": []
        }))
        .unwrap();
        assert!(record.bounding_box.is_none());
    }

    #[test]
    fn test_ner_tag_accepts_legacy_fields() {
        let tag: NerTag = serde_json::from_value(json!({"tag": "Paris", "category": "location"})).unwrap();
        assert_eq!(tag, NerTag::location("Paris"));
        assert!(tag.is_location());
        assert!(!NerTag::new("Paris", "person").is_location());
    }
}
