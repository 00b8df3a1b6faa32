//! Photon search client
//!
//! Queries `{photon_url}{search_endpoint}?q=..&lang=..&osm_tag=..` and turns
//! the GeoJSON feature collection into [`LocationRecord`]s.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use super::{endpoint_url, get_json};
use crate::config::GeocoderConfig;
use crate::models::{BoundingBox, LocationRecord};
use crate::reference::ReferenceData;
use crate::utils::error::LookupError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    geometry: Geometry,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    name: Option<String>,
    country: Option<String>,
    extent: Option<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Geometry {
    coordinates: Option<Vec<f64>>,
}

/// Client for the Photon search API
pub struct PhotonClient {
    client: Client,
    search_url: Url,
    lang: String,
    osm_tag: String,
    reference: Arc<ReferenceData>,
}

impl PhotonClient {
    pub fn new(
        config: &GeocoderConfig,
        client: Client,
        reference: Arc<ReferenceData>,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            client,
            search_url: endpoint_url(&config.photon_url, &config.search_endpoint)?,
            lang: config.lang.clone(),
            osm_tag: config.osm_tag.clone(),
            reference,
        })
    }

    /// Search for `name`, keeping only features in `country` when given.
    ///
    /// Results keep Photon's ranking; with `best_matching` only the first
    /// surviving feature is returned.
    pub async fn search(
        &self,
        name: &str,
        best_matching: bool,
        country: Option<&str>,
    ) -> Result<Vec<LocationRecord>, LookupError> {
        tracing::debug!(location = %name, country = ?country, "Querying Photon");

        let body = get_json(
            &self.client,
            &self.search_url,
            &[
                ("q", name),
                ("lang", self.lang.as_str()),
                ("osm_tag", self.osm_tag.as_str()),
            ],
        )
        .await?;

        let collection: FeatureCollection =
            serde_json::from_value(body).map_err(|e| LookupError::Decode(e.to_string()))?;

        let wanted_country = country.map(str::to_lowercase);
        let mut records = Vec::new();

        for feature in collection.features {
            let Some(record) = self.to_record(feature) else {
                continue;
            };

            if let Some(wanted) = &wanted_country {
                if record.country.to_lowercase() != *wanted {
                    continue;
                }
            }

            records.push(record);

            if best_matching {
                break;
            }
        }

        Ok(records)
    }

    /// Features missing a name, country, extent or point are skipped
    fn to_record(&self, feature: Feature) -> Option<LocationRecord> {
        let Properties {
            name,
            country,
            extent,
        } = feature.properties;

        let name = name?;
        let country = country?;
        let extent = extent?;
        let coordinates = match feature.geometry.coordinates?.as_slice() {
            [lon, lat, ..] => [*lon, *lat],
            _ => return None,
        };

        // country-level features take the reference country box
        let bounding_box = if name.to_lowercase() == country.to_lowercase() {
            self.reference.country_bbox(&country)
        } else {
            BoundingBox::from_slice(&extent)
        };

        Some(LocationRecord {
            name,
            country,
            coordinates,
            bounding_box,
        })
    }
}
