//! Geonames gazetteer client used to confirm search hits

use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::{endpoint_url, get_json};
use crate::config::GeocoderConfig;
use crate::models::LocationRecord;
use crate::reference::ReferenceData;
use crate::utils::error::LookupError;

/// Client for the Geonames lookup service
pub struct GeonamesClient {
    client: Client,
    lookup_url: Url,
    reference: Arc<ReferenceData>,
}

impl GeonamesClient {
    pub fn new(
        config: &GeocoderConfig,
        client: Client,
        reference: Arc<ReferenceData>,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            client,
            lookup_url: endpoint_url(&config.geonames_url, &config.geonames_endpoint)?,
            reference,
        })
    }

    /// Look `name` up inside `country`.
    ///
    /// The service answers with at most one place; anything that isn't a
    /// complete place object means "not found".
    pub async fn validate(
        &self,
        name: &str,
        country: &str,
    ) -> Result<Vec<LocationRecord>, LookupError> {
        let country_key = country.to_lowercase();
        let name_key = name.to_lowercase();

        tracing::debug!(location = %name, country = %country, "Querying Geonames");

        let body = get_json(
            &self.client,
            &self.lookup_url,
            &[
                ("country", country_key.as_str()),
                ("local_location", name_key.as_str()),
            ],
        )
        .await?;

        let Some(mut record) = parse_place(&body) else {
            return Ok(Vec::new());
        };

        if record.name.to_lowercase() == country_key {
            record.bounding_box = self.reference.country_bbox(&country_key);
        }

        Ok(vec![record])
    }
}

fn parse_place(body: &Value) -> Option<LocationRecord> {
    let obj = body.as_object()?;
    let name = obj.get("name")?.as_str()?;
    let country = obj.get("country")?.as_str()?;
    let longitude = number(obj.get("longitude")?)?;
    let latitude = number(obj.get("latitude")?)?;

    Some(LocationRecord::new(name, country, [longitude, latitude]))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
