//! Geocoding clients
//!
//! [`GeoLookup`] is the seam the disambiguation engine consumes. The concrete
//! [`Geocoder`] combines a Photon search server with a Geonames gazetteer:
//! every search hit is cross-checked against the gazetteer before it is
//! returned.
//!
//! Transport, status and decoding faults stop here. They are logged at
//! `error` level and surface to callers as an empty result; nothing is
//! retried.

pub mod geonames;
pub mod photon;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::config::{GeocoderConfig, ValidationPolicy};
use crate::error::Result;
use crate::models::LocationRecord;
use crate::reference::ReferenceData;
use crate::utils::error::LookupError;

pub use geonames::GeonamesClient;
pub use photon::PhotonClient;

/// Place-name resolution as seen by the disambiguation engine.
///
/// Both operations are infallible by contract: "nothing found" and "the
/// upstream failed" are the same empty vector.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Resolve `name`, optionally restricted to `country`. With
    /// `best_matching` at most one record is returned.
    async fn lookup(
        &self,
        name: &str,
        best_matching: bool,
        country: Option<&str>,
    ) -> Vec<LocationRecord>;

    /// Cross-check `name` in `country` against the secondary gazetteer
    async fn validate(&self, name: &str, country: &str) -> Vec<LocationRecord>;
}

/// Build the shared HTTP client with the configured timeouts
pub fn build_http_client(config: &GeocoderConfig) -> std::result::Result<Client, LookupError> {
    let client = Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

/// Join a server base URL and an endpoint path
pub(crate) fn endpoint_url(base: &str, path: &str) -> std::result::Result<Url, LookupError> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| LookupError::InvalidUrl(format!("{joined}: {e}")))
}

/// GET `url` with `query` and decode the body as JSON
pub(crate) async fn get_json(
    client: &Client,
    url: &Url,
    query: &[(&str, &str)],
) -> std::result::Result<Value, LookupError> {
    let response = client
        .get(url.clone())
        .query(query)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout
            } else {
                LookupError::Http(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::ServerError(status.as_u16()));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))
}

/// Photon search validated against Geonames
pub struct Geocoder {
    photon: PhotonClient,
    geonames: GeonamesClient,
    reference: Arc<ReferenceData>,
    validation_policy: ValidationPolicy,
}

impl Geocoder {
    /// Create both clients over one HTTP connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if a server URL is invalid or the HTTP client cannot be built
    pub fn new(config: &GeocoderConfig, reference: Arc<ReferenceData>) -> Result<Self> {
        let client = build_http_client(config)?;
        let photon = PhotonClient::new(config, client.clone(), Arc::clone(&reference))?;
        let geonames = GeonamesClient::new(config, client, Arc::clone(&reference))?;

        tracing::info!(
            photon = %config.photon_url,
            geonames = %config.geonames_url,
            policy = ?config.validation_policy,
            "Geocoder initialized"
        );

        Ok(Self {
            photon,
            geonames,
            reference,
            validation_policy: config.validation_policy,
        })
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Country constraint as sent upstream: aliases expand to their canonical name
    fn country_constraint<'a>(&'a self, country: Option<&'a str>) -> Option<&'a str> {
        country.map(|c| self.reference.resolve_acronym(c).unwrap_or(c))
    }

    async fn is_validated(&self, hit: &LocationRecord) -> bool {
        self.validate(&hit.name, &hit.country)
            .await
            .iter()
            .any(|checked| {
                checked.name.to_lowercase() == hit.name.to_lowercase()
                    && checked.country.to_lowercase() == hit.country.to_lowercase()
            })
    }
}

#[async_trait]
impl GeoLookup for Geocoder {
    async fn lookup(
        &self,
        name: &str,
        best_matching: bool,
        country: Option<&str>,
    ) -> Vec<LocationRecord> {
        if self.reference.is_blacklisted(name) {
            tracing::warn!(location = %name, "Location is blacklisted, returning empty result");
            return Vec::new();
        }

        let country = self.country_constraint(country);

        let hits = match self.photon.search(name, best_matching, country).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!(location = %name, error = %e, "Geocoder query failed");
                return Vec::new();
            }
        };

        let total = hits.len();
        let mut validated = Vec::with_capacity(total);
        for hit in hits {
            if self.is_validated(&hit).await {
                validated.push(hit);
            } else if self.validation_policy == ValidationPolicy::RejectOnAnyFailure {
                tracing::warn!(
                    location = %name,
                    rejected = %hit.name,
                    "Geocoder hit failed validation, rejecting all hits"
                );
                return Vec::new();
            } else {
                tracing::debug!(location = %name, rejected = %hit.name, "Dropping unvalidated hit");
            }
        }

        if validated.is_empty() {
            tracing::warn!(location = %name, hits = total, "Location validation failed, returning empty result");
        }

        validated
    }

    async fn validate(&self, name: &str, country: &str) -> Vec<LocationRecord> {
        match self.geonames.validate(name, country).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(location = %name, country = %country, error = %e, "Gazetteer query failed");
                Vec::new()
            }
        }
    }
}
