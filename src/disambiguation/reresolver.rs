//! Final materialization of a disambiguated batch
//!
//! Each position is either kept, replaced by a record re-resolved in its
//! target country, or dropped to [`BatchEntry::Empty`]. Output length and
//! order always match the input.

use futures::stream::{self, StreamExt};

use super::extractor::CountryMapping;
use super::majority::FrequencyTable;
use crate::geocoder::GeoLookup;
use crate::models::{BatchEntry, LocationRecord};

/// Applies a final name -> country mapping to a batch
pub struct Reresolver<'a> {
    lookup: &'a dyn GeoLookup,
    mapping: &'a CountryMapping,
    only_countries: &'a FrequencyTable,
}

impl<'a> Reresolver<'a> {
    pub fn new(
        lookup: &'a dyn GeoLookup,
        mapping: &'a CountryMapping,
        only_countries: &'a FrequencyTable,
    ) -> Self {
        Self {
            lookup,
            mapping,
            only_countries,
        }
    }

    /// Resolve every position, running up to `concurrency` lookups at once
    pub async fn apply(&self, batch: &[BatchEntry], concurrency: usize) -> Vec<BatchEntry> {
        stream::iter(batch)
            .map(|entry| self.resolve_entry(entry))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Resolve one position; candidate lists are judged by their best match
    pub async fn resolve_entry(&self, entry: &BatchEntry) -> BatchEntry {
        let Some(record) = entry.primary() else {
            return BatchEntry::Empty;
        };

        let Some(target) = self.mapping.get(&record.name) else {
            return BatchEntry::Empty;
        };

        if target != record.country {
            tracing::info!(
                location = %record.name,
                from = %record.country,
                to = %target,
                "Changing location country"
            );

            if let Some(found) = self
                .lookup
                .lookup(&record.name, true, Some(target))
                .await
                .into_iter()
                .next()
            {
                return BatchEntry::Single(found);
            }
        }

        if self.keeps(record) {
            entry.clone()
        } else {
            tracing::warn!(
                location = %record.name,
                country = %record.country,
                "Location matches no reference country, discarding"
            );
            BatchEntry::Empty
        }
    }

    /// A record survives when no reference country exists or it is in one
    fn keeps(&self, record: &LocationRecord) -> bool {
        self.only_countries.is_empty() || self.only_countries.contains(&record.country)
    }
}
