//! Batch disambiguation state machine
//!
//! A batch is classified into exactly one [`EdgeCase`], checked in priority
//! order. The selected case rewrites the name -> country mapping, and the
//! [`Reresolver`] then materializes the output batch from it.

use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;

use super::extractor::{extract_countries, CountryExtraction, CountryMapping};
use super::majority::{count_countries, is_tied, CountryCount, FrequencyTable};
use super::ner::{normalize_country_tags, split_ner_tags, UNITED_KINGDOM};
use super::reresolver::Reresolver;
use crate::config::{DegeneratePolicy, DisambiguationConfig};
use crate::geocoder::GeoLookup;
use crate::models::{BatchEntry, NerTag};
use crate::reference::ReferenceData;

/// The mutually exclusive situations a batch can be in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeCase {
    /// Exactly one country is mentioned literally
    SingleReference(String),
    /// Several countries are mentioned literally
    ConflictingCountries(usize),
    /// No literal country, but the text names a UK nation
    UkNations,
    /// The two leading countries share a non-singleton count
    TiedMajority,
    /// Anything else: follow the majority
    ClearMajority,
}

impl EdgeCase {
    /// Pick the case for a batch, first match wins.
    ///
    /// Only the tie arm requires a count above one: a literal country mention
    /// or a UK nation tag is a reference on its own, whatever the counts.
    pub fn classify(
        only_countries: &FrequencyTable,
        uk_nations: &[&str],
        majority: &[CountryCount],
    ) -> Self {
        match only_countries.len() {
            1 => {
                let country = only_countries.first().unwrap_or_default().to_string();
                Self::SingleReference(country)
            }
            n if n > 1 => Self::ConflictingCountries(n),
            _ if !uk_nations.is_empty() => Self::UkNations,
            _ if is_tied(majority) && majority[0].count > 1 => Self::TiedMajority,
            _ => Self::ClearMajority,
        }
    }

    /// Stable numbering used in logs
    pub fn number(&self) -> u8 {
        match self {
            Self::SingleReference(_) => 1,
            Self::ConflictingCountries(_) => 2,
            Self::ClearMajority => 3,
            Self::TiedMajority => 4,
            Self::UkNations => 5,
        }
    }
}

impl fmt::Display for EdgeCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleReference(country) => write!(f, "single reference country ({country})"),
            Self::ConflictingCountries(n) => write!(f, "{n} conflicting country mentions"),
            Self::UkNations => f.write_str("UK nations mentioned"),
            Self::TiedMajority => f.write_str("tied majority"),
            Self::ClearMajority => f.write_str("clear majority"),
        }
    }
}

/// A location and the ordered countries it may be moved to
struct Redirect {
    name: String,
    current: String,
    candidates: Vec<String>,
}

/// Reconciles the countries of a batch of related locations
pub struct Disambiguator {
    lookup: Arc<dyn GeoLookup>,
    reference: Arc<ReferenceData>,
    config: DisambiguationConfig,
}

impl Disambiguator {
    pub fn new(
        lookup: Arc<dyn GeoLookup>,
        reference: Arc<ReferenceData>,
        config: DisambiguationConfig,
    ) -> Self {
        Self {
            lookup,
            reference,
            config,
        }
    }

    /// Disambiguate `locations` using `ner_tags` from the same text.
    ///
    /// `top_countries` caps the candidate reference countries and overrides
    /// the configured cap. The output has one entry per input position,
    /// except that the no-majority short-circuit always yields at least one.
    pub async fn disambiguate(
        &self,
        locations: &[BatchEntry],
        ner_tags: &[NerTag],
        top_countries: Option<usize>,
    ) -> Vec<BatchEntry> {
        let top = top_countries.or(self.config.top_countries);

        let split = split_ner_tags(ner_tags, &self.reference);
        let uk_nations = split.uk_nations();
        let ner_countries =
            normalize_country_tags(self.lookup.as_ref(), &self.reference, &split.countries).await;

        let CountryExtraction {
            countries,
            only_countries,
            mut mapping,
        } = extract_countries(locations);

        let majority = count_countries(&countries, top);
        let ner_majority = count_countries(&ner_countries, top);

        tracing::debug!(
            locations = locations.len(),
            majority = ?majority,
            ner_majority = ?ner_majority,
            "Country frequencies computed"
        );

        if majority.len() <= 1 || majority[0].count == 1 {
            tracing::info!("Location edge case 0 detected: only one country in event locations");

            let malformed = locations.first().map_or(true, |e| e.primary().is_none());
            if malformed && self.config.degenerate_policy == DegeneratePolicy::EmptyOnMalformed {
                tracing::warn!("First location is empty, returning empty locations");
                return vec![BatchEntry::Empty; locations.len().max(1)];
            }
        }

        let case = EdgeCase::classify(&only_countries, &uk_nations, &majority);
        tracing::info!(case = case.number(), "Location edge case detected: {case}");

        let redirects = match &case {
            EdgeCase::SingleReference(country) => fixed_target(&mapping, country),
            EdgeCase::ConflictingCountries(_) => {
                tracing::warn!(
                    "Locations not matching one of the mentioned countries will be discarded"
                );
                Vec::new()
            }
            EdgeCase::UkNations => fixed_target(&mapping, UNITED_KINGDOM),
            EdgeCase::TiedMajority => {
                if ner_majority.first().is_some_and(|top| top.count >= 1) {
                    // a lone singleton still breaks the tie
                    let multiple = ner_majority.len() > 1;
                    ranked_targets(&mapping, &ner_majority, |c| multiple && c.is_singleton())
                } else {
                    tracing::warn!("No country NER tags found, majority could not be established");
                    Vec::new()
                }
            }
            EdgeCase::ClearMajority => {
                ranked_targets(&mapping, &majority, CountryCount::is_singleton)
            }
        };

        self.apply_redirects(&mut mapping, redirects).await;

        Reresolver::new(self.lookup.as_ref(), &mapping, &only_countries)
            .apply(locations, self.config.max_concurrent_lookups)
            .await
    }

    /// Evaluate redirects concurrently, then write the mapping in order
    async fn apply_redirects(&self, mapping: &mut CountryMapping, redirects: Vec<Redirect>) {
        let outcomes: Vec<(String, Option<String>)> = stream::iter(redirects)
            .map(|redirect| async move {
                let country = self.first_accepting_country(&redirect).await;
                (redirect.name, country)
            })
            .buffered(self.config.max_concurrent_lookups.max(1))
            .collect()
            .await;

        for (name, country) in outcomes {
            if let Some(country) = country {
                tracing::debug!(location = %name, country = %country, "Mapping updated");
                mapping.insert(&name, &country);
            }
        }
    }

    /// Country of the first candidate the location resolves in.
    ///
    /// Stops without a change when the location already sits in a higher
    /// ranked candidate, so a consistent batch is a fixed point.
    async fn first_accepting_country(&self, redirect: &Redirect) -> Option<String> {
        for candidate in &redirect.candidates {
            if *candidate == redirect.current {
                return None;
            }

            let found = self
                .lookup
                .lookup(&redirect.name, true, Some(candidate.as_str()))
                .await;

            if let Some(record) = found.into_iter().next() {
                return Some(record.country);
            }
        }
        None
    }
}

/// Every non-country location redirected to one country
fn fixed_target(mapping: &CountryMapping, country: &str) -> Vec<Redirect> {
    mapping
        .iter()
        .filter(|(name, current)| name != current)
        .map(|(name, current)| Redirect {
            name: name.to_string(),
            current: current.to_string(),
            candidates: vec![country.to_string()],
        })
        .collect()
}

/// Every non-country location tried against a ranking, up to the first
/// entry `stop` rejects
fn ranked_targets(
    mapping: &CountryMapping,
    ranking: &[CountryCount],
    stop: impl Fn(&CountryCount) -> bool,
) -> Vec<Redirect> {
    let candidates: Vec<String> = ranking
        .iter()
        .take_while(|c| !stop(c))
        .map(|c| c.country.clone())
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    mapping
        .iter()
        .filter(|(name, current)| name != current)
        .map(|(name, current)| Redirect {
            name: name.to_string(),
            current: current.to_string(),
            candidates: candidates.clone(),
        })
        .collect()
}
