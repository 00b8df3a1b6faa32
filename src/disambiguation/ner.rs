//! Named-entity tags as corroborating country signal

use crate::geocoder::GeoLookup;
use crate::models::NerTag;
use crate::reference::ReferenceData;
use crate::utils::normalize_key;

/// Constituent nations of the United Kingdom, lowercase
pub const UK_NATIONS: [&str; 4] = ["england", "wales", "northern ireland", "scotland"];

/// Canonical country the UK nations fall back to
pub const UNITED_KINGDOM: &str = "United Kingdom";

/// Location tags partitioned into country mentions and everything else
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NerSplit<'a> {
    /// Tags naming a known country (directly or through an alias)
    pub countries: Vec<&'a NerTag>,
    /// Every other location tag, first-level subdivisions included
    pub locals: Vec<&'a NerTag>,
}

impl<'a> NerSplit<'a> {
    /// Local tags naming a UK constituent nation
    pub fn uk_nations(&self) -> Vec<&'a str> {
        self.locals
            .iter()
            .filter(|tag| UK_NATIONS.contains(&normalize_key(&tag.name).as_str()))
            .map(|tag| tag.name.as_str())
            .collect()
    }
}

/// Partition `tags`; tags without the location label are ignored
pub fn split_ner_tags<'a>(tags: &'a [NerTag], reference: &ReferenceData) -> NerSplit<'a> {
    let mut split = NerSplit::default();

    for tag in tags.iter().filter(|t| t.is_location()) {
        if reference.canonical_country(&tag.name).is_some() {
            split.countries.push(tag);
        } else {
            split.locals.push(tag);
        }
    }

    split
}

/// Normalize country tags through the geocoder.
///
/// Each tag is looked up as itself constrained to itself; the country of the
/// best match is kept and tags that do not resolve are dropped.
pub async fn normalize_country_tags(
    lookup: &dyn GeoLookup,
    reference: &ReferenceData,
    country_tags: &[&NerTag],
) -> Vec<String> {
    let mut countries = Vec::with_capacity(country_tags.len());

    for tag in country_tags {
        let Some(canonical) = reference.canonical_country(&tag.name) else {
            continue;
        };

        match lookup.lookup(&canonical, true, Some(canonical.as_str())).await.first() {
            Some(record) => countries.push(record.country.clone()),
            None => {
                tracing::debug!(tag = %tag.name, "Country tag did not resolve, discarding");
            }
        }
    }

    countries
}
