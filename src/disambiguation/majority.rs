//! Country frequency counting and majority ranking

use std::collections::HashMap;

/// One ranked country and how often it was seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

impl CountryCount {
    /// Seen only once: too weak to redirect other locations
    pub fn is_singleton(&self) -> bool {
        self.count == 1
    }
}

/// Country occurrence counts that remember first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<CountryCount>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, country: &str) {
        match self.index.get(country) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(country.to_string(), self.entries.len());
                self.entries.push(CountryCount {
                    country: country.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, country: &str) -> bool {
        self.index.contains_key(country)
    }

    pub fn count(&self, country: &str) -> usize {
        self.index
            .get(country)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    /// First country ever added
    pub fn first(&self) -> Option<&str> {
        self.entries.first().map(|e| e.country.as_str())
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &CountryCount> {
        self.entries.iter()
    }

    /// Descending by count; equal counts keep first-seen order
    pub fn most_common(&self, top_n: Option<usize>) -> Vec<CountryCount> {
        let mut ranked = self.entries.clone();
        // stable: ties stay in insertion order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        if let Some(n) = top_n {
            ranked.truncate(n);
        }
        ranked
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        for country in iter {
            table.add(country.as_ref());
        }
        table
    }
}

/// Rank `countries` by frequency, keeping at most `top_n` entries
pub fn count_countries<S: AsRef<str>>(countries: &[S], top_n: Option<usize>) -> Vec<CountryCount> {
    countries
        .iter()
        .map(AsRef::as_ref)
        .collect::<FrequencyTable>()
        .most_common(top_n)
}

/// True when the two leading entries share the same count
pub fn is_tied(majority: &[CountryCount]) -> bool {
    matches!(majority, [first, second, ..] if first.count == second.count)
}
