//! Event-document batch processing
//!
//! Documents come from the NLP pipeline as
//! `{ "events": [ { "location": "..", .. } ], "ner_tags": [ .. ] }`.
//! Every event gets a `coordinates` array with its geocoded records. With
//! `double_check`, each document's coordinates are reconciled through the
//! [`Disambiguator`] using the document's NER tags.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::DisambiguationConfig;
use crate::disambiguation::Disambiguator;
use crate::error::{Error, Result};
use crate::geocoder::GeoLookup;
use crate::models::{BatchEntry, NerTag};
use crate::reference::ReferenceData;
use crate::utils::is_processable_location;

/// Switches for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Remove events whose location did not resolve
    pub strict: bool,
    /// Reconcile countries across each document's events
    pub double_check: bool,
    /// Keep every geocoder candidate instead of only the best match
    pub all_candidates: bool,
    pub top_countries: Option<usize>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            strict: false,
            double_check: true,
            all_candidates: false,
            top_countries: None,
        }
    }
}

/// Totals for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub documents: usize,
    pub skipped_documents: usize,
    pub events: usize,
    pub unresolved_events: usize,
    pub lookups: usize,
}

/// Geocodes and reconciles event documents
pub struct Pipeline {
    lookup: Arc<dyn GeoLookup>,
    disambiguator: Disambiguator,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        lookup: Arc<dyn GeoLookup>,
        reference: Arc<ReferenceData>,
        config: DisambiguationConfig,
        options: PipelineOptions,
    ) -> Self {
        let disambiguator = Disambiguator::new(Arc::clone(&lookup), reference, config);
        Self {
            lookup,
            disambiguator,
            options,
        }
    }

    /// Process `documents` in order; documents without events are dropped
    pub async fn run(&self, documents: Vec<Value>) -> (Vec<Value>, PipelineStats) {
        let mut seen: HashMap<String, BatchEntry> = HashMap::new();
        let mut stats = PipelineStats::default();
        let mut output = Vec::with_capacity(documents.len());

        for document in documents {
            match self.process_document(document, &mut seen, &mut stats).await {
                Some(document) => {
                    stats.documents += 1;
                    output.push(document);
                }
                None => stats.skipped_documents += 1,
            }
        }

        tracing::info!(
            documents = stats.documents,
            skipped = stats.skipped_documents,
            events = stats.events,
            unresolved = stats.unresolved_events,
            lookups = stats.lookups,
            "Pipeline finished"
        );

        (output, stats)
    }

    async fn process_document(
        &self,
        mut document: Value,
        seen: &mut HashMap<String, BatchEntry>,
        stats: &mut PipelineStats,
    ) -> Option<Value> {
        let ner_tags = ner_tags_of(&document);

        let events = document.get_mut("events")?.as_array_mut()?;
        if events.is_empty() {
            return None;
        }

        let mut entries = Vec::with_capacity(events.len());
        for event in events.iter() {
            let location = event
                .get("location")
                .and_then(Value::as_str)
                .unwrap_or_default();
            entries.push(self.geocode(location, seen, stats).await);
        }

        stats.events += entries.len();
        stats.unresolved_events += entries.iter().filter(|e| e.is_empty()).count();

        if self.options.strict {
            let mut kept = Vec::with_capacity(entries.len());
            let mut kept_entries = Vec::with_capacity(entries.len());
            for (event, entry) in events.drain(..).zip(entries) {
                if !entry.is_empty() {
                    kept.push(event);
                    kept_entries.push(entry);
                }
            }
            *events = kept;
            entries = kept_entries;
        }

        if self.options.double_check && !entries.is_empty() {
            entries = self
                .disambiguator
                .disambiguate(&entries, &ner_tags, self.options.top_countries)
                .await;
        }

        for (event, entry) in events.iter_mut().zip(&entries) {
            if let Some(obj) = event.as_object_mut() {
                let coordinates = serde_json::to_value(entry.records()).unwrap_or_default();
                obj.insert("coordinates".to_string(), coordinates);
            }
        }

        Some(document)
    }

    /// Geocode one event location, answering repeats from `seen`
    async fn geocode(
        &self,
        location: &str,
        seen: &mut HashMap<String, BatchEntry>,
        stats: &mut PipelineStats,
    ) -> BatchEntry {
        if let Some(entry) = seen.get(location) {
            return entry.clone();
        }

        let entry = if is_processable_location(location) {
            stats.lookups += 1;
            let records = self
                .lookup
                .lookup(location, !self.options.all_candidates, None)
                .await;
            if self.options.all_candidates {
                BatchEntry::from_candidates(records)
            } else {
                records
                    .into_iter()
                    .next()
                    .map(BatchEntry::Single)
                    .unwrap_or_default()
            }
        } else {
            tracing::warn!(location = %location, "Location cannot be processed, skipping lookup");
            BatchEntry::Empty
        };

        seen.insert(location.to_string(), entry.clone());
        entry
    }
}

/// NER tags carried by a document; malformed tags are ignored
fn ner_tags_of(document: &Value) -> Vec<NerTag> {
    document
        .get("ner_tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| serde_json::from_value(tag.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Read documents from a JSON file or every `.json` file of a directory.
///
/// A file may hold one document or an array of documents.
pub async fn load_documents(path: &Path) -> Result<Vec<Value>> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        Error::with_source(format!("Failed to access input: {}", path.display()), e)
    })?;

    if !metadata.is_dir() {
        return read_document_file(path).await;
    }

    let mut files = Vec::new();
    let mut dir = tokio::fs::read_dir(path).await?;
    while let Some(entry) = dir.next_entry().await? {
        let file = entry.path();
        if file.extension().is_some_and(|ext| ext == "json") {
            files.push(file);
        }
    }
    files.sort();

    let mut documents = Vec::new();
    for file in files {
        documents.extend(read_document_file(&file).await?);
    }
    Ok(documents)
}

async fn read_document_file(path: &Path) -> Result<Vec<Value>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::with_source(format!("Failed to read input file: {}", path.display()), e)
    })?;

    let parsed: Value = serde_json::from_str(&content)?;
    match parsed {
        Value::Array(documents) => Ok(documents),
        document => Ok(vec![document]),
    }
}

/// Write processed documents as one JSON array
pub async fn write_documents(path: &Path, documents: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(documents)?;
    tokio::fs::write(path, json).await.map_err(|e| {
        Error::with_source(format!("Failed to write output file: {}", path.display()), e)
    })
}
