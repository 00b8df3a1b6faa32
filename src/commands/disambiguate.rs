use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use geotriage::config::Config;
use geotriage::disambiguation::Disambiguator;
use geotriage::models::{BatchEntry, NerTag};

use super::build_services;

/// Parameters for the disambiguate command
#[derive(Debug, Clone)]
pub struct DisambiguateParams {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub top_countries: Option<usize>,
}

/// An already geocoded batch and the NER tags of its text
#[derive(Debug, Deserialize)]
struct BatchFile {
    locations: Vec<BatchEntry>,
    #[serde(default)]
    ner_tags: Vec<NerTag>,
}

pub async fn disambiguate(config: &Config, params: DisambiguateParams) -> Result<()> {
    let content = tokio::fs::read_to_string(&params.input)
        .await
        .with_context(|| format!("Failed to read {}", params.input.display()))?;
    let batch: BatchFile = serde_json::from_str(&content).context("Invalid batch file")?;

    let (reference, geocoder) = build_services(config)?;
    let engine = Disambiguator::new(geocoder, reference, config.disambiguation.clone());

    let resolved = engine
        .disambiguate(&batch.locations, &batch.ner_tags, params.top_countries)
        .await;

    let json = serde_json::to_string_pretty(&resolved).context("Failed to serialize batch")?;
    match params.output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} locations to {}", resolved.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
