use anyhow::{Context, Result};
use std::path::PathBuf;

use geotriage::config::Config;
use geotriage::pipeline::{load_documents, write_documents, Pipeline, PipelineOptions};

use super::build_services;

/// Parameters for the resolve command
#[derive(Debug, Clone)]
pub struct ResolveParams {
    pub data: PathBuf,
    pub output: PathBuf,
    pub strict: bool,
    pub double_check: bool,
    pub all_candidates: bool,
    pub top_countries: Option<usize>,
}

pub async fn resolve(config: &Config, params: ResolveParams) -> Result<()> {
    let (reference, geocoder) = build_services(config)?;

    let documents = load_documents(&params.data)
        .await
        .with_context(|| format!("Failed to load documents from {}", params.data.display()))?;

    tracing::info!(documents = documents.len(), "Documents loaded");

    let pipeline = Pipeline::new(
        geocoder,
        reference,
        config.disambiguation.clone(),
        PipelineOptions {
            strict: params.strict,
            double_check: params.double_check,
            all_candidates: params.all_candidates,
            top_countries: params.top_countries,
        },
    );

    let (output, stats) = pipeline.run(documents).await;

    write_documents(&params.output, &output)
        .await
        .context("Failed to write output")?;

    println!("Resolved {} documents ({} skipped)", stats.documents, stats.skipped_documents);
    println!("  Events: {}", stats.events);
    println!("  Unresolved events: {}", stats.unresolved_events);
    println!("  Geocoder lookups: {}", stats.lookups);
    println!("  Output: {}", params.output.display());

    Ok(())
}
