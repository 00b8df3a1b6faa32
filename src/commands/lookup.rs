use anyhow::{Context, Result};

use geotriage::config::Config;
use geotriage::geocoder::GeoLookup;
use geotriage::models::BoundingBox;

use super::build_services;

/// Geocode one place name and print the validated records as JSON.
///
/// With `around`, also list the countries within that many meters of each record.
pub async fn lookup(
    config: &Config,
    name: String,
    country: Option<String>,
    all: bool,
    around: Option<f64>,
) -> Result<()> {
    let (reference, geocoder) = build_services(config)?;

    let records = geocoder.lookup(&name, !all, country.as_deref()).await;
    if records.is_empty() {
        println!("No validated location found for \"{name}\"");
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
    println!("{json}");

    if let Some(meters) = around {
        for record in &records {
            let [lon, lat] = record.coordinates;
            let bbox = record
                .bounding_box
                .unwrap_or_else(|| BoundingBox::new(lon, lat, lon, lat));
            let countries = reference.countries_around(&bbox, meters);
            println!(
                "Countries within {meters} m of {} ({}): {}",
                record.name,
                record.country,
                countries.join(", ")
            );
        }
    }

    Ok(())
}
