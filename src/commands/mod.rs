pub mod disambiguate;
pub mod lookup;
pub mod resolve;

use anyhow::{Context, Result};
use std::sync::Arc;

use geotriage::config::Config;
use geotriage::geocoder::Geocoder;
use geotriage::reference::ReferenceData;

// Re-export command functions for convenience
pub use disambiguate::{disambiguate, DisambiguateParams};
pub use lookup::lookup;
pub use resolve::{resolve, ResolveParams};

/// Reference data and geocoder shared by every command
pub(crate) fn build_services(config: &Config) -> Result<(Arc<ReferenceData>, Arc<Geocoder>)> {
    let reference = Arc::new(
        ReferenceData::load(&config.reference).context("Failed to load reference data")?,
    );
    let geocoder = Geocoder::new(&config.geocoder, Arc::clone(&reference))
        .context("Failed to create geocoder")?;
    Ok((reference, Arc::new(geocoder)))
}
