//! geotriage - Country-consistent geocoding for news locations
//!
//! Resolves place names extracted from text into geographic records, then
//! reconciles the countries of locations mentioned together so that a lone
//! "Paris" among Texan cities stays in Texas.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`reference`] - Country tables, acronyms and blacklist
//! - [`geocoder`] - Photon search validated against Geonames
//! - [`disambiguation`] - Majority voting and edge-case reconciliation
//! - [`pipeline`] - Event-document batch processing
//! - [`geometry`] - Distance and bounding-box helpers
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use geotriage::config::Config;
//! use geotriage::disambiguation::Disambiguator;
//! use geotriage::geocoder::Geocoder;
//! use geotriage::reference::ReferenceData;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let reference = Arc::new(ReferenceData::load(&config.reference)?);
//!     let geocoder = Arc::new(Geocoder::new(&config.geocoder, Arc::clone(&reference))?);
//!     let engine = Disambiguator::new(geocoder, reference, config.disambiguation.clone());
//!     let _resolved = engine.disambiguate(&[], &[], None).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod disambiguation;
pub mod error;
pub mod geocoder;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod reference;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::disambiguation::Disambiguator;
    pub use crate::error::{Error, ErrorCategory, GeoErrorTrait, Result};
    pub use crate::geocoder::{GeoLookup, Geocoder};
    pub use crate::models::{BatchEntry, BoundingBox, LocationRecord, NerTag};
    pub use crate::reference::ReferenceData;
}

// Direct re-exports for convenience
pub use models::{BatchEntry, BoundingBox, LocationRecord, NerTag};
