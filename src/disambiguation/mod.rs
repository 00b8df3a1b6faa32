//! Country disambiguation for batches of related locations
//!
//! The pieces run in this order for every batch:
//!
//! 1. [`ner`] splits NER tags into countries and local places
//! 2. [`extractor`] collects countries and the name -> country mapping
//! 3. [`majority`] ranks countries by frequency
//! 4. [`engine`] picks an edge case and rewrites the mapping
//! 5. [`reresolver`] re-resolves moved locations and builds the output

pub mod engine;
pub mod extractor;
pub mod majority;
pub mod ner;
pub mod reresolver;

pub use engine::{Disambiguator, EdgeCase};
pub use extractor::{extract_countries, CountryExtraction, CountryMapping};
pub use majority::{count_countries, CountryCount, FrequencyTable};
pub use ner::{split_ner_tags, NerSplit, UK_NATIONS};
pub use reresolver::Reresolver;
