//! Pronunciation normalization for text-to-speech front ends.
//!
//! Raw text goes through contraction expansion, then IPA conversion
//! (normalization, context rules, homograph resolution, grapheme mapping,
//! stress), then validation. All rule tables live in one immutable
//! [`RuleTables`] shared through `Arc`.

pub mod cache;
pub mod config;
pub mod contractions;
pub mod error;
pub mod language;
pub mod pipeline;
pub mod tables;
pub mod types;

pub use config::NormalizerConfig;
pub use contractions::{ContractionExpander, ContractionRule, ContractionTable};
pub use error::ConfigError;
pub use language::{PhonemeSimilarityGraph, PhoneticMapper};
pub use pipeline::Normalizer;
pub use tables::RuleTables;
pub use types::{
    ContractionChange, ContractionReport, ExpansionMode, NormalizedText, Priority,
    ValidationReport,
};
