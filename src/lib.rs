//! # pill-matcher
//!
//! A library for identifying a drug from the signals extracted from a pill
//! image: a predicted color class, a predicted shape class, and the imprint
//! text read by OCR.
//!
//! Each record of a reference drug database is scored against the prediction
//! and the highest scoring record names the drug:
//!
//! - **Color and shape**: 0.5 each for an exact class match
//! - **Edit similarity**: `1 - levenshtein / (len(a) + len(b))`
//! - **Overlap similarity**: shared distinct characters, Dice style
//!
//! Ties go to the record that appears first in the database.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pill_matcher::{LabelDecoder, Prediction, ReferenceDatabase, score_and_match};
//! use std::path::Path;
//!
//! let database = ReferenceDatabase::load_from_file(Path::new("drug_database.csv")).unwrap();
//! let decoder = LabelDecoder::load_from_file(Path::new("labels.json")).unwrap();
//!
//! let prediction = Prediction::new(3, 1, "M;30");
//! let result = score_and_match(&prediction, &database, &decoder).unwrap();
//! println!("{} ({:.3})", result.name, result.score.total);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Reference database storage and label decoding
//! - [`core`]: Core data types for records and predictions
//! - [`matching`]: Similarity measures, scoring, and the matching engine
//! - [`parsing`]: Loaders for database CSVs, label files, and OCR detections
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP identification service

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::labels::LabelDecoder;
pub use catalog::store::ReferenceDatabase;
pub use core::prediction::Prediction;
pub use core::record::ReferenceRecord;
pub use core::types::*;
pub use matching::engine::{score_and_match, MatchError, MatchResult, MatchingEngine};
pub use matching::scoring::{ScoreVector, ScoringWeights};
