//! Drug matching engine and scoring algorithms.
//!
//! This module provides the core matching functionality:
//!
//! - [`MatchingEngine`](engine::MatchingEngine): Main entry point for finding the best match
//! - [`ScoreVector`](scoring::ScoreVector): Per-record score breakdown
//! - [`similarity`]: Edit-distance and character-overlap primitives
//!
//! ## Scoring
//!
//! Every record is scored against the prediction with four components:
//!
//! - **Color match**: 0.5 when the color classes are equal
//! - **Shape match**: 0.5 when the shape classes are equal
//! - **Edit similarity**: `1 - levenshtein / combined_length` of the imprints
//! - **Overlap similarity**: `2 * shared_distinct_chars / combined_length`
//!
//! Two empty imprints score 1.0 on both similarities. The total ranges up to
//! 3.0, and the highest total wins with ties going to the earliest record.
//!
//! ## Example
//!
//! ```rust
//! use pill_matcher::catalog::labels::LabelDecoder;
//! use pill_matcher::catalog::store::ReferenceDatabase;
//! use pill_matcher::core::prediction::Prediction;
//! use pill_matcher::core::record::ReferenceRecord;
//! use pill_matcher::matching::engine::MatchingEngine;
//!
//! let database = ReferenceDatabase::from_records(vec![
//!     ReferenceRecord::new("XY", 1, 2, 0),
//!     ReferenceRecord::new("", 1, 2, 1),
//! ]);
//! let decoder = LabelDecoder::from_classes(["Aspirin", "Ibuprofen"]);
//!
//! let engine = MatchingEngine::new(&database, &decoder);
//! let result = engine.score_and_match(&Prediction::new(1, 2, "XY")).unwrap();
//!
//! assert_eq!(result.index, 0);
//! assert_eq!(result.name, "Aspirin");
//! assert!((result.score.total - 3.0).abs() < 1e-9);
//! ```

pub mod engine;
pub mod report;
pub mod scoring;
pub mod similarity;
