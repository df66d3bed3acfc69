use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::labels::LabelDecoder;
use crate::catalog::store::ReferenceDatabase;
use crate::core::prediction::Prediction;
use crate::core::record::ReferenceRecord;
use crate::core::types::NameKey;
use crate::matching::scoring::{ScoreVector, ScoringWeights};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Reference database is empty")]
    EmptyDatabase,

    #[error("Unknown label for record {index}: name key {key} is not in the label decoder")]
    UnknownLabel { index: usize, key: NameKey },
}

/// Result of matching a prediction against the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Position of the matched record in the database
    pub index: usize,

    /// Encoded drug name of the matched record
    pub name_key: NameKey,

    /// Drug name resolved through the label decoder
    pub name: String,

    /// Score breakdown for the matched record
    pub score: ScoreVector,
}

/// Default database size at which scoring switches to a parallel scan
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Configuration for the matching engine
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Weights for the score components
    pub scoring_weights: ScoringWeights,
    /// Databases with at least this many records are scanned on the rayon pool
    pub parallel_threshold: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            scoring_weights: ScoringWeights::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// The main matching engine
///
/// Borrows an immutable database snapshot and decoder, so one engine per
/// request is cheap and any number may run concurrently.
pub struct MatchingEngine<'a> {
    database: &'a ReferenceDatabase,
    decoder: &'a LabelDecoder,
    config: MatchingConfig,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    #[must_use]
    pub fn new(database: &'a ReferenceDatabase, decoder: &'a LabelDecoder) -> Self {
        Self {
            database,
            decoder,
            config: MatchingConfig::default(),
        }
    }

    /// Create a new matching engine with custom configuration
    #[must_use]
    pub fn with_config(
        database: &'a ReferenceDatabase,
        decoder: &'a LabelDecoder,
        config: MatchingConfig,
    ) -> Self {
        Self {
            database,
            decoder,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    #[must_use]
    pub fn database(&self) -> &'a ReferenceDatabase {
        self.database
    }

    fn is_parallel(&self) -> bool {
        self.database.len() >= self.config.parallel_threshold
    }

    /// Select the best matching record.
    ///
    /// The record with the strictly highest total wins; equal totals resolve
    /// to the lowest index, whether or not the scan runs in parallel.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::EmptyDatabase` if there are no records, or
    /// `MatchError::UnknownLabel` if the winner's name key cannot be decoded.
    pub fn score_and_match(&self, prediction: &Prediction) -> Result<MatchResult, MatchError> {
        let weights = &self.config.scoring_weights;
        let score = |(index, record): (usize, &ReferenceRecord)| {
            (
                index,
                ScoreVector::calculate_with_weights(prediction, record, weights),
            )
        };

        let records = self.database.records();
        let best = if self.is_parallel() {
            records
                .par_iter()
                .enumerate()
                .map(score)
                .reduce_with(prefer_best)
        } else {
            records.iter().enumerate().map(score).reduce(prefer_best)
        };

        let (index, score) = best.ok_or(MatchError::EmptyDatabase)?;
        let result = self.resolve(index, score)?;

        debug!(
            index = result.index,
            name = %result.name,
            total = result.score.total,
            "Selected best match"
        );
        Ok(result)
    }

    /// Score every record, in database order
    #[must_use]
    pub fn score_all(&self, prediction: &Prediction) -> Vec<ScoreVector> {
        let weights = &self.config.scoring_weights;
        let records = self.database.records();

        if self.is_parallel() {
            records
                .par_iter()
                .map(|r| ScoreVector::calculate_with_weights(prediction, r, weights))
                .collect()
        } else {
            records
                .iter()
                .map(|r| ScoreVector::calculate_with_weights(prediction, r, weights))
                .collect()
        }
    }

    /// Rank the best `limit` records by total score, ties by index.
    ///
    /// The first entry is always the [`score_and_match`](Self::score_and_match)
    /// winner.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::EmptyDatabase` if there are no records, or
    /// `MatchError::UnknownLabel` if any returned record cannot be decoded.
    pub fn rank(
        &self,
        prediction: &Prediction,
        limit: usize,
    ) -> Result<Vec<MatchResult>, MatchError> {
        if self.database.is_empty() {
            return Err(MatchError::EmptyDatabase);
        }

        let mut scored: Vec<(usize, ScoreVector)> =
            self.score_all(prediction).into_iter().enumerate().collect();

        scored.sort_by(|(ia, a), (ib, b)| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(Ordering::Equal)
                .then(ia.cmp(ib))
        });

        scored
            .into_iter()
            .take(limit)
            .map(|(index, score)| self.resolve(index, score))
            .collect()
    }

    fn resolve(&self, index: usize, score: ScoreVector) -> Result<MatchResult, MatchError> {
        let record = &self.database.records()[index];
        let name = self
            .decoder
            .decode(record.name_key)
            .map_err(|_| MatchError::UnknownLabel {
                index,
                key: record.name_key,
            })?;

        Ok(MatchResult {
            index,
            name_key: record.name_key,
            name: name.to_string(),
            score,
        })
    }
}

/// Score and match with the default configuration.
///
/// # Errors
///
/// See [`MatchingEngine::score_and_match`].
pub fn score_and_match(
    prediction: &Prediction,
    database: &ReferenceDatabase,
    decoder: &LabelDecoder,
) -> Result<MatchResult, MatchError> {
    MatchingEngine::new(database, decoder).score_and_match(prediction)
}

/// Reduction step for the best-match scan.
///
/// Keeps `left` unless `right` scores strictly higher, or scores the same from
/// a lower index. Rayon hands `reduce_with` its operands in index order, so
/// the parallel scan resolves ties exactly like the sequential one.
fn prefer_best(left: (usize, ScoreVector), right: (usize, ScoreVector)) -> (usize, ScoreVector) {
    match right.1.total.partial_cmp(&left.1.total) {
        Some(Ordering::Greater) => right,
        Some(Ordering::Equal) if right.0 < left.0 => right,
        _ => left,
    }
}
