use serde::{Deserialize, Serialize};

use crate::core::prediction::Prediction;
use crate::core::record::ReferenceRecord;
use crate::matching::similarity::{edit_similarity, overlap_similarity};

/// Configurable weights for the four scoring components
///
/// The defaults reproduce the reference scoring exactly: 0.5 for a color
/// match, 0.5 for a shape match, and unit weight for both imprint
/// similarities, for a maximum total of 3.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Credit for an exact color class match
    pub color: f64,
    /// Credit for an exact shape class match
    pub shape: f64,
    /// Multiplier for the edit-distance similarity
    pub edit: f64,
    /// Multiplier for the character-overlap similarity
    pub overlap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            color: 0.5,
            shape: 0.5,
            edit: 1.0,
            overlap: 1.0,
        }
    }
}

impl ScoringWeights {
    /// Whether every weight is finite and non-negative
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.color, self.shape, self.edit, self.overlap]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }

    /// Highest total a record can reach
    #[must_use]
    pub fn max_total(&self) -> f64 {
        self.color + self.shape + self.edit + self.overlap
    }
}

/// Per-record score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    /// Color class credit (0.0 or the color weight)
    pub color_match: f64,

    /// Shape class credit (0.0 or the shape weight)
    pub shape_match: f64,

    /// `1 - levenshtein / combined_length`; may be negative, never clamped
    pub edit_similarity: f64,

    /// `2 * shared_distinct_chars / combined_length`
    pub overlap_similarity: f64,

    /// Sum of the four components
    pub total: f64,
}

impl ScoreVector {
    /// Score one reference record against a prediction with default weights
    #[must_use]
    pub fn calculate(prediction: &Prediction, record: &ReferenceRecord) -> Self {
        Self::calculate_with_weights(prediction, record, &ScoringWeights::default())
    }

    /// Score one reference record against a prediction
    #[must_use]
    pub fn calculate_with_weights(
        prediction: &Prediction,
        record: &ReferenceRecord,
        weights: &ScoringWeights,
    ) -> Self {
        let color_match = if record.color_class == prediction.color_class {
            weights.color
        } else {
            0.0
        };
        let shape_match = if record.shape_class == prediction.shape_class {
            weights.shape
        } else {
            0.0
        };

        let edit = weights.edit * edit_similarity(&record.imprint, &prediction.imprint_text);
        let overlap =
            weights.overlap * overlap_similarity(&record.imprint, &prediction.imprint_text);

        Self {
            color_match,
            shape_match,
            edit_similarity: edit,
            overlap_similarity: overlap,
            total: color_match + shape_match + edit + overlap,
        }
    }
}
