use serde::Serialize;

use crate::core::prediction::Prediction;
use crate::core::types::{ClassIndex, NameKey};
use crate::matching::engine::{MatchError, MatchResult, MatchingEngine};
use crate::matching::scoring::ScoreVector;

/// A ranked record, with the fields needed to show it to a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// 1-based position in the ranking
    pub rank: usize,
    pub index: usize,
    pub name_key: NameKey,
    pub name: String,
    pub imprint: String,
    pub color_class: ClassIndex,
    pub shape_class: ClassIndex,
    pub score: ScoreVector,
}

/// Identification outcome as returned by the service and `identify --format json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentificationReport {
    pub predicted_color: ClassIndex,
    pub predicted_shape: ClassIndex,
    pub predicted_imprint: String,
    pub identified_drug_name: String,

    #[serde(rename = "match")]
    pub best: Candidate,

    /// Best `limit` candidates, `best` first
    pub candidates: Vec<Candidate>,
}

/// Identify a prediction and collect the top `limit` candidates.
///
/// A `limit` of 0 or 1 still reports the winner as the only candidate.
///
/// # Errors
///
/// Propagates `MatchError` from the engine.
pub fn identify(
    engine: &MatchingEngine<'_>,
    prediction: &Prediction,
    limit: usize,
) -> Result<IdentificationReport, MatchError> {
    let best = engine.score_and_match(prediction)?;
    let ranked = if limit > 1 {
        engine.rank(prediction, limit)?
    } else {
        vec![best.clone()]
    };

    let to_candidate = |rank: usize, result: MatchResult| {
        let record = &engine.database().records()[result.index];
        Candidate {
            rank,
            index: result.index,
            name_key: result.name_key,
            name: result.name,
            imprint: record.imprint.clone(),
            color_class: record.color_class,
            shape_class: record.shape_class,
            score: result.score,
        }
    };

    let candidates: Vec<Candidate> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, result)| to_candidate(i + 1, result))
        .collect();

    Ok(IdentificationReport {
        predicted_color: prediction.color_class,
        predicted_shape: prediction.shape_class,
        predicted_imprint: prediction.imprint_text.clone(),
        identified_drug_name: best.name.clone(),
        best: to_candidate(1, best),
        candidates,
    })
}
