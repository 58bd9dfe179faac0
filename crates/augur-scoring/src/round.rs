// crates/augur-scoring/src/round.rs
//
// One full scoring round for a topic: reputer, inference and forecast scores
// computed from the same inputs and committed together. Either every score and
// coefficient of the round is persisted, or nothing is.

use augur_core::{
    AugurError, BlockHeight, EmissionsKeeper, ReputerValueBundles, RoundWrites, Score, TopicId,
    ValueBundle,
};

use crate::forecast::compute_forecast_scores;
use crate::inference::compute_inference_scores;
use crate::params::ScoringParams;
use crate::reputer::{compute_reputer_scores, ExcludedReputer};

/// What a committed round produced.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub topic_id: TopicId,
    pub block_height: BlockHeight,
    pub reputer_scores: Vec<Score>,
    pub inference_scores: Vec<Score>,
    pub forecast_scores: Vec<Score>,
    /// Reputers left out of consensus, with the reason.
    pub excluded: Vec<ExcludedReputer>,
    /// Consensus reweighting passes.
    pub iterations: usize,
}

impl RoundOutcome {
    pub fn score_count(&self) -> usize {
        self.reputer_scores.len() + self.inference_scores.len() + self.forecast_scores.len()
    }
}

/// Score every participant of one round and commit the result atomically.
///
/// # Errors
/// Any error from the three generators, or from `commit_round`, aborts the
/// round with nothing persisted.
pub fn score_round<K: EmissionsKeeper + ?Sized>(
    keeper: &K,
    params: &ScoringParams,
    topic: TopicId,
    block: BlockHeight,
    reputer_bundles: &ReputerValueBundles,
    network: &ValueBundle,
) -> Result<RoundOutcome, AugurError> {
    tracing::info!(
        topic,
        block,
        reputers = reputer_bundles.len(),
        "scoring round"
    );

    // Step 1: reputer scores and coefficients.
    let reputer_round = compute_reputer_scores(keeper, params, topic, block, reputer_bundles)?;

    // Step 2: worker scores from the network's resolved bundle.
    let inference = compute_inference_scores(topic, block, network)?;
    let forecast = compute_forecast_scores(params, topic, block, network)?;

    // Step 3: one commit for the whole round.
    let mut writes = RoundWrites::new(topic, block);
    writes.merge(reputer_round.writes)?;
    writes.merge(inference)?;
    writes.merge(forecast)?;
    keeper.commit_round(&writes)?;

    tracing::info!(
        topic,
        block,
        scores = writes.score_count(),
        coefficients = writes.coefficients.len(),
        excluded = reputer_round.excluded.len(),
        "round committed"
    );

    Ok(RoundOutcome {
        topic_id: topic,
        block_height: block,
        reputer_scores: writes.reputer_scores,
        inference_scores: writes.inference_scores,
        forecast_scores: writes.forecast_scores,
        excluded: reputer_round.excluded,
        iterations: reputer_round.outcome.iterations,
    })
}
