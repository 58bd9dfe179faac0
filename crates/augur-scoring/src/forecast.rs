// crates/augur-scoring/src/forecast.rs
//
// Worker scores for the forecast task.
//
// A forecaster earns a one-out component (how much the combined loss rises
// when its forecast is withheld) and a one-in component (how much its
// forecast improves on the naive baseline). The two are blended with the
// uniqueness weight, which shifts credit from the one-in to the one-out
// component as more forecasters report.
//
// Components are paired by worker identity. Two collections listed in
// different orders score the same.

use augur_core::bundle::collect_worker_losses;
use augur_core::{
    Address, AugurError, BlockHeight, EmissionsKeeper, RoundWrites, Score, TopicId, ValueBundle,
};

use crate::coverage::LossCategory;
use crate::params::ScoringParams;
use crate::primitives::{forecast_task_score, uniqueness_weight, worker_score};

/// Compute forecast scores from the network's resolved bundle without writing.
///
/// One score per worker in the one-in forecaster collection, in that order.
///
/// # Errors
/// - `NotFound` if the combined or naive loss is missing while forecasters are listed.
/// - `InvalidInput` if a one-in forecaster has no one-out entry, or an entry repeats.
/// - `Identity` / `Domain` for malformed addresses or invalid losses.
pub fn compute_forecast_scores(
    params: &ScoringParams,
    topic: TopicId,
    block: BlockHeight,
    network: &ValueBundle,
) -> Result<RoundWrites, AugurError> {
    params.validate()?;

    let mut writes = RoundWrites::new(topic, block);
    if network.one_in_forecaster_values.is_empty() {
        tracing::debug!(topic, block, "no one-in forecaster losses reported");
        return Ok(writes);
    }

    let combined = network.require_combined()?;
    let naive = network.require_naive()?;

    // Pass 1: one-out component per forecaster.
    let one_out = collect_worker_losses(
        &network.one_out_forecaster_values,
        LossCategory::OneOutForecaster.label(),
    )?;
    let mut one_out_scores = std::collections::BTreeMap::new();
    for (worker, loss) in &one_out {
        one_out_scores.insert(*worker, worker_score(combined, *loss)?);
    }

    let uniqueness = uniqueness_weight(one_out_scores.len() as f64, &params.uniqueness);

    // Pass 2: one-in component blended with the matching one-out component.
    collect_worker_losses(
        &network.one_in_forecaster_values,
        LossCategory::OneInForecaster.label(),
    )?;
    for entry in &network.one_in_forecaster_values {
        let worker: Address = entry.worker.parse()?;
        let one_out_score = one_out_scores.get(&worker).copied().ok_or_else(|| {
            AugurError::InvalidInput(format!(
                "forecaster {} has a one-in loss but no one-out loss",
                worker
            ))
        })?;
        let one_in_score = worker_score(entry.value, naive)?;
        let score = forecast_task_score(one_in_score, one_out_score, uniqueness)?;

        writes.forecast_scores.push(Score {
            topic_id: topic,
            block_height: block,
            address: worker,
            score,
        });
    }

    tracing::info!(
        topic,
        block,
        scored = writes.forecast_scores.len(),
        uniqueness,
        "forecast scores computed"
    );
    Ok(writes)
}

/// Compute and persist forecast scores for one round. Returns the new scores.
pub fn generate_forecast_scores<K: EmissionsKeeper + ?Sized>(
    keeper: &K,
    params: &ScoringParams,
    topic: TopicId,
    block: BlockHeight,
    network: &ValueBundle,
) -> Result<Vec<Score>, AugurError> {
    let writes = compute_forecast_scores(params, topic, block, network)?;
    keeper.commit_round(&writes)?;
    Ok(writes.forecast_scores)
}
