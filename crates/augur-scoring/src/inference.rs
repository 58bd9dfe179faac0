// crates/augur-scoring/src/inference.rs
//
// Worker scores for the inference task. Each inferer is scored by how much
// the network's combined loss changes when its inference is withheld.

use augur_core::bundle::collect_worker_losses;
use augur_core::{
    Address, AugurError, BlockHeight, EmissionsKeeper, RoundWrites, Score, TopicId, ValueBundle,
};

use crate::coverage::LossCategory;
use crate::primitives::worker_score;

/// Compute inference scores from the network's resolved bundle without writing.
///
/// One score per worker listed in the one-out inferer collection, in the
/// order listed. Workers missing from that collection get no record.
///
/// # Errors
/// `NotFound` if the combined loss is missing while inferers are listed;
/// `Identity`, `InvalidInput` or `Domain` for a malformed, repeated or
/// invalid entry. Any error invalidates the whole set.
pub fn compute_inference_scores(
    topic: TopicId,
    block: BlockHeight,
    network: &ValueBundle,
) -> Result<RoundWrites, AugurError> {
    let mut writes = RoundWrites::new(topic, block);
    let entries = &network.one_out_inferer_values;
    if entries.is_empty() {
        tracing::debug!(topic, block, "no one-out inferer losses reported");
        return Ok(writes);
    }

    let combined = network.require_combined()?;
    let one_out = collect_worker_losses(entries, LossCategory::OneOutInferer.label())?;

    for entry in entries {
        let worker: Address = entry.worker.parse()?;
        let score = worker_score(combined, one_out[&worker])?;
        writes.inference_scores.push(Score {
            topic_id: topic,
            block_height: block,
            address: worker,
            score,
        });
    }

    tracing::info!(topic, block, scored = writes.inference_scores.len(), "inference scores computed");
    Ok(writes)
}

/// Compute and persist inference scores for one round. Returns the new scores.
pub fn generate_inference_scores<K: EmissionsKeeper + ?Sized>(
    keeper: &K,
    topic: TopicId,
    block: BlockHeight,
    network: &ValueBundle,
) -> Result<Vec<Score>, AugurError> {
    let writes = compute_inference_scores(topic, block, network)?;
    keeper.commit_round(&writes)?;
    Ok(writes.inference_scores)
}
