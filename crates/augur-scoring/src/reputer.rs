// crates/augur-scoring/src/reputer.rs
//
// Reputer score generation: coverage filter + consensus aggregator, one score
// per participating reputer, plus the updated listening coefficients.
//
// A reputer's score is the negated RMS log10 distance of its losses from the
// stake-weighted consensus: 0 for perfect agreement, more negative the further
// it strays.

use std::collections::BTreeSet;

use augur_core::{
    Address, AugurError, BlockHeight, EmissionsKeeper, ListeningCoefficient, ReputerValueBundles,
    RoundWrites, Score, TopicId,
};

use crate::consensus::{aggregate, ConsensusOutcome, ReputerInput};
use crate::coverage::filter_bundle;
use crate::params::ScoringParams;

/// Why a reputer did not take part in a round.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    /// No complete category and neither combined nor naive loss.
    NoEligibleLosses,
    /// The bundle carried an invalid loss or a repeated worker.
    InvalidBundle(AugurError),
}

/// A reputer left out of aggregation. Its coefficient is not touched and it
/// receives no score.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedReputer {
    pub reputer: Address,
    pub reason: ExclusionReason,
}

/// Everything a reputer round computed, staged but not yet persisted.
#[derive(Debug, Clone)]
pub struct ReputerRound {
    /// New coefficients and reputer scores.
    pub writes: RoundWrites,
    pub outcome: ConsensusOutcome,
    pub excluded: Vec<ExcludedReputer>,
}

/// Compute reputer scores and coefficients for one round without writing.
///
/// Reads the roster, and the stake and coefficient of every participating
/// reputer, from `keeper`.
///
/// # Errors
/// - `Identity` if any reputer or worker address is malformed. Checked
///   before any collaborator is called for reputer addresses.
/// - `InvalidInput` if a reputer submitted twice or the participants' total
///   stake is zero.
/// - Collaborator errors (`NotFound`, `Persistence`) as returned.
pub fn compute_reputer_scores<K: EmissionsKeeper + ?Sized>(
    keeper: &K,
    params: &ScoringParams,
    topic: TopicId,
    block: BlockHeight,
    bundles: &ReputerValueBundles,
) -> Result<ReputerRound, AugurError> {
    params.validate()?;

    let mut reputers = Vec::with_capacity(bundles.len());
    let mut seen = BTreeSet::new();
    for bundle in bundles.iter() {
        let reputer = Address::parse(&bundle.reputer)?;
        if !seen.insert(reputer) {
            return Err(AugurError::InvalidInput(format!(
                "reputer {} submitted more than one bundle for topic {} block {}",
                reputer, topic, block
            )));
        }
        reputers.push(reputer);
    }

    let roster = keeper.topic_workers(topic)?;

    let mut inputs = Vec::new();
    let mut excluded = Vec::new();
    for (reputer, bundle) in reputers.iter().zip(bundles.iter()) {
        let losses = match filter_bundle(&bundle.value_bundle, &roster) {
            Ok(losses) => losses,
            Err(e @ AugurError::Identity(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(%reputer, topic, block, error = %e, "reputer bundle rejected");
                excluded.push(ExcludedReputer {
                    reputer: *reputer,
                    reason: ExclusionReason::InvalidBundle(e),
                });
                continue;
            }
        };
        if losses.is_empty() {
            tracing::warn!(%reputer, topic, block, "reputer has no eligible losses, excluded");
            excluded.push(ExcludedReputer {
                reputer: *reputer,
                reason: ExclusionReason::NoEligibleLosses,
            });
            continue;
        }
        if !losses.excluded.is_empty() {
            tracing::debug!(
                %reputer,
                excluded = ?losses.excluded,
                "incomplete categories dropped"
            );
        }

        let stake = keeper.stake_on_topic(topic, reputer)?;
        let coefficient = keeper.listening_coefficient(topic, reputer)?;
        inputs.push(ReputerInput {
            reputer: *reputer,
            stake: stake as f64,
            coefficient: coefficient.coefficient,
            losses,
        });
    }

    let outcome = aggregate(&inputs, &params.consensus)?;

    let mut writes = RoundWrites::new(topic, block);
    for result in &outcome.reputers {
        writes
            .coefficients
            .insert(result.reputer, ListeningCoefficient::new(result.coefficient));
        writes.reputer_scores.push(Score {
            topic_id: topic,
            block_height: block,
            address: result.reputer,
            score: 0.0 - result.deviation,
        });
    }

    tracing::info!(
        topic,
        block,
        scored = writes.reputer_scores.len(),
        excluded = excluded.len(),
        iterations = outcome.iterations,
        "reputer scores computed"
    );

    Ok(ReputerRound {
        writes,
        outcome,
        excluded,
    })
}

/// Compute and persist reputer scores and coefficients for one round.
///
/// All writes go through a single `commit_round`; on any error nothing is
/// persisted. Returns the new scores.
pub fn generate_reputer_scores<K: EmissionsKeeper + ?Sized>(
    keeper: &K,
    params: &ScoringParams,
    topic: TopicId,
    block: BlockHeight,
    bundles: &ReputerValueBundles,
) -> Result<Vec<Score>, AugurError> {
    let round = compute_reputer_scores(keeper, params, topic, block, bundles)?;
    keeper.commit_round(&round.writes)?;
    Ok(round.writes.reputer_scores)
}
