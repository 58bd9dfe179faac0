// crates/augur-scoring/src/consensus.rs
//
// Stake-and-coefficient weighted consensus over reputer loss reports.
//
// Every loss a reputer contributes (combined, naive, and each worker entry of
// its complete categories) is a component. Components are compared in log10
// space. The aggregator runs an iteratively reweighted consensus:
//
//   1. w_i = stake_i * coefficient_i   (stake alone if every product is zero)
//   2. C_k = stake_weighted_loss(w over reporters of k, their losses)
//   3. d_i = RMS over i's components of (log10 L_ik - C_k)
//   4. a_i = 1 / (1 + d_i / deviation_scale)
//   5. w_i = stake_i * coefficient_i * a_i, repeat from 2 until C moves less
//      than `tolerance` or `max_iterations` passes ran
//
// The persisted coefficient then takes one damped step towards the
// renormalized agreement:
//
//   target_i = a_i / max_j a_j
//   c_i' = clamp((1 - lr) * c_i + lr * target_i * max_coefficient, min, max)
//
// The aggregator is pure. Prior coefficients come in, new coefficients come
// out; nothing is read from or written to a keeper here.

use std::collections::{BTreeMap, BTreeSet};

use augur_core::{Address, AugurError};

use crate::coverage::{FilteredLosses, LossComponent};
use crate::params::ConsensusParams;
use crate::primitives::stake_weighted_loss;

/// One participating reputer as seen by the aggregator.
#[derive(Debug, Clone)]
pub struct ReputerInput {
    pub reputer: Address,
    pub stake: f64,
    /// Coefficient before this round.
    pub coefficient: f64,
    pub losses: FilteredLosses,
}

/// Per-reputer result of a consensus round.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputerOutcome {
    pub reputer: Address,
    /// RMS log10 distance of the reputer's losses from consensus.
    pub deviation: f64,
    /// Agreement in (0, 1]; 1 means the reputer matched consensus exactly.
    pub agreement: f64,
    pub prior_coefficient: f64,
    pub coefficient: f64,
}

/// Result of a consensus round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsensusOutcome {
    /// Consensus log10 loss per component.
    pub consensus: BTreeMap<LossComponent, f64>,
    /// One entry per input, in input order.
    pub reputers: Vec<ReputerOutcome>,
    /// Reweighting passes actually run.
    pub iterations: usize,
}

impl ConsensusOutcome {
    pub fn outcome_for(&self, reputer: &Address) -> Option<&ReputerOutcome> {
        self.reputers.iter().find(|r| r.reputer == *reputer)
    }
}

/// Compute consensus losses and updated coefficients for the participants of
/// one round.
///
/// # Errors
/// `InvalidInput` if a stake or coefficient is not a finite non-negative
/// number, a reputer appears twice, a participant has no components, or the
/// participants' total stake is zero. Any of these aborts the round.
pub fn aggregate(
    inputs: &[ReputerInput],
    params: &ConsensusParams,
) -> Result<ConsensusOutcome, AugurError> {
    if inputs.is_empty() {
        return Ok(ConsensusOutcome::default());
    }

    let mut seen = BTreeSet::new();
    for input in inputs {
        if !seen.insert(input.reputer) {
            return Err(AugurError::InvalidInput(format!(
                "reputer {} entered consensus twice",
                input.reputer
            )));
        }
        if !(input.stake.is_finite() && input.stake >= 0.0) {
            return Err(AugurError::InvalidInput(format!(
                "stake of reputer {} must be non-negative, got {}",
                input.reputer, input.stake
            )));
        }
        if !(input.coefficient.is_finite() && input.coefficient >= 0.0) {
            return Err(AugurError::InvalidInput(format!(
                "listening coefficient of reputer {} must be non-negative, got {}",
                input.reputer, input.coefficient
            )));
        }
        if input.losses.is_empty() {
            return Err(AugurError::InvalidInput(format!(
                "reputer {} has no eligible losses",
                input.reputer
            )));
        }
    }

    let total_stake: f64 = inputs.iter().map(|i| i.stake).sum();
    if !(total_stake > 0.0) {
        return Err(AugurError::InvalidInput(
            "total stake of participating reputers cannot be zero".to_string(),
        ));
    }

    let priors: Vec<f64> = inputs
        .iter()
        .map(|i| i.coefficient.clamp(params.min_coefficient, params.max_coefficient))
        .collect();

    let mut base_weights: Vec<f64> = inputs
        .iter()
        .zip(&priors)
        .map(|(input, prior)| input.stake * prior)
        .collect();
    if base_weights.iter().sum::<f64>() <= 0.0 {
        base_weights = inputs.iter().map(|i| i.stake).collect();
    }

    let components: Vec<BTreeMap<LossComponent, f64>> =
        inputs.iter().map(|i| i.losses.components()).collect();
    let keys: BTreeSet<LossComponent> = components
        .iter()
        .flat_map(|c| c.keys().copied())
        .collect();

    let mut weights = base_weights.clone();
    let mut consensus = BTreeMap::new();
    let mut deviations = vec![0.0; inputs.len()];
    let mut agreements = vec![1.0; inputs.len()];
    let mut iterations = 0;

    for pass in 0..params.max_iterations {
        iterations = pass + 1;
        let next = component_consensus(&keys, &components, &weights)?;

        for (i, reported) in components.iter().enumerate() {
            deviations[i] = rms_deviation(reported, &next);
            agreements[i] = 1.0 / (1.0 + deviations[i] / params.deviation_scale);
        }

        let max_move = if consensus.is_empty() {
            f64::INFINITY
        } else {
            next.iter()
                .map(|(k, v)| (v - consensus.get(k).copied().unwrap_or(*v)).abs())
                .fold(0.0, f64::max)
        };
        consensus = next;

        tracing::debug!(pass, max_move, "consensus pass complete");
        if max_move <= params.tolerance {
            break;
        }

        for i in 0..inputs.len() {
            weights[i] = base_weights[i] * agreements[i];
        }
    }

    let best = agreements.iter().copied().fold(0.0, f64::max);
    let reputers = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let target = if best > 0.0 { agreements[i] / best } else { 0.0 };
            let stepped = (1.0 - params.learning_rate) * priors[i]
                + params.learning_rate * target * params.max_coefficient;
            ReputerOutcome {
                reputer: input.reputer,
                deviation: deviations[i],
                agreement: agreements[i],
                prior_coefficient: input.coefficient,
                coefficient: stepped.clamp(params.min_coefficient, params.max_coefficient),
            }
        })
        .collect();

    Ok(ConsensusOutcome {
        consensus,
        reputers,
        iterations,
    })
}

/// Weighted log10 consensus per component. A component whose reporters all
/// carry zero weight falls back to an equal-weighted mean so that every
/// reported component has a consensus value.
fn component_consensus(
    keys: &BTreeSet<LossComponent>,
    components: &[BTreeMap<LossComponent, f64>],
    weights: &[f64],
) -> Result<BTreeMap<LossComponent, f64>, AugurError> {
    let mut out = BTreeMap::new();
    for key in keys {
        let mut ws = Vec::new();
        let mut losses = Vec::new();
        for (reported, weight) in components.iter().zip(weights) {
            if let Some(loss) = reported.get(key) {
                ws.push(*weight);
                losses.push(*loss);
            }
        }
        if ws.iter().sum::<f64>() <= 0.0 {
            ws.iter_mut().for_each(|w| *w = 1.0);
        }
        out.insert(*key, stake_weighted_loss(&ws, &losses)?);
    }
    Ok(out)
}

fn rms_deviation(reported: &BTreeMap<LossComponent, f64>, consensus: &BTreeMap<LossComponent, f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for (key, loss) in reported {
        if let Some(c) = consensus.get(key) {
            let diff = loss.log10() - c;
            sum += diff * diff;
            n += 1;
        }
    }
    if n == 0 {
        0.0
    } else {
        (sum / n as f64).sqrt()
    }
}
