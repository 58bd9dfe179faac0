// crates/augur-core/src/bundle.rs
//
// Round inputs: the loss bundles reported by reputers and the network's
// resolved bundle. These are the logical wire shapes; the serialization layer
// must preserve them field for field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AugurError;
use crate::identity::Address;

/// One per-worker loss entry as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerValue {
    /// Worker address, not yet validated.
    pub worker: String,
    /// Reported loss.
    pub value: f64,
}

impl WorkerValue {
    pub fn new(worker: impl Into<String>, value: f64) -> Self {
        Self {
            worker: worker.into(),
            value,
        }
    }
}

/// A reputer's (or the network's) loss assessment for one (topic, round).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueBundle {
    /// Loss of the network's combined inference.
    #[serde(default)]
    pub combined_value: Option<f64>,
    /// Loss of the naive baseline (network inference without forecast-implied inferences).
    #[serde(default)]
    pub naive_value: Option<f64>,
    /// Network loss with each inferer withheld in turn.
    #[serde(default)]
    pub one_out_inferer_values: Vec<WorkerValue>,
    /// Network loss with each forecaster withheld in turn.
    #[serde(default)]
    pub one_out_forecaster_values: Vec<WorkerValue>,
    /// Naive loss with each forecaster added in turn.
    #[serde(default)]
    pub one_in_forecaster_values: Vec<WorkerValue>,
}

impl ValueBundle {
    /// Combined loss, required for worker scoring.
    pub fn require_combined(&self) -> Result<f64, AugurError> {
        let value = self
            .combined_value
            .ok_or_else(|| AugurError::NotFound("combined loss missing from bundle".to_string()))?;
        validate_loss(value, "combined loss")
    }

    /// Naive baseline loss, required for forecast scoring.
    pub fn require_naive(&self) -> Result<f64, AugurError> {
        let value = self
            .naive_value
            .ok_or_else(|| AugurError::NotFound("naive loss missing from bundle".to_string()))?;
        validate_loss(value, "naive loss")
    }
}

/// One reputer's signed submission for a round.
///
/// The signature is carried through untouched; authentication happens before
/// bundles reach the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputerValueBundle {
    pub reputer: String,
    pub value_bundle: ValueBundle,
    #[serde(default)]
    pub signature: Vec<u8>,
}

/// Ordered collection of reputer submissions for one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReputerValueBundles {
    pub reputer_value_bundles: Vec<ReputerValueBundle>,
}

impl ReputerValueBundles {
    pub fn new(reputer_value_bundles: Vec<ReputerValueBundle>) -> Self {
        Self {
            reputer_value_bundles,
        }
    }

    pub fn len(&self) -> usize {
        self.reputer_value_bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reputer_value_bundles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReputerValueBundle> {
        self.reputer_value_bundles.iter()
    }
}

/// Check that a loss is a strictly positive finite real.
pub fn validate_loss(value: f64, what: &str) -> Result<f64, AugurError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AugurError::Domain(format!(
            "{} must be a positive finite value, got {}",
            what, value
        )))
    }
}

/// Resolve a per-worker collection into a typed map.
///
/// Fails on the first malformed address (`Identity`), repeated worker
/// (`InvalidInput`) or invalid loss (`Domain`).
pub fn collect_worker_losses(
    values: &[WorkerValue],
    collection: &str,
) -> Result<BTreeMap<Address, f64>, AugurError> {
    let mut losses = BTreeMap::new();
    for entry in values {
        let worker = Address::parse(&entry.worker)?;
        let loss = validate_loss(entry.value, &format!("{} loss of {}", collection, worker))?;
        if losses.insert(worker, loss).is_some() {
            return Err(AugurError::InvalidInput(format!(
                "worker {} appears more than once in {}",
                worker, collection
            )));
        }
    }
    Ok(losses)
}
