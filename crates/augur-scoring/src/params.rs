// crates/augur-scoring/src/params.rs
//
// Tuning parameters for the scoring engine. None of these are
// correctness-critical contracts; each has a safe default and can be
// overridden from the operator config.

use augur_core::AugurError;
use serde::{Deserialize, Serialize};

/// Knobs of the consensus aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    /// Maximum reweighting passes per round.
    pub max_iterations: usize,
    /// Early-exit threshold on the largest consensus move between passes (log10 units).
    pub tolerance: f64,
    /// Damping of the coefficient update: 0 keeps the prior, 1 jumps to the target.
    pub learning_rate: f64,
    /// RMS log10 deviation at which a reputer's agreement drops to one half.
    pub deviation_scale: f64,
    /// Lower coefficient bound.
    pub min_coefficient: f64,
    /// Upper coefficient bound.
    pub max_coefficient: f64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 1e-9,
            learning_rate: 0.25,
            deviation_scale: 1.0,
            min_coefficient: 0.0,
            max_coefficient: 1.0,
        }
    }
}

/// Shape of the forecast uniqueness curve `max(floor, base^-(n-1))`.
///
/// The default floor is 0.1: however many forecasters a topic has, at least a
/// tenth of each forecast score still comes from beating the naive baseline.
/// With base 2 the floor takes over from five forecasters on. A floor of 0.0
/// gives the undamped curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniquenessCurve {
    /// Decay base; larger values shift credit to the one-out component faster.
    pub base: f64,
    /// Lowest weight the one-in component can fall to.
    pub floor: f64,
}

impl Default for UniquenessCurve {
    fn default() -> Self {
        Self {
            base: 2.0,
            floor: 0.1,
        }
    }
}

/// All engine parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub consensus: ConsensusParams,
    pub uniqueness: UniquenessCurve,
}

impl ScoringParams {
    /// Reject parameter sets the engine cannot run with.
    pub fn validate(&self) -> Result<(), AugurError> {
        let c = &self.consensus;
        if c.max_iterations == 0 {
            return Err(invalid("consensus.max_iterations must be at least 1"));
        }
        if !(c.tolerance.is_finite() && c.tolerance >= 0.0) {
            return Err(invalid("consensus.tolerance must be a non-negative number"));
        }
        if !(0.0..=1.0).contains(&c.learning_rate) {
            return Err(invalid("consensus.learning_rate must lie in [0, 1]"));
        }
        if !(c.deviation_scale.is_finite() && c.deviation_scale > 0.0) {
            return Err(invalid("consensus.deviation_scale must be positive"));
        }
        if !(c.min_coefficient.is_finite()
            && c.max_coefficient.is_finite()
            && 0.0 <= c.min_coefficient
            && c.min_coefficient < c.max_coefficient)
        {
            return Err(invalid(
                "consensus coefficient bounds must satisfy 0 <= min_coefficient < max_coefficient",
            ));
        }
        let u = &self.uniqueness;
        if !(u.base.is_finite() && u.base >= 1.0) {
            return Err(invalid("uniqueness.base must be at least 1"));
        }
        if !(0.0..=1.0).contains(&u.floor) {
            return Err(invalid("uniqueness.floor must lie in [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> AugurError {
    AugurError::InvalidInput(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ScoringParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut params = ScoringParams::default();
        params.consensus.min_coefficient = 0.8;
        params.consensus.max_coefficient = 0.2;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_learning_rate() {
        let mut params = ScoringParams::default();
        params.consensus.learning_rate = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_shrinking_uniqueness_base() {
        let mut params = ScoringParams::default();
        params.uniqueness.base = 0.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn default_floor_keeps_one_in_credit() {
        let curve = UniquenessCurve::default();
        assert!(curve.floor > 0.0 && curve.floor < 1.0);
        assert!((crate::primitives::uniqueness_weight(50.0, &curve) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: ScoringParams =
            serde_json::from_str(r#"{"consensus": {"learning_rate": 0.5}}"#).unwrap();
        assert_eq!(params.consensus.learning_rate, 0.5);
        assert_eq!(params.consensus.max_iterations, 10);
        assert_eq!(params.uniqueness, UniquenessCurve::default());
    }
}
