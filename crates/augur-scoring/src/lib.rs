// crates/augur-scoring/src/lib.rs
//
// augur-scoring: Coverage filtering, stake-weighted consensus, and score
// generation for the Augur scoring engine.
//
// Reputers are scored by how closely their loss reports agree with the
// stake-weighted consensus, and their listening coefficients are updated
// accordingly. Workers are scored by how much the network's loss changes when
// their inference or forecast is withheld.

pub mod consensus;
pub mod coverage;
pub mod forecast;
pub mod inference;
pub mod params;
pub mod primitives;
pub mod reputer;
pub mod round;

pub use consensus::{aggregate, ConsensusOutcome, ReputerInput, ReputerOutcome};
pub use coverage::{filter_bundle, FilteredLosses, LossCategory, LossComponent};
pub use forecast::{compute_forecast_scores, generate_forecast_scores};
pub use inference::{compute_inference_scores, generate_inference_scores};
pub use params::{ConsensusParams, ScoringParams, UniquenessCurve};
pub use primitives::{forecast_task_score, stake_weighted_loss, uniqueness_weight, worker_score};
pub use reputer::{
    compute_reputer_scores, generate_reputer_scores, ExcludedReputer, ExclusionReason, ReputerRound,
};
pub use round::{score_round, RoundOutcome};
