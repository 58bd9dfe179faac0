// crates/augur-core/src/traits.rs
//
// Collaborator interfaces the scoring engine consumes. The ledger owns stakes
// and rosters; the engine reads them. Coefficients and scores are written by
// the engine through these traits. All calls are synchronous round-trips that
// may fail; the engine propagates failures and never retries.

use crate::error::AugurError;
use crate::identity::{Address, BlockHeight, TopicId, WorkerRoster};
use crate::score::{ListeningCoefficient, RoundWrites, Score, ScoreKind, Stake};

/// Read-only view of reputer stake.
///
/// Implemented by augur-store.
pub trait StakeLedger: Send + Sync {
    /// Stake `reputer` holds on `topic`. Fails with `NotFound` if the reputer
    /// is not registered on the topic.
    fn stake_on_topic(&self, topic: TopicId, reputer: &Address) -> Result<Stake, AugurError>;
}

/// Persistent listening coefficients.
pub trait CoefficientStore: Send + Sync {
    /// Coefficient of `reputer` on `topic`. Returns the neutral default when
    /// the reputer has never been scored on the topic.
    fn listening_coefficient(
        &self,
        topic: TopicId,
        reputer: &Address,
    ) -> Result<ListeningCoefficient, AugurError>;

    /// Overwrite the coefficient of `reputer` on `topic`.
    fn set_listening_coefficient(
        &self,
        topic: TopicId,
        reputer: &Address,
        coefficient: ListeningCoefficient,
    ) -> Result<(), AugurError>;
}

/// Read-only view of topic registration.
pub trait WorkerRegistry: Send + Sync {
    /// Workers currently registered on `topic`. An unknown topic yields
    /// `NotFound`.
    fn topic_workers(&self, topic: TopicId) -> Result<WorkerRoster, AugurError>;
}

/// Append-only score tables keyed by (topic, block, address).
pub trait ScoreStore: Send + Sync {
    /// Insert a reputer score. Fails with `DuplicateKey` if the key exists.
    fn insert_reputer_score(&self, score: &Score) -> Result<(), AugurError>;

    /// Insert a worker inference score. Fails with `DuplicateKey` if the key exists.
    fn insert_worker_inference_score(&self, score: &Score) -> Result<(), AugurError>;

    /// Insert a worker forecast score. Fails with `DuplicateKey` if the key exists.
    fn insert_worker_forecast_score(&self, score: &Score) -> Result<(), AugurError>;

    /// Whether a score already exists under the given key.
    fn contains_score(
        &self,
        kind: ScoreKind,
        topic: TopicId,
        block: BlockHeight,
        address: &Address,
    ) -> Result<bool, AugurError>;

    /// All scores of one kind recorded for (topic, block), in address order.
    fn scores_at(
        &self,
        kind: ScoreKind,
        topic: TopicId,
        block: BlockHeight,
    ) -> Result<Vec<Score>, AugurError>;

    /// Insert into the table selected by `kind`.
    fn insert_score(&self, kind: ScoreKind, score: &Score) -> Result<(), AugurError> {
        match kind {
            ScoreKind::Reputer => self.insert_reputer_score(score),
            ScoreKind::Inference => self.insert_worker_inference_score(score),
            ScoreKind::Forecast => self.insert_worker_forecast_score(score),
        }
    }
}

/// Everything the engine needs from the surrounding ledger.
pub trait EmissionsKeeper: StakeLedger + CoefficientStore + WorkerRegistry + ScoreStore {
    /// Apply every write of a round, or none of them.
    ///
    /// The default implementation checks all score keys up front and then
    /// writes sequentially, which is atomic only as long as the individual
    /// writes themselves cannot fail. Adapters with real transactions
    /// override it.
    fn commit_round(&self, writes: &RoundWrites) -> Result<(), AugurError> {
        writes.validate()?;
        for (kind, score) in writes.scores() {
            if self.contains_score(kind, score.topic_id, score.block_height, &score.address)? {
                return Err(AugurError::DuplicateKey(format!(
                    "{} score for {} already recorded at topic {} block {}",
                    kind, score.address, score.topic_id, score.block_height
                )));
            }
        }
        for (reputer, coefficient) in &writes.coefficients {
            self.set_listening_coefficient(writes.topic_id, reputer, *coefficient)?;
        }
        for (kind, score) in writes.scores() {
            self.insert_score(kind, score)?;
        }
        Ok(())
    }
}
