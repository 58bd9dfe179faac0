// crates/augur-store/src/memory.rs
//
// In-memory keeper implementing every collaborator trait of the engine.
//
// State lives in `RwLock`-guarded B-tree maps, so reads come back in a stable
// order. `commit_round` takes the coefficient and score locks together and
// checks every key before applying anything, which makes a round's writes
// atomic with respect to other callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use augur_core::{
    Address, AugurError, BlockHeight, CoefficientStore, EmissionsKeeper, ListeningCoefficient,
    RoundWrites, Score, ScoreKind, ScoreStore, Stake, StakeLedger, TopicId, WorkerRegistry,
    WorkerRoster,
};

type ScoreKey = (ScoreKind, TopicId, BlockHeight, Address);

/// Keeper holding all state in process memory.
#[derive(Debug, Default)]
pub struct MemoryKeeper {
    stakes: RwLock<HashMap<(TopicId, Address), Stake>>,
    rosters: RwLock<HashMap<TopicId, WorkerRoster>>,
    coefficients: RwLock<HashMap<(TopicId, Address), ListeningCoefficient>>,
    scores: RwLock<BTreeMap<ScoreKey, Score>>,
}

impl MemoryKeeper {
    /// Create an empty keeper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reputer` on `topic` with the given stake.
    pub fn set_stake(&self, topic: TopicId, reputer: Address, stake: Stake) {
        self.stakes
            .write()
            .expect("RwLock poisoned")
            .insert((topic, reputer), stake);
    }

    /// Replace the worker roster of `topic`.
    pub fn set_topic_workers(&self, topic: TopicId, roster: WorkerRoster) {
        self.rosters
            .write()
            .expect("RwLock poisoned")
            .insert(topic, roster);
    }

    /// Total number of score records across all tables.
    pub fn score_count(&self) -> usize {
        self.scores.read().expect("RwLock poisoned").len()
    }

    fn score_key(kind: ScoreKind, score: &Score) -> ScoreKey {
        (kind, score.topic_id, score.block_height, score.address)
    }

    fn insert(&self, kind: ScoreKind, score: &Score) -> Result<(), AugurError> {
        let mut scores = self.scores.write().expect("RwLock poisoned");
        let key = Self::score_key(kind, score);
        if scores.contains_key(&key) {
            return Err(duplicate(kind, score));
        }
        scores.insert(key, score.clone());
        Ok(())
    }
}

fn duplicate(kind: ScoreKind, score: &Score) -> AugurError {
    AugurError::DuplicateKey(format!(
        "{} score for {} already recorded at topic {} block {}",
        kind, score.address, score.topic_id, score.block_height
    ))
}

impl StakeLedger for MemoryKeeper {
    fn stake_on_topic(&self, topic: TopicId, reputer: &Address) -> Result<Stake, AugurError> {
        self.stakes
            .read()
            .expect("RwLock poisoned")
            .get(&(topic, *reputer))
            .copied()
            .ok_or_else(|| {
                AugurError::NotFound(format!("no stake for reputer {} on topic {}", reputer, topic))
            })
    }
}

impl CoefficientStore for MemoryKeeper {
    fn listening_coefficient(
        &self,
        topic: TopicId,
        reputer: &Address,
    ) -> Result<ListeningCoefficient, AugurError> {
        Ok(self
            .coefficients
            .read()
            .expect("RwLock poisoned")
            .get(&(topic, *reputer))
            .copied()
            .unwrap_or_default())
    }

    fn set_listening_coefficient(
        &self,
        topic: TopicId,
        reputer: &Address,
        coefficient: ListeningCoefficient,
    ) -> Result<(), AugurError> {
        self.coefficients
            .write()
            .expect("RwLock poisoned")
            .insert((topic, *reputer), coefficient);
        Ok(())
    }
}

impl WorkerRegistry for MemoryKeeper {
    fn topic_workers(&self, topic: TopicId) -> Result<WorkerRoster, AugurError> {
        self.rosters
            .read()
            .expect("RwLock poisoned")
            .get(&topic)
            .cloned()
            .ok_or_else(|| AugurError::NotFound(format!("topic {} has no worker roster", topic)))
    }
}

impl ScoreStore for MemoryKeeper {
    fn insert_reputer_score(&self, score: &Score) -> Result<(), AugurError> {
        self.insert(ScoreKind::Reputer, score)
    }

    fn insert_worker_inference_score(&self, score: &Score) -> Result<(), AugurError> {
        self.insert(ScoreKind::Inference, score)
    }

    fn insert_worker_forecast_score(&self, score: &Score) -> Result<(), AugurError> {
        self.insert(ScoreKind::Forecast, score)
    }

    fn contains_score(
        &self,
        kind: ScoreKind,
        topic: TopicId,
        block: BlockHeight,
        address: &Address,
    ) -> Result<bool, AugurError> {
        Ok(self
            .scores
            .read()
            .expect("RwLock poisoned")
            .contains_key(&(kind, topic, block, *address)))
    }

    fn scores_at(
        &self,
        kind: ScoreKind,
        topic: TopicId,
        block: BlockHeight,
    ) -> Result<Vec<Score>, AugurError> {
        Ok(self
            .scores
            .read()
            .expect("RwLock poisoned")
            .iter()
            .filter(|((k, t, b, _), _)| *k == kind && *t == topic && *b == block)
            .map(|(_, score)| score.clone())
            .collect())
    }
}

impl EmissionsKeeper for MemoryKeeper {
    fn commit_round(&self, writes: &RoundWrites) -> Result<(), AugurError> {
        writes.validate()?;

        // Lock order: coefficients, then scores.
        let mut coefficients = self.coefficients.write().expect("RwLock poisoned");
        let mut scores = self.scores.write().expect("RwLock poisoned");

        for (kind, score) in writes.scores() {
            if scores.contains_key(&Self::score_key(kind, score)) {
                return Err(duplicate(kind, score));
            }
        }

        for (reputer, coefficient) in &writes.coefficients {
            coefficients.insert((writes.topic_id, *reputer), *coefficient);
        }
        for (kind, score) in writes.scores() {
            scores.insert(Self::score_key(kind, score), score.clone());
        }

        tracing::debug!(
            topic = writes.topic_id,
            block = writes.block_height,
            scores = writes.score_count(),
            "round committed to memory keeper"
        );
        Ok(())
    }
}
