// crates/augur-store/src/rocks.rs
//
// RocksDB-backed keeper.
//
// Key format:
//   - Stake:       `stake:{topic}:{address}`                  -> decimal stake
//   - Roster:      `roster:{topic}`                           -> JSON WorkerRoster
//   - Coefficient: `coef:{topic}:{address}`                   -> JSON ListeningCoefficient
//   - Score:       `score:{kind}:{topic}:{block}:{address}`   -> JSON Score
//
// Block heights in score keys are shifted into u64 and zero-padded to 20
// digits, so lexicographic key order matches numeric block order and a prefix
// scan over one round never picks up another.

use std::sync::Mutex;

use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};

use augur_core::{
    Address, AugurError, BlockHeight, CoefficientStore, EmissionsKeeper, ListeningCoefficient,
    RoundWrites, Score, ScoreKind, ScoreStore, Stake, StakeLedger, TopicId, WorkerRegistry,
    WorkerRoster,
};

/// RocksDB wrapper implementing `EmissionsKeeper`.
#[derive(Debug)]
pub struct RocksKeeper {
    db: DBWithThreadMode<MultiThreaded>,
    /// Serializes the check-then-write of score inserts and round commits.
    write_lock: Mutex<()>,
}

impl RocksKeeper {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, AugurError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            AugurError::Persistence(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        tracing::debug!(path, "opened RocksDB keeper");
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn stake_key(topic: TopicId, reputer: &Address) -> Vec<u8> {
        format!("stake:{}:{}", topic, reputer).into_bytes()
    }

    fn roster_key(topic: TopicId) -> Vec<u8> {
        format!("roster:{}", topic).into_bytes()
    }

    fn coefficient_key(topic: TopicId, reputer: &Address) -> Vec<u8> {
        format!("coef:{}:{}", topic, reputer).into_bytes()
    }

    /// Prefix shared by every score of one kind in one round.
    fn score_prefix(kind: ScoreKind, topic: TopicId, block: BlockHeight) -> String {
        format!("score:{}:{}:{:020}:", kind.tag(), topic, block_ordinal(block))
    }

    fn score_key(kind: ScoreKind, topic: TopicId, block: BlockHeight, address: &Address) -> Vec<u8> {
        format!("{}{}", Self::score_prefix(kind, topic, block), address).into_bytes()
    }

    /// Put raw bytes into RocksDB, mapping errors to AugurError::Persistence.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), AugurError> {
        self.db
            .put(key, value)
            .map_err(|e| AugurError::Persistence(format!("RocksDB put failed: {}", e)))
    }

    /// Get raw bytes from RocksDB, mapping errors to AugurError::Persistence.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AugurError> {
        self.db
            .get(key)
            .map_err(|e| AugurError::Persistence(format!("RocksDB get failed: {}", e)))
    }

    /// Register `reputer` on `topic` with the given stake.
    pub fn set_stake(&self, topic: TopicId, reputer: &Address, stake: Stake) -> Result<(), AugurError> {
        self.put_raw(&Self::stake_key(topic, reputer), stake.to_string().as_bytes())
    }

    /// Replace the worker roster of `topic`.
    pub fn set_topic_workers(&self, topic: TopicId, roster: &WorkerRoster) -> Result<(), AugurError> {
        let json = serde_json::to_vec(roster)?;
        self.put_raw(&Self::roster_key(topic), &json)
    }

    fn insert(&self, kind: ScoreKind, score: &Score) -> Result<(), AugurError> {
        let _guard = self.write_lock.lock().expect("Mutex poisoned");
        let key = Self::score_key(kind, score.topic_id, score.block_height, &score.address);
        if self.get_raw(&key)?.is_some() {
            return Err(duplicate(kind, score));
        }
        let json = serde_json::to_vec(score)?;
        self.put_raw(&key, &json)
    }
}

/// Map a signed block height onto u64 preserving order.
fn block_ordinal(block: BlockHeight) -> u64 {
    (block as u64) ^ (1 << 63)
}

fn duplicate(kind: ScoreKind, score: &Score) -> AugurError {
    AugurError::DuplicateKey(format!(
        "{} score for {} already recorded at topic {} block {}",
        kind, score.address, score.topic_id, score.block_height
    ))
}

impl StakeLedger for RocksKeeper {
    fn stake_on_topic(&self, topic: TopicId, reputer: &Address) -> Result<Stake, AugurError> {
        let bytes = self.get_raw(&Self::stake_key(topic, reputer))?.ok_or_else(|| {
            AugurError::NotFound(format!("no stake for reputer {} on topic {}", reputer, topic))
        })?;
        std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<Stake>().ok())
            .ok_or_else(|| {
                AugurError::Serialization(format!(
                    "corrupt stake record for reputer {} on topic {}",
                    reputer, topic
                ))
            })
    }
}

impl CoefficientStore for RocksKeeper {
    fn listening_coefficient(
        &self,
        topic: TopicId,
        reputer: &Address,
    ) -> Result<ListeningCoefficient, AugurError> {
        match self.get_raw(&Self::coefficient_key(topic, reputer))? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(ListeningCoefficient::default()),
        }
    }

    fn set_listening_coefficient(
        &self,
        topic: TopicId,
        reputer: &Address,
        coefficient: ListeningCoefficient,
    ) -> Result<(), AugurError> {
        let json = serde_json::to_vec(&coefficient)?;
        self.put_raw(&Self::coefficient_key(topic, reputer), &json)
    }
}

impl WorkerRegistry for RocksKeeper {
    fn topic_workers(&self, topic: TopicId) -> Result<WorkerRoster, AugurError> {
        let bytes = self
            .get_raw(&Self::roster_key(topic))?
            .ok_or_else(|| AugurError::NotFound(format!("topic {} has no worker roster", topic)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl ScoreStore for RocksKeeper {
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
            .get_raw(&Self::score_key(kind, topic, block, address))?
            .is_some())
    }

    fn scores_at(
        &self,
        kind: ScoreKind,
        topic: TopicId,
        block: BlockHeight,
    ) -> Result<Vec<Score>, AugurError> {
        let prefix_str = Self::score_prefix(kind, topic, block);
        let prefix = prefix_str.as_bytes();
        let mut scores = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item
                .map_err(|e| AugurError::Persistence(format!("RocksDB iteration error: {}", e)))?;
            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }
            scores.push(serde_json::from_slice(&value)?);
        }

        Ok(scores)
    }
}

impl EmissionsKeeper for RocksKeeper {
    /// Check every score key, then apply all writes in one `WriteBatch`.
    fn commit_round(&self, writes: &RoundWrites) -> Result<(), AugurError> {
        writes.validate()?;
        let _guard = self.write_lock.lock().expect("Mutex poisoned");

        let mut batch = WriteBatch::default();
        for (kind, score) in writes.scores() {
            let key = Self::score_key(kind, score.topic_id, score.block_height, &score.address);
            if self.get_raw(&key)?.is_some() {
                return Err(duplicate(kind, score));
            }
            batch.put(key, serde_json::to_vec(score)?);
        }
        for (reputer, coefficient) in &writes.coefficients {
            batch.put(
                Self::coefficient_key(writes.topic_id, reputer),
                serde_json::to_vec(coefficient)?,
            );
        }

        self.db
            .write(batch)
            .map_err(|e| AugurError::Persistence(format!("RocksDB batch write failed: {}", e)))?;

        tracing::debug!(
            topic = writes.topic_id,
            block = writes.block_height,
            scores = writes.score_count(),
            coefficients = writes.coefficients.len(),
            "round committed to RocksDB"
        );
        Ok(())
    }
}
