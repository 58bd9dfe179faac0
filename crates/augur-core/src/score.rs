// crates/augur-core/src/score.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AugurError;
use crate::identity::{Address, BlockHeight, TopicId};

/// Stake amount a reputer holds on a topic, in the smallest token unit.
pub type Stake = u128;

/// Neutral listening coefficient assigned on a reputer's first appearance.
pub const DEFAULT_LISTENING_COEFFICIENT: f64 = 1.0;

/// An immutable score record for one participant in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub topic_id: TopicId,
    pub block_height: BlockHeight,
    pub address: Address,
    pub score: f64,
}

/// Which score table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Reputer score from loss-report agreement.
    Reputer,
    /// Worker score for the inference task.
    Inference,
    /// Worker score for the forecast task.
    Forecast,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 3] = [ScoreKind::Reputer, ScoreKind::Inference, ScoreKind::Forecast];

    /// Short stable tag used in storage keys.
    pub fn tag(&self) -> &'static str {
        match self {
            ScoreKind::Reputer => "reputer",
            ScoreKind::Inference => "inference",
            ScoreKind::Forecast => "forecast",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-(topic, reputer) reliability weight used to down-weight historically
/// inconsistent reputers in future consensus rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListeningCoefficient {
    pub coefficient: f64,
}

impl ListeningCoefficient {
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }
}

impl Default for ListeningCoefficient {
    fn default() -> Self {
        Self {
            coefficient: DEFAULT_LISTENING_COEFFICIENT,
        }
    }
}

/// Every write a round produces, staged so it can be applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundWrites {
    pub topic_id: TopicId,
    pub block_height: BlockHeight,
    pub coefficients: BTreeMap<Address, ListeningCoefficient>,
    pub reputer_scores: Vec<Score>,
    pub inference_scores: Vec<Score>,
    pub forecast_scores: Vec<Score>,
}

impl RoundWrites {
    pub fn new(topic_id: TopicId, block_height: BlockHeight) -> Self {
        Self {
            topic_id,
            block_height,
            coefficients: BTreeMap::new(),
            reputer_scores: Vec::new(),
            inference_scores: Vec::new(),
            forecast_scores: Vec::new(),
        }
    }

    /// Score list for the given kind.
    pub fn scores_of(&self, kind: ScoreKind) -> &[Score] {
        match kind {
            ScoreKind::Reputer => &self.reputer_scores,
            ScoreKind::Inference => &self.inference_scores,
            ScoreKind::Forecast => &self.forecast_scores,
        }
    }

    /// All staged scores with their kind.
    pub fn scores(&self) -> impl Iterator<Item = (ScoreKind, &Score)> {
        ScoreKind::ALL
            .into_iter()
            .flat_map(move |kind| self.scores_of(kind).iter().map(move |s| (kind, s)))
    }

    pub fn score_count(&self) -> usize {
        self.reputer_scores.len() + self.inference_scores.len() + self.forecast_scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty() && self.score_count() == 0
    }

    /// Fold another write set for the same round into this one.
    pub fn merge(&mut self, other: RoundWrites) -> Result<(), AugurError> {
        if other.topic_id != self.topic_id || other.block_height != self.block_height {
            return Err(AugurError::InvalidInput(format!(
                "cannot merge writes for topic {} block {} into topic {} block {}",
                other.topic_id, other.block_height, self.topic_id, self.block_height
            )));
        }
        self.coefficients.extend(other.coefficients);
        self.reputer_scores.extend(other.reputer_scores);
        self.inference_scores.extend(other.inference_scores);
        self.forecast_scores.extend(other.forecast_scores);
        Ok(())
    }

    /// Reject write sets that are internally inconsistent: a score scoped to a
    /// different round, or two scores for the same (kind, address).
    pub fn validate(&self) -> Result<(), AugurError> {
        let mut seen = BTreeSet::new();
        for (kind, score) in self.scores() {
            if score.topic_id != self.topic_id || score.block_height != self.block_height {
                return Err(AugurError::InvalidInput(format!(
                    "{} score for {} is keyed to topic {} block {}, expected topic {} block {}",
                    kind,
                    score.address,
                    score.topic_id,
                    score.block_height,
                    self.topic_id,
                    self.block_height
                )));
            }
            if !seen.insert((kind, score.address)) {
                return Err(AugurError::DuplicateKey(format!(
                    "{} score for {} staged twice in topic {} block {}",
                    kind, score.address, self.topic_id, self.block_height
                )));
            }
        }
        Ok(())
    }
}
