// crates/augur-cli/src/runner.rs
//
// Async round runner.
//
// Rounds of different topics run concurrently. Rounds of the same topic are
// serialized by a per-topic lock and, within one batch, run in the order they
// were given, so each round reads the coefficients its predecessor wrote. A
// round's roster and stakes are seeded under the same lock, immediately before
// it is scored.
// Scoring itself is CPU-bound and synchronous, so it runs on the blocking pool.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use augur_core::{BlockHeight, EmissionsKeeper, TopicId};
use augur_scoring::{score_round, RoundOutcome, ScoringParams};

use crate::input::{LedgerSeed, RoundInput};

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundStatus {
    Scored {
        reputers: usize,
        inferers: usize,
        forecasters: usize,
        excluded: usize,
    },
    Unscored {
        reason: String,
    },
}

/// Per-round result printed by `augur score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// Where the round came from, usually the file path.
    pub label: String,
    pub topic_id: TopicId,
    pub block_height: BlockHeight,
    #[serde(flatten)]
    pub status: RoundStatus,
}

impl RoundReport {
    pub fn is_scored(&self) -> bool {
        matches!(self.status, RoundStatus::Scored { .. })
    }

    fn scored(label: String, outcome: &RoundOutcome) -> Self {
        Self {
            label,
            topic_id: outcome.topic_id,
            block_height: outcome.block_height,
            status: RoundStatus::Scored {
                reputers: outcome.reputer_scores.len(),
                inferers: outcome.inference_scores.len(),
                forecasters: outcome.forecast_scores.len(),
                excluded: outcome.excluded.len(),
            },
        }
    }

    fn unscored(label: String, topic_id: TopicId, block_height: BlockHeight, reason: String) -> Self {
        Self {
            label,
            topic_id,
            block_height,
            status: RoundStatus::Unscored { reason },
        }
    }
}

/// Runs scoring rounds against a shared keeper.
pub struct RoundRunner<K> {
    keeper: Arc<K>,
    params: ScoringParams,
    topic_locks: Mutex<HashMap<TopicId, Arc<Mutex<()>>>>,
}

impl<K: EmissionsKeeper + LedgerSeed + 'static> RoundRunner<K> {
    pub fn new(keeper: Arc<K>, params: ScoringParams) -> Self {
        Self {
            keeper,
            params,
            topic_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn topic_lock(&self, topic: TopicId) -> Arc<Mutex<()>> {
        let mut locks = self.topic_locks.lock().await;
        Arc::clone(locks.entry(topic).or_insert_with(|| Arc::new(Mutex::new(()))))
    }

    /// Seed and score one round. Failures are reported, never propagated.
    pub async fn run(&self, label: String, input: RoundInput) -> RoundReport {
        let topic = input.topic_id;
        let block = input.block_height;

        let lock = self.topic_lock(topic).await;
        let _guard = lock.lock().await;

        let keeper = Arc::clone(&self.keeper);
        let params = self.params.clone();
        let result = tokio::task::spawn_blocking(move || {
            keeper.seed_round(&input)?;
            score_round(
                keeper.as_ref(),
                &params,
                topic,
                block,
                &input.reputer_value_bundles,
                &input.network_value_bundle,
            )
        })
        .await;

        match result {
            Ok(Ok(outcome)) => {
                tracing::info!(%label, topic, block, scores = outcome.score_count(), "round scored");
                RoundReport::scored(label, &outcome)
            }
            Ok(Err(e)) => {
                tracing::error!(%label, topic, block, error = %e, "round left unscored");
                RoundReport::unscored(label, topic, block, e.to_string())
            }
            Err(e) => {
                tracing::error!(%label, topic, block, error = %e, "scoring task failed");
                RoundReport::unscored(label, topic, block, format!("scoring task failed: {}", e))
            }
        }
    }

    /// Score a batch of rounds. Reports come back in input order.
    pub async fn run_all(self: Arc<Self>, rounds: Vec<(String, RoundInput)>) -> Vec<RoundReport> {
        let total = rounds.len();
        let mut by_topic: BTreeMap<TopicId, Vec<(usize, String, RoundInput)>> = BTreeMap::new();
        for (index, (label, input)) in rounds.into_iter().enumerate() {
            by_topic
                .entry(input.topic_id)
                .or_default()
                .push((index, label, input));
        }

        let mut handles = Vec::new();
        for (topic, queue) in by_topic {
            let runner = Arc::clone(&self);
            let pending: Vec<(usize, String, BlockHeight)> = queue
                .iter()
                .map(|(index, label, input)| (*index, label.clone(), input.block_height))
                .collect();
            let handle = tokio::spawn(async move {
                let mut reports = Vec::with_capacity(queue.len());
                for (index, label, input) in queue {
                    reports.push((index, runner.run(label, input).await));
                }
                reports
            });
            handles.push((topic, pending, handle));
        }

        let mut slots: Vec<Option<RoundReport>> = vec![None; total];
        for (topic, pending, handle) in handles {
            match handle.await {
                Ok(reports) => {
                    for (index, report) in reports {
                        slots[index] = Some(report);
                    }
                }
                Err(e) => {
                    tracing::error!(topic, error = %e, "topic task failed");
                    for (index, label, block) in pending {
                        slots[index] = Some(RoundReport::unscored(
                            label,
                            topic,
                            block,
                            format!("topic task failed: {}", e),
                        ));
                    }
                }
            }
        }

        slots.into_iter().flatten().collect()
    }
}
