// crates/augur-cli/src/input.rs
//
// Round files: one JSON document per scoring round, carrying the ledger view
// (roster and stakes) alongside the reputer and network bundles.
//
// Example:
//   {
//     "topic_id": 1,
//     "block_height": 1200,
//     "workers": ["0x01...", "0x02..."],
//     "stakes": [{ "reputer": "0x0a...", "stake": 1000 }],
//     "reputer_value_bundles": { "reputer_value_bundles": [ ... ] },
//     "network_value_bundle": { "combined_value": 0.5, ... }
//   }

use std::fs;

use augur_core::{
    Address, AugurError, BlockHeight, ReputerValueBundles, Stake, TopicId, ValueBundle,
    WorkerRoster,
};
use augur_store::{MemoryKeeper, RocksKeeper};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Stake a reputer holds on the round's topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub reputer: Address,
    pub stake: Stake,
}

/// Everything needed to score one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundInput {
    pub topic_id: TopicId,
    pub block_height: BlockHeight,
    /// Topic roster at round time.
    #[serde(default)]
    pub workers: Vec<Address>,
    #[serde(default)]
    pub stakes: Vec<StakeEntry>,
    pub reputer_value_bundles: ReputerValueBundles,
    pub network_value_bundle: ValueBundle,
}

impl RoundInput {
    /// Read a round file.
    pub fn load(path: &str) -> Result<Self, CliError> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| CliError::Input(format!("{}: {}", path, e)))
    }

    pub fn roster(&self) -> WorkerRoster {
        self.workers.iter().copied().collect()
    }
}

/// Keepers that accept the ledger view carried by a round file.
///
/// Seeding overwrites the topic roster and the listed stakes, so it must run
/// in the same critical section as the round it belongs to.
pub trait LedgerSeed {
    fn seed_round(&self, input: &RoundInput) -> Result<(), AugurError>;
}

impl LedgerSeed for RocksKeeper {
    fn seed_round(&self, input: &RoundInput) -> Result<(), AugurError> {
        self.set_topic_workers(input.topic_id, &input.roster())?;
        for entry in &input.stakes {
            self.set_stake(input.topic_id, &entry.reputer, entry.stake)?;
        }
        log_seeded(input);
        Ok(())
    }
}

impl LedgerSeed for MemoryKeeper {
    fn seed_round(&self, input: &RoundInput) -> Result<(), AugurError> {
        self.set_topic_workers(input.topic_id, input.roster());
        for entry in &input.stakes {
            self.set_stake(input.topic_id, entry.reputer, entry.stake);
        }
        log_seeded(input);
        Ok(())
    }
}

fn log_seeded(input: &RoundInput) {
    tracing::debug!(
        topic = input.topic_id,
        block = input.block_height,
        workers = input.workers.len(),
        stakes = input.stakes.len(),
        "seeded ledger view"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND: &str = r#"{
        "topic_id": 3,
        "block_height": 42,
        "workers": ["0x0101010101010101010101010101010101010101"],
        "stakes": [{ "reputer": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a", "stake": 500 }],
        "reputer_value_bundles": {
            "reputer_value_bundles": [{
                "reputer": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a",
                "value_bundle": { "combined_value": 0.5, "naive_value": 0.9 }
            }]
        },
        "network_value_bundle": {
            "combined_value": 0.5,
            "one_out_inferer_values": [
                { "worker": "0x0101010101010101010101010101010101010101", "value": 0.6 }
            ]
        }
    }"#;

    #[test]
    fn parses_round_file() {
        let input: RoundInput = serde_json::from_str(ROUND).unwrap();
        assert_eq!(input.topic_id, 3);
        assert_eq!(input.block_height, 42);
        assert_eq!(input.roster().len(), 1);
        assert_eq!(input.stakes[0].stake, 500);
        assert_eq!(input.reputer_value_bundles.len(), 1);
        assert_eq!(input.network_value_bundle.one_out_inferer_values.len(), 1);
        assert!(input.network_value_bundle.naive_value.is_none());
    }

    #[test]
    fn malformed_address_in_roster_is_rejected() {
        let bad = ROUND.replace(
            "\"workers\": [\"0x0101010101010101010101010101010101010101\"]",
            "\"workers\": [\"0x01\"]",
        );
        assert!(serde_json::from_str::<RoundInput>(&bad).is_err());
    }
}
