// crates/augur-store/tests/rocks_keeper.rs
//
// Integration tests for the RocksDB keeper: stake and roster lookups,
// coefficient defaults, append-only score tables, atomic round commits, and
// persistence across reopen.

use uuid::Uuid;

use augur_core::{
    Address, AugurError, CoefficientStore, EmissionsKeeper, ListeningCoefficient, RoundWrites,
    Score, ScoreKind, ScoreStore, StakeLedger, WorkerRegistry, WorkerRoster,
};
use augur_store::RocksKeeper;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory path using UUID to avoid conflicts.
fn temp_db_path(label: &str) -> String {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("augur_test_{}_{}", label, Uuid::now_v7()));
    path.to_string_lossy().to_string()
}

fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

fn score(block: i64, b: u8, value: f64) -> Score {
    Score {
        topic_id: 1,
        block_height: block,
        address: addr(b),
        score: value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn stake_and_roster_lookups() {
    let db_path = temp_db_path("ledger");
    {
        let keeper = RocksKeeper::open(&db_path).unwrap();
        let big: u128 = u128::MAX - 7;
        keeper.set_stake(1, &addr(1), big).unwrap();
        assert_eq!(keeper.stake_on_topic(1, &addr(1)).unwrap(), big);
        assert!(matches!(
            keeper.stake_on_topic(1, &addr(2)),
            Err(AugurError::NotFound(_))
        ));

        assert!(matches!(keeper.topic_workers(1), Err(AugurError::NotFound(_))));
        let roster: WorkerRoster = [addr(3), addr(4)].into_iter().collect();
        keeper.set_topic_workers(1, &roster).unwrap();
        assert_eq!(keeper.topic_workers(1).unwrap(), roster);
    }
    std::fs::remove_dir_all(&db_path).ok();
}

#[test]
fn coefficients_default_and_persist() {
    let db_path = temp_db_path("coef");
    {
        let keeper = RocksKeeper::open(&db_path).unwrap();
        assert_eq!(keeper.listening_coefficient(1, &addr(1)).unwrap().coefficient, 1.0);
        keeper
            .set_listening_coefficient(1, &addr(1), ListeningCoefficient::new(0.375))
            .unwrap();
    }
    {
        let keeper = RocksKeeper::open(&db_path).unwrap();
        assert_eq!(keeper.listening_coefficient(1, &addr(1)).unwrap().coefficient, 0.375);
    }
    std::fs::remove_dir_all(&db_path).ok();
}

#[test]
fn scores_are_append_only_and_scoped_to_round() {
    let db_path = temp_db_path("scores");
    {
        let keeper = RocksKeeper::open(&db_path).unwrap();
        keeper.insert_reputer_score(&score(10, 2, -0.5)).unwrap();
        keeper.insert_reputer_score(&score(10, 1, -0.25)).unwrap();
        keeper.insert_reputer_score(&score(100, 1, -0.75)).unwrap();
        keeper.insert_worker_forecast_score(&score(10, 1, 0.1)).unwrap();

        assert!(matches!(
            keeper.insert_reputer_score(&score(10, 1, 0.0)),
            Err(AugurError::DuplicateKey(_))
        ));

        let at_10 = keeper.scores_at(ScoreKind::Reputer, 1, 10).unwrap();
        assert_eq!(at_10.len(), 2);
        assert_eq!(at_10[0].address, addr(1));
        assert_eq!(at_10[0].score, -0.25);
        assert_eq!(at_10[1].address, addr(2));

        assert_eq!(keeper.scores_at(ScoreKind::Reputer, 1, 100).unwrap().len(), 1);
        assert_eq!(keeper.scores_at(ScoreKind::Forecast, 1, 10).unwrap().len(), 1);
        assert!(keeper.scores_at(ScoreKind::Inference, 1, 10).unwrap().is_empty());
        assert!(keeper
            .contains_score(ScoreKind::Reputer, 1, 100, &addr(1))
            .unwrap());
    }
    std::fs::remove_dir_all(&db_path).ok();
}

#[test]
fn commit_round_is_all_or_nothing() {
    let db_path = temp_db_path("commit");
    {
        let keeper = RocksKeeper::open(&db_path).unwrap();
        keeper.insert_worker_inference_score(&score(5, 9, 0.4)).unwrap();

        let mut writes = RoundWrites::new(1, 5);
        writes
            .coefficients
            .insert(addr(1), ListeningCoefficient::new(0.5));
        writes.reputer_scores.push(score(5, 1, -0.1));
        writes.inference_scores.push(score(5, 9, 0.2));

        let err = keeper.commit_round(&writes).unwrap_err();
        assert!(matches!(err, AugurError::DuplicateKey(_)));
        assert!(keeper.scores_at(ScoreKind::Reputer, 1, 5).unwrap().is_empty());
        assert_eq!(keeper.listening_coefficient(1, &addr(1)).unwrap().coefficient, 1.0);

        writes.inference_scores.clear();
        keeper.commit_round(&writes).unwrap();
        assert_eq!(keeper.scores_at(ScoreKind::Reputer, 1, 5).unwrap().len(), 1);
        assert_eq!(keeper.listening_coefficient(1, &addr(1)).unwrap().coefficient, 0.5);
    }
    std::fs::remove_dir_all(&db_path).ok();
}

#[test]
fn negative_block_heights_are_supported() {
    let db_path = temp_db_path("negative");
    {
        let keeper = RocksKeeper::open(&db_path).unwrap();
        keeper.insert_reputer_score(&score(-3, 1, -0.1)).unwrap();
        keeper.insert_reputer_score(&score(3, 1, -0.2)).unwrap();
        let found = keeper.scores_at(ScoreKind::Reputer, 1, -3).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].block_height, -3);
    }
    std::fs::remove_dir_all(&db_path).ok();
}
