// crates/augur-scoring/tests/round_pipeline.rs
//
// End-to-end scoring rounds against the in-memory keeper: coverage filtering,
// reputer exclusion, coefficient persistence, append-only scores, and
// all-or-nothing commits.

use augur_core::{
    Address, AugurError, CoefficientStore, ReputerValueBundle, ReputerValueBundles, ScoreKind,
    ScoreStore, ValueBundle, WorkerRoster, WorkerValue,
};
use augur_scoring::{
    compute_reputer_scores, generate_forecast_scores, generate_inference_scores,
    generate_reputer_scores, score_round, ExclusionReason, LossCategory, LossComponent,
    ScoringParams,
};
use augur_store::MemoryKeeper;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TOPIC: u64 = 7;

fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

fn values(entries: &[(u8, f64)]) -> Vec<WorkerValue> {
    entries
        .iter()
        .map(|(b, v)| WorkerValue::new(addr(*b).to_string(), *v))
        .collect()
}

/// Keeper with workers {W1, W2} and the given reputer stakes.
fn keeper_with(stakes: &[(u8, u128)]) -> MemoryKeeper {
    let keeper = MemoryKeeper::new();
    keeper.set_topic_workers(TOPIC, [addr(1), addr(2)].into_iter().collect::<WorkerRoster>());
    for (b, stake) in stakes {
        keeper.set_stake(TOPIC, addr(*b), *stake);
    }
    keeper
}

fn full_bundle(scale: f64) -> ValueBundle {
    ValueBundle {
        combined_value: Some(0.5 * scale),
        naive_value: Some(0.8 * scale),
        one_out_inferer_values: values(&[(1, 0.6 * scale), (2, 0.4 * scale)]),
        one_out_forecaster_values: values(&[(1, 0.55 * scale), (2, 0.52 * scale)]),
        one_in_forecaster_values: values(&[(1, 0.7 * scale), (2, 0.75 * scale)]),
    }
}

fn reputer(b: u8, bundle: ValueBundle) -> ReputerValueBundle {
    ReputerValueBundle {
        reputer: addr(b).to_string(),
        value_bundle: bundle,
        signature: Vec::new(),
    }
}

fn bundles(list: Vec<ReputerValueBundle>) -> ReputerValueBundles {
    ReputerValueBundles::new(list)
}

// ---------------------------------------------------------------------------
// Reputer rounds
// ---------------------------------------------------------------------------

#[test]
fn partial_category_is_dropped_not_zero_filled() {
    let keeper = keeper_with(&[(10, 100), (11, 100)]);
    let mut partial = full_bundle(1.0);
    partial.one_out_inferer_values = values(&[(1, 0.6)]);

    let round = compute_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![reputer(10, partial), reputer(11, full_bundle(1.0))]),
    )
    .unwrap();

    // Reputer 11 alone defines the one-out inferer consensus.
    let w2 = LossComponent::Worker(LossCategory::OneOutInferer, addr(2));
    assert!((round.outcome.consensus[&w2] - 0.4f64.log10()).abs() < 1e-12);

    // Everything reputer 10 kept matches consensus exactly, so it is not
    // penalized for the dropped category.
    for score in &round.writes.reputer_scores {
        assert!(score.score.abs() < 1e-9, "{:?}", score);
    }
    assert!(round.excluded.is_empty());
}

#[test]
fn excluded_reputer_keeps_coefficient_and_gets_no_score() {
    let keeper = keeper_with(&[(10, 100), (11, 100)]);
    keeper
        .set_listening_coefficient(TOPIC, &addr(11), augur_core::ListeningCoefficient::new(0.6))
        .unwrap();
    let useless = ValueBundle {
        one_out_inferer_values: values(&[(1, 0.6)]),
        ..Default::default()
    };

    let scores = generate_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(11, useless)]),
    )
    .unwrap();

    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].address, addr(10));
    assert_eq!(
        keeper.listening_coefficient(TOPIC, &addr(11)).unwrap().coefficient,
        0.6
    );
    assert!(!keeper
        .contains_score(ScoreKind::Reputer, TOPIC, 1, &addr(11))
        .unwrap());
}

#[test]
fn invalid_bundle_excludes_only_that_reputer() {
    let keeper = keeper_with(&[(10, 100), (11, 100)]);
    let mut broken = full_bundle(1.0);
    broken.combined_value = Some(-1.0);

    let round = compute_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(11, broken)]),
    )
    .unwrap();

    assert_eq!(round.writes.reputer_scores.len(), 1);
    assert_eq!(round.excluded.len(), 1);
    assert_eq!(round.excluded[0].reputer, addr(11));
    assert!(matches!(
        round.excluded[0].reason,
        ExclusionReason::InvalidBundle(AugurError::Domain(_))
    ));
}

#[test]
fn outlier_scores_lower_and_loses_coefficient() {
    let keeper = keeper_with(&[(10, 100), (11, 100), (12, 100)]);
    let scores = generate_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![
            reputer(10, full_bundle(1.0)),
            reputer(11, full_bundle(1.05)),
            reputer(12, full_bundle(40.0)),
        ]),
    )
    .unwrap();

    let by = |b: u8| scores.iter().find(|s| s.address == addr(b)).unwrap().score;
    assert!(by(12) < by(10));
    assert!(by(12) < by(11));
    assert!(scores.iter().all(|s| s.score <= 0.0));

    let c10 = keeper.listening_coefficient(TOPIC, &addr(10)).unwrap().coefficient;
    let c12 = keeper.listening_coefficient(TOPIC, &addr(12)).unwrap().coefficient;
    assert!(c12 < c10);
    assert!((0.0..=1.0).contains(&c12));
}

#[test]
fn second_run_for_same_round_is_rejected() {
    let keeper = keeper_with(&[(10, 100)]);
    let input = bundles(vec![reputer(10, full_bundle(1.0))]);
    generate_reputer_scores(&keeper, &ScoringParams::default(), TOPIC, 1, &input).unwrap();

    let err =
        generate_reputer_scores(&keeper, &ScoringParams::default(), TOPIC, 1, &input).unwrap_err();
    assert!(matches!(err, AugurError::DuplicateKey(_)));

    // A later block is a fresh round.
    generate_reputer_scores(&keeper, &ScoringParams::default(), TOPIC, 2, &input).unwrap();
}

#[test]
fn recomputation_is_deterministic() {
    let input = bundles(vec![
        reputer(10, full_bundle(1.0)),
        reputer(11, full_bundle(2.0)),
        reputer(12, full_bundle(0.7)),
    ]);
    let stakes: [(u8, u128); 3] = [(10, 100), (11, 250), (12, 40)];
    let a = generate_reputer_scores(&keeper_with(&stakes), &ScoringParams::default(), TOPIC, 1, &input)
        .unwrap();
    let b = generate_reputer_scores(&keeper_with(&stakes), &ScoringParams::default(), TOPIC, 1, &input)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_stake_aborts_without_writes() {
    let keeper = keeper_with(&[(10, 100)]);
    let err = generate_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(11, full_bundle(1.0))]),
    )
    .unwrap_err();
    assert!(matches!(err, AugurError::NotFound(_)));
    assert_eq!(keeper.score_count(), 0);
    assert_eq!(
        keeper.listening_coefficient(TOPIC, &addr(10)).unwrap().coefficient,
        1.0
    );
}

#[test]
fn malformed_reputer_address_fails_fast() {
    let keeper = MemoryKeeper::new();
    let err = generate_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![ReputerValueBundle {
            reputer: "0xnope".to_string(),
            value_bundle: full_bundle(1.0),
            signature: Vec::new(),
        }]),
    )
    .unwrap_err();
    // Reported before the keeper's missing roster is ever consulted.
    assert!(matches!(err, AugurError::Identity(_)));
}

#[test]
fn duplicate_reputer_submission_is_rejected() {
    let keeper = keeper_with(&[(10, 100)]);
    let err = generate_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(10, full_bundle(2.0))]),
    )
    .unwrap_err();
    assert!(matches!(err, AugurError::InvalidInput(_)));
}

#[test]
fn zero_total_stake_aborts() {
    let keeper = keeper_with(&[(10, 0), (11, 0)]);
    let err = generate_reputer_scores(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        1,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(11, full_bundle(1.0))]),
    )
    .unwrap_err();
    assert!(matches!(err, AugurError::InvalidInput(_)));
    assert_eq!(keeper.score_count(), 0);
}

// ---------------------------------------------------------------------------
// Worker rounds
// ---------------------------------------------------------------------------

#[test]
fn worker_generators_persist_scores() {
    let keeper = keeper_with(&[]);
    let network = full_bundle(1.0);

    let inference = generate_inference_scores(&keeper, TOPIC, 3, &network).unwrap();
    assert_eq!(inference.len(), 2);
    let forecast =
        generate_forecast_scores(&keeper, &ScoringParams::default(), TOPIC, 3, &network).unwrap();
    assert_eq!(forecast.len(), 2);

    assert_eq!(keeper.scores_at(ScoreKind::Inference, TOPIC, 3).unwrap().len(), 2);
    assert_eq!(keeper.scores_at(ScoreKind::Forecast, TOPIC, 3).unwrap().len(), 2);

    let err = generate_inference_scores(&keeper, TOPIC, 3, &network).unwrap_err();
    assert!(matches!(err, AugurError::DuplicateKey(_)));
}

// ---------------------------------------------------------------------------
// Full rounds
// ---------------------------------------------------------------------------

#[test]
fn full_round_commits_every_table() {
    let keeper = keeper_with(&[(10, 100), (11, 300)]);
    let outcome = score_round(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        9,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(11, full_bundle(1.2))]),
        &full_bundle(1.0),
    )
    .unwrap();

    assert_eq!(outcome.reputer_scores.len(), 2);
    assert_eq!(outcome.inference_scores.len(), 2);
    assert_eq!(outcome.forecast_scores.len(), 2);
    assert_eq!(outcome.score_count(), 6);
    assert_eq!(keeper.score_count(), 6);
    assert!(outcome.iterations >= 1);
}

#[test]
fn failed_worker_scoring_leaves_store_untouched() {
    let keeper = keeper_with(&[(10, 100), (11, 300)]);
    let mut network = full_bundle(1.0);
    network.one_in_forecaster_values = values(&[(1, 0.7), (3, 0.9)]);

    let err = score_round(
        &keeper,
        &ScoringParams::default(),
        TOPIC,
        9,
        &bundles(vec![reputer(10, full_bundle(1.0)), reputer(11, full_bundle(3.0))]),
        &network,
    )
    .unwrap_err();

    assert!(matches!(err, AugurError::InvalidInput(_)));
    assert_eq!(keeper.score_count(), 0);
    for b in [10, 11] {
        assert_eq!(
            keeper.listening_coefficient(TOPIC, &addr(b)).unwrap().coefficient,
            1.0
        );
    }
}
