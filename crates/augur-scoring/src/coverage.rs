// crates/augur-scoring/src/coverage.rs
//
// Coverage filter: decides which per-worker loss categories of a reputer's
// bundle can be trusted for aggregation.
//
// A category is complete only if it reports a loss for every worker on the
// topic roster. An incomplete category is dropped as a whole, never
// zero-filled or partially used, so a reputer cannot cherry-pick the workers
// it reports on. Combined and naive losses carry no coverage requirement.

use std::collections::BTreeMap;
use std::fmt;

use augur_core::bundle::{collect_worker_losses, validate_loss};
use augur_core::{Address, AugurError, ValueBundle, WorkerRoster, WorkerValue};
use serde::{Deserialize, Serialize};

/// The per-worker loss collections of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossCategory {
    OneOutInferer,
    OneOutForecaster,
    OneInForecaster,
}

impl LossCategory {
    pub const ALL: [LossCategory; 3] = [
        LossCategory::OneOutInferer,
        LossCategory::OneOutForecaster,
        LossCategory::OneInForecaster,
    ];

    /// The raw collection of this category in `bundle`.
    pub fn values(self, bundle: &ValueBundle) -> &[WorkerValue] {
        match self {
            LossCategory::OneOutInferer => &bundle.one_out_inferer_values,
            LossCategory::OneOutForecaster => &bundle.one_out_forecaster_values,
            LossCategory::OneInForecaster => &bundle.one_in_forecaster_values,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LossCategory::OneOutInferer => "one-out inferer",
            LossCategory::OneOutForecaster => "one-out forecaster",
            LossCategory::OneInForecaster => "one-in forecaster",
        }
    }
}

impl fmt::Display for LossCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single comparable loss across reputers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LossComponent {
    Combined,
    Naive,
    Worker(LossCategory, Address),
}

/// The part of a reputer's bundle that survives the coverage filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredLosses {
    pub combined: Option<f64>,
    pub naive: Option<f64>,
    /// Complete categories only, restricted to roster workers.
    pub categories: BTreeMap<LossCategory, BTreeMap<Address, f64>>,
    /// Categories dropped for incomplete coverage.
    pub excluded: Vec<LossCategory>,
}

impl FilteredLosses {
    pub fn is_eligible(&self, category: LossCategory) -> bool {
        self.categories.contains_key(&category)
    }

    /// Flatten into the components the aggregator compares.
    pub fn components(&self) -> BTreeMap<LossComponent, f64> {
        let mut out = BTreeMap::new();
        if let Some(v) = self.combined {
            out.insert(LossComponent::Combined, v);
        }
        if let Some(v) = self.naive {
            out.insert(LossComponent::Naive, v);
        }
        for (category, losses) in &self.categories {
            for (worker, loss) in losses {
                out.insert(LossComponent::Worker(*category, *worker), *loss);
            }
        }
        out
    }

    /// Whether nothing in the bundle can take part in aggregation.
    pub fn is_empty(&self) -> bool {
        self.combined.is_none() && self.naive.is_none() && self.categories.is_empty()
    }
}

/// Run the coverage filter over one bundle.
///
/// # Errors
/// Any malformed worker address (`Identity`), repeated worker
/// (`InvalidInput`) or invalid loss (`Domain`) anywhere in the bundle, even in
/// an incomplete category.
pub fn filter_bundle(bundle: &ValueBundle, roster: &WorkerRoster) -> Result<FilteredLosses, AugurError> {
    let mut filtered = FilteredLosses {
        combined: bundle
            .combined_value
            .map(|v| validate_loss(v, "combined loss"))
            .transpose()?,
        naive: bundle
            .naive_value
            .map(|v| validate_loss(v, "naive loss"))
            .transpose()?,
        ..Default::default()
    };

    for category in LossCategory::ALL {
        let reported = collect_worker_losses(category.values(bundle), category.label())?;
        let complete = !roster.is_empty() && roster.iter().all(|w| reported.contains_key(w));
        if complete {
            let on_roster = reported
                .into_iter()
                .filter(|(worker, _)| roster.contains(worker))
                .collect();
            filtered.categories.insert(category, on_roster);
        } else {
            filtered.excluded.push(category);
        }
    }

    Ok(filtered)
}
