// crates/augur-scoring/src/primitives.rs
//
// Stateless numeric building blocks shared by every score generator.
//
// All losses are compared in log10 space so that losses of very different
// magnitude do not dominate linearly.

use augur_core::AugurError;

use crate::params::UniquenessCurve;

/// Log-loss delta between a loss and the same loss with a participant held
/// out (or held in).
///
/// Returns `log10(held_out_loss) - log10(loss)`: positive when removing the
/// participant increases the loss, i.e. the participant helped.
pub fn worker_score(loss: f64, held_out_loss: f64) -> Result<f64, AugurError> {
    for (name, value) in [("loss", loss), ("held-out loss", held_out_loss)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(AugurError::Domain(format!(
                "{} must be a positive finite value, got {}",
                name, value
            )));
        }
    }
    Ok(held_out_loss.log10() - loss.log10())
}

/// Stake-share-weighted sum of `log10(loss)`, i.e. the log of a
/// stake-weighted geometric mean.
///
/// # Errors
/// `InvalidInput` if the slices differ in length, a stake is negative or not
/// finite, the total stake is not positive, or any loss is not positive.
pub fn stake_weighted_loss(stakes: &[f64], losses: &[f64]) -> Result<f64, AugurError> {
    if stakes.len() != losses.len() {
        return Err(AugurError::InvalidInput(format!(
            "stakes and losses must have the same length ({} != {})",
            stakes.len(),
            losses.len()
        )));
    }
    if stakes.iter().any(|s| !s.is_finite() || *s < 0.0) {
        return Err(AugurError::InvalidInput(
            "stakes must be non-negative finite values".to_string(),
        ));
    }

    let total_stake: f64 = stakes.iter().sum();
    if !(total_stake > 0.0) {
        return Err(AugurError::InvalidInput(
            "total stake cannot be zero".to_string(),
        ));
    }

    let mut weighted = 0.0;
    for (stake, loss) in stakes.iter().zip(losses) {
        if !(loss.is_finite() && *loss > 0.0) {
            return Err(AugurError::InvalidInput(format!(
                "loss values must be greater than zero, got {}",
                loss
            )));
        }
        weighted += (stake / total_stake) * loss.log10();
    }
    Ok(weighted)
}

/// Share of forecast credit attributable to the one-in component when
/// `num_forecasters` forecasters report on the same round.
///
/// `max(floor, base^-(n-1))`, so a lone forecaster gets full one-in credit and
/// each additional forecaster shifts weight towards the one-out component.
/// Continuous in `n`, non-increasing, and always within `[0, 1]`.
pub fn uniqueness_weight(num_forecasters: f64, curve: &UniquenessCurve) -> f64 {
    if !(num_forecasters > 1.0) {
        return 1.0;
    }
    let decayed = curve.base.powf(-(num_forecasters - 1.0));
    decayed.max(curve.floor).clamp(0.0, 1.0)
}

/// Blend the one-in and one-out component scores of a forecaster, weighting
/// the one-in component by `uniqueness`.
pub fn forecast_task_score(
    one_in_score: f64,
    one_out_score: f64,
    uniqueness: f64,
) -> Result<f64, AugurError> {
    if !(0.0..=1.0).contains(&uniqueness) {
        return Err(AugurError::InvalidInput(format!(
            "uniqueness weight must lie in [0, 1], got {}",
            uniqueness
        )));
    }
    Ok(uniqueness * one_in_score + (1.0 - uniqueness) * one_out_score)
}
