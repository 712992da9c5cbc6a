//! Randomized delays.

use std::time::Duration;

use rand::Rng;

/// Returns `base` shifted by a uniform offset in `[-spread, +spread]`.
///
/// Never goes below zero.
pub fn jittered(base: Duration, spread: Duration) -> Duration {
    if spread.is_zero() {
        return base;
    }

    let spread_ms = i64::try_from(spread.as_millis()).unwrap_or(i64::MAX);
    let base_ms = i64::try_from(base.as_millis()).unwrap_or(i64::MAX);
    let offset = rand::rng().random_range(-spread_ms..=spread_ms);
    let millis = base_ms.saturating_add(offset).max(0);

    Duration::from_millis(millis.unsigned_abs())
}
