//! Strategy-chain prober.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::json;

use crate::domain::entities::{Availability, ProbeResult, StrategyKind, UnknownKind};
use crate::domain::probing::{Probe, ProbeStrategy, StrategyOutcome};
use crate::error::AppError;

/// Runs an ordered list of strategies and folds their outcomes into one
/// [`ProbeResult`].
///
/// # Chain Rules
///
/// - A verdict (available/taken) ends the chain
/// - A non-retryable inconclusive outcome ends the chain as Unknown
/// - A retryable outcome hands over to the next strategy
/// - When every strategy defers, the last deferral becomes the result
pub struct Prober {
    strategies: Vec<Arc<dyn ProbeStrategy>>,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Prober {
    /// Creates a prober over `strategies`, tried in order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the chain is empty.
    pub fn new(strategies: Vec<Arc<dyn ProbeStrategy>>) -> Result<Self, AppError> {
        if strategies.is_empty() {
            return Err(AppError::bad_request(
                "Prober needs at least one strategy",
                json!({}),
            ));
        }

        Ok(Self {
            strategies,
            limiter: None,
        })
    }

    /// Paces probes to at most `per_second` starts per second, shared across
    /// every concurrent caller.
    pub fn with_rate_limit(mut self, per_second: NonZeroU32) -> Self {
        self.limiter = Some(RateLimiter::direct(Quota::per_second(per_second)));
        self
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    fn finish(result: ProbeResult) -> ProbeResult {
        let strategy = result.strategy_used.map(|s| s.as_str()).unwrap_or("none");
        metrics::counter!(
            "probe_outcomes_total",
            "outcome" => result.availability.label(),
            "strategy" => strategy
        )
        .increment(1);

        tracing::debug!(
            username = %result.identifier,
            outcome = result.availability.label(),
            strategy,
            rate_limited = result.rate_limited,
            status = ?result.raw_status_code,
            error = ?result.error_kind(),
            "Probe finished"
        );

        result
    }
}

#[async_trait]
impl Probe for Prober {
    async fn probe(&self, identifier: &str) -> ProbeResult {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let mut last_deferral = None;
        let mut throttled = false;

        for strategy in &self.strategies {
            let strategy_kind = strategy.kind();

            match strategy.attempt(identifier).await {
                StrategyOutcome::Verdict {
                    available,
                    status,
                    user_id,
                } => {
                    let availability = if available {
                        Availability::Available
                    } else {
                        Availability::Taken
                    };
                    let result = ProbeResult::new(identifier, availability, Some(strategy_kind), status)
                        .with_user_id(user_id)
                        .with_rate_limited(throttled);
                    return Self::finish(result);
                }
                StrategyOutcome::Inconclusive {
                    kind,
                    status,
                    message,
                    retryable,
                } => {
                    let result = ProbeResult::new(
                        identifier,
                        Availability::Unknown(kind),
                        Some(strategy_kind),
                        status,
                    )
                    .with_message(message)
                    .with_rate_limited(throttled);
                    throttled |= kind == UnknownKind::RateLimited;

                    if !retryable {
                        return Self::finish(result);
                    }

                    tracing::debug!(
                        username = identifier,
                        strategy = strategy_kind.as_str(),
                        reason = kind.as_str(),
                        "Strategy deferred"
                    );
                    last_deferral = Some(result);
                }
            }
        }

        let result = last_deferral.unwrap_or_else(|| {
            ProbeResult::unknown(
                identifier,
                UnknownKind::UnexpectedException,
                "no strategy produced a result",
            )
        });
        Self::finish(result)
    }
}
