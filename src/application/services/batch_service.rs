//! Windowed batch probing.
//!
//! Identifiers are split into windows of `concurrency`. Each window runs its
//! probes as separate Tokio tasks, launched with a jittered spacing, and the
//! orchestrator pauses between windows. Results come back in input order.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until, timeout_at};

use crate::application::backoff::BackoffPolicy;
use crate::domain::entities::{ProbeResult, UnknownKind};
use crate::domain::probing::Probe;
use crate::utils::jitter::jittered;

/// Pacing and limits for a batch run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Probes in flight per window.
    pub concurrency: usize,
    /// Spacing between launches inside a window.
    pub intra_delay: Duration,
    pub intra_jitter: Duration,
    /// Pause between windows.
    pub inter_batch_backoff: Duration,
    pub backoff_jitter: Duration,
    pub max_backoff: Duration,
    /// Double the pause after a window that was rate limited.
    pub adaptive_backoff: bool,
    /// Overall budget for the run; `None` means unbounded.
    pub deadline: Option<Duration>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            intra_delay: Duration::from_millis(250),
            intra_jitter: Duration::from_millis(100),
            inter_batch_backoff: Duration::from_millis(3000),
            backoff_jitter: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(60_000),
            adaptive_backoff: false,
            deadline: None,
        }
    }
}

/// Results of a batch run, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<ProbeResult>,
}

impl BatchReport {
    pub fn new(results: Vec<ProbeResult>) -> Self {
        Self { results }
    }

    pub fn available(&self) -> Vec<String> {
        self.identifiers_where(ProbeResult::is_available)
    }

    pub fn taken(&self) -> Vec<String> {
        self.identifiers_where(ProbeResult::is_taken)
    }

    pub fn unknown(&self) -> Vec<String> {
        self.identifiers_where(ProbeResult::is_unknown)
    }

    /// True when there was work and no probe reached a verdict.
    ///
    /// Separates "the check failed to run" from "nothing was available".
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(ProbeResult::is_unknown)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn identifiers_where(&self, predicate: impl Fn(&ProbeResult) -> bool) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| predicate(*r))
            .map(|r| r.identifier.clone())
            .collect()
    }
}

impl From<Vec<ProbeResult>> for BatchReport {
    fn from(results: Vec<ProbeResult>) -> Self {
        Self::new(results)
    }
}

/// Drives a [`Probe`] over many identifiers.
pub struct BatchOrchestrator<P: Probe + 'static> {
    probe: Arc<P>,
    settings: BatchSettings,
}

impl<P: Probe + 'static> BatchOrchestrator<P> {
    pub fn new(probe: Arc<P>, settings: BatchSettings) -> Self {
        Self { probe, settings }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Probes every identifier with the configured settings.
    pub async fn check_all(&self, identifiers: &[String]) -> Vec<ProbeResult> {
        self.check_all_with(identifiers, &self.settings).await
    }

    /// Probes every identifier, returning exactly one result per input in
    /// input order.
    ///
    /// Never fails: a panicking probe becomes Unknown/UnexpectedException for
    /// its identifier, and anything cut off by the deadline becomes
    /// Unknown/Timeout.
    pub async fn check_all_with(
        &self,
        identifiers: &[String],
        settings: &BatchSettings,
    ) -> Vec<ProbeResult> {
        let concurrency = settings.concurrency.max(1);
        let deadline = settings.deadline.map(|budget| Instant::now() + budget);
        let windows = identifiers.len().div_ceil(concurrency);
        let mut backoff = BackoffPolicy::new(
            settings.inter_batch_backoff,
            settings.backoff_jitter,
            settings.max_backoff,
            settings.adaptive_backoff,
        );

        let mut results = Vec::with_capacity(identifiers.len());

        for (index, window) in identifiers.chunks(concurrency).enumerate() {
            if expired(deadline) {
                tracing::warn!(
                    window = index + 1,
                    windows,
                    skipped = window.len(),
                    "Batch deadline reached, skipping window"
                );
                results.extend(window.iter().map(|id| deadline_result(id)));
                continue;
            }

            let window_results = self.run_window(window, settings, deadline).await;
            let rate_limited = window_results.iter().any(|r| r.rate_limited);

            tracing::info!(
                window = index + 1,
                windows,
                available = window_results.iter().filter(|r| r.is_available()).count(),
                taken = window_results.iter().filter(|r| r.is_taken()).count(),
                unknown = window_results.iter().filter(|r| r.is_unknown()).count(),
                rate_limited,
                "Batch window finished"
            );

            results.extend(window_results);

            if index + 1 < windows {
                let pause = backoff.next_delay(rate_limited);
                sleep_bounded(pause, deadline).await;
            }
        }

        results
    }

    async fn run_window(
        &self,
        window: &[String],
        settings: &BatchSettings,
        deadline: Option<Instant>,
    ) -> Vec<ProbeResult> {
        let mut tasks = WindowTasks(Vec::with_capacity(window.len()));

        for (position, identifier) in window.iter().enumerate() {
            if position > 0 {
                let pause = jittered(settings.intra_delay, settings.intra_jitter);
                sleep_bounded(pause, deadline).await;
            }

            if expired(deadline) {
                tasks.0.push(None);
                continue;
            }

            let probe = Arc::clone(&self.probe);
            let identifier = identifier.clone();
            tasks.0.push(Some(tokio::spawn(async move {
                probe.probe(&identifier).await
            })));
        }

        let mut results = Vec::with_capacity(window.len());
        for (identifier, slot) in window.iter().zip(tasks.0.iter_mut()) {
            let Some(handle) = slot.as_mut() else {
                results.push(deadline_result(identifier));
                continue;
            };

            let joined = match deadline {
                Some(at) => match timeout_at(at, &mut *handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        handle.abort();
                        tracing::debug!(username = %identifier, "Probe aborted at batch deadline");
                        results.push(deadline_result(identifier));
                        continue;
                    }
                },
                None => handle.await,
            };

            results.push(match joined {
                Ok(result) => result,
                Err(e) => fault_result(identifier, e),
            });
        }

        results
    }
}

/// Probe tasks of one window, in input order.
///
/// Dropping it aborts whatever is still running, so a batch that is itself
/// cancelled stops sending requests.
struct WindowTasks(Vec<Option<JoinHandle<ProbeResult>>>);

impl Drop for WindowTasks {
    fn drop(&mut self) {
        for handle in self.0.iter().flatten() {
            handle.abort();
        }
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|at| Instant::now() >= at)
}

async fn sleep_bounded(pause: Duration, deadline: Option<Instant>) {
    if pause.is_zero() {
        return;
    }

    let wake = Instant::now() + pause;
    sleep_until(deadline.map_or(wake, |at| wake.min(at))).await;
}

fn deadline_result(identifier: &str) -> ProbeResult {
    ProbeResult::unknown(identifier, UnknownKind::Timeout, "batch deadline exceeded")
}

fn fault_result(identifier: &str, error: JoinError) -> ProbeResult {
    let message = if error.is_panic() {
        format!("probe panicked: {}", panic_text(error.into_panic()))
    } else {
        "probe task was cancelled".to_string()
    };

    tracing::error!(username = identifier, error = %message, "Probe task failed");
    ProbeResult::unknown(identifier, UnknownKind::UnexpectedException, message)
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
