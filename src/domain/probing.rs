//! Probing contracts.
//!
//! A [`ProbeStrategy`] is one way of asking the platform about a username. The
//! prober runs an ordered list of strategies and stops at the first answer
//! that is not a retryable deferral. [`Probe`] is the seam the batch
//! orchestrator drives.

use async_trait::async_trait;

use crate::domain::entities::{ProbeResult, StrategyKind, UnknownKind};

/// What a single strategy concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Definitive answer; ends the chain.
    Verdict {
        available: bool,
        status: Option<u16>,
        user_id: Option<String>,
    },
    /// No answer. `retryable` hands over to the next strategy; otherwise the
    /// chain ends with an Unknown result of this kind.
    Inconclusive {
        kind: UnknownKind,
        status: Option<u16>,
        message: String,
        retryable: bool,
    },
}

impl StrategyOutcome {
    pub fn available(status: Option<u16>) -> Self {
        Self::Verdict {
            available: true,
            status,
            user_id: None,
        }
    }

    pub fn taken(status: Option<u16>, user_id: Option<String>) -> Self {
        Self::Verdict {
            available: false,
            status,
            user_id,
        }
    }

    /// Inconclusive, let the next strategy try.
    pub fn defer(kind: UnknownKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Inconclusive {
            kind,
            status,
            message: message.into(),
            retryable: true,
        }
    }

    /// Inconclusive and final.
    pub fn fail(kind: UnknownKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Inconclusive {
            kind,
            status,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Inconclusive { retryable: true, .. })
    }
}

/// One method of classifying a username against the platform.
///
/// Implementations never return errors: every transport or protocol failure
/// is expressed as [`StrategyOutcome::Inconclusive`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn attempt(&self, identifier: &str) -> StrategyOutcome;
}

/// Classifies one username. Never fails; see [`ProbeResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, identifier: &str) -> ProbeResult;
}
