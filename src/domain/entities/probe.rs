//! Probe outcome model shared by every strategy.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why a probe could not reach a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKind {
    Timeout,
    ConnectionError,
    RateLimited,
    LoginRequired,
    UnexpectedStatus,
    UnexpectedException,
}

impl UnknownKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownKind::Timeout => "timeout",
            UnknownKind::ConnectionError => "connection_error",
            UnknownKind::RateLimited => "rate_limited",
            UnknownKind::LoginRequired => "login_required",
            UnknownKind::UnexpectedStatus => "unexpected_status",
            UnknownKind::UnexpectedException => "unexpected_exception",
        }
    }
}

/// Tri-state availability of a username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Taken,
    Unknown(UnknownKind),
}

impl Availability {
    /// `Some(true)` for Available, `Some(false)` for Taken, `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Availability::Available => Some(true),
            Availability::Taken => Some(false),
            Availability::Unknown(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Taken => "taken",
            Availability::Unknown(_) => "unknown",
        }
    }
}

/// The strategy that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Structured profile lookup with a platform session.
    AuthenticatedLookup,
    /// Anonymous fetch of the public profile page.
    PresenceCheck,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::AuthenticatedLookup => "authenticated_lookup",
            StrategyKind::PresenceCheck => "presence_check",
        }
    }
}

/// Classified outcome of one probe attempt. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub identifier: String,
    pub availability: Availability,
    /// `None` when the result was synthesized outside the strategy chain.
    pub strategy_used: Option<StrategyKind>,
    pub raw_status_code: Option<u16>,
    /// Diagnostic text for Unknown results.
    pub message: Option<String>,
    /// Opaque platform id, reported by the authenticated lookup on Taken.
    pub user_id: Option<String>,
    /// Some strategy in the chain was throttled, even if a later one answered.
    pub rate_limited: bool,
    pub observed_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn new(
        identifier: impl Into<String>,
        availability: Availability,
        strategy_used: Option<StrategyKind>,
        raw_status_code: Option<u16>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            availability,
            strategy_used,
            raw_status_code,
            message: None,
            user_id: None,
            rate_limited: matches!(availability, Availability::Unknown(UnknownKind::RateLimited)),
            observed_at: Utc::now(),
        }
    }

    /// An indeterminate result produced outside the strategy chain.
    pub fn unknown(identifier: impl Into<String>, kind: UnknownKind, message: impl Into<String>) -> Self {
        Self::new(identifier, Availability::Unknown(kind), None, None).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_rate_limited(mut self, rate_limited: bool) -> Self {
        self.rate_limited |= rate_limited;
        self
    }

    pub fn error_kind(&self) -> Option<UnknownKind> {
        match self.availability {
            Availability::Unknown(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn is_taken(&self) -> bool {
        self.availability == Availability::Taken
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.availability, Availability::Unknown(_))
    }

    /// Text recorded in the audit log for this result.
    pub fn error_message(&self) -> Option<String> {
        self.error_kind().map(|kind| match &self.message {
            Some(message) => format!("{}: {}", kind.as_str(), message),
            None => kind.as_str().to_string(),
        })
    }
}
