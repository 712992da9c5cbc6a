//! Authenticated structured profile lookup.
//!
//! Uses the platform's web profile endpoint with a session cookie. Anything
//! short of a definitive "user" / "no user" answer defers to the next
//! strategy in the chain.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{ProbeSettings, build_client, classify_transport_error, headers};
use crate::domain::entities::{StrategyKind, UnknownKind};
use crate::domain::probing::{ProbeStrategy, StrategyOutcome};
use crate::error::AppError;
use crate::utils::platform_url::lookup_url;

/// App id the platform's own web client sends with API calls.
const WEB_APP_ID: &str = "936619743392459";

const APP_ID_HEADER: &str = "x-ig-app-id";

#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<LookupData>,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    #[serde(default)]
    user: Option<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(default)]
    id: Option<Value>,
}

pub struct ProfileLookupStrategy {
    client: Client,
    lookup_url: Url,
    session_id: String,
}

impl ProfileLookupStrategy {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if no session is configured and
    /// [`AppError::Internal`] if the HTTP client cannot be built.
    pub fn new(settings: &ProbeSettings) -> Result<Self, AppError> {
        let session_id = settings.session_id.clone().ok_or_else(|| {
            AppError::bad_request(
                "Authenticated lookup requires PLATFORM_SESSION_ID",
                serde_json::json!({}),
            )
        })?;

        Ok(Self {
            // Redirects are answers here: the platform bounces expired sessions to its login page.
            client: build_client(settings, false)?,
            lookup_url: settings.lookup_url.clone(),
            session_id,
        })
    }
}

#[async_trait]
impl ProbeStrategy for ProfileLookupStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AuthenticatedLookup
    }

    async fn attempt(&self, identifier: &str) -> StrategyOutcome {
        let url = lookup_url(&self.lookup_url, identifier);
        let request = headers::apply(self.client.get(url), headers::pick())
            .header(COOKIE, format!("sessionid={}", self.session_id))
            .header(APP_ID_HEADER, WEB_APP_ID);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let (kind, message) = classify_transport_error(&e);
                return StrategyOutcome::defer(kind, None, message);
            }
        };

        let status = response.status().as_u16();
        if status != 200 {
            return classify_lookup(status, None);
        }

        match response.text().await {
            Ok(body) => classify_lookup(status, Some(&body)),
            Err(e) => {
                let (kind, message) = classify_transport_error(&e);
                StrategyOutcome::defer(kind, Some(status), message)
            }
        }
    }
}

/// Maps a lookup response to an outcome.
pub fn classify_lookup(status: u16, body: Option<&str>) -> StrategyOutcome {
    match status {
        200 => classify_lookup_body(body.unwrap_or_default()),
        404 => StrategyOutcome::available(Some(404)),
        300..=399 | 401 | 403 => StrategyOutcome::defer(
            UnknownKind::LoginRequired,
            Some(status),
            "session rejected by the platform",
        ),
        429 => StrategyOutcome::defer(UnknownKind::RateLimited, Some(429), "too many requests"),
        other => StrategyOutcome::defer(
            UnknownKind::UnexpectedStatus,
            Some(other),
            format!("lookup returned status {other}"),
        ),
    }
}

fn classify_lookup_body(body: &str) -> StrategyOutcome {
    let envelope: LookupEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return StrategyOutcome::defer(
                UnknownKind::UnexpectedStatus,
                Some(200),
                "unrecognized lookup body",
            );
        }
    };

    if envelope.status.as_deref() == Some("fail") {
        let message = envelope.message.unwrap_or_default();
        let lowered = message.to_lowercase();
        let kind = if lowered.contains("login") || lowered.contains("checkpoint") {
            UnknownKind::LoginRequired
        } else if lowered.contains("wait")
            || lowered.contains("rate limit")
            || lowered.contains("too many")
        {
            UnknownKind::RateLimited
        } else {
            UnknownKind::UnexpectedStatus
        };
        return StrategyOutcome::defer(kind, Some(200), message);
    }

    match envelope.data {
        Some(LookupData { user: Some(user) }) => {
            let user_id = user.id.map(|id| match id {
                Value::String(s) => s,
                other => other.to_string(),
            });
            StrategyOutcome::taken(Some(200), user_id)
        }
        Some(LookupData { user: None }) => StrategyOutcome::available(Some(200)),
        None => StrategyOutcome::defer(
            UnknownKind::UnexpectedStatus,
            Some(200),
            "lookup body has no data",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(outcome: &StrategyOutcome) -> Option<UnknownKind> {
        match outcome {
            StrategyOutcome::Inconclusive { kind, .. } => Some(*kind),
            StrategyOutcome::Verdict { .. } => None,
        }
    }

    #[test]
    fn test_user_object_is_taken() {
        let body = r#"{"data":{"user":{"id":"1234567","username":"ab12"}},"status":"ok"}"#;
        assert_eq!(
            classify_lookup(200, Some(body)),
            StrategyOutcome::taken(Some(200), Some("1234567".to_string()))
        );
    }

    #[test]
    fn test_numeric_user_id() {
        let body = r#"{"data":{"user":{"id":42}}}"#;
        assert_eq!(
            classify_lookup(200, Some(body)),
            StrategyOutcome::taken(Some(200), Some("42".to_string()))
        );
    }

    #[test]
    fn test_null_user_is_available() {
        let body = r#"{"data":{"user":null},"status":"ok"}"#;
        assert_eq!(classify_lookup(200, Some(body)), StrategyOutcome::available(Some(200)));
    }

    #[test]
    fn test_404_is_available() {
        assert_eq!(classify_lookup(404, None), StrategyOutcome::available(Some(404)));
    }

    #[test]
    fn test_auth_failures_defer_as_login_required() {
        for status in [302, 401, 403] {
            let outcome = classify_lookup(status, None);
            assert!(outcome.is_retryable());
            assert_eq!(kind_of(&outcome), Some(UnknownKind::LoginRequired));
        }
    }

    #[test]
    fn test_429_defers_as_rate_limited() {
        let outcome = classify_lookup(429, None);
        assert!(outcome.is_retryable());
        assert_eq!(kind_of(&outcome), Some(UnknownKind::RateLimited));
    }

    #[test]
    fn test_fail_envelopes() {
        let login = classify_lookup(200, Some(r#"{"message":"login_required","status":"fail"}"#));
        assert_eq!(kind_of(&login), Some(UnknownKind::LoginRequired));

        let wait = classify_lookup(
            200,
            Some(r#"{"message":"Please wait a few minutes before you try again.","status":"fail"}"#),
        );
        assert_eq!(kind_of(&wait), Some(UnknownKind::RateLimited));

        let other = classify_lookup(200, Some(r#"{"message":"feedback_required","status":"fail"}"#));
        assert_eq!(kind_of(&other), Some(UnknownKind::UnexpectedStatus));
        assert!(other.is_retryable());
    }

    #[test]
    fn test_garbage_body_defers() {
        let outcome = classify_lookup(200, Some("<html>login</html>"));
        assert!(outcome.is_retryable());
        assert_eq!(kind_of(&outcome), Some(UnknownKind::UnexpectedStatus));

        let empty = classify_lookup(200, Some("{}"));
        assert!(empty.is_retryable());
    }

    #[test]
    fn test_server_errors_defer() {
        let outcome = classify_lookup(500, None);
        assert!(outcome.is_retryable());
        assert_eq!(kind_of(&outcome), Some(UnknownKind::UnexpectedStatus));
    }
}
