//! Anonymous presence check against the public profile page.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{ProbeSettings, build_client, classify_transport_error, headers};
use crate::domain::entities::{StrategyKind, UnknownKind};
use crate::domain::probing::{ProbeStrategy, StrategyOutcome};
use crate::error::AppError;
use crate::utils::platform_url::{is_login_redirect, profile_url};

/// Soft-404 marker: a 200 page whose body says the account does not exist.
///
/// Heuristic only; the platform does not document its not-found page.
static NOT_FOUND_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)not found").expect("valid soft-404 pattern"));

/// `GET {base}/{username}/`: 404 means available, 200 means taken.
pub struct PresenceCheckStrategy {
    client: Client,
    base_url: Url,
    soft_404_check: bool,
}

impl PresenceCheckStrategy {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the HTTP client cannot be built.
    pub fn new(settings: &ProbeSettings) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(settings, true)?,
            base_url: settings.base_url.clone(),
            soft_404_check: settings.soft_404_check,
        })
    }
}

#[async_trait]
impl ProbeStrategy for PresenceCheckStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PresenceCheck
    }

    async fn attempt(&self, identifier: &str) -> StrategyOutcome {
        let url = match profile_url(&self.base_url, identifier) {
            Ok(url) => url,
            Err(e) => return StrategyOutcome::fail(UnknownKind::UnexpectedException, None, e.to_string()),
        };

        let request = headers::apply(self.client.get(url), headers::pick());
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let (kind, message) = classify_transport_error(&e);
                return StrategyOutcome::defer(kind, None, message);
            }
        };

        let status = response.status();
        if is_login_redirect(response.url()) {
            return StrategyOutcome::defer(
                UnknownKind::LoginRequired,
                Some(status.as_u16()),
                "redirected to the login page",
            );
        }

        if status != StatusCode::OK || !self.soft_404_check {
            return classify_page(status.as_u16(), None);
        }

        match response.text().await {
            Ok(body) => classify_page(status.as_u16(), Some(&body)),
            Err(e) => {
                let (kind, message) = classify_transport_error(&e);
                StrategyOutcome::defer(kind, Some(status.as_u16()), message)
            }
        }
    }
}

/// Maps a profile page response to an outcome.
///
/// `body` is only consulted for 200 responses, and only when present.
pub fn classify_page(status: u16, body: Option<&str>) -> StrategyOutcome {
    match status {
        404 => StrategyOutcome::available(Some(404)),
        200 => match body {
            Some(body) if NOT_FOUND_MARKER.is_match(body) => StrategyOutcome::available(Some(200)),
            _ => StrategyOutcome::taken(Some(200), None),
        },
        429 => StrategyOutcome::defer(UnknownKind::RateLimited, Some(429), "too many requests"),
        other => StrategyOutcome::fail(
            UnknownKind::UnexpectedStatus,
            Some(other),
            format!("unexpected status {other}"),
        ),
    }
}
