//! HTTP strategies against the remote platform.
//!
//! - [`ProfileLookupStrategy`] - Authenticated structured lookup
//! - [`PresenceCheckStrategy`] - Anonymous profile page fetch
//!
//! [`build_strategies`] assembles the ordered chain from configuration.

pub mod headers;
pub mod presence_check;
pub mod profile_lookup;

pub use presence_check::PresenceCheckStrategy;
pub use profile_lookup::ProfileLookupStrategy;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use serde_json::json;
use url::Url;

use crate::domain::entities::UnknownKind;
use crate::domain::probing::ProbeStrategy;
use crate::error::AppError;

/// Redirect hops the presence check will follow.
const MAX_REDIRECTS: usize = 5;

/// Remote-side settings for the prober.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub base_url: Url,
    pub lookup_url: Url,
    /// Platform session cookie; enables the authenticated lookup.
    pub session_id: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub soft_404_check: bool,
    pub max_requests_per_second: Option<NonZeroU32>,
}

/// Builds the strategy chain: lookup first when a session is configured,
/// then the presence check.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if an HTTP client cannot be built.
pub fn build_strategies(settings: &ProbeSettings) -> Result<Vec<Arc<dyn ProbeStrategy>>, AppError> {
    let mut chain: Vec<Arc<dyn ProbeStrategy>> = Vec::with_capacity(2);

    if settings.session_id.is_some() {
        chain.push(Arc::new(ProfileLookupStrategy::new(settings)?));
    } else {
        tracing::info!("No platform session configured; authenticated lookup disabled");
    }

    chain.push(Arc::new(PresenceCheckStrategy::new(settings)?));
    Ok(chain)
}

pub(crate) fn build_client(settings: &ProbeSettings, follow_redirects: bool) -> Result<Client, AppError> {
    let redirect = if follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.timeout)
        .redirect(redirect)
        .build()
        .map_err(|e| AppError::internal("Failed to build HTTP client", json!({ "reason": e.to_string() })))
}

/// Maps a transport failure onto the Unknown taxonomy.
pub(crate) fn classify_transport_error(e: &reqwest::Error) -> (UnknownKind, String) {
    let kind = if e.is_timeout() {
        UnknownKind::Timeout
    } else if e.is_connect() || e.is_request() || e.is_body() {
        UnknownKind::ConnectionError
    } else {
        UnknownKind::UnexpectedException
    };

    (kind, e.to_string())
}
