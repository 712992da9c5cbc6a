//! URL handling for the remote platform endpoints.
//!
//! Base URLs come from configuration and are normalized once; per-username
//! URLs are then derived by joining onto the normalized base.

use url::Url;

/// Errors that can occur while preparing platform URLs.
#[derive(Debug, thiserror::Error)]
pub enum PlatformUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to build URL: {0}")]
    BuildFailed(String),
}

/// Normalizes a configured base URL.
///
/// # Normalization Rules
///
/// 1. **Protocol**: only HTTP and HTTPS are allowed
/// 2. **Hostname**: lowercased by the parser
/// 3. **Fragments and query**: removed
/// 4. **Path**: always ends with `/` so that joins append instead of replace
///
/// # Errors
///
/// Returns [`PlatformUrlError::InvalidFormat`] for malformed URLs and
/// [`PlatformUrlError::UnsupportedProtocol`] for non-HTTP(S) schemes.
pub fn normalize_base_url(input: &str) -> Result<Url, PlatformUrlError> {
    let mut url = Url::parse(input).map_err(|e| PlatformUrlError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(PlatformUrlError::UnsupportedProtocol),
    }

    url.set_fragment(None);
    url.set_query(None);

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Builds the public profile page URL: `{base}{username}/`.
pub fn profile_url(base: &Url, username: &str) -> Result<Url, PlatformUrlError> {
    base.join(&format!("{username}/"))
        .map_err(|e| PlatformUrlError::BuildFailed(e.to_string()))
}

/// Builds the structured lookup URL: `{lookup}?username={username}`.
pub fn lookup_url(lookup: &Url, username: &str) -> Url {
    let mut url = lookup.clone();
    url.query_pairs_mut().clear().append_pair("username", username);
    url
}

/// Returns true when a response landed on the platform's login wall.
pub fn is_login_redirect(url: &Url) -> bool {
    url.path().starts_with("/accounts/login")
}
