//! Rotating browser header profiles.
//!
//! Each request picks one profile at random. Purely cosmetic: no
//! classification depends on which profile was sent.

use rand::Rng;
use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderProfile {
    pub user_agent: &'static str,
    pub accept_language: &'static str,
    pub accept: &'static str,
}

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub const HEADER_POOL: &[HeaderProfile] = &[
    HeaderProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        accept_language: "en-US,en;q=0.9",
        accept: HTML_ACCEPT,
    },
    HeaderProfile {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
        accept_language: "en-GB,en;q=0.8",
        accept: HTML_ACCEPT,
    },
    HeaderProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        accept_language: "en-US,en;q=0.7",
        accept: HTML_ACCEPT,
    },
];

/// Picks a profile uniformly from [`HEADER_POOL`].
pub fn pick() -> &'static HeaderProfile {
    let idx = rand::rng().random_range(0..HEADER_POOL.len());
    &HEADER_POOL[idx]
}

pub fn apply(builder: RequestBuilder, profile: &HeaderProfile) -> RequestBuilder {
    builder
        .header(USER_AGENT, profile.user_agent)
        .header(ACCEPT_LANGUAGE, profile.accept_language)
        .header(ACCEPT, profile.accept)
}
