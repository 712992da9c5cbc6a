//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup (after `dotenvy::dotenv()`) and
//! validated before anything touches the network or the database.
//!
//! ```bash
//! export DATABASE_URL="sqlite://usernames.db"
//! export PLATFORM_SESSION_ID="..."   # enables the authenticated lookup
//! export BATCH_CONCURRENCY=3
//! ```
//!
//! ## Database
//!
//! - `DATABASE_URL` - SQLite URL (default: `sqlite://usernames.db`)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `DB_CONNECT_TIMEOUT` - Pool acquire timeout in seconds (default: 30)
//! - `DB_BUSY_TIMEOUT` - SQLite busy timeout in seconds (default: 5)
//!
//! ## Platform and probing
//!
//! - `PLATFORM_BASE_URL` - Public profile root (default: `https://www.instagram.com/`)
//! - `PLATFORM_LOOKUP_URL` - Structured lookup endpoint
//! - `PLATFORM_SESSION_ID` - Session cookie; lookup is disabled when unset
//! - `PROBE_CONNECT_TIMEOUT` / `PROBE_TIMEOUT` - Seconds (default: 10 / 15)
//! - `PROBE_SOFT_404_CHECK` - Treat "not found" pages as available (default: true)
//! - `PROBE_MAX_RPS` - Global request pacing (default: unset)
//!
//! ## Batching
//!
//! - `BATCH_CONCURRENCY` - Probes per window (default: 3, max: 64)
//! - `BATCH_INTRA_DELAY_MS` / `BATCH_INTRA_JITTER_MS` (default: 250 / 100)
//! - `BATCH_BACKOFF_MS` / `BATCH_BACKOFF_JITTER_MS` (default: 3000 / 1000)
//! - `BATCH_MAX_BACKOFF_MS` (default: 60000)
//! - `BATCH_ADAPTIVE_BACKOFF` (default: true)
//! - `BATCH_DEADLINE_SECS` - Overall budget, 0 for none (default: 0)
//!
//! ## Logging
//!
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::BatchSettings;
use crate::infrastructure::remote::ProbeSettings;
use crate::utils::platform_url::normalize_base_url;

const DEFAULT_BASE_URL: &str = "https://www.instagram.com/";
const DEFAULT_LOOKUP_URL: &str = "https://i.instagram.com/api/v1/users/web_profile_info/";

/// Upper bound for `BATCH_CONCURRENCY`.
const MAX_CONCURRENCY: usize = 64;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Maximum number of connections in the pool (`DB_MAX_CONNECTIONS`).
    pub db_max_connections: u32,
    /// Pool acquire timeout in seconds (`DB_CONNECT_TIMEOUT`).
    pub db_connect_timeout: u64,
    /// How long SQLite waits on a locked file before failing, in seconds.
    pub db_busy_timeout: u64,

    pub platform_base_url: String,
    pub platform_lookup_url: String,
    pub platform_session_id: Option<String>,

    pub probe_connect_timeout: u64,
    pub probe_timeout: u64,
    pub probe_soft_404_check: bool,
    pub probe_max_rps: Option<u32>,

    pub batch_concurrency: usize,
    pub batch_intra_delay_ms: u64,
    pub batch_intra_jitter_ms: u64,
    pub batch_backoff_ms: u64,
    pub batch_backoff_jitter_ms: u64,
    pub batch_max_backoff_ms: u64,
    pub batch_adaptive_backoff: bool,
    /// Zero disables the deadline.
    pub batch_deadline_secs: u64,

    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://usernames.db".to_string(),
            db_max_connections: 5,
            db_connect_timeout: 30,
            db_busy_timeout: 5,
            platform_base_url: DEFAULT_BASE_URL.to_string(),
            platform_lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            platform_session_id: None,
            probe_connect_timeout: 10,
            probe_timeout: 15,
            probe_soft_404_check: true,
            probe_max_rps: None,
            batch_concurrency: 3,
            batch_intra_delay_ms: 250,
            batch_intra_jitter_ms: 100,
            batch_backoff_ms: 3000,
            batch_backoff_jitter_ms: 1000,
            batch_max_backoff_ms: 60_000,
            batch_adaptive_backoff: false,
            batch_deadline_secs: 0,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_connect_timeout: env_parse("DB_CONNECT_TIMEOUT", defaults.db_connect_timeout)?,
            db_busy_timeout: env_parse("DB_BUSY_TIMEOUT", defaults.db_busy_timeout)?,

            platform_base_url: env::var("PLATFORM_BASE_URL").unwrap_or(defaults.platform_base_url),
            platform_lookup_url: env::var("PLATFORM_LOOKUP_URL")
                .unwrap_or(defaults.platform_lookup_url),
            platform_session_id: env::var("PLATFORM_SESSION_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            probe_connect_timeout: env_parse("PROBE_CONNECT_TIMEOUT", defaults.probe_connect_timeout)?,
            probe_timeout: env_parse("PROBE_TIMEOUT", defaults.probe_timeout)?,
            probe_soft_404_check: env_flag("PROBE_SOFT_404_CHECK", defaults.probe_soft_404_check),
            probe_max_rps: env::var("PROBE_MAX_RPS")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| {
                    v.trim()
                        .parse()
                        .with_context(|| format!("PROBE_MAX_RPS must be an integer, got '{v}'"))
                })
                .transpose()?,

            batch_concurrency: env_parse("BATCH_CONCURRENCY", defaults.batch_concurrency)?,
            batch_intra_delay_ms: env_parse("BATCH_INTRA_DELAY_MS", defaults.batch_intra_delay_ms)?,
            batch_intra_jitter_ms: env_parse("BATCH_INTRA_JITTER_MS", defaults.batch_intra_jitter_ms)?,
            batch_backoff_ms: env_parse("BATCH_BACKOFF_MS", defaults.batch_backoff_ms)?,
            batch_backoff_jitter_ms: env_parse(
                "BATCH_BACKOFF_JITTER_MS",
                defaults.batch_backoff_jitter_ms,
            )?,
            batch_max_backoff_ms: env_parse("BATCH_MAX_BACKOFF_MS", defaults.batch_max_backoff_ms)?,
            batch_adaptive_backoff: env_flag("BATCH_ADAPTIVE_BACKOFF", defaults.batch_adaptive_backoff),
            batch_deadline_secs: env_parse("BATCH_DEADLINE_SECS", defaults.batch_deadline_secs)?,

            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is not a SQLite URL
    /// - a platform URL is not a valid http(s) URL
    /// - pool size, timeouts or concurrency are out of range
    /// - the backoff or a jitter spread exceeds the backoff cap
    /// - `LOG_FORMAT` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!(
                "DATABASE_URL must start with 'sqlite:', got '{}'",
                self.database_url
            );
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.db_connect_timeout == 0 {
            anyhow::bail!("DB_CONNECT_TIMEOUT must be greater than 0");
        }

        normalize_base_url(&self.platform_base_url).with_context(|| {
            format!("PLATFORM_BASE_URL is invalid: '{}'", self.platform_base_url)
        })?;
        normalize_base_url(&self.platform_lookup_url).with_context(|| {
            format!("PLATFORM_LOOKUP_URL is invalid: '{}'", self.platform_lookup_url)
        })?;

        if self.probe_connect_timeout == 0 || self.probe_timeout == 0 {
            anyhow::bail!("PROBE_CONNECT_TIMEOUT and PROBE_TIMEOUT must be greater than 0");
        }
        if self.probe_max_rps == Some(0) {
            anyhow::bail!("PROBE_MAX_RPS must be at least 1 when set");
        }

        if self.batch_concurrency == 0 || self.batch_concurrency > MAX_CONCURRENCY {
            anyhow::bail!(
                "BATCH_CONCURRENCY must be between 1 and {}, got {}",
                MAX_CONCURRENCY,
                self.batch_concurrency
            );
        }
        if self.batch_backoff_ms > self.batch_max_backoff_ms {
            anyhow::bail!(
                "BATCH_BACKOFF_MS ({}) must not exceed BATCH_MAX_BACKOFF_MS ({})",
                self.batch_backoff_ms,
                self.batch_max_backoff_ms
            );
        }

        if self.batch_intra_jitter_ms > self.batch_max_backoff_ms
            || self.batch_backoff_jitter_ms > self.batch_max_backoff_ms
        {
            anyhow::bail!(
                "BATCH_INTRA_JITTER_MS and BATCH_BACKOFF_JITTER_MS must not exceed BATCH_MAX_BACKOFF_MS ({})",
                self.batch_max_backoff_ms
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    /// Remote-side settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a platform URL does not normalize.
    pub fn probe_settings(&self) -> Result<ProbeSettings> {
        Ok(ProbeSettings {
            base_url: normalize_base_url(&self.platform_base_url)
                .context("PLATFORM_BASE_URL is invalid")?,
            lookup_url: normalize_base_url(&self.platform_lookup_url)
                .context("PLATFORM_LOOKUP_URL is invalid")?,
            session_id: self.platform_session_id.clone(),
            connect_timeout: Duration::from_secs(self.probe_connect_timeout),
            timeout: Duration::from_secs(self.probe_timeout),
            soft_404_check: self.probe_soft_404_check,
            max_requests_per_second: self.probe_max_rps.and_then(NonZeroU32::new),
        })
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            concurrency: self.batch_concurrency,
            intra_delay: Duration::from_millis(self.batch_intra_delay_ms),
            intra_jitter: Duration::from_millis(self.batch_intra_jitter_ms),
            inter_batch_backoff: Duration::from_millis(self.batch_backoff_ms),
            backoff_jitter: Duration::from_millis(self.batch_backoff_jitter_ms),
            max_backoff: Duration::from_millis(self.batch_max_backoff_ms),
            adaptive_backoff: self.batch_adaptive_backoff,
            deadline: (self.batch_deadline_secs > 0)
                .then(|| Duration::from_secs(self.batch_deadline_secs)),
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Database: {}", self.database_url);
        tracing::info!("  Platform: {}", self.platform_base_url);
        match self.platform_session_id {
            Some(ref session) => tracing::info!("  Session: {} (lookup enabled)", mask_secret(session)),
            None => tracing::info!("  Session: none (presence check only)"),
        }
        tracing::info!(
            "  Probe timeouts: connect {}s, total {}s",
            self.probe_connect_timeout,
            self.probe_timeout
        );
        tracing::info!(
            "  Batch: concurrency {}, backoff {}ms (max {}ms, adaptive: {})",
            self.batch_concurrency,
            self.batch_backoff_ms,
            self.batch_max_backoff_ms,
            self.batch_adaptive_backoff
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: '{value}'")),
        _ => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

/// Masks a secret for logging, keeping only its first four characters.
///
/// - `abcd1234efgh` → `abcd***`
/// - `abc` → `***`
fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "***".to_string();
    }

    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}***")
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
