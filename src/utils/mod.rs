//! Utility functions for candidate generation and platform URL handling.
//!
//! - [`username_generator`] - Candidate generation and validation
//! - [`platform_url`] - Base URL normalization and per-username URLs
//! - [`jitter`] - Randomized delays used by the batch scheduler

pub mod jitter;
pub mod platform_url;
pub mod username_generator;
