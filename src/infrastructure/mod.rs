//! Infrastructure layer: storage and the remote platform.
//!
//! - [`persistence`] - SQLite repositories behind a single-writer gate
//! - [`remote`] - HTTP probe strategies

pub mod persistence;
pub mod remote;
