//! Candidate username generation and validation.
//!
//! Candidates are short strings drawn uniformly from the alphabet the platform
//! accepts for handles. Uniqueness is guaranteed within one batch only; the
//! ledger is responsible for anything that has been seen before.

use std::collections::HashSet;

use rand::Rng;
use serde_json::json;

use crate::error::AppError;

/// Characters allowed in a candidate: lowercase letters, digits and underscore.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_";

/// Length of every generated candidate.
pub const IDENTIFIER_LEN: usize = 4;

/// Upper bound for a single batch.
///
/// 37^4 is about 1.87M combinations; the cap keeps the rejection loop in
/// [`generate_batch`] fast and guarantees termination.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Generates one random candidate using the thread-local RNG.
pub fn generate_single() -> String {
    draw(&mut rand::rng())
}

/// Generates `count` mutually distinct candidates.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if `count` is zero or exceeds
/// [`MAX_BATCH_SIZE`].
///
/// # Examples
///
/// ```ignore
/// let batch = generate_batch(3)?;
/// assert_eq!(batch.len(), 3);
/// assert!(batch.iter().all(|u| u.len() == 4));
/// ```
pub fn generate_batch(count: usize) -> Result<Vec<String>, AppError> {
    generate_batch_with(&mut rand::rng(), count)
}

/// Same as [`generate_batch`], drawing from a caller-supplied RNG.
///
/// Seed a [`rand::rngs::StdRng`] to get a reproducible batch.
pub fn generate_batch_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
) -> Result<Vec<String>, AppError> {
    if count == 0 {
        return Err(AppError::bad_request(
            "Batch size must be at least 1",
            json!({ "count": count }),
        ));
    }

    if count > MAX_BATCH_SIZE {
        return Err(AppError::bad_request(
            format!("Batch size must not exceed {MAX_BATCH_SIZE}"),
            json!({ "count": count, "max": MAX_BATCH_SIZE }),
        ));
    }

    let mut seen = HashSet::with_capacity(count);
    let mut batch = Vec::with_capacity(count);

    while batch.len() < count {
        let candidate = draw(rng);
        if seen.insert(candidate.clone()) {
            batch.push(candidate);
        }
    }

    Ok(batch)
}

/// Validates an operator-supplied username before it is probed or stored.
///
/// # Rules
///
/// - Exactly [`IDENTIFIER_LEN`] characters
/// - Only characters from [`ALPHABET`]
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_identifier(identifier: &str) -> Result<(), AppError> {
    if identifier.chars().count() != IDENTIFIER_LEN {
        return Err(AppError::bad_request(
            format!("Username must be exactly {IDENTIFIER_LEN} characters"),
            json!({ "username": identifier, "provided_length": identifier.chars().count() }),
        ));
    }

    if !identifier.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(AppError::bad_request(
            "Username can only contain lowercase letters, digits, and underscores",
            json!({ "username": identifier }),
        ));
    }

    Ok(())
}

fn draw<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..IDENTIFIER_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}
