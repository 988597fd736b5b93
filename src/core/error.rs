//! Core capability errors (identity parsing and validation).
//!
//! These are bounded and stable: core errors represent domain/refusal
//! states, not library implementation details.

use thiserror::Error;

/// Identity blob with the wrong length.
///
/// Always a programming or data-corruption signal, never a normal outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("player identity must be 16 bytes, got {len}")]
pub struct InvalidIdentity {
    pub len: usize,
}

/// Invalid username string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("username `{raw}` is invalid: {reason}")]
pub struct InvalidName {
    pub raw: String,
    pub reason: String,
}

/// Invalid link code string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("link code `{raw}` is invalid: {reason}")]
pub struct InvalidCode {
    pub raw: String,
    pub reason: String,
}

/// Canonical error enum for the core capability.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidIdentity(#[from] InvalidIdentity),
    #[error(transparent)]
    InvalidName(#[from] InvalidName),
    #[error(transparent)]
    InvalidCode(#[from] InvalidCode),
}
