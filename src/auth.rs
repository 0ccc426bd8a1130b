//! Static bearer-token authentication.
//!
//! Two tiers share one mechanism: a regular API key for document writes and
//! index inspection, and an admin key for destructive index operations. The
//! check is an exact string comparison against the configured key; there is
//! no token store and no expiry.

use rand::Rng;
use std::fmt::Write as _;

/// Why a token check failed. The HTTP layer maps [`AuthFailure::NoKeyConfigured`]
/// to a server error and everything else to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The server side has no key configured for this tier.
    NoKeyConfigured,
    /// No `Authorization` header was sent.
    Missing,
    /// The header is not exactly `Bearer <token>`.
    Malformed,
    /// The token does not match the configured key.
    BadToken,
}

/// Validates an `Authorization` header against a configured key.
pub fn check_bearer(header: Option<&str>, key: &str) -> Result<(), AuthFailure> {
    if key.is_empty() {
        return Err(AuthFailure::NoKeyConfigured);
    }
    let header = match header {
        Some(h) => h,
        None => return Err(AuthFailure::Missing),
    };
    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(AuthFailure::Malformed);
    }
    if parts[1] != key {
        return Err(AuthFailure::BadToken);
    }
    Ok(())
}

/// Generates a random hex token of `length` bytes for operator use. The
/// result is only printed; to take effect it must be placed in the config
/// file or the `CCS_API_KEY` environment variable.
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::rng();
    let mut token = String::with_capacity(length * 2);
    for _ in 0..length {
        let byte: u8 = rng.random();
        let _ = write!(token, "{:02x}", byte);
    }
    token
}
