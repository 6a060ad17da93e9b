use std::collections::HashMap;

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The subset of claims the console reads from a stored credential.
///
/// The console never holds the signing secret, so the signature is not
/// verified here; the backend does that on every request. Only the expiry is
/// checked locally to skip a pointless `/auth/me` round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued-at (Unix timestamp, seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("credential is not a decodable token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

impl CredentialClaims {
    /// Decode the claims of `token` without verifying its signature or expiry.
    ///
    /// A token without an `exp` claim is rejected as malformed.
    pub fn decode_unverified(token: &str) -> Result<Self, ClaimsError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<CredentialClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }

    /// A credential whose expiry equals `now` is already expired.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp <= now
    }

    /// Seconds until expiry, zero once expired.
    pub fn remaining_secs(&self, now: u64) -> u64 {
        self.exp.saturating_sub(now)
    }
}
