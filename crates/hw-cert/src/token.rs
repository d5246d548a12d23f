//! EdDSA token issuance
//!
//! Tokens are minted fresh for every authenticated request and never cached;
//! the validity window is backdated to tolerate clock skew between the host
//! and the vendor.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Seconds the issued-at claim is set into the past.
pub const TOKEN_BACKDATE_SECS: i64 = 30;
/// Seconds from now until the token expires.
pub const TOKEN_LIFETIME_SECS: i64 = 180;

/// Claim shape consumed by the vendor API. The key id travels in the
/// token header, not the claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
}

/// Sign `claims` with the PEM-encoded Ed25519 private key, placing `kid`
/// in the token header. Failures are logged and reported as `None`.
pub(crate) fn sign(private_pem: &str, claims: &TokenClaims, kid: &str) -> Option<String> {
    let key = match EncodingKey::from_ed_pem(private_pem.as_bytes()) {
        Ok(key) => key,
        Err(err) => {
            error!(%err, "private key PEM rejected");
            return None;
        }
    };

    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(kid.to_string());

    match encode(&header, claims, &key) {
        Ok(token) => Some(token),
        Err(err) => {
            error!(%err, "token signing failed");
            None
        }
    }
}
