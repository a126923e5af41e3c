//! Signed Bearer Tokens
//!
//! Tokens are `base64url(claims).base64url(hmac)` where the MAC is
//! HMAC-SHA256 over the encoded claims segment. Tampering with either
//! segment, or presenting the token after `exp`, fails verification.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

/// Token verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

/// Claims carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user surrogate key)
    pub sub: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Issues and verifies signed bearer tokens
///
/// The signing key is process-wide and loaded once at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Zeroizing<[u8; 32]>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: [u8; 32], ttl: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            ttl,
        }
    }

    /// Issue a token for `subject`
    pub fn issue(&self, subject: i64) -> String {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, subject: i64, now: DateTime<Utc>) -> String {
        let claims = TokenClaims {
            sub: subject,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .map_or(i64::MAX, |exp| exp.timestamp()),
        };
        // Serializing three integers cannot fail
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let encoded = to_base64url(&payload);
        let signature = hmac_sha256(&self.secret[..], encoded.as_bytes());

        format!("{}.{}", encoded, to_base64url(&signature))
    }

    /// Verify `token` against the current time
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (encoded, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if encoded.is_empty() || signature_b64.contains('.') {
            return Err(TokenError::Malformed);
        }

        let signature = from_base64url(signature_b64).map_err(|_| TokenError::Malformed)?;
        if !verify_hmac_sha256(&self.secret[..], encoded.as_bytes(), &signature) {
            return Err(TokenError::BadSignature);
        }

        let payload = from_base64url(encoded).map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}
