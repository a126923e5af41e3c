//! Application Configuration
//!
//! Configuration for the Conduit application layer.

use std::time::Duration;

use platform::password::PasswordHasher;
use platform::token::TokenIssuer;

/// Conduit application configuration
#[derive(Debug, Clone)]
pub struct ConduitConfig {
    /// Token secret key for HMAC signing (32 bytes)
    pub token_secret: [u8; 32],
    /// Token lifetime (1 week)
    pub token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Page size when `limit` is absent
    pub default_page_size: i64,
    /// Upper bound on `limit`
    pub max_page_size: i64,
}

impl Default for ConduitConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            password_pepper: None,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl ConduitConfig {
    /// Create config with a random token secret (for development)
    ///
    /// Tokens stop verifying after a restart.
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Build the process-wide token issuer
    pub fn token_issuer(&self) -> TokenIssuer {
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(7));
        TokenIssuer::new(self.token_secret, ttl)
    }

    /// Build the process-wide password hasher
    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.password_pepper.clone())
    }

    /// Clamp client paging parameters to `(limit, offset)`
    pub fn page(&self, limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        let offset = offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamps() {
        let config = ConduitConfig::default();
        assert_eq!(config.page(None, None), (20, 0));
        assert_eq!(config.page(Some(5), Some(10)), (5, 10));
        assert_eq!(config.page(Some(10_000), Some(-3)), (100, 0));
        assert_eq!(config.page(Some(0), None), (1, 0));
    }

    #[test]
    fn test_random_secret() {
        let a = ConduitConfig::with_random_secret();
        let b = ConduitConfig::with_random_secret();
        assert_ne!(a.token_secret, b.token_secret);
    }

    #[test]
    fn test_token_issuer_uses_secret() {
        let config = ConduitConfig::with_random_secret();
        let token = config.token_issuer().issue(9);
        assert_eq!(config.token_issuer().verify(&token).unwrap().sub, 9);
        assert!(ConduitConfig::with_random_secret().token_issuer().verify(&token).is_err());
    }
}
