//! Password Hashing and Verification
//!
//! - [`ClearTextPassword`]: NFKC-normalized, policy-checked, wiped on drop
//! - [`HashedPassword`]: Argon2id digest in PHC string form, safe to store
//! - [`PasswordHasher`]: process-wide hasher holding the optional pepper
//!
//! Plaintext never appears in `Debug` output.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// NIST SP 800-63B: at least 8
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// NIST SP 800-63B: permit at least 64
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password policy violation; messages read as `password <message>`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("is too short (minimum is {min} characters, got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("is too long (maximum is {max} characters, got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("can't be blank")]
    EmptyOrWhitespace,

    #[error("contains invalid control characters")]
    InvalidCharacter,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// A password as typed by the user
///
/// Not `Clone`, so the plaintext exists in one place and is zeroized
/// when that value drops.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// assert!(ClearTextPassword::new("correct horse battery".to_string()).is_ok());
/// assert!(ClearTextPassword::new("short".to_string()).is_err());
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize (NFKC) then check length in code points and reject
    /// control characters other than tab and newline
    pub fn new(mut raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self(raw.nfkc().collect());
        raw.zeroize();

        if password.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        match password.0.chars().count() {
            n if n < MIN_PASSWORD_LENGTH => Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: n,
            }),
            n if n > MAX_PASSWORD_LENGTH => Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: n,
            }),
            _ if password
                .0
                .chars()
                .any(|ch| ch.is_control() && ch != '\t' && ch != '\n') =>
            {
                Err(PasswordPolicyError::InvalidCharacter)
            }
            _ => Ok(password),
        }
    }

    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClearTextPassword([REDACTED])")
    }
}

/// Argon2id digest in PHC string format (algorithm, params, salt, hash)
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Accept a stored digest after checking it parses as PHC
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = s.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self(phc))
    }

    pub fn as_phc_string(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([HASH])")
    }
}

/// Salted one-way password hasher
///
/// Built once at startup and shared by request handlers. Uses the
/// OWASP-recommended Argon2id defaults (m=19 MiB, t=2, p=1) with a
/// fresh 16-byte salt per digest.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl PasswordHasher {
    /// An empty pepper is treated as none
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.filter(|p| !p.is_empty()).map(Zeroizing::new),
        }
    }

    /// Password bytes followed by the pepper, wiped on drop
    fn input(&self, password: &ClearTextPassword) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(password.0.as_bytes().to_vec());
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(&self.input(password), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(HashedPassword(digest.to_string()))
    }

    /// Recompute with the digest's own salt and parameters
    ///
    /// The comparison inside argon2 is constant-time. A digest that no
    /// longer parses never verifies.
    pub fn verify(&self, digest: &HashedPassword, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&digest.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(&self.input(password), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> ClearTextPassword {
        ClearTextPassword::new_unchecked(s.to_string())
    }

    #[test]
    fn test_policy() {
        assert_eq!(
            ClearTextPassword::new("short".into()).unwrap_err(),
            PasswordPolicyError::TooShort { min: 8, actual: 5 }
        );
        assert!(matches!(
            ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert_eq!(
            ClearTextPassword::new("        ".into()).unwrap_err(),
            PasswordPolicyError::EmptyOrWhitespace
        );
        assert_eq!(
            ClearTextPassword::new("abc\u{0007}defgh".into()).unwrap_err(),
            PasswordPolicyError::InvalidCharacter
        );
        assert!(ClearTextPassword::new("tab\tand\nnewline".into()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".into()).is_ok());
    }

    #[test]
    fn test_length_counts_code_points_after_nfkc() {
        // Eight fullwidth letters normalize to eight ASCII letters
        assert!(ClearTextPassword::new("ＡＢＣＤＥＦＧＨ".into()).is_ok());
        // Seven multi-byte characters are still too short
        assert!(matches!(
            ClearTextPassword::new("ééééééé".into()),
            Err(PasswordPolicyError::TooShort { actual: 7, .. })
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash(&pw("TestPassword123!")).unwrap();

        assert!(hasher.verify(&digest, &pw("TestPassword123!")));
        assert!(!hasher.verify(&digest, &pw("WrongPassword123!")));
        assert!(digest.as_phc_string().starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::default();
        let first = hasher.hash(&pw("TestPassword123!")).unwrap();
        let second = hasher.hash(&pw("TestPassword123!")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_pepper_is_part_of_the_input() {
        let peppered = PasswordHasher::new(Some(b"my_secret_pepper".to_vec()));
        let digest = peppered.hash(&pw("TestPassword123!")).unwrap();

        assert!(peppered.verify(&digest, &pw("TestPassword123!")));
        assert!(!PasswordHasher::default().verify(&digest, &pw("TestPassword123!")));
        assert!(
            !PasswordHasher::new(Some(b"wrong_pepper".to_vec()))
                .verify(&digest, &pw("TestPassword123!"))
        );
    }

    #[test]
    fn test_stored_digest_round_trip() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash(&pw("TestPassword123!")).unwrap();

        let restored = HashedPassword::from_phc_string(digest.as_phc_string()).unwrap();
        assert!(hasher.verify(&restored, &pw("TestPassword123!")));
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let debug = format!("{:?}", pw("secret-value"));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret-value"));
    }
}
