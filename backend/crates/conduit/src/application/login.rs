//! Login Use Case
//!
//! Authenticates a user with email and password.

use std::sync::{Arc, OnceLock};

use platform::password::{ClearTextPassword, HashedPassword, PasswordHasher};
use platform::token::TokenIssuer;

use crate::application::identity::AuthenticatedUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::Email;
use crate::error::{ConduitError, ConduitResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuer>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, hasher: Arc<PasswordHasher>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            user_repo,
            hasher,
            tokens,
        }
    }

    /// Unknown email, malformed input and wrong password all fail with
    /// `UserNotFound`.
    pub async fn execute(&self, input: LoginInput) -> ConduitResult<AuthenticatedUser> {
        let email = Email::new(input.email).map_err(|_| ConduitError::UserNotFound)?;
        let password =
            ClearTextPassword::new(input.password).map_err(|_| ConduitError::UserNotFound)?;

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            // Spend the same hashing work as a real check
            if let Some(digest) = dummy_digest(&self.hasher) {
                let _ = self.hasher.verify(digest, &password);
            }
            return Err(ConduitError::UserNotFound);
        };

        if !self.hasher.verify(&user.password_hash, &password) {
            return Err(ConduitError::UserNotFound);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        let token = self.tokens.issue(user.id.value());

        Ok(AuthenticatedUser { user, token })
    }
}

/// Digest verified against when the email is unknown
fn dummy_digest(hasher: &PasswordHasher) -> Option<&'static HashedPassword> {
    static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            ClearTextPassword::new("conduit-dummy-password".to_string())
                .ok()
                .and_then(|p| hasher.hash(&p).ok())
        })
        .as_ref()
}
