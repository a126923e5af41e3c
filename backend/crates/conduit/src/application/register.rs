//! Register Use Case
//!
//! Creates a new user account and its profile row.

use std::sync::Arc;

use kernel::error::fields::FieldErrors;
use platform::password::{ClearTextPassword, PasswordHasher};
use platform::token::TokenIssuer;

use crate::application::identity::AuthenticatedUser;
use crate::application::{check, finish};
use crate::domain::entity::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserName};
use crate::error::{ConduitError, ConduitResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuer>,
}

impl<U> RegisterUseCase<U>
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

    pub async fn execute(&self, input: RegisterInput) -> ConduitResult<AuthenticatedUser> {
        let mut errors = FieldErrors::new();

        let username = check(&mut errors, UserName::new(input.username))?;
        let email = check(&mut errors, Email::new(input.email))?;
        let password = check(
            &mut errors,
            ClearTextPassword::new(input.password)
                .map_err(|e| ConduitError::invalid("password", e.to_string())),
        )?;
        finish(errors)?;

        let (Some(username), Some(email), Some(password)) = (username, email, password) else {
            return Err(ConduitError::Internal("validation state mismatch".into()));
        };

        let password_hash = self.hasher.hash(&password)?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
        };

        // The store arbitrates concurrent duplicates; the transaction has
        // already been rolled back when this fails.
        let user = self
            .user_repo
            .create(&new_user)
            .await
            .map_err(|e| match e {
                ConduitError::Integrity(_) => ConduitError::UserAlreadyRegistered,
                other => other,
            })?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User registered"
        );

        let token = self.tokens.issue(user.id.value());

        Ok(AuthenticatedUser { user, token })
    }
}
