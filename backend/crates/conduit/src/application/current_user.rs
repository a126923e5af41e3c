//! Current User Use Case
//!
//! Reads and updates the account behind the request's token.

use std::sync::Arc;

use kernel::error::fields::FieldErrors;
use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::identity::{AuthenticatedUser, Identity};
use crate::application::{at_most, check, finish};
use crate::domain::entity::UserChanges;
use crate::domain::entity::user::{BIO_MAX_LENGTH, IMAGE_MAX_LENGTH};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserName};
use crate::error::{ConduitError, ConduitResult};

/// Partial update; `None` leaves a field unchanged
///
/// An empty password also means "no change".
#[derive(Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// Current user use case
pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<PasswordHasher>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, hasher: Arc<PasswordHasher>) -> Self {
        Self { user_repo, hasher }
    }

    pub async fn get(&self, identity: &Identity) -> ConduitResult<AuthenticatedUser> {
        let user = self
            .user_repo
            .find_by_id(identity.user_id)
            .await?
            .ok_or(ConduitError::UserNotFound)?;

        Ok(AuthenticatedUser {
            user,
            token: identity.token.clone(),
        })
    }

    pub async fn update(
        &self,
        identity: &Identity,
        input: UpdateUserInput,
    ) -> ConduitResult<AuthenticatedUser> {
        let changes = self.validate(input)?;

        if changes.is_empty() {
            return self.get(identity).await;
        }

        let user = self
            .user_repo
            .update(identity.user_id, &changes)
            .await
            .map_err(|e| match e {
                ConduitError::Database(sqlx::Error::RowNotFound) => ConduitError::UserNotFound,
                other => other,
            })?;

        tracing::info!(
            user_id = %user.id,
            password_changed = changes.password_hash.is_some(),
            "User updated"
        );

        Ok(AuthenticatedUser {
            user,
            token: identity.token.clone(),
        })
    }

    fn validate(&self, input: UpdateUserInput) -> ConduitResult<UserChanges> {
        let mut errors = FieldErrors::new();
        let mut changes = UserChanges::default();

        if let Some(username) = input.username {
            changes.username = check(&mut errors, UserName::new(username))?;
        }
        if let Some(email) = input.email {
            changes.email = check(&mut errors, Email::new(email))?;
        }
        if let Some(bio) = input.bio {
            changes.bio = check(&mut errors, at_most("bio", bio, BIO_MAX_LENGTH))?;
        }
        if let Some(image) = input.image {
            changes.image = check(&mut errors, at_most("image", image, IMAGE_MAX_LENGTH))?;
        }

        let password = match input.password.filter(|p| !p.is_empty()) {
            Some(raw) => check(
                &mut errors,
                ClearTextPassword::new(raw)
                    .map_err(|e| ConduitError::invalid("password", e.to_string())),
            )?,
            None => None,
        };

        finish(errors)?;

        if let Some(password) = password {
            changes.password_hash = Some(self.hasher.hash(&password)?);
        }

        Ok(changes)
    }
}
