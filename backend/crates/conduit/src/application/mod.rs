//! Application Layer
//!
//! Use cases and application services.

pub mod article;
pub mod comment;
pub mod config;
pub mod current_user;
pub mod identity;
pub mod login;
pub mod profile;
pub mod register;
pub mod tag;

// Re-exports
pub use article::{ArticleUseCase, CreateArticleInput, UpdateArticleInput};
pub use comment::CommentUseCase;
pub use config::ConduitConfig;
pub use current_user::{CurrentUserUseCase, UpdateUserInput};
pub use identity::{AuthenticatedUser, Identity};
pub use login::{LoginInput, LoginUseCase};
pub use profile::ProfileUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use tag::TagUseCase;

use kernel::error::fields::FieldErrors;

use crate::error::{ConduitError, ConduitResult};

/// Run one field check, moving its validation messages into `errors`
///
/// Lets a use case report every invalid field at once instead of the
/// first one only. Non-validation errors pass through.
pub(crate) fn check<T>(errors: &mut FieldErrors, result: ConduitResult<T>) -> ConduitResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ConduitError::Validation(fields)) => {
            errors.merge(fields);
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

/// Reject blank required text
pub(crate) fn required(field: &'static str, value: String) -> ConduitResult<String> {
    if value.trim().is_empty() {
        Err(ConduitError::invalid(field, "can't be blank"))
    } else {
        Ok(value)
    }
}

/// Reject text longer than `max` characters
pub(crate) fn at_most(field: &'static str, value: String, max: usize) -> ConduitResult<String> {
    if value.chars().count() > max {
        Err(ConduitError::invalid(
            field,
            format!("is too long (maximum is {} characters)", max),
        ))
    } else {
        Ok(value)
    }
}

/// Turn collected messages into a single validation error
pub(crate) fn finish(errors: FieldErrors) -> ConduitResult<()> {
    errors.into_result().map_err(ConduitError::Validation)
}
