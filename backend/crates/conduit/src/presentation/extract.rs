//! Identity Extractors
//!
//! Resolve the bearer token once per request. Auth-required routes take
//! [`AuthUser`]; auth-optional routes take [`MaybeAuthUser`].

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use kernel::id::UserId;
use platform::header::extract_bearer_token;
use platform::token::TokenIssuer;

use crate::application::identity::Identity;
use crate::error::ConduitError;

/// Verify the request's token, if any
fn resolve(parts: &Parts, tokens: &TokenIssuer) -> Option<Identity> {
    let token = extract_bearer_token(&parts.headers)?;

    match tokens.verify(token) {
        Ok(claims) => Some(Identity::new(UserId::new(claims.sub), token)),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            None
        }
    }
}

/// Identity of an authenticated request; 401 otherwise
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenIssuer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ConduitError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenIssuer>::from_ref(state);
        resolve(parts, &tokens)
            .map(AuthUser)
            .ok_or(ConduitError::Unauthorized)
    }
}

/// Identity when a valid token is present; anonymous otherwise
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Identity>);

impl MaybeAuthUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    Arc<TokenIssuer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenIssuer>::from_ref(state);
        Ok(MaybeAuthUser(resolve(parts, &tokens)))
    }
}
