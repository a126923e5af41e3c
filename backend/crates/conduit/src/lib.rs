//! Conduit (RealWorld) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application configuration
//! - `infra/` - Database implementations
//! - `presentation/` - Envelope codec, HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration, login and current-user management
//! - Profiles with follow/unfollow
//! - Articles with tags, favorites, filtering and a personal feed
//! - Comments on articles
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (see `platform::password`)
//! - Stateless HMAC-signed bearer tokens (`Authorization: Token <t>`)
//! - Unknown email and wrong password yield the same error

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::ConduitConfig;
pub use error::{ConduitError, ConduitResult};
pub use infra::postgres::PgConduitRepository;
pub use presentation::router::{conduit_router, conduit_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
