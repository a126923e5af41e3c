//! Conduit Router

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::application::config::ConduitConfig;
use crate::domain::repository::ConduitRepository;
use crate::infra::postgres::PgConduitRepository;
use crate::presentation::handlers::{self, ConduitAppState};

/// Create the Conduit router with PostgreSQL repository
pub fn conduit_router(repo: PgConduitRepository, config: ConduitConfig) -> Router {
    conduit_router_generic(repo, config)
}

/// Create a generic Conduit router for any repository implementation
pub fn conduit_router_generic<R>(repo: R, config: ConduitConfig) -> Router
where
    R: ConduitRepository,
{
    let state = ConduitAppState::new(repo, config);

    Router::new()
        // Users
        .route("/users", post(handlers::register::<R>))
        .route("/users/login", post(handlers::login::<R>))
        .route(
            "/user",
            get(handlers::current_user::<R>).put(handlers::update_user::<R>),
        )
        // Profiles
        .route("/profiles/{username}", get(handlers::get_profile::<R>))
        .route(
            "/profiles/{username}/follow",
            post(handlers::follow::<R>).delete(handlers::unfollow::<R>),
        )
        // Articles
        .route(
            "/articles",
            get(handlers::list_articles::<R>).post(handlers::create_article::<R>),
        )
        .route("/articles/feed", get(handlers::feed::<R>))
        .route(
            "/articles/{slug}",
            get(handlers::get_article::<R>)
                .put(handlers::update_article::<R>)
                .delete(handlers::delete_article::<R>),
        )
        .route(
            "/articles/{slug}/favorite",
            post(handlers::favorite::<R>).delete(handlers::unfavorite::<R>),
        )
        // Comments
        .route(
            "/articles/{slug}/comments",
            get(handlers::list_comments::<R>).post(handlers::add_comment::<R>),
        )
        .route(
            "/articles/{slug}/comments/{id}",
            delete(handlers::delete_comment::<R>),
        )
        // Tags
        .route("/tags", get(handlers::list_tags::<R>))
        .with_state(state)
}
