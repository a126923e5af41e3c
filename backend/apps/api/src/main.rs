//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by
//! the `conduit` crate.

use anyhow::{Context, bail};
use axum::{
    Router, http,
    http::{Method, header},
};
use conduit::{ConduitConfig, PgConduitRepository, conduit_router};
use platform::crypto::from_base64;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,conduit=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let conduit_config = load_conduit_config()?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:4100,http://127.0.0.1:4100".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest(
            "/api",
            conduit_router(PgConduitRepository::new(pool), conduit_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Token secret, lifetime and pepper from the environment
///
/// Debug builds fall back to a random secret; release builds refuse to
/// start without one.
fn load_conduit_config() -> anyhow::Result<ConduitConfig> {
    let mut config = match env::var("CONDUIT_TOKEN_SECRET") {
        Ok(secret_b64) => ConduitConfig {
            token_secret: decode_token_secret(&secret_b64)?,
            ..ConduitConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("CONDUIT_TOKEN_SECRET not set, using a random secret");
            ConduitConfig::with_random_secret()
        }
        Err(_) => bail!("CONDUIT_TOKEN_SECRET must be set in production"),
    };

    if let Ok(ttl) = env::var("CONDUIT_TOKEN_TTL_SECS") {
        let secs: u64 = ttl
            .trim()
            .parse()
            .context("CONDUIT_TOKEN_TTL_SECS must be a number of seconds")?;
        config.token_ttl = Duration::from_secs(secs);
    }

    if let Ok(pepper) = env::var("CONDUIT_PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

/// Standard base64 of exactly 32 bytes
fn decode_token_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = from_base64(secret_b64.trim()).context("CONDUIT_TOKEN_SECRET must be base64")?;
    let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("CONDUIT_TOKEN_SECRET must decode to 32 bytes");
    };
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_token_secret() {
        // 32 bytes of 0x2a
        let encoded = "KioqKioqKioqKioqKioqKioqKioqKioqKioqKioqKio=";
        assert_eq!(decode_token_secret(encoded).unwrap(), [0x2a; 32]);
        assert_eq!(decode_token_secret(&format!("  {encoded}\n")).unwrap(), [0x2a; 32]);

        // 16 bytes
        assert!(decode_token_secret("KioqKioqKioqKioqKioqKg==").is_err());
        assert!(decode_token_secret("not base64!").is_err());
    }
}
