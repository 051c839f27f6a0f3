//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthAppState, AuthConfig, PgUserRepository, SessionTokenAuthority, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::cache::{CacheClient, MemoryCache, RedisCache};
use platform::crypto::HmacFingerprinter;
use platform::password::{KdfHasher, KdfParams};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Auth configuration (secrets validated here, once)
    let config = Arc::new(AuthConfig::from_env()?);
    tracing::info!(
        token_lifetime_secs = config.token_lifetime_secs(),
        "Auth configuration loaded"
    );

    // Database connection
    let database_url =
        env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

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

    let users = PgUserRepository::new(pool);
    let passwords = KdfHasher::new(config.password_salt(), KdfParams::default())?;
    let fingerprinter = Arc::new(HmacFingerprinter::new(config.password_salt()));

    let port = match env::var("APP_PORT") {
        Ok(raw) => raw.parse::<u16>()?,
        Err(_) => DEFAULT_PORT,
    };

    // Revocation store
    match env::var("REDIS_URL") {
        Ok(url) => {
            let cache = RedisCache::open(&url)?;
            tracing::info!("Using Redis revocation store");
            let tokens = SessionTokenAuthority::new(config, fingerprinter, Arc::new(cache));
            serve(AuthAppState::new(users, passwords, tokens), port).await
        }
        Err(_) => {
            tracing::warn!(
                "REDIS_URL not set, using in-process revocation store (single instance only)"
            );
            let cache = MemoryCache::new();
            let tokens = SessionTokenAuthority::new(config, fingerprinter, Arc::new(cache));
            serve(AuthAppState::new(users, passwords, tokens), port).await
        }
    }
}

async fn serve<C>(state: AuthAppState<PgUserRepository, C>, port: u16) -> anyhow::Result<()>
where
    C: CacheClient,
{
    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest("/auth", auth_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
