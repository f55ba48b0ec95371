//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::domain::repository::AuthStore;
use auth::presentation::AuthAppState;
use auth::{AnyAuthenticator, AuthConfig, FileAuthRepository, SqliteAuthRepository, StoreKind, auth_router};
use axum::http::{self, Method, header};
use platform::password::{Argon2Verifier, CredentialVerifier};
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
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuthConfig::from_env()?;
    let verifier: Arc<dyn CredentialVerifier> =
        Arc::new(Argon2Verifier::new(config.password_pepper.clone()));

    let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("API_PORT").unwrap_or_else(|_| "5000".to_string());
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    match config.store {
        StoreKind::File => {
            let repo = FileAuthRepository::open(&config.data_dir).await?;
            tracing::info!(dir = %config.data_dir.display(), "Opened JSON file store");
            serve(Arc::new(repo), config, verifier, addr).await
        }
        StoreKind::Sqlite => {
            let repo = SqliteAuthRepository::connect(&config.database_url).await?;
            repo.init_schema().await?;
            tracing::info!("Connected to database");
            serve(Arc::new(repo), config, verifier, addr).await
        }
    }
}

async fn serve<R>(
    repo: Arc<R>,
    config: AuthConfig,
    verifier: Arc<dyn CredentialVerifier>,
    addr: SocketAddr,
) -> anyhow::Result<()>
where
    R: AuthStore,
{
    let state = AuthAppState::new(repo, config, verifier);

    // Startup cleanup: errors here should not prevent server startup
    if let Some(AnyAuthenticator::SessionDb(auth)) = state.authenticator.as_deref() {
        match auth.purge_expired().await {
            Ok(sessions) => {
                tracing::info!(sessions_deleted = sessions, "Auth session cleanup completed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
            }
        }
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

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
        ]))
        .allow_credentials(true);

    let app = auth_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
