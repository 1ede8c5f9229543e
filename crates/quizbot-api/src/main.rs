//! Quiz bot API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use quizbot_api::chitchat::HttpChitchatClient;
use quizbot_api::config::{Config, ConfigError};
use quizbot_api::error::AppError;
use quizbot_api::routes;
use quizbot_api::state::AppState;
use quizbot_challenge::application::chitchat::{Chitchat, SilentChitchat};
use quizbot_core::clock::SystemClock;
use quizbot_core::rng::ThreadRandom;
use quizbot_core::storage::Storage;
use quizbot_store::memory::InMemoryStorage;
use quizbot_store::pg_storage::PgStorage;
use quizbot_store::schema::MIGRATOR;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

async fn storage(config: &Config) -> Result<Arc<dyn Storage>, AppError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL is not set, quiz progress is kept in memory");
        return Ok(Arc::new(InMemoryStorage::new()));
    };
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    MIGRATOR.run(&pool).await.map_err(sqlx::Error::from)?;
    tracing::info!("database migrations applied");
    Ok(Arc::new(PgStorage::new(pool)))
}

fn chitchat(config: &Config) -> Result<Arc<dyn Chitchat>, AppError> {
    match &config.chitchat {
        Some(chitchat) => {
            let client = HttpChitchatClient::new(chitchat).map_err(|e| {
                ConfigError::Invalid {
                    name: "CHITCHAT_URL",
                    message: e.to_string(),
                }
            })?;
            tracing::info!(url = %chitchat.url, "chitchat enabled");
            Ok(Arc::new(client))
        }
        None => Ok(Arc::new(SilentChitchat)),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting quiz bot API server");

    let config = Config::from_env()?;
    let settings = Arc::new(config.load_quiz()?);
    tracing::info!(
        challenges = settings.challenge_amount(),
        autostart = settings.autostart,
        "quiz configuration loaded"
    );

    let app_state = AppState::new(
        settings,
        storage(&config).await?,
        Arc::new(SystemClock),
        Box::new(ThreadRandom),
        chitchat(&config)?,
    );
    let state = app_state.manager.bootstrap().await?;
    tracing::info!(%state, "quiz ready");

    // TODO: Replace CorsLayer::permissive() with the chat gateway origin once it is fixed.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| ConfigError::Invalid {
        name: "HOST",
        message: format!("invalid HOST:PORT combination: {e}"),
    })?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
