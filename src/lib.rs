pub mod api;
pub mod config;
pub mod db;
pub mod metadata;
pub mod middleware;
pub mod password;
pub mod server;
pub mod service;
pub mod trivia;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::PasswordScheme;
use crate::password::{BcryptHasher, PasswordHasher, Sha256Hasher};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
    #[error("Metadata client error: {0}")]
    Search(#[from] metadata::SearchError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: &str) -> Result<(), ServerError> {
    let config = config::Config::from_file(config_path)?;

    info!("Using config file: {}", config_path);

    let db_path = config.database_path();
    info!("Opening database at {}", db_path);
    let repo: Arc<dyn db::Repository> = Arc::new(db::SqliteRepository::new(&db_path).await?);

    let hasher: Arc<dyn PasswordHasher> = match config.password_scheme {
        PasswordScheme::Sha256 => Arc::new(Sha256Hasher),
        PasswordScheme::Bcrypt => Arc::new(BcryptHasher),
    };

    let trivia = Arc::new(trivia::LocalTriviaGenerator::new(config.trivia.questions));
    let service = Arc::new(service::ReviewService::new(repo, hasher, trivia));

    let search: Arc<dyn metadata::MovieSearch> = Arc::new(metadata::ImdbSearch::new(
        &config.metadata.baseurl,
        Duration::from_secs(config.metadata.timeout_secs),
    )?);

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let state = server::AppState::new(service, search);
    let app = server::build_router(state);

    info!("Serving HTTP on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
