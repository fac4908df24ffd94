//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, memory::MemoryStore},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{build_router, serve, AppState},
};
use qa_core::{
    ports::{AnswerRepository, QuestionRepository},
    services::{AnswerManager, QuestionManager},
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let (questions, answers, db_pool): (
        Arc<dyn QuestionRepository>,
        Arc<dyn AnswerRepository>,
        Option<PgPool>,
    ) = match config.storage {
        StorageBackend::Postgres => {
            info!(
                "Connecting to database {} at {}:{}...",
                config.database.name, config.database.host, config.database.port
            );
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(config.server.request_timeout)
                .connect_with(config.database.connect_options())
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let questions: Arc<dyn QuestionRepository> = db_adapter.clone();
            let answers: Arc<dyn AnswerRepository> = db_adapter;
            (questions, answers, Some(db_pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown.");
            let store = Arc::new(MemoryStore::new());
            let questions: Arc<dyn QuestionRepository> = store.clone();
            let answers: Arc<dyn AnswerRepository> = store;
            (questions, answers, None)
        }
    };

    // --- 3. Build the Services and the Shared AppState ---
    let app_state = Arc::new(AppState {
        questions: Arc::new(QuestionManager::new(questions.clone())),
        answers: Arc::new(AnswerManager::new(answers, questions)),
        config: config.clone(),
    });
    let app = build_router(app_state);

    // --- 4. Start the Server ---
    let bind_address = config.server.bind_address();
    info!("Starting server on {}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    let shutdown = CancellationToken::new();
    let server_config = config.server.clone();
    let server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { serve(listener, app, &server_config, shutdown).await }
    });

    // --- 5. Wait for a Signal, Then Drain In-flight Requests ---
    shutdown_signal().await;
    shutdown.cancel();
    if let Err(e) = server.await {
        error!("Server task failed: {}", e);
    }
    info!("Server stopped.");

    if let Some(db_pool) = db_pool {
        db_pool.close().await;
        info!("Database pool closed.");
    }

    info!("Application stopped.");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C."),
        () = terminate => info!("Received SIGTERM."),
    }
}
