use std::sync::Arc;

use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contas_obra::config::{Config, LogFormat, StoreBackend};
use contas_obra::core::BusinessClock;
use contas_obra::middleware::{RequestId, SessionAuth};
use contas_obra::modules::auth::services::{AccessCodeVerifier, GoTrueProvider};
use contas_obra::{AppState, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().expect("Failed to load configuration");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "contas_obra=debug,actix_web=info".into());
    match config.app.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting Contas Obra");
    tracing::info!(environment = config.app.env.as_str(), "Configuration loaded");
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let clock =
        BusinessClock::new(config.app.utc_offset_hours).expect("Invalid business UTC offset");

    let store = match config.database.backend {
        StoreBackend::Mysql => {
            let pool = config
                .database
                .create_pool()
                .await
                .expect("Failed to create database pool");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!(
                "Database pool initialized ({} connections)",
                config.database.pool_size
            );
            Store::mysql(pool)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on shutdown");
            Store::in_memory()
        }
    };

    let provider = Arc::new(GoTrueProvider::new(
        config.auth.url.clone(),
        config.auth.api_key.clone(),
        config.auth.max_retries,
    ));
    let access_code =
        AccessCodeVerifier::new(&config.auth.access_code).expect("Invalid ACCESS_CODE");

    let state = AppState::new(store, clock, provider, access_code, &config.auth.admin_role);

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(SessionAuth::new(state.sessions.clone()))
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}
