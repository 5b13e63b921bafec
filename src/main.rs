use actix::prelude::*;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod auth;
mod config;
mod domain;
mod error;
mod http;
mod integrations;
mod metrics;
mod notifications;
mod persistence;
mod queries;
mod utils;

use actors::OutboxRelay;
use auth::TokenService;
use config::AppConfig;
use domain::instagram::MediaSource;
use domain::user::UserAggregate;
use http::extractors::Accounts;
use http::AppState;
use integrations::InstagramGraphClient;
use notifications::{Contact, Notifier, UserDirectory};
use persistence::DocumentStore;
use utils::RetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, override with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vente_vault=debug")),
        )
        .init();

    tracing::info!("Starting Vente Vault backend");

    // === 1. Configuration ===
    let config = Arc::new(AppConfig::load()?);

    // === 2. PostgreSQL pool + schema ===
    tracing::info!(max_connections = config.database.max_connections, "Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // === 3. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // Metrics HTTP server in a background thread
    let metrics_for_server = metrics.clone();
    let metrics_port = config.metrics.port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_for_server, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 4. Notification pipeline + outbox relay ===
    let mailer = Notifier::transport_for(&config.mail)?;
    tracing::info!(transport = mailer.name(), "Mail transport selected");

    let notifier = Arc::new(Notifier::new(
        mailer,
        Arc::new(UserDirectory::new(DocumentStore::new(pool.clone()))),
        Contact::new(config.mail.admin_email.clone(), "Vente Vault Admin"),
        RetryConfig::default(),
        metrics.clone(),
    ));

    let relay = OutboxRelay::new(pool.clone(), notifier, config.relay.clone(), metrics.clone()).start();
    tracing::info!(
        poll_interval_ms = config.relay.poll_interval_ms,
        batch_size = config.relay.batch_size,
        "Outbox relay started"
    );

    // === 5. HTTP API ===
    let media_source: Arc<dyn MediaSource> = Arc::new(InstagramGraphClient::new(config.instagram.clone())?);
    let tokens = TokenService::new(&config.auth)
        .map_err(|e| anyhow::anyhow!("Invalid JWT secret: {}", e))?;

    let state = web::Data::new(AppState::new(
        pool.clone(),
        config.clone(),
        metrics.clone(),
        media_source,
        Some(relay),
    ));
    let tokens = web::Data::new(tokens);
    let accounts: Arc<dyn Accounts> = Arc::new(DocumentStore::<UserAggregate>::new(pool.clone()));
    let accounts = web::Data::from(accounts);

    let bind = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %bind.0, port = bind.1, "HTTP server listening");

    let server_config = config.server.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(tokens.clone())
            .app_data(accounts.clone())
            .wrap(http::cors_headers(&server_config))
            .wrap_fn(http::observe)
            .configure(http::extractor_config)
            .configure(http::configure)
            .default_service(web::to(http::preflight))
    })
    .bind(bind)?
    .run()
    .await?;

    tracing::info!("HTTP server stopped");
    pool.close().await;

    Ok(())
}
