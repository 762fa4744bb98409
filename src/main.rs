use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use engagement_service::config::Config;
use engagement_service::handlers;
use engagement_service::repository::SqlxFeedRepository;
use engagement_service::services::auth::IdentityClient;
use engagement_service::services::sessions::SessionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting engagement-service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}",
        config.app.env, config.app.http_port
    );

    // Initialize database pool
    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("Database pool created and verified");

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let repository = Arc::new(SqlxFeedRepository::new(pg_pool));
    let registry = web::Data::new(SessionRegistry::new(repository));
    let identity = web::Data::new(IdentityClient::new(config.identity.clone()));
    info!("Session registry and identity client initialized");

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("Starting HTTP server on http://{}", http_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .app_data(identity.clone())
            .route("/health", web::get().to(handlers::health::health))
            .route("/ready", web::get().to(handlers::health::ready))
            .service(
                web::scope("/api/v1")
                    .route("/auth/login", web::post().to(handlers::auth::login))
                    .route(
                        "/auth/federated/start",
                        web::post().to(handlers::auth::federated_start),
                    )
                    .route(
                        "/auth/federated/callback",
                        web::post().to(handlers::auth::federated_callback),
                    )
                    .route("/feed/{user_id}/load", web::post().to(handlers::feed::load_feed))
                    .route("/feed/{user_id}", web::get().to(handlers::feed::get_feed))
                    .route(
                        "/feed/{user_id}",
                        web::delete().to(handlers::feed::unmount_feed),
                    )
                    .route(
                        "/feed/{user_id}/posts/{post_id}/like",
                        web::post().to(handlers::feed::toggle_like),
                    )
                    .route(
                        "/feed/{user_id}/posts/{post_id}/comments/toggle",
                        web::post().to(handlers::feed::toggle_comments),
                    )
                    .route(
                        "/feed/{user_id}/posts/{post_id}/comments/draft",
                        web::put().to(handlers::feed::set_draft),
                    )
                    .route(
                        "/feed/{user_id}/posts/{post_id}/comments",
                        web::post().to(handlers::feed::add_comment),
                    ),
            )
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("engagement-service shutting down");
    Ok(())
}
