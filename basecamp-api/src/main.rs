use anyhow::Context;
use basecamp_api::{
    app,
    state::{AppState, AuthConfig, UploadConfig},
};
use basecamp_store::{Config, DbClient, RedisClient, Repositories, StorageBackend};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basecamp_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Basecamp API on port {}", config.server.port);

    let repos = match config.database.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Repositories::postgres(db.pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory backend; data is lost on restart");
            Repositories::in_memory()
        }
    };

    let auth = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        expiration: config.auth.jwt_expiration_seconds,
        bootstrap_admin_email: config.auth.bootstrap_admin_email.clone(),
    };
    let uploads = UploadConfig {
        dir: config.uploads.dir.clone(),
        max_image_bytes: config.uploads.max_image_bytes,
    };

    let mut app_state = AppState::new(repos, auth, uploads).context("Failed to register metrics")?;

    // Redis Connection
    if let Some(redis_url) = config.redis.url.as_deref() {
        let redis_client = RedisClient::new(redis_url).context("Invalid Redis URL")?;
        app_state = app_state.with_rate_limit(Arc::new(redis_client), config.redis.requests_per_minute);
        tracing::info!("Rate limiting at {} requests/minute per IP", config.redis.requests_per_minute);
    }

    let app = app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
