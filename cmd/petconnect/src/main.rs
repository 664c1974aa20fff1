//! # PetConnect server
//!
//! Assembles the application: configuration, logging, storage, auth and
//! media adapters, the services and finally the HTTP router.

mod telemetry;

use std::sync::Arc;

use anyhow::{bail, Context};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;

use api_adapters::web::{self, AppState, UploadPolicy, WebOptions};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use configs::{DatabaseSettings, MediaSettings, Settings};
use domains::SystemClock;
use services::Services;
use storage_adapters::media::{ImageKind, LocalMediaStorage};
use storage_adapters::Repositories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    telemetry::init(&settings.logging).context("failed to initialise logging")?;

    tracing::info!(environment = %settings.environment, "starting PetConnect");

    let repos = repositories(&settings.database).await?;
    let services = Services::new(
        repos.users,
        repos.pets,
        repos.posts,
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtTokenService::with_ttl_hours(
            settings.auth.jwt_secret.expose_secret().as_bytes(),
            settings.auth.token_ttl_hours,
        )),
        Arc::new(SystemClock),
    );

    let media = media_storage(&settings.media)?;
    let state = AppState::new(
        services,
        Arc::new(media),
        UploadPolicy {
            max_files: settings.media.max_files,
            max_file_size: settings.media.max_file_size,
        },
    );
    let app = web::router(
        state,
        WebOptions {
            cors_origins: settings.server.cors_origins.clone(),
            uploads_dir: Some(settings.media.upload_dir.clone().into()),
            uploads_url: settings.media.url_prefix.clone(),
        },
    );

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down cleanly");
    Ok(())
}

async fn repositories(settings: &DatabaseSettings) -> anyhow::Result<Repositories> {
    match settings.url.as_deref() {
        #[cfg(feature = "db-postgres")]
        Some(url) => {
            let pool = storage_adapters::postgres::connect(url, settings.max_connections)
                .await
                .context("failed to connect to postgres")?;
            Ok(Repositories::postgres(pool))
        }
        #[cfg(not(feature = "db-postgres"))]
        Some(_) => bail!("database.url is set but this build has no postgres support"),
        None => {
            tracing::warn!("no database.url configured, using the in-memory store");
            Ok(Repositories::memory())
        }
    }
}

fn media_storage(settings: &MediaSettings) -> anyhow::Result<LocalMediaStorage> {
    let mut allowed = Vec::with_capacity(settings.allowed_types.len());
    for name in &settings.allowed_types {
        match ImageKind::from_name(name) {
            Some(kind) if !allowed.contains(&kind) => allowed.push(kind),
            Some(_) => {}
            None => bail!("unsupported media.allowed_types entry '{name}'"),
        }
    }
    Ok(LocalMediaStorage::new(
        settings.upload_dir.as_str(),
        settings.url_prefix.as_str(),
        settings.max_file_size,
    )
    .with_allowed(allowed))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
