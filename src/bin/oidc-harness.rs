//! OIDC registration harness server binary.
//!
//! Loads configuration, builds the template engine and HTTP client, and serves
//! the registration, login, and federation pages with graceful shutdown.

use anyhow::Result;
use oidc_harness::{
    config::Config,
    http::{AppState, build_engine, build_router},
};
use std::env;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "oidc_harness=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = oidc_harness::config::version()?;

    if env::args().any(|arg| arg == "--version") {
        println!("{version}");
        return Ok(());
    }

    tracing::info!(?version, "Starting OIDC registration harness");

    let config = Config::new()?;

    let http_client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(*config.http_client_timeout.as_ref())
        .build()?;

    let template_env = build_engine(&config);

    let http_port = *config.http_port.as_ref();
    tracing::info!(
        external_base = %config.external_base,
        signup_api_url = %config.signup_api_url,
        "configuration loaded"
    );

    let app = build_router(AppState::new(config, http_client, template_env));

    // Setup graceful shutdown
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!("failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(err) => {
                    tracing::error!("failed to install signal handler: {}", err);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    // Bind before spawning so a taken port fails startup
    let bind_address = format!("0.0.0.0:{http_port}");
    let listener = TcpListener::bind(&bind_address).await?;

    {
        let inner_token = token.clone();
        tracker.spawn(async move {
            tracing::info!("Starting server on {bind_address}");

            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        () = shutdown_token.cancelled() => { }
                    }
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}
