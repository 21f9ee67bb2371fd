//! switchplane — a `mod_xml_curl` control plane for a multi-tenant SIP
//! softswitch (§1, §6).

mod admin;
mod cnam;
mod config;
mod error;
mod http;
mod models;
mod resolver;
mod store;
mod xml;

use std::sync::Arc;

use config::AppConfig;
use store::PgStore;

#[tokio::main]
async fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("switchplane=info".parse().unwrap()),
        )
        .init();

    let config = AppConfig::from_env();
    let port = config.port;

    let store = match PgStore::connect(&config.store_uri).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to store");
            std::process::exit(1);
        }
    };

    if let Err(err) = store.run_migrations().await {
        tracing::error!(error = %err, "failed to run migrations");
        std::process::exit(1);
    }

    let cnam = cnam::CnamClient::from_config(&config.cnam, config.cnam_timeout);
    if !cnam.is_enabled() {
        tracing::info!("CNAM enrichment disabled (no credentials configured)");
    }

    let state = Arc::new(http::AppState {
        store: Arc::new(store),
        cnam,
        config,
    });

    let app = http::create_router(state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, port, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(port, "switchplane listening");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler");
    }
    tracing::info!("shutdown signal received");
}
