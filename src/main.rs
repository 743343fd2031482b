use std::process;

use tracing::{Level, error, info};
use tracing_subscriber::fmt as tracing_fmt;

use larder::config;
use larder::infra::{error::InfraError, telemetry};
use larder::proxy;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &InfraError) {
    if tracing::dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = tracing::Dispatch::new(subscriber);
    tracing::dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), InfraError> {
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    if settings.proxy.backend_origin.is_none() {
        // Serve anyway; every request will answer with the configuration
        // error, which is easier to diagnose than a refused connection.
        error!("no proxy backend origin configured; /api/* requests will fail");
    }

    let state = proxy::ProxyState::new(settings.proxy.backend_origin.clone());
    let router = proxy::router(state);

    let addr = settings
        .proxy
        .listen_addr()
        .map_err(|err| InfraError::configuration(err.to_string()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "edge proxy listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("edge proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to install shutdown handler");
    }
}
