// src/main.rs
use std::process::ExitCode;

use pack_normalizer::api;
use pack_normalizer::config::{AppConfig, debug_from_env};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_result = dotenvy::dotenv();

    // the subscriber has to exist before config loading can warn
    init_tracing(debug_from_env());

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!(error = %err, "Could not load .env");
        }
    }

    let app_config = AppConfig::from_env();
    info!(debug = app_config.debug, "Packing service starting");

    match api::start_api_server(app_config.api.clone(), app_config.solver).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                addr = %app_config.api.socket_addr(),
                error = %err,
                "API server terminated with an error"
            );
            ExitCode::FAILURE
        }
    }
}
