//! Bookshelf service entry point.
//!
//! # Responsibility
//! - Load environment config, start logging, open the store.
//! - Serve HTTP until Ctrl-C, then drain in-flight requests and exit.

mod config;

use bookshelf_core::{init_logging, open_db, DbHandle};
use bookshelf_http::{AppState, HttpServer};
use config::AppConfig;
use log::{error, info, warn};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bookshelf: configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("bookshelf: logging init failed: {err}");
        return ExitCode::FAILURE;
    }
    if let Some(level) = &config.rejected_log_level {
        warn!(
            "event=config_load module=server status=fallback log_level={} rejected={level}",
            config.log_level
        );
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=server_exit module=server status=error error={message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), String> {
    let db_path = config.database.file_path();
    let conn = open_db(&db_path)
        .map_err(|err| format!("open database {}: {err}", db_path.display()))?;
    info!(
        "event=server_start module=server status=ok db_path={} addr={}",
        db_path.display(),
        config.server.socket_addr()
    );

    let server = HttpServer::new(config.server, AppState::new(DbHandle::new(conn)));
    server
        .serve(shutdown_signal())
        .await
        .map_err(|err| format!("http server: {err}"))?;

    info!("event=server_exit module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=shutdown_signal module=server status=ok"),
        Err(err) => {
            // Without a signal handler the server runs until killed.
            warn!("event=shutdown_signal module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
    }
}
