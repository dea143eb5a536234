// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary entry point: initializes logging, loads configuration, runs
//! startup, and hands the bound listener and seeded manager to the
//! reactor. Runs in the foreground; process supervision (backgrounding,
//! restart-on-crash) is the caller's job.

use amdaemon::config::Config;
use amdaemon::lifecycle;
use amdaemon::reactor;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let startup = match lifecycle::startup(&config).await {
        Ok(startup) => startup,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return std::process::ExitCode::FAILURE;
        }
    };

    let cleanup_config = startup.config.clone();

    tokio::select! {
        _ = reactor::run(startup.config.clone(), startup.manager, startup.listener) => {}
        _ = shutdown_signal() => {
            tracing::info!("received shutdown signal");
        }
    }

    remove_if_present(&cleanup_config.socket_path);
    remove_if_present(&cleanup_config.lock_path);

    std::process::ExitCode::SUCCESS
}

fn remove_if_present(path: &std::path::Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove file during shutdown");
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "failed to install signal handler; shutdown signals will be ignored");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
