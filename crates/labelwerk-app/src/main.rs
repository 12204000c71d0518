// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk — shipping-label print router.
//
// Entry point. Initialises logging, assembles the service from config and
// `PRINT_API_TOKEN`, serves until Ctrl-C or SIGTERM, then shuts down
// gracefully. Runs in the foreground; supervise it with sc.exe, nssm or
// systemd.

mod service;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use labelwerk_core::error::Result;
use tracing::{error, info};

use service::LabelService;

#[derive(Debug, Parser)]
#[command(name = "labelwerk", version, about = "Shipping-label print router")]
struct Cli {
    /// TOML config file. Defaults to ./labelwerk.toml when present.
    #[arg(short, long, env = "LABELWERK_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "Labelwerk starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), error = %e, "Labelwerk failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let service = LabelService::init(cli.config.as_deref())?;
    let mut server = service.start().await?;

    shutdown_signal().await;
    server.stop().await
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl-C received"),
        () = terminate => info!("SIGTERM received"),
    }
}
