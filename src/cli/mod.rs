//! CLI module
//!
//! Subcommands:
//! - `serve`: API + UI combined
//! - `api`: API server only
//! - `ui`: UI server with optional API proxy

pub mod api;
pub mod serve;
pub mod ui;

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Chat Relay - session-based chat over multiple LLM providers
#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run API + UI server combined
    Serve,

    /// Run API server only
    Api,

    /// Run UI server with optional API proxy
    Ui(ui::UiArgs),
}

/// Load `.env` and the layered configuration, then install logging
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    config
}

fn build_socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((host.parse::<IpAddr>()?, port)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
