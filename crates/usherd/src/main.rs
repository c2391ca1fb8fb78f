//! usherd - Seat-finder cart control daemon
//!
//! HTTP front-end for a motorized seat-finder cart: seat calls become GO
//! commands on the serial link, controller status lines stream to dashboards
//! over WebSocket.
//!
//! Usage:
//!   usherd [OPTIONS] [config.json]
//!
//! Options:
//!   -l, --listen <port>  HTTP listen port (default 8000)
//!
//! The config file is created on first update if it does not exist.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use usher_api::{create_router, AppState};
use usher_core::{ConfigStore, ObserverRegistry};
use usher_serial::{reader, SerialSession, SystemLinkFactory};

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_LISTEN_PORT: u16 = 8000;

/// Parsed command-line arguments
struct Args {
    /// Persisted cart config (JSON)
    config_path: String,
    /// HTTP listen port
    listen_port: u16,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        listen_port: DEFAULT_LISTEN_PORT,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--listen" | "-l" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse() {
                        Ok(port) => result.listen_port = port,
                        Err(_) => tracing::error!("Invalid port: {}", args[i + 1]),
                    }
                    i += 2;
                } else {
                    tracing::error!("Missing argument for --listen");
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = arg.to_string();
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"usherd - Seat-finder cart control daemon

Usage: usherd [OPTIONS] [config.json]

Options:
  -l, --listen <port>  HTTP listen port (default 8000)
  -h, --help           Print this help message

Examples:
  # Run with the default config path
  usherd

  # Run with an explicit config and port
  usherd --listen 9000 /etc/usherd/config.json
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "usherd=info,usher_api=info,usher_serial=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting usherd (seat-finder cart daemon)");

    let args = parse_args();

    let config = Arc::new(ConfigStore::open(&args.config_path));
    tracing::info!(path = %args.config_path, config = ?config.snapshot(), "Cart config loaded");

    let session = Arc::new(SerialSession::new(
        config.clone(),
        Box::new(SystemLinkFactory::new()),
    ));
    let observers = Arc::new(ObserverRegistry::new());

    // The reader loop runs for the life of the process; the watch channel
    // lets shutdown stop it cleanly.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reader_task = tokio::spawn(reader::run(
        session.clone(),
        observers.clone(),
        shutdown_rx,
    ));

    let state = AppState::new(config, session, observers);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.listen_port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = reader_task.await;
    tracing::info!("usherd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
    }
}
