//! Page server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ middleware (trace, request id, https policy, metrics, timeout)
//!                        │
//!                        ▼
//!                   static files ──hit──▶ asset bytes
//!                        │ miss
//!                        ▼
//!                   route table ──▶ /ws upgrade ──▶ session factory
//!                        │          /api/ pong, delegated API
//!                        ▼
//!                   fallback ──▶ /api/* 404 JSON
//!                            └─▶ shell document, base href rewritten
//!
//!     Cross-cutting: config, lifecycle (bind retry, drain), observability
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use page_server::config::{read_config, ServerConfig};
use page_server::http::{Collaborators, HttpServer};
use page_server::lifecycle::{signals, startup, Shutdown};
use page_server::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "page-server")]
#[command(about = "Serve a web client, its shell document and session upgrades", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the web client and the shell document.
    #[arg(long)]
    content_dir: Option<String>,

    /// Directory of app assets, looked up before the content directory.
    #[arg(long)]
    assets_dir: Option<String>,

    #[arg(long)]
    bind_ip: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Register a page identifier (repeatable).
    #[arg(long = "page")]
    pages: Vec<String>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(dir) = self.content_dir {
            config.content.content_dir = dir;
        }
        if let Some(dir) = self.assets_dir {
            config.content.assets_dir = Some(dir);
        }
        if let Some(ip) = self.bind_ip {
            config.listener.bind_ip = ip;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        config.pages.extend(self.pages);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = Args::parse();

    let mut config = match args.config.take() {
        Some(path) => match read_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };
    args.apply(&mut config);

    if let Err(e) = logging::init(&config.observability.log_level) {
        eprintln!("failed to initialize logging: {e}");
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "page-server starting");

    let config = match config.validated() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    startup::log_startup(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let collaborators = Collaborators::from_config(&config);
    let server = HttpServer::new(config, collaborators);

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    match server.run(shutdown.subscribe()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server exited with error");
            ExitCode::FAILURE
        }
    }
}
