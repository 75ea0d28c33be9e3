//! Gateway binary.
//!
//! ```text
//!                        ┌──────────────────────────────────────────┐
//!   Client request       │                 GATEWAY                  │
//!   ─────────────────────┼─▶ http::server ──▶ routing::manager      │
//!                        │        │            (longest prefix)     │
//!                        │        ▼                                 │
//!   Client response      │   hyper-util client ──────────────────────┼──▶ Backend
//!   ◀────────────────────┼────────┘                                 │
//!                        │                                          │
//!   Admin tooling ───────┼─▶ admin (routes, port) ──▶ routes.json   │
//!                        └──────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use gateway::lifecycle::{signals, startup, Shutdown};
use gateway::observability::init_logging;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "Path-prefix HTTP gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "./gateway.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gateway starting");

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c_handler(shutdown.clone());

    startup::run(&cli.config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
