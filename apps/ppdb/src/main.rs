//! # PPDB - School Admissions Portal
//!
//! The main binary for the PPDB (Penerimaan Peserta Didik Baru) portal.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for status, reports and upload checks
//! - Background jobs for exports and scheduled announcements
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       apps/ppdb (THE BINARY)                    │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │  Background Jobs │    │
//! │  │  (clap)     │    │   (axum)    │    │  (tokio tasks)   │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │   ppdb-core   │                           │
//! │                    │  (THE LOGIC)  │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! ppdb server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! ppdb status
//! ppdb report --json-mode
//! ppdb check-file -f ijazah.pdf -k ijazah
//! ```

use clap::Parser;
use ppdb::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing. PPDB_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("PPDB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ppdb=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the PPDB startup banner.
fn print_banner() {
    println!(
        r#"
  ██████╗ ██████╗ ██████╗ ██████╗
  ██╔══██╗██╔══██╗██╔══██╗██╔══██╗
  ██████╔╝██████╔╝██║  ██║██████╔╝
  ██╔═══╝ ██╔═══╝ ██║  ██║██╔══██╗
  ██║     ██║     ██████╔╝██████╔╝
  ╚═╝     ╚═╝     ╚═════╝ ╚═════╝

  Penerimaan Peserta Didik Baru v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
