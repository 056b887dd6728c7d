//! # PPDB CLI Module
//!
//! This module implements the CLI interface for the portal.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show record counts of the seeded portal
//! - `report` - Print the admissions report
//! - `config` - Print the effective configuration
//! - `check-file` - Check a local file against the upload rules

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use ppdb_core::PpdbError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// PPDB - School admissions portal
///
/// Serves the registration wizard, the applicant dashboard and the back
/// office over HTTP. All data lives in memory.
#[derive(Parser, Debug)]
#[command(name = "ppdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show record counts of the seeded portal
    Status,

    /// Print the admissions report
    Report,

    /// Print the effective configuration
    Config,

    /// Check a local file against the document upload rules
    CheckFile {
        /// Path to the file
        #[arg(short, long)]
        file: PathBuf,

        /// Document kind whose size limit applies (ijazah, kk, akta, foto, sehat, rapor)
        #[arg(short, long)]
        kind: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), PpdbError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, host, port).await,
        Some(Commands::Status) => cmd_status(json_mode),
        Some(Commands::Report) => cmd_report(json_mode),
        Some(Commands::Config) => cmd_config(&config, json_mode),
        Some(Commands::CheckFile { file, kind }) => {
            cmd_check_file(&file, kind.as_deref(), json_mode)
        }
        None => {
            // No subcommand - show status by default
            cmd_status(json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
