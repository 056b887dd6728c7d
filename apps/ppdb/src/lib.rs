//! # ppdb
//!
//! Library half of the PPDB portal binary: HTTP API, CLI and configuration.
//! The binary in `main.rs` only sets up logging and dispatches the CLI; the
//! integration tests drive the router through this crate.

pub mod api;
pub mod cli;
pub mod config;
