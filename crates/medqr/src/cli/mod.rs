//! Command-line interface for medqr.
//!
//! This module provides the CLI structure for the `medqr` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{BackendArg, ConfigCommand, ProfileCommand, QrCommand, ServeCommand};

/// medqr - Medical profile cards behind a QR code
///
/// Serves a small web form that stores a profile and hands back a QR code
/// linking to it.
#[derive(Debug, Parser)]
#[command(name = "medqr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Inspect stored profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Render a payload as a QR code PNG
    Qr(QrCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
