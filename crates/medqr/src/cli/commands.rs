//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::{Backend, Config};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Storage backend (overrides `storage.backend`)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}

impl ServeCommand {
    /// Apply the command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend.into();
        }
    }
}

/// Profile inspection commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Print a stored profile
    Show {
        /// Profile identifier
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// QR command arguments.
#[derive(Debug, Args)]
pub struct QrCommand {
    /// Text to encode
    pub payload: String,

    /// Where to write the PNG
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Backend argument for `serve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// JSON files on disk
    File,
    /// Record carried in the URL
    Stateless,
    /// `SQLite` database
    Database,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::File => Self::File,
            BackendArg::Stateless => Self::Stateless,
            BackendArg::Database => Self::Database,
        }
    }
}
