//! Error types for medqr.
//!
//! This module defines all error types used throughout the medqr crate. HTTP
//! handlers translate them into plain-text responses at the request boundary.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for medqr operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Lookup Errors ===
    /// The identifier does not address any stored profile, or the query
    /// parameters needed to rebuild a stateless profile are missing.
    #[error("profile not found")]
    NotFound,

    // === Validation Errors ===
    /// A required form field was absent or empty.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === QR Errors ===
    /// The payload could not be encoded as a QR symbol.
    #[error("QR encoding failed: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    /// The rendered QR symbol could not be written as an image.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query string serialization failed.
    #[error("query encoding failed: {0}")]
    QueryEncode(#[from] serde_urlencoded::ser::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for medqr operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a missing-field validation error.
    #[must_use]
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Check if this error means the profile could not be resolved.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Check if this error was caused by invalid caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}
