//! `medqr` - Medical profile cards served behind a QR code
//!
//! A web form collects a profile, one of three storage backends keeps it, and
//! the response carries a QR code whose URL displays the profile again.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod identifier;
pub mod logging;
pub mod profile;
pub mod qr;
pub mod server;
pub mod service;
pub mod storage;

pub use config::{Backend, Config};
pub use error::{Error, Result};
pub use http::{build_router, AppState};
pub use identifier::IdStrategy;
pub use logging::init_logging;
pub use profile::{MedicalDetails, Profile, ProfileFields, ProfileId};
pub use qr::QrRenderer;
pub use service::ProfileService;
pub use storage::ProfileStore;
