//! Storage layer for medqr.
//!
//! Three interchangeable backends implement [`ProfileStore`]:
//! - [`FileStore`]: one JSON file (plus QR PNG) per profile
//! - [`StatelessStore`]: nothing persisted, the URL carries the record
//! - [`DatabaseStore`]: one `SQLite` row per profile

pub mod database;
pub mod file;
pub mod migrations;
pub mod schema;
pub mod stateless;

use std::fmt;
use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::profile::{Profile, ProfileFields, ProfileId};

pub use database::DatabaseStore;
pub use file::FileStore;
pub use stateless::StatelessStore;

/// Capability set shared by every storage backend.
///
/// Implementations are synchronous; async callers run them on a blocking
/// thread.
pub trait ProfileStore: Send + Sync + fmt::Debug {
    /// Which backend this is.
    fn backend(&self) -> Backend;

    /// Persist `profile` and return the identifier addressing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn create(&self, profile: &Profile) -> Result<ProfileId>;

    /// Resolve a profile.
    ///
    /// `query` holds the request's query parameters; only the stateless
    /// backend reads the record from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if nothing is
    /// addressed, or another error if the backend fails.
    fn read(&self, id: &ProfileId, query: &ProfileFields) -> Result<Profile>;

    /// Identifier to report for a profile resolved through `id`.
    fn canonical_id(&self, id: &ProfileId, _profile: &Profile) -> ProfileId {
        id.clone()
    }

    /// Identifier for a request that carries no path identifier.
    ///
    /// Only backends that rebuild records from the query can answer.
    fn id_from_query(&self, _query: &ProfileFields) -> Option<ProfileId> {
        None
    }

    /// Keep a rendered QR image alongside the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be written.
    fn save_qr(&self, _id: &ProfileId, _png: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Fetch a previously saved QR image.
    ///
    /// Backends that regenerate images on demand return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored image exists but cannot be read.
    fn stored_qr(&self, _id: &ProfileId) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    /// Whether stored QR images are the source of truth for downloads.
    fn keeps_qr_images(&self) -> bool {
        false
    }
}

/// Open the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the backend's directory or database cannot be opened.
pub fn open_store(config: &Config) -> Result<Arc<dyn ProfileStore>> {
    let store: Arc<dyn ProfileStore> = match config.storage.backend {
        Backend::File => Arc::new(FileStore::open(config.profile_dir())?),
        Backend::Stateless => Arc::new(StatelessStore::new()),
        Backend::Database => Arc::new(DatabaseStore::open(config.database_path())?),
    };
    Ok(store)
}
