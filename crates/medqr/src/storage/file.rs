//! File-based profile storage.
//!
//! Each profile is a `<id>.json` file in the storage directory, with its QR
//! image kept next to it as `<id>_qr.png`. Identifiers are content hashes, so
//! resubmitting an identical form rewrites the same file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Backend;
use crate::error::{Error, Result};
use crate::identifier::IdStrategy;
use crate::profile::{Profile, ProfileFields, ProfileId};

use super::ProfileStore;

/// Suffix of stored QR image file names.
pub const QR_FILE_SUFFIX: &str = "_qr.png";

/// Profile storage backed by a directory of JSON files.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;
        info!("Profile directory ready at {}", dir.display());
        Ok(Self { dir })
    }

    fn record_path(&self, id: &ProfileId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn qr_path(&self, id: &ProfileId) -> PathBuf {
        self.dir.join(format!("{id}{QR_FILE_SUFFIX}"))
    }
}

impl ProfileStore for FileStore {
    fn backend(&self) -> Backend {
        Backend::File
    }

    fn create(&self, profile: &Profile) -> Result<ProfileId> {
        let id = IdStrategy::ContentHash.derive(profile);
        let json = serde_json::to_vec(profile)?;
        fs::write(self.record_path(&id), json)?;
        debug!("Wrote profile {}", id);
        Ok(id)
    }

    fn read(&self, id: &ProfileId, _query: &ProfileFields) -> Result<Profile> {
        let bytes = match fs::read(self.record_path(id)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(Error::NotFound),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save_qr(&self, id: &ProfileId, png: &[u8]) -> Result<()> {
        fs::write(self.qr_path(id), png)?;
        Ok(())
    }

    fn stored_qr(&self, id: &ProfileId) -> Result<Option<Vec<u8>>> {
        match fs::read(self.qr_path(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn keeps_qr_images(&self) -> bool {
        true
    }
}
