//! `SQLite`-backed profile storage.
//!
//! Every operation opens its own connection and drops it before returning, on
//! success and failure alike. Identifiers are random tokens generated before
//! the insert.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::config::Backend;
use crate::error::{Error, Result};
use crate::identifier::IdStrategy;
use crate::profile::{MedicalDetails, Profile, ProfileFields, ProfileId};

use super::{migrations, ProfileStore};

/// Profile storage in a `SQLite` database file.
#[derive(Debug)]
pub struct DatabaseStore {
    /// Path to the database file.
    path: PathBuf,
}

impl DatabaseStore {
    /// Open or create a profile database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let store = Self { path };
        let conn = store.connect()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", store.path.display());
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        debug!("Opening database connection to {}", self.path.display());
        Connection::open(&self.path).map_err(|source| Error::DatabaseOpen {
            path: self.path.clone(),
            source,
        })
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let text = |idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };

        Ok(Profile {
            name: row.get(0)?,
            phone: text(1)?,
            blood_group: text(2)?,
            template: text(3)?,
            password: text(4)?,
            medical: MedicalDetails {
                emergency_contact: row.get(5)?,
                medical_conditions: row.get(6)?,
                allergies: row.get(7)?,
                medications: row.get(8)?,
            },
        })
    }
}

impl ProfileStore for DatabaseStore {
    fn backend(&self) -> Backend {
        Backend::Database
    }

    fn create(&self, profile: &Profile) -> Result<ProfileId> {
        let id = IdStrategy::RandomToken.derive(profile);
        let conn = self.connect()?;

        conn.execute(
            r"
            INSERT INTO profiles (
                id, name, phone, blood_group, template, password,
                emergency_contact, medical_conditions, allergies, medications
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
            params![
                id.as_str(),
                profile.name,
                profile.phone,
                profile.blood_group,
                profile.template,
                profile.password,
                profile.medical.emergency_contact,
                profile.medical.medical_conditions,
                profile.medical.allergies,
                profile.medical.medications,
            ],
        )?;

        debug!("Inserted profile {}", id);
        Ok(id)
    }

    fn read(&self, id: &ProfileId, _query: &ProfileFields) -> Result<Profile> {
        let conn = self.connect()?;
        conn.query_row(
            r"
            SELECT name, phone, blood_group, template, password,
                   emergency_contact, medical_conditions, allergies, medications
            FROM profiles WHERE id = ?1
            ",
            [id.as_str()],
            Self::row_to_profile,
        )
        .optional()?
        .ok_or(Error::NotFound)
    }
}
