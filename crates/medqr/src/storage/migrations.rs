//! Schema versioning for profile databases.
//!
//! Databases written by earlier deployments hold a bare `profiles` table with
//! the same columns as today's. Opening one adds the metadata table and stamps
//! it with [`CURRENT_VERSION`]; a database stamped by a newer medqr is refused.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The schema version this build reads and writes.
pub const CURRENT_VERSION: i32 = 1;

const VERSION_KEY: &str = "schema_version";

/// Create missing tables and check the stored schema version.
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the database was stamped by a newer
/// version or carries an unreadable stamp, or a query error.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match stored_version(conn)? {
        Some(version) if version > CURRENT_VERSION => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        }),
        Some(CURRENT_VERSION) => Ok(()),
        previous => {
            let rows: i64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
            if previous.is_none() && rows > 0 {
                info!("Adopting unversioned profile database with {} rows", rows);
            }
            conn.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                (VERSION_KEY, CURRENT_VERSION.to_string()),
            )?;
            Ok(())
        }
    }
}

fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|value| {
            value.parse().map_err(|_| Error::DatabaseMigration {
                message: format!("invalid schema version: {value}"),
            })
        })
        .transpose()
}
