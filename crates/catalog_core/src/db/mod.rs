//! Catalog database: connection bootstrap, schema migrations and fixtures.
//!
//! The schema is versioned through `PRAGMA user_version`; repositories only
//! ever see a connection whose catalog and notification tables are current.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod seed;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer catalog build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// One schema step failed; the transaction was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "catalog schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "catalog migration {version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
