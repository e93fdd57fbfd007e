//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing queries apply visibility rules in storage, never in services.

pub mod catalog_repo;
pub mod listing_repo;
pub mod notification_repo;
pub mod profile_repo;

use crate::db::DbError;
use crate::model::timestamp::from_micros;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { entity: &'static str, id: String },
    InvalidData(String),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_micros(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    from_micros(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}
