//! Cache-aside storage contracts.
//!
//! # Responsibility
//! - Define the `CacheStore` seam consumed by aggregation services.
//! - Derive deterministic cache keys from identity attributes.
//! - Provide an in-process, TTL-governed backend.
//!
//! # Invariants
//! - Values are stored as JSON text; a cached view decodes to exactly the
//!   value that was written.
//! - Cache keys never leave this crate.

mod keyspace;
mod memory;

pub use keyspace::{make_keysafe, KeySpace, KEY_DELIMITER};
pub use memory::MemoryCacheStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache backend and payload errors.
#[derive(Debug)]
pub enum CacheError {
    /// Backend could not serve the request.
    Backend(String),
    /// Payload could not be encoded or decoded.
    Serialization(serde_json::Error),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "cache backend error: {message}"),
            Self::Serialization(err) => write!(f, "cache serialization error: {err}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(_) => None,
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Key-value cache with per-entry time-to-live.
///
/// No invalidation primitive is part of the contract: entries go stale only
/// until they expire.
pub trait CacheStore {
    /// Returns the live value stored under `key`.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    /// Stores `value` under `key` with the backend's default TTL.
    fn set(&self, key: &str, value: String) -> CacheResult<()>;
    /// Stores `value` under `key` with an explicit TTL.
    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> CacheResult<()> {
        (**self).set(key, value)
    }

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        (**self).set_with_ttl(key, value, ttl)
    }
}

impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> CacheResult<()> {
        (**self).set(key, value)
    }

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        (**self).set_with_ttl(key, value, ttl)
    }
}

/// Reads and decodes a JSON value.
pub fn get_json<T, C>(cache: &C, key: &str) -> CacheResult<Option<T>>
where
    T: DeserializeOwned,
    C: CacheStore + ?Sized,
{
    match cache.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes and stores a JSON value with the default TTL.
pub fn set_json<T, C>(cache: &C, key: &str, value: &T) -> CacheResult<()>
where
    T: Serialize + ?Sized,
    C: CacheStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    cache.set(key, raw)
}
