//! Global metadata snapshot assembly.
//!
//! One cache entry under `metadata`, shared by every caller; metadata is not
//! access-controlled. Failures follow the storefront error contract.

use crate::cache::{get_json, set_json, CacheStore, KeySpace};
use crate::model::metadata::MetadataSnapshot;
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::RepoError;
use crate::service::view::{ErrorResult, ViewResult};
use log::{debug, error, info, warn};

pub const METADATA_KEYSPACE: KeySpace = KeySpace::new("metadata");
const ERROR_CONTEXT: &str = "Error getting metadata";

pub struct MetadataService<R: CatalogRepository, C: CacheStore> {
    catalog: R,
    cache: C,
}

impl<R: CatalogRepository, C: CacheStore> MetadataService<R, C> {
    pub fn new(catalog: R, cache: C) -> Self {
        Self { catalog, cache }
    }

    /// Returns the metadata snapshot, serving from cache when present.
    pub fn get_metadata(&self) -> ViewResult<MetadataSnapshot> {
        let key = METADATA_KEYSPACE.derive(std::iter::empty::<&str>());

        match get_json::<MetadataSnapshot, _>(&self.cache, &key) {
            Ok(Some(cached)) => {
                debug!("event=metadata_get module=metadata status=cache_hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(err) => warn!(
                "event=metadata_get module=metadata status=cache_read_failed error={}",
                err
            ),
        }

        let snapshot = self.assemble().map_err(|err| {
            error!(
                "event=metadata_get module=metadata status=error error_code=query_failed error={}",
                err
            );
            ErrorResult::with_context(ERROR_CONTEXT, err)
        })?;

        set_json(&self.cache, &key, &snapshot).map_err(|err| {
            error!(
                "event=metadata_get module=metadata status=error error_code=cache_write_failed error={}",
                err
            );
            ErrorResult::with_context(ERROR_CONTEXT, err)
        })?;

        info!(
            "event=metadata_get module=metadata status=cache_miss categories={} agencies={} intents={}",
            snapshot.categories.len(),
            snapshot.agencies.len(),
            snapshot.intents.len()
        );
        Ok(snapshot)
    }

    fn assemble(&self) -> Result<MetadataSnapshot, RepoError> {
        Ok(MetadataSnapshot {
            categories: self.catalog.list_categories()?,
            listing_types: self.catalog.list_listing_types()?,
            agencies: self.catalog.list_agencies()?,
            contact_types: self.catalog.list_contact_types()?,
            intents: self.catalog.list_intents()?,
        })
    }
}
