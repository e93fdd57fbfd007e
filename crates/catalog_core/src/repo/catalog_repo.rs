//! Catalog metadata sources.
//!
//! Each query projects only the fields exposed in the metadata snapshot,
//! ordered by primary key.

use crate::model::metadata::{
    AgencySummary, CategorySummary, ContactTypeSummary, IntentSummary, ListingTypeSummary,
};
use crate::repo::{parse_flag, RepoResult};
use rusqlite::Connection;

pub trait CatalogRepository {
    fn list_categories(&self) -> RepoResult<Vec<CategorySummary>>;
    fn list_listing_types(&self) -> RepoResult<Vec<ListingTypeSummary>>;
    fn list_agencies(&self) -> RepoResult<Vec<AgencySummary>>;
    fn list_contact_types(&self) -> RepoResult<Vec<ContactTypeSummary>>;
    fn list_intents(&self) -> RepoResult<Vec<IntentSummary>>;
}

pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<CategorySummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title, description FROM categories ORDER BY id ASC;")?;
        let items = stmt
            .query_map([], |row| {
                Ok(CategorySummary {
                    title: row.get(0)?,
                    description: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_listing_types(&self) -> RepoResult<Vec<ListingTypeSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title, description FROM listing_types ORDER BY id ASC;")?;
        let items = stmt
            .query_map([], |row| {
                Ok(ListingTypeSummary {
                    title: row.get(0)?,
                    description: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_agencies(&self) -> RepoResult<Vec<AgencySummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title, short_name, icon_url FROM agencies ORDER BY id ASC;")?;
        let items = stmt
            .query_map([], |row| {
                Ok(AgencySummary {
                    title: row.get(0)?,
                    short_name: row.get(1)?,
                    icon_url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_contact_types(&self) -> RepoResult<Vec<ContactTypeSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, required FROM contact_types ORDER BY id ASC;")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, required)| {
                Ok(ContactTypeSummary {
                    name,
                    required: parse_flag(required, "contact_types.required")?,
                })
            })
            .collect()
    }

    fn list_intents(&self) -> RepoResult<Vec<IntentSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT action, media_type, label, icon FROM intents ORDER BY id ASC;",
        )?;
        let items = stmt
            .query_map([], |row| {
                Ok(IntentSummary {
                    action: row.get(0)?,
                    media_type: row.get(1)?,
                    label: row.get(2)?,
                    icon: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
