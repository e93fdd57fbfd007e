//! Listing queries scoped to one identity.
//!
//! # Invariants
//! - Only enabled listings are returned.
//! - A listing is visible when its classification rank does not exceed the
//!   identity's ceiling, and it is public or owned by one of the identity's
//!   organizations.
//! - Ranked orderings break ties by ascending listing id.
//! - Unapproved listings (no `approved_date`) sort after approved ones in
//!   either direction.

use crate::config::SortDirection;
use crate::model::identity::Identity;
use crate::model::listing::Listing;
use crate::repo::{parse_flag, parse_micros, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

const LISTING_SELECT_SQL: &str = "SELECT
    l.id,
    l.title,
    l.agency_id,
    a.title AS agency,
    ac.title AS access_control,
    l.is_featured,
    l.is_private,
    l.approved_date,
    l.avg_rate
FROM listings l
JOIN agencies a ON a.id = l.agency_id
JOIN access_controls ac ON ac.id = l.access_control_id
WHERE l.is_enabled = 1
  AND ac.rank <= ?
  AND (
    l.is_private = 0
    OR l.agency_id IN (SELECT agency_id FROM profile_agencies WHERE profile_id = ?)
  )";

/// Sort key for visible-listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    /// Storage default (listing id).
    #[default]
    Default,
    ApprovedDate(SortDirection),
    AvgRate(SortDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingQuery {
    pub featured_only: bool,
    pub order: ListingOrder,
    pub limit: u32,
}

pub trait ListingRepository {
    /// Lists listings visible to `identity`.
    fn list_visible(&self, identity: &Identity, query: &ListingQuery) -> RepoResult<Vec<Listing>>;
}

pub struct SqliteListingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ListingRepository for SqliteListingRepository<'_> {
    fn list_visible(&self, identity: &Identity, query: &ListingQuery) -> RepoResult<Vec<Listing>> {
        let mut sql = String::from(LISTING_SELECT_SQL);
        let mut bind_values = vec![
            Value::Integer(identity.access_control.rank),
            Value::Integer(identity.id),
        ];

        if query.featured_only {
            sql.push_str(" AND l.is_featured = 1");
        }

        match query.order {
            ListingOrder::Default => sql.push_str(" ORDER BY l.id ASC"),
            ListingOrder::ApprovedDate(direction) => sql.push_str(&format!(
                " ORDER BY l.approved_date {} NULLS LAST, l.id ASC",
                direction.as_sql()
            )),
            ListingOrder::AvgRate(direction) => sql.push_str(&format!(
                " ORDER BY l.avg_rate {}, l.id ASC",
                direction.as_sql()
            )),
        }

        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(query.limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut listings = Vec::new();
        while let Some(row) = rows.next()? {
            listings.push(parse_listing_row(row)?);
        }
        Ok(listings)
    }
}

fn parse_listing_row(row: &Row<'_>) -> RepoResult<Listing> {
    let approved_date = match row.get::<_, Option<i64>>("approved_date")? {
        Some(value) => Some(parse_micros(value, "listings.approved_date")?),
        None => None,
    };

    Ok(Listing {
        id: row.get("id")?,
        title: row.get("title")?,
        agency_id: row.get("agency_id")?,
        agency: row.get("agency")?,
        access_control: row.get("access_control")?,
        is_featured: parse_flag(row.get("is_featured")?, "listings.is_featured")?,
        is_private: parse_flag(row.get("is_private")?, "listings.is_private")?,
        approved_date,
        avg_rate: row.get("avg_rate")?,
    })
}
