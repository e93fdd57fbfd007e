//! Notification and dismissal persistence.
//!
//! # Responsibility
//! - Store notifications and per-user dismissal markers.
//! - Resolve which notifications address a profile's audience.
//!
//! # Invariants
//! - Notifications are never deleted through this repository.
//! - Dismissal writes are idempotent per `(profile, notification)`.
//! - A notification targets at most one of listing or agency.
//!
//! Lifecycle partitioning and ordering are owned by the notification service.

use crate::model::identity::ProfileId;
use crate::model::listing::ListingId;
use crate::model::notification::{
    Audience, NewNotification, Notification, NotificationId, NotificationUpdate,
};
use crate::model::timestamp::to_micros;
use crate::repo::{parse_micros, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashSet;

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    n.id,
    p.username AS author,
    n.listing_id,
    n.agency_id,
    n.created_date,
    n.message,
    n.expires_date
FROM notifications n
JOIN profiles p ON p.id = n.author_id";

pub trait NotificationRepository {
    fn create_notification(&self, draft: &NewNotification) -> RepoResult<NotificationId>;
    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>>;
    /// Applies set fields of `update`; `NotFound` when `id` does not exist.
    fn update_notification(&self, id: NotificationId, update: &NotificationUpdate)
        -> RepoResult<()>;
    /// Notifications addressed to `profile_id`: global, the profile's
    /// organizations, and listings the profile owns.
    fn list_for_profile(&self, profile_id: ProfileId) -> RepoResult<Vec<Notification>>;
    /// All notifications, optionally narrowed to one listing.
    fn list_all(&self, listing: Option<ListingId>) -> RepoResult<Vec<Notification>>;
    fn dismissed_ids(&self, profile_id: ProfileId) -> RepoResult<HashSet<NotificationId>>;
    fn record_dismissal(
        &self,
        profile_id: ProfileId,
        notification_id: NotificationId,
        dismissed_at: DateTime<Utc>,
    ) -> RepoResult<()>;
    /// Returns whether the agency or listing an audience refers to exists.
    fn audience_target_exists(&self, audience: Audience) -> RepoResult<bool>;
}

pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_notifications(&self, sql: &str, binds: Vec<Value>) -> RepoResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_notification_row(row)?);
        }
        Ok(items)
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_notification(&self, draft: &NewNotification) -> RepoResult<NotificationId> {
        self.conn.execute(
            "INSERT INTO notifications (
                author_id,
                message,
                created_date,
                expires_date,
                listing_id,
                agency_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.author_id,
                draft.message.as_str(),
                to_micros(&draft.created_date),
                to_micros(&draft.expires_date),
                draft.audience.listing_id(),
                draft.audience.agency_id(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>> {
        let mut items = self.query_notifications(
            &format!("{NOTIFICATION_SELECT_SQL} WHERE n.id = ?;"),
            vec![Value::Integer(id)],
        )?;
        Ok(items.pop())
    }

    fn update_notification(
        &self,
        id: NotificationId,
        update: &NotificationUpdate,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notifications
             SET
                message = COALESCE(?2, message),
                expires_date = COALESCE(?3, expires_date)
             WHERE id = ?1;",
            params![
                id,
                update.message.as_deref(),
                update.expires_date.as_ref().map(to_micros),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("notification", id));
        }
        Ok(())
    }

    fn list_for_profile(&self, profile_id: ProfileId) -> RepoResult<Vec<Notification>> {
        self.query_notifications(
            &format!(
                "{NOTIFICATION_SELECT_SQL}
                 WHERE (n.listing_id IS NULL AND n.agency_id IS NULL)
                    OR n.agency_id IN (
                        SELECT agency_id FROM profile_agencies WHERE profile_id = ?1
                    )
                    OR n.listing_id IN (
                        SELECT listing_id FROM listing_owners WHERE profile_id = ?1
                    )
                 ORDER BY n.id ASC;"
            ),
            vec![Value::Integer(profile_id)],
        )
    }

    fn list_all(&self, listing: Option<ListingId>) -> RepoResult<Vec<Notification>> {
        match listing {
            Some(listing_id) => self.query_notifications(
                &format!("{NOTIFICATION_SELECT_SQL} WHERE n.listing_id = ? ORDER BY n.id ASC;"),
                vec![Value::Integer(listing_id)],
            ),
            None => self.query_notifications(
                &format!("{NOTIFICATION_SELECT_SQL} ORDER BY n.id ASC;"),
                Vec::new(),
            ),
        }
    }

    fn dismissed_ids(&self, profile_id: ProfileId) -> RepoResult<HashSet<NotificationId>> {
        let mut stmt = self.conn.prepare(
            "SELECT notification_id FROM notification_dismissals WHERE profile_id = ?1;",
        )?;
        let ids = stmt
            .query_map(params![profile_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    fn record_dismissal(
        &self,
        profile_id: ProfileId,
        notification_id: NotificationId,
        dismissed_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO notification_dismissals (
                profile_id,
                notification_id,
                dismissed_at
            ) VALUES (?1, ?2, ?3);",
            params![profile_id, notification_id, to_micros(&dismissed_at)],
        )?;
        Ok(())
    }

    fn audience_target_exists(&self, audience: Audience) -> RepoResult<bool> {
        let (sql, id) = match audience {
            Audience::Global => return Ok(true),
            Audience::Agency(id) => ("SELECT 1 FROM agencies WHERE id = ?1;", id),
            Audience::Listing(id) => ("SELECT 1 FROM listings WHERE id = ?1;", id),
        };
        let found = self
            .conn
            .query_row(sql, params![id], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(found.is_some())
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let id: NotificationId = row.get("id")?;
    let listing: Option<ListingId> = row.get("listing_id")?;
    let agency = row.get("agency_id")?;
    if Audience::from_columns(listing, agency).is_none() {
        return Err(RepoError::InvalidData(format!(
            "notification {id} targets both a listing and an agency"
        )));
    }

    Ok(Notification {
        id,
        author: row.get("author")?,
        listing,
        agency,
        created_date: parse_micros(row.get("created_date")?, "notifications.created_date")?,
        message: row.get("message")?,
        expires_date: parse_micros(row.get("expires_date")?, "notifications.expires_date")?,
    })
}
