//! Deterministic sample catalog.
//!
//! Timestamps are relative to the `now` passed in, so lifecycle partitions
//! are stable for any clock pinned to the same instant.
//!
//! Notable fixtures:
//! - `wsmith` (org steward, Ministry of Truth, SECRET) sees notifications
//!   1, 2 and 5, created in that order.
//! - `jones` (user, Ministry of Peace, UNCLASSIFIED) holds no elevated role.
//! - `bigbrother` (apps mall steward, every ministry, TOP SECRET).
//! - Pending: 1, 2, 6. Expired: 3, 4, 5. Only notification 1 targets
//!   listing 1.

use crate::db::DbResult;
use crate::model::timestamp::to_micros;
use chrono::{DateTime, Duration, Utc};
use log::info;
use rusqlite::{params, Connection};

/// Inserts the sample catalog in one transaction.
pub fn seed_sample_data(conn: &mut Connection, now: DateTime<Utc>) -> DbResult<()> {
    let at = |offset: Duration| to_micros(&(now + offset));
    let tx = conn.transaction()?;

    tx.execute_batch(
        "INSERT INTO access_controls (id, title, rank) VALUES
            (1, 'UNCLASSIFIED', 1),
            (2, 'CONFIDENTIAL', 2),
            (3, 'SECRET', 3),
            (4, 'TOP SECRET', 4);

         INSERT INTO agencies (id, title, short_name, icon_url) VALUES
            (1, 'Ministry of Truth', 'Minitrue', 'https://localhost/icons/minitrue.png'),
            (2, 'Ministry of Peace', 'Minipax', 'https://localhost/icons/minipax.png'),
            (3, 'Ministry of Love', 'Miniluv', NULL);

         INSERT INTO profiles (id, username, display_name, access_control_id, highest_role) VALUES
            (1, 'wsmith', 'Winston Smith', 3, 'org_steward'),
            (2, 'jones', 'Jones', 1, 'user'),
            (3, 'bigbrother', 'Big Brother', 4, 'apps_mall_steward'),
            (4, 'julia', 'Julia', 2, 'user');

         INSERT INTO profile_agencies (profile_id, agency_id) VALUES
            (1, 1),
            (2, 2),
            (3, 1),
            (3, 2),
            (3, 3),
            (4, 3);

         INSERT INTO categories (id, title, description) VALUES
            (1, 'Books and Reference', 'Things made of paper'),
            (2, 'Communication', 'Moving info between people and things'),
            (3, 'Tools', NULL);

         INSERT INTO listing_types (id, title, description) VALUES
            (1, 'web application', 'web applications'),
            (2, 'widget', 'widget things');

         INSERT INTO contact_types (id, name, required) VALUES
            (1, 'Civillian', 0),
            (2, 'Government', 0),
            (3, 'Military', 1);

         INSERT INTO intents (id, action, media_type, label, icon) VALUES
            (1, '/view', 'text/x-uri', 'view', 'https://localhost/icons/view.png'),
            (2, '/share', 'text/x-uri', 'share', NULL);",
    )?;

    let listings: [(i64, &str, i64, i64, bool, bool, bool, Option<i64>, f64); 6] = [
        (1, "Air Mail", 1, 1, true, false, true, Some(-30), 4.5),
        (2, "Bread Basket", 2, 1, true, true, true, Some(-20), 3.0),
        (3, "Chart Course", 2, 2, false, false, true, Some(-10), 2.0),
        (4, "Diamond", 1, 3, true, false, true, Some(-5), 4.0),
        (5, "Eagle Eye", 3, 4, false, false, true, Some(-2), 5.0),
        (6, "Retired Radio", 1, 1, true, false, false, Some(-40), 1.0),
    ];
    for (id, title, agency, access, featured, private, enabled, approved_days, rate) in listings {
        tx.execute(
            "INSERT INTO listings (
                id, title, agency_id, access_control_id,
                is_featured, is_private, is_enabled, approved_date, avg_rate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id,
                title,
                agency,
                access,
                featured,
                private,
                enabled,
                approved_days.map(|days| at(Duration::days(days))),
                rate,
            ],
        )?;
    }

    tx.execute_batch(
        "INSERT INTO listing_owners (listing_id, profile_id) VALUES
            (1, 1),
            (2, 2),
            (3, 2),
            (4, 1),
            (5, 3);",
    )?;

    // (id, author, message, created offset hours, expires offset hours, listing, agency)
    let notifications: [(i64, i64, &str, i64, i64, Option<i64>, Option<i64>); 6] = [
        (1, 3, "Air Mail update scheduled", -72, 240, Some(1), None),
        (2, 3, "System will be going down for maintenance", -48, 120, None, None),
        (3, 3, "Ministry of Peace quarterly review", -40, -2, None, Some(2)),
        (4, 1, "Chart Course was retired", -36, -4, Some(3), None),
        (5, 3, "Ministry of Truth records audit complete", -24, -1, None, Some(1)),
        (6, 3, "Ministry of Love open house", -12, 48, None, Some(3)),
    ];
    for (id, author, message, created_hours, expires_hours, listing, agency) in notifications {
        tx.execute(
            "INSERT INTO notifications (
                id, author_id, message, created_date, expires_date, listing_id, agency_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id,
                author,
                message,
                at(Duration::hours(created_hours)),
                at(Duration::hours(expires_hours)),
                listing,
                agency,
            ],
        )?;
    }

    tx.commit()?;
    info!("event=db_seed module=db status=ok listings=6 notifications=6");
    Ok(())
}

/// Returns whether any profile exists yet.
pub fn is_seeded(conn: &Connection) -> DbResult<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM profiles;", [], |row| row.get(0))?;
    Ok(count > 0)
}
