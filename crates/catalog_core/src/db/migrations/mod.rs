//! Catalog schema steps.
//!
//! `0001_catalog` holds classification levels, agencies, profiles, listings
//! and the metadata tables; `0002_notifications` adds notifications and
//! per-user dismissals. Versions are dense and start at 1.

use crate::db::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "catalog",
        sql: include_str!("0001_catalog.sql"),
    },
    Migration {
        version: 2,
        name: "notifications",
        sql: include_str!("0002_notifications.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the catalog schema up to [`latest_version`] in one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
    {
        apply_step(&tx, migration).map_err(|source| {
            error!(
                "event=db_migrate module=db status=error version={} name={} error={}",
                migration.version, migration.name, source
            );
            DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            }
        })?;
        debug!(
            "event=db_migrate module=db status=step_ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, latest
    );
    Ok(())
}

fn apply_step(tx: &Transaction<'_>, migration: &Migration) -> rusqlite::Result<()> {
    tx.execute_batch(migration.sql)?;
    tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
}
