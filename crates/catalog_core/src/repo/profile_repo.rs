//! Profile lookup.
//!
//! Resolves a username into an [`Identity`] with its organizations,
//! classification ceiling and role.

use crate::model::identity::{AccessControl, Identity, Organization, Role};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait ProfileRepository {
    /// Returns `None` when no profile has `username`.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Identity>>;
}

pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Identity>> {
        let row = self
            .conn
            .query_row(
                "SELECT p.id, p.username, p.highest_role, ac.title, ac.rank
                 FROM profiles p
                 JOIN access_controls ac ON ac.id = p.access_control_id
                 WHERE p.username = ?1;",
                params![username],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, username, role_text, access_title, access_rank)) = row else {
            return Ok(None);
        };

        let role = Role::parse(&role_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid role `{role_text}` in profiles.highest_role"))
        })?;

        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.title
             FROM profile_agencies pa
             JOIN agencies a ON a.id = pa.agency_id
             WHERE pa.profile_id = ?1
             ORDER BY a.title ASC;",
        )?;
        let organizations = stmt
            .query_map(params![id], |row| {
                Ok(Organization {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Identity {
            id,
            username,
            organizations,
            access_control: AccessControl {
                title: access_title,
                rank: access_rank,
            },
            role,
        }))
    }
}
