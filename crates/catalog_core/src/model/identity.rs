//! Request principals and role checks.
//!
//! # Invariants
//! - An `Identity` is immutable for the lifetime of one request.
//! - Roles are totally ordered; holding a role implies every lower role.

use serde::{Deserialize, Serialize};

pub type ProfileId = i64;
pub type AgencyId = i64;

/// Authorization level of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular catalog consumer.
    User,
    /// Steward of one or more organizations.
    OrgSteward,
    /// Steward of the whole catalog.
    AppsMallSteward,
}

impl Role {
    /// Minimum role required for privileged notification operations.
    pub const ELEVATED: Role = Role::OrgSteward;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::OrgSteward => "org_steward",
            Self::AppsMallSteward => "apps_mall_steward",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "org_steward" => Some(Self::OrgSteward),
            "apps_mall_steward" => Some(Self::AppsMallSteward),
            _ => None,
        }
    }
}

/// Organization membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: AgencyId,
    pub title: String,
}

/// Classification ceiling. Higher `rank` sees more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    pub title: String,
    pub rank: i64,
}

/// Resolved user principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: ProfileId,
    pub username: String,
    pub organizations: Vec<Organization>,
    pub access_control: AccessControl,
    pub role: Role,
}

impl Identity {
    /// Returns whether this identity holds `role` or a higher one.
    pub fn has_role(&self, role: Role) -> bool {
        self.role >= role
    }

    pub fn is_member_of(&self, agency_id: AgencyId) -> bool {
        self.organizations.iter().any(|org| org.id == agency_id)
    }
}

/// Caller of a request, as resolved by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Identity),
}

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }
}

impl From<Identity> for Caller {
    fn from(value: Identity) -> Self {
        Self::Authenticated(value)
    }
}

impl From<Option<Identity>> for Caller {
    fn from(value: Option<Identity>) -> Self {
        value.map_or(Self::Anonymous, Self::Authenticated)
    }
}
