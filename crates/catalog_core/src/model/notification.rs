//! Notification domain model.
//!
//! # Responsibility
//! - Define notification records, audience scopes and the time-derived
//!   lifecycle partition.
//! - Define the self-feed ordering contract.
//!
//! # Invariants
//! - `Pending` iff `now < expires_date`; `Expired` otherwise. The transition
//!   is time-driven and never persisted.
//! - Feed order is total: ties on `created_date` fall back to `id` in the
//!   same direction, so ascending order is the exact reverse of descending.

use crate::model::identity::AgencyId;
use crate::model::listing::ListingId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

pub type NotificationId = i64;

/// Targeting rule deciding which users see a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Audience {
    /// Every user.
    #[default]
    Global,
    /// Members of one organization.
    Agency(AgencyId),
    /// Owners of one listing.
    Listing(ListingId),
}

impl Audience {
    /// Builds an audience from nullable storage columns.
    pub fn from_columns(listing_id: Option<ListingId>, agency_id: Option<AgencyId>) -> Option<Self> {
        match (listing_id, agency_id) {
            (None, None) => Some(Self::Global),
            (Some(listing_id), None) => Some(Self::Listing(listing_id)),
            (None, Some(agency_id)) => Some(Self::Agency(agency_id)),
            (Some(_), Some(_)) => None,
        }
    }

    pub fn listing_id(self) -> Option<ListingId> {
        match self {
            Self::Listing(id) => Some(id),
            _ => None,
        }
    }

    pub fn agency_id(self) -> Option<AgencyId> {
        match self {
            Self::Agency(id) => Some(id),
            _ => None,
        }
    }
}

impl Display for Audience {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Agency(id) => write!(f, "agency:{id}"),
            Self::Listing(id) => write!(f, "listing:{id}"),
        }
    }
}

/// Time-derived lifecycle partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Pending,
    Expired,
}

/// Persisted notification as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Author username.
    pub author: String,
    pub listing: Option<ListingId>,
    pub agency: Option<AgencyId>,
    #[serde(with = "crate::model::timestamp::wire")]
    pub created_date: DateTime<Utc>,
    pub message: String,
    #[serde(with = "crate::model::timestamp::wire")]
    pub expires_date: DateTime<Utc>,
}

impl Notification {
    pub fn audience(&self) -> Audience {
        Audience::from_columns(self.listing, self.agency).unwrap_or_default()
    }

    /// Lifecycle state relative to `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> NotificationState {
        if now < self.expires_date {
            NotificationState::Pending
        } else {
            NotificationState::Expired
        }
    }
}

/// Insert model for a new notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub author_id: crate::model::identity::ProfileId,
    pub message: String,
    pub created_date: DateTime<Utc>,
    pub expires_date: DateTime<Utc>,
    pub audience: Audience,
}

/// Partial update. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationUpdate {
    pub message: Option<String>,
    pub expires_date: Option<DateTime<Utc>>,
}

impl NotificationUpdate {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.expires_date.is_none()
    }
}

/// Self-feed ordering by `created_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedOrdering {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
}

impl FeedOrdering {
    /// Parses the `ordering` query parameter.
    ///
    /// `None` and `-created_date` are descending, `created_date` is ascending.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("-created_date") => Some(Self::CreatedDesc),
            Some("created_date") => Some(Self::CreatedAsc),
            Some(_) => None,
        }
    }

    pub fn compare(self, left: &Notification, right: &Notification) -> Ordering {
        let ascending = left
            .created_date
            .cmp(&right.created_date)
            .then_with(|| left.id.cmp(&right.id));
        match self {
            Self::CreatedAsc => ascending,
            Self::CreatedDesc => ascending.reverse(),
        }
    }

    pub fn sort(self, items: &mut [Notification]) {
        items.sort_by(|left, right| self.compare(left, right));
    }
}

#[cfg(test)]
mod tests {
    use super::{Audience, FeedOrdering, Notification, NotificationState};
    use chrono::{Duration, TimeZone, Utc};

    fn notification(id: i64, created_offset_secs: i64) -> Notification {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Notification {
            id,
            author: "bigbrother".to_string(),
            listing: None,
            agency: None,
            created_date: base + Duration::seconds(created_offset_secs),
            message: format!("message {id}"),
            expires_date: base + Duration::days(1),
        }
    }

    #[test]
    fn state_flips_exactly_at_expiry() {
        let item = notification(1, 0);
        let expiry = item.expires_date;
        assert_eq!(
            item.state_at(expiry - Duration::microseconds(1)),
            NotificationState::Pending
        );
        assert_eq!(item.state_at(expiry), NotificationState::Expired);
        assert_eq!(
            item.state_at(expiry + Duration::days(3)),
            NotificationState::Expired
        );
    }

    #[test]
    fn ordering_parameter_parsing() {
        assert_eq!(FeedOrdering::parse(None), Some(FeedOrdering::CreatedDesc));
        assert_eq!(
            FeedOrdering::parse(Some("-created_date")),
            Some(FeedOrdering::CreatedDesc)
        );
        assert_eq!(
            FeedOrdering::parse(Some("created_date")),
            Some(FeedOrdering::CreatedAsc)
        );
        assert_eq!(FeedOrdering::parse(Some("expires_date")), None);
    }

    #[test]
    fn ascending_is_exact_reverse_of_descending_even_with_ties() {
        let mut desc = vec![
            notification(4, 10),
            notification(1, 0),
            notification(3, 10),
            notification(2, 5),
        ];
        let mut asc = desc.clone();
        FeedOrdering::CreatedDesc.sort(&mut desc);
        FeedOrdering::CreatedAsc.sort(&mut asc);

        let desc_ids: Vec<i64> = desc.iter().map(|item| item.id).collect();
        let asc_ids: Vec<i64> = asc.iter().map(|item| item.id).collect();
        assert_eq!(asc_ids, vec![1, 2, 3, 4]);
        assert_eq!(desc_ids, asc_ids.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn audience_columns_are_mutually_exclusive() {
        assert_eq!(Audience::from_columns(None, None), Some(Audience::Global));
        assert_eq!(
            Audience::from_columns(Some(2), None),
            Some(Audience::Listing(2))
        );
        assert_eq!(
            Audience::from_columns(None, Some(5)),
            Some(Audience::Agency(5))
        );
        assert_eq!(Audience::from_columns(Some(2), Some(5)), None);
    }
}
