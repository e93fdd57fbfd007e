//! Catalog listing read model.

use crate::model::identity::AgencyId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ListingId = i64;

/// Listing projection served inside storefront views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub agency_id: AgencyId,
    /// Owning organization title.
    pub agency: String,
    /// Classification level title.
    pub access_control: String,
    pub is_featured: bool,
    pub is_private: bool,
    #[serde(with = "crate::model::timestamp::wire_option")]
    pub approved_date: Option<DateTime<Utc>>,
    pub avg_rate: f64,
}
