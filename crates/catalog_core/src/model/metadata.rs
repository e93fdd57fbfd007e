//! Global catalog metadata snapshot.
//!
//! Each entry type carries only the projected fields exposed to clients.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingTypeSummary {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencySummary {
    pub title: String,
    pub short_name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactTypeSummary {
    pub name: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub action: String,
    pub media_type: String,
    pub label: String,
    pub icon: Option<String>,
}

/// Composite metadata view. Not access-controlled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    pub categories: Vec<CategorySummary>,
    pub listing_types: Vec<ListingTypeSummary>,
    pub agencies: Vec<AgencySummary>,
    pub contact_types: Vec<ContactTypeSummary>,
    pub intents: Vec<IntentSummary>,
}
