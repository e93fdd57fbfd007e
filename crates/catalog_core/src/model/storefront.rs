//! Storefront bundle.

use crate::model::listing::Listing;
use serde::{Deserialize, Serialize};

/// Three listing subsets shown on a user's storefront.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Storefront {
    pub featured: Vec<Listing>,
    pub recent: Vec<Listing>,
    pub most_popular: Vec<Listing>,
}
