//! Data-access and caching core for the application catalog.
//!
//! Serves per-user storefront views and the global metadata snapshot through
//! a cache-aside path, and owns the notification lifecycle: audience
//! resolution, pending/expired partitioning, per-user dismissal and
//! role-gated creation.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use cache::{make_keysafe, CacheError, CacheStore, KeySpace, MemoryCacheStore};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CacheSettings, ConfigError, CoreConfig, SortDirection, StorefrontLimits};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::identity::{Caller, Identity, Role};
pub use model::listing::Listing;
pub use model::metadata::MetadataSnapshot;
pub use model::notification::{Audience, FeedOrdering, Notification, NotificationUpdate};
pub use model::storefront::Storefront;
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::listing_repo::{ListingRepository, SqliteListingRepository};
pub use repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use repo::{RepoError, RepoResult};
pub use service::metadata_service::MetadataService;
pub use service::notification_service::{
    CreateNotification, NotificationError, NotificationService,
};
pub use service::storefront_service::StorefrontService;
pub use service::view::{ErrorResult, ViewResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
