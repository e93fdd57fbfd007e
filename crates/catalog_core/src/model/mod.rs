//! Domain model for the catalog core.
//!
//! # Responsibility
//! - Define identities, listings, notifications and the composite views
//!   served from cache.
//! - Keep wire-visible field names and timestamp formats in one place.
//!
//! # Invariants
//! - Identities and listings are read-only to this crate.
//! - Notification lifecycle state is derived from time, never stored.

pub mod identity;
pub mod listing;
pub mod metadata;
pub mod notification;
pub mod storefront;
pub mod timestamp;
