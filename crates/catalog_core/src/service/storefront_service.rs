//! Storefront aggregation.
//!
//! # Responsibility
//! - Serve the featured / recent / most popular bundle for one user from
//!   cache, computing and caching it on miss.
//!
//! # Invariants
//! - The cache key is derived from the user's sorted, deduplicated
//!   organization titles followed by the access-control title; two users with
//!   the same combination share one entry.
//! - A cache hit is returned verbatim without re-filtering.
//! - Nothing is cached when any query or the cache write fails.
//! - Concurrent misses may both recompute and both write; last write wins.

use crate::cache::{get_json, set_json, CacheStore, KeySpace};
use crate::config::StorefrontLimits;
use crate::model::identity::Identity;
use crate::model::storefront::Storefront;
use crate::repo::listing_repo::{ListingOrder, ListingQuery, ListingRepository};
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::RepoError;
use crate::service::view::{ErrorResult, ViewResult};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::time::Instant;

pub const STOREFRONT_KEYSPACE: KeySpace = KeySpace::new("storefront");
const ERROR_CONTEXT: &str = "Error getting storefront";

/// Derives the storefront cache key for `identity`.
pub fn storefront_cache_key(identity: &Identity) -> String {
    let org_titles: BTreeSet<&str> = identity
        .organizations
        .iter()
        .map(|org| org.title.as_str())
        .collect();
    STOREFRONT_KEYSPACE.derive(
        org_titles
            .into_iter()
            .chain(std::iter::once(identity.access_control.title.as_str())),
    )
}

pub struct StorefrontService<P, L, C>
where
    P: ProfileRepository,
    L: ListingRepository,
    C: CacheStore,
{
    profiles: P,
    listings: L,
    cache: C,
    limits: StorefrontLimits,
}

impl<P, L, C> StorefrontService<P, L, C>
where
    P: ProfileRepository,
    L: ListingRepository,
    C: CacheStore,
{
    pub fn new(profiles: P, listings: L, cache: C, limits: StorefrontLimits) -> Self {
        Self {
            profiles,
            listings,
            cache,
            limits,
        }
    }

    /// Returns the storefront bundle for `username`.
    ///
    /// Failures are returned as [`ErrorResult`] with message
    /// `"Error getting storefront: <detail>"`.
    pub fn get_storefront(&self, username: &str) -> ViewResult<Storefront> {
        let started_at = Instant::now();

        let identity = match self.profiles.find_by_username(username) {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                warn!("event=storefront_get module=storefront status=error error_code=profile_not_found");
                return Err(ErrorResult::with_context(
                    ERROR_CONTEXT,
                    RepoError::not_found("profile", username),
                ));
            }
            Err(err) => {
                error!(
                    "event=storefront_get module=storefront status=error error_code=profile_lookup_failed error={}",
                    err
                );
                return Err(ErrorResult::with_context(ERROR_CONTEXT, err));
            }
        };

        let key = storefront_cache_key(&identity);
        match get_json::<Storefront, _>(&self.cache, &key) {
            Ok(Some(cached)) => {
                debug!(
                    "event=storefront_get module=storefront status=cache_hit profile_id={} duration_ms={}",
                    identity.id,
                    started_at.elapsed().as_millis()
                );
                return Ok(cached);
            }
            Ok(None) => {}
            Err(err) => warn!(
                "event=storefront_get module=storefront status=cache_read_failed profile_id={} error={}",
                identity.id, err
            ),
        }

        let storefront = self.build(&identity).map_err(|err| {
            error!(
                "event=storefront_get module=storefront status=error error_code=query_failed profile_id={} error={}",
                identity.id, err
            );
            ErrorResult::with_context(ERROR_CONTEXT, err)
        })?;

        set_json(&self.cache, &key, &storefront).map_err(|err| {
            error!(
                "event=storefront_get module=storefront status=error error_code=cache_write_failed profile_id={} error={}",
                identity.id, err
            );
            ErrorResult::with_context(ERROR_CONTEXT, err)
        })?;

        info!(
            "event=storefront_get module=storefront status=cache_miss profile_id={} featured={} recent={} most_popular={} duration_ms={}",
            identity.id,
            storefront.featured.len(),
            storefront.recent.len(),
            storefront.most_popular.len(),
            started_at.elapsed().as_millis()
        );
        Ok(storefront)
    }

    fn build(&self, identity: &Identity) -> Result<Storefront, RepoError> {
        let featured = self.listings.list_visible(
            identity,
            &ListingQuery {
                featured_only: true,
                order: ListingOrder::Default,
                limit: self.limits.featured,
            },
        )?;
        let recent = self.listings.list_visible(
            identity,
            &ListingQuery {
                featured_only: false,
                order: ListingOrder::ApprovedDate(self.limits.recent_order),
                limit: self.limits.recent,
            },
        )?;
        let most_popular = self.listings.list_visible(
            identity,
            &ListingQuery {
                featured_only: false,
                order: ListingOrder::AvgRate(self.limits.popular_order),
                limit: self.limits.most_popular,
            },
        )?;

        Ok(Storefront {
            featured,
            recent,
            most_popular,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::storefront_cache_key;
    use crate::model::identity::{AccessControl, Identity, Organization, Role};

    fn identity(orgs: &[&str], access: &str) -> Identity {
        Identity {
            id: 1,
            username: "someone".to_string(),
            organizations: orgs
                .iter()
                .enumerate()
                .map(|(idx, title)| Organization {
                    id: idx as i64 + 1,
                    title: title.to_string(),
                })
                .collect(),
            access_control: AccessControl {
                title: access.to_string(),
                rank: 2,
            },
            role: Role::User,
        }
    }

    #[test]
    fn key_is_independent_of_membership_order_and_duplicates() {
        let first = identity(&["Ministry of Truth", "Ministry of Peace"], "SECRET");
        let second = identity(
            &["Ministry of Peace", "Ministry of Truth", "Ministry of Peace"],
            "SECRET",
        );
        assert_eq!(storefront_cache_key(&first), storefront_cache_key(&second));
        assert_eq!(
            storefront_cache_key(&first),
            "storefront:ministryofpeace:ministryoftruth:secret"
        );
    }

    #[test]
    fn key_differs_by_access_control() {
        let secret = identity(&["Ministry of Truth"], "SECRET");
        let top = identity(&["Ministry of Truth"], "TOP SECRET");
        assert_ne!(storefront_cache_key(&secret), storefront_cache_key(&top));
    }

    #[test]
    fn key_without_organizations_keeps_access_part() {
        assert_eq!(
            storefront_cache_key(&identity(&[], "UNCLASSIFIED")),
            "storefront:unclassified"
        );
    }
}
