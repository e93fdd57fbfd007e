//! Notification lifecycle engine.
//!
//! # Responsibility
//! - Resolve each caller's notification feed and its per-user dismissals.
//! - Partition notifications into pending and expired relative to the clock.
//! - Gate privileged reads and creation behind the elevated role.
//!
//! # Invariants
//! - Every operation rejects anonymous callers before touching storage.
//! - `list_pending` only returns `now < expires_date`; `list_expired` only
//!   returns `expires_date <= now`.
//! - A dismissed notification never reappears in that user's feed; other
//!   users are unaffected.
//! - Role failures yield a rejection, never partial data.
//! - `update` requires authentication only.

use crate::clock::Clock;
use crate::model::identity::{Caller, Identity, Role};
use crate::model::listing::ListingId;
use crate::model::notification::{
    Audience, FeedOrdering, NewNotification, Notification, NotificationId, NotificationState,
    NotificationUpdate,
};
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::RepoError;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Notification use-case errors.
#[derive(Debug)]
pub enum NotificationError {
    /// No identity was resolved for the request.
    Unauthenticated,
    /// Caller lacks the role the operation requires.
    AccessDenied { required: Role },
    /// Notification does not exist or is outside the caller's audience.
    NotFound(NotificationId),
    /// Referenced agency or listing does not exist.
    AudienceNotFound(Audience),
    /// Input failed validation.
    Validation(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl NotificationError {
    /// HTTP status code reported for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::AccessDenied { .. } => 403,
            Self::NotFound(_) | Self::AudienceNotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Repo(_) | Self::InconsistentState(_) => 500,
        }
    }
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication credentials were not provided"),
            Self::AccessDenied { required } => write!(
                f,
                "you do not have permission to perform this action (requires {})",
                required.as_str()
            ),
            Self::NotFound(id) => write!(f, "notification not found: {id}"),
            Self::AudienceNotFound(audience) => write!(f, "audience target not found: {audience}"),
            Self::Validation(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent notification state: {details}")
            }
        }
    }
}

impl Error for NotificationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NotificationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "notification",
                id,
            } => match id.parse() {
                Ok(id) => Self::NotFound(id),
                Err(_) => Self::Repo(RepoError::NotFound {
                    entity: "notification",
                    id,
                }),
            },
            other => Self::Repo(other),
        }
    }
}

pub type NotificationResult<T> = Result<T, NotificationError>;

/// Input for [`NotificationService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNotification {
    pub message: String,
    pub expires_date: DateTime<Utc>,
    pub audience: Audience,
}

/// Notification engine over a repository and a clock.
pub struct NotificationService<R: NotificationRepository, K: Clock> {
    repo: R,
    clock: K,
}

impl<R: NotificationRepository, K: Clock> NotificationService<R, K> {
    pub fn new(repo: R, clock: K) -> Self {
        Self { repo, clock }
    }

    /// Lists the caller's feed, excluding notifications the caller dismissed.
    ///
    /// Pending and expired notifications are both included.
    pub fn list_self_feed(
        &self,
        caller: &Caller,
        ordering: FeedOrdering,
    ) -> NotificationResult<Vec<Notification>> {
        let identity = require_authenticated(caller)?;
        let dismissed = self.repo.dismissed_ids(identity.id)?;

        let mut feed: Vec<Notification> = self
            .repo
            .list_for_profile(identity.id)?
            .into_iter()
            .filter(|item| !dismissed.contains(&item.id))
            .collect();
        ordering.sort(&mut feed);
        Ok(feed)
    }

    /// Hides one notification from the caller's feed.
    ///
    /// Idempotent. Expired notifications can be dismissed too.
    pub fn dismiss(&self, caller: &Caller, id: NotificationId) -> NotificationResult<()> {
        let identity = require_authenticated(caller)?;
        if self.repo.get_notification(id)?.is_none() {
            return Err(NotificationError::NotFound(id));
        }
        let addressed = self
            .repo
            .list_for_profile(identity.id)?
            .iter()
            .any(|item| item.id == id);
        if !addressed {
            warn!(
                "event=notification_dismiss module=notification status=error error_code=outside_audience profile_id={} notification_id={}",
                identity.id, id
            );
            return Err(NotificationError::NotFound(id));
        }

        self.repo
            .record_dismissal(identity.id, id, self.clock.now())?;
        info!(
            "event=notification_dismiss module=notification status=ok profile_id={} notification_id={}",
            identity.id, id
        );
        Ok(())
    }

    /// Lists pending notifications, optionally for one listing.
    pub fn list_pending(
        &self,
        caller: &Caller,
        listing: Option<ListingId>,
    ) -> NotificationResult<Vec<Notification>> {
        self.list_partition(caller, listing, NotificationState::Pending)
    }

    /// Lists expired notifications, optionally for one listing.
    pub fn list_expired(
        &self,
        caller: &Caller,
        listing: Option<ListingId>,
    ) -> NotificationResult<Vec<Notification>> {
        self.list_partition(caller, listing, NotificationState::Expired)
    }

    /// Creates a notification authored by the caller.
    pub fn create(
        &self,
        caller: &Caller,
        request: CreateNotification,
    ) -> NotificationResult<Notification> {
        let identity = require_role(caller, Role::ELEVATED)?;
        let message = normalize_message(request.message)?;
        if !self.repo.audience_target_exists(request.audience)? {
            return Err(NotificationError::AudienceNotFound(request.audience));
        }

        let id = self.repo.create_notification(&NewNotification {
            author_id: identity.id,
            message,
            created_date: self.clock.now(),
            expires_date: request.expires_date,
            audience: request.audience,
        })?;
        info!(
            "event=notification_create module=notification status=ok profile_id={} notification_id={} audience={}",
            identity.id, id, request.audience
        );

        self.repo
            .get_notification(id)?
            .ok_or(NotificationError::InconsistentState(
                "created notification not found in read-back",
            ))
    }

    /// Updates message and/or expiration of an existing notification.
    pub fn update(
        &self,
        caller: &Caller,
        id: NotificationId,
        update: NotificationUpdate,
    ) -> NotificationResult<Notification> {
        let identity = require_authenticated(caller)?;
        if update.is_empty() {
            return Err(NotificationError::Validation(
                "update must set message or expires_date".to_string(),
            ));
        }
        let update = NotificationUpdate {
            message: update.message.map(normalize_message).transpose()?,
            expires_date: update.expires_date,
        };

        self.repo.update_notification(id, &update)?;
        info!(
            "event=notification_update module=notification status=ok profile_id={} notification_id={}",
            identity.id, id
        );

        self.repo
            .get_notification(id)?
            .ok_or(NotificationError::InconsistentState(
                "updated notification not found in read-back",
            ))
    }

    fn list_partition(
        &self,
        caller: &Caller,
        listing: Option<ListingId>,
        state: NotificationState,
    ) -> NotificationResult<Vec<Notification>> {
        require_role(caller, Role::ELEVATED)?;
        let now = self.clock.now();

        let mut items: Vec<Notification> = self
            .repo
            .list_all(listing)?
            .into_iter()
            .filter(|item| item.state_at(now) == state)
            .collect();
        FeedOrdering::default().sort(&mut items);
        Ok(items)
    }
}

/// Resolves the caller's identity when it holds the elevated role.
pub fn require_elevated(caller: &Caller) -> NotificationResult<&Identity> {
    require_role(caller, Role::ELEVATED)
}

fn require_authenticated(caller: &Caller) -> NotificationResult<&Identity> {
    caller.identity().ok_or(NotificationError::Unauthenticated)
}

fn require_role(caller: &Caller, role: Role) -> NotificationResult<&Identity> {
    let identity = require_authenticated(caller)?;
    if !identity.has_role(role) {
        warn!(
            "event=notification_access module=notification status=denied profile_id={} required_role={}",
            identity.id,
            role.as_str()
        );
        return Err(NotificationError::AccessDenied { required: role });
    }
    Ok(identity)
}

fn normalize_message(message: String) -> NotificationResult<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(NotificationError::Validation(
            "message must not be blank".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
