//! Framework-free endpoint adapters.
//!
//! # Responsibility
//! - Map use-case results onto the status codes and JSON bodies of the
//!   public endpoints.
//! - Parse query parameters and request bodies at the boundary.
//!
//! # Invariants
//! - Adapters never panic; every outcome becomes an [`ApiResponse`].
//! - Error bodies are `{"detail": "..."}`; aggregate view failures keep the
//!   `{"error": true, "msg": "..."}` shape.
//!
//! | Endpoint                                | Success | Failure      |
//! |-----------------------------------------|---------|--------------|
//! | GET `/self/notification/`               | 200     | 401          |
//! | DELETE `/self/notification/{id}/`       | 204     | 401, 404     |
//! | GET `/notifications/pending/`           | 200     | 401, 403     |
//! | GET `/notifications/expired/`           | 200     | 401, 403     |
//! | POST `/notification/`                   | 201     | 400, 401, 403|
//! | PUT `/notification/{id}/`               | 200     | 400, 401, 404|
//! | GET `/storefront/`                      | 200     | 500          |
//! | GET `/metadata/`                        | 200     | 500          |

use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::model::identity::Caller;
use crate::model::listing::ListingId;
use crate::model::notification::{Audience, FeedOrdering, NotificationId, NotificationUpdate};
use crate::model::timestamp::parse_timestamp;
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::listing_repo::ListingRepository;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::profile_repo::ProfileRepository;
use crate::service::metadata_service::MetadataService;
use crate::service::notification_service::{
    require_elevated, CreateNotification, NotificationError, NotificationResult,
    NotificationService,
};
use crate::service::storefront_service::StorefrontService;
use crate::service::view::{ViewPayload, ViewResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(status: u16, body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(err) => Self::detail(STATUS_INTERNAL_ERROR, err.to_string()),
        }
    }

    fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "detail": detail.into() }),
        }
    }

    fn from_error(err: &NotificationError) -> Self {
        Self::detail(err.status_code(), err.to_string())
    }

    fn from_result<T: Serialize>(status: u16, result: NotificationResult<T>) -> Self {
        match result {
            Ok(body) => Self::ok(status, body),
            Err(err) => Self::from_error(&err),
        }
    }

    fn from_view<T: Serialize>(result: ViewResult<T>) -> Self {
        let status = if result.is_ok() {
            STATUS_OK
        } else {
            STATUS_INTERNAL_ERROR
        };
        Self::ok(status, ViewPayload::from(result))
    }
}

/// Reference to another record by id, as in `{"id": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

/// Body of `POST /notification/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateNotificationBody {
    pub message: String,
    pub expires_date: String,
    #[serde(default)]
    pub listing: Option<IdRef>,
    #[serde(default)]
    pub agency: Option<IdRef>,
}

/// Body of `PUT /notification/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateNotificationBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub expires_date: Option<String>,
}

/// `GET /self/notification/[?ordering=...]`
pub fn get_self_notifications<R: NotificationRepository, K: Clock>(
    service: &NotificationService<R, K>,
    caller: &Caller,
    ordering: Option<&str>,
) -> ApiResponse {
    if caller.identity().is_none() {
        return ApiResponse::from_error(&NotificationError::Unauthenticated);
    }
    let Some(ordering) = FeedOrdering::parse(ordering) else {
        return ApiResponse::detail(
            STATUS_BAD_REQUEST,
            "ordering must be `created_date` or `-created_date`",
        );
    };
    ApiResponse::from_result(STATUS_OK, service.list_self_feed(caller, ordering))
}

/// `DELETE /self/notification/{id}/`
pub fn delete_self_notification<R: NotificationRepository, K: Clock>(
    service: &NotificationService<R, K>,
    caller: &Caller,
    id: NotificationId,
) -> ApiResponse {
    match service.dismiss(caller, id) {
        Ok(()) => ApiResponse {
            status: STATUS_NO_CONTENT,
            body: Value::Null,
        },
        Err(err) => ApiResponse::from_error(&err),
    }
}

/// `GET /notifications/pending/[?listing=<id>]`
pub fn get_pending_notifications<R: NotificationRepository, K: Clock>(
    service: &NotificationService<R, K>,
    caller: &Caller,
    listing: Option<&str>,
) -> ApiResponse {
    if let Err(err) = require_elevated(caller) {
        return ApiResponse::from_error(&err);
    }
    match parse_listing_param(listing) {
        Ok(listing) => ApiResponse::from_result(STATUS_OK, service.list_pending(caller, listing)),
        Err(response) => response,
    }
}

/// `GET /notifications/expired/[?listing=<id>]`
pub fn get_expired_notifications<R: NotificationRepository, K: Clock>(
    service: &NotificationService<R, K>,
    caller: &Caller,
    listing: Option<&str>,
) -> ApiResponse {
    if let Err(err) = require_elevated(caller) {
        return ApiResponse::from_error(&err);
    }
    match parse_listing_param(listing) {
        Ok(listing) => ApiResponse::from_result(STATUS_OK, service.list_expired(caller, listing)),
        Err(response) => response,
    }
}

/// `POST /notification/`
pub fn post_notification<R: NotificationRepository, K: Clock>(
    service: &NotificationService<R, K>,
    caller: &Caller,
    body: &Value,
) -> ApiResponse {
    if caller.identity().is_none() {
        return ApiResponse::from_error(&NotificationError::Unauthenticated);
    }
    let body: CreateNotificationBody = match serde_json::from_value(body.clone()) {
        Ok(body) => body,
        Err(err) => return ApiResponse::detail(STATUS_BAD_REQUEST, err.to_string()),
    };
    let Some(expires_date) = parse_timestamp(&body.expires_date) else {
        return ApiResponse::detail(STATUS_BAD_REQUEST, "expires_date is not a valid timestamp");
    };
    let audience = match (body.listing, body.agency) {
        (None, None) => Audience::Global,
        (Some(listing), None) => Audience::Listing(listing.id),
        (None, Some(agency)) => Audience::Agency(agency.id),
        (Some(_), Some(_)) => {
            return ApiResponse::detail(
                STATUS_BAD_REQUEST,
                "a notification targets a listing or an agency, not both",
            )
        }
    };

    ApiResponse::from_result(
        STATUS_CREATED,
        service.create(
            caller,
            CreateNotification {
                message: body.message,
                expires_date,
                audience,
            },
        ),
    )
}

/// `PUT /notification/{id}/`
pub fn put_notification<R: NotificationRepository, K: Clock>(
    service: &NotificationService<R, K>,
    caller: &Caller,
    id: NotificationId,
    body: &Value,
) -> ApiResponse {
    if caller.identity().is_none() {
        return ApiResponse::from_error(&NotificationError::Unauthenticated);
    }
    let body: UpdateNotificationBody = match serde_json::from_value(body.clone()) {
        Ok(body) => body,
        Err(err) => return ApiResponse::detail(STATUS_BAD_REQUEST, err.to_string()),
    };
    let expires_date = match body.expires_date.as_deref().map(parse_timestamp) {
        None => None,
        Some(Some(value)) => Some(value),
        Some(None) => {
            return ApiResponse::detail(STATUS_BAD_REQUEST, "expires_date is not a valid timestamp")
        }
    };

    ApiResponse::from_result(
        STATUS_OK,
        service.update(
            caller,
            id,
            NotificationUpdate {
                message: body.message,
                expires_date,
            },
        ),
    )
}

/// `GET /storefront/` for the authenticated `username`.
pub fn get_storefront<P, L, C>(service: &StorefrontService<P, L, C>, username: &str) -> ApiResponse
where
    P: ProfileRepository,
    L: ListingRepository,
    C: CacheStore,
{
    ApiResponse::from_view(service.get_storefront(username))
}

/// `GET /metadata/`
pub fn get_metadata<R: CatalogRepository, C: CacheStore>(
    service: &MetadataService<R, C>,
) -> ApiResponse {
    ApiResponse::from_view(service.get_metadata())
}

fn parse_listing_param(value: Option<&str>) -> Result<Option<ListingId>, ApiResponse> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<ListingId>().map(Some).map_err(|_| {
            ApiResponse::detail(STATUS_BAD_REQUEST, format!("invalid listing id `{raw}`"))
        }),
    }
}
