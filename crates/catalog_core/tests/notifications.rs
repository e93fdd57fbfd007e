use catalog_core::db::open_db_in_memory;
use catalog_core::db::seed::seed_sample_data;
use catalog_core::model::timestamp::parse_timestamp;
use catalog_core::{
    Audience, Caller, CreateNotification, FeedOrdering, FixedClock, NotificationError,
    NotificationService, NotificationUpdate, ProfileRepository, Role, SqliteNotificationRepository,
    SqliteProfileRepository,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::Connection;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn seeded_conn() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    seed_sample_data(&mut conn, now()).unwrap();
    conn
}

fn caller(conn: &Connection, username: &str) -> Caller {
    SqliteProfileRepository::new(conn)
        .find_by_username(username)
        .unwrap()
        .expect("seeded profile")
        .into()
}

type Service<'conn> = NotificationService<SqliteNotificationRepository<'conn>, FixedClock>;

fn service(conn: &Connection) -> Service<'_> {
    NotificationService::new(SqliteNotificationRepository::new(conn), FixedClock(now()))
}

fn feed_ids(service: &Service<'_>, caller: &Caller, ordering: FeedOrdering) -> Vec<i64> {
    service
        .list_self_feed(caller, ordering)
        .unwrap()
        .iter()
        .map(|item| item.id)
        .collect()
}

#[test]
fn self_feed_default_is_newest_first() {
    let conn = seeded_conn();
    let service = service(&conn);
    let wsmith = caller(&conn, "wsmith");

    let default_ids = feed_ids(&service, &wsmith, FeedOrdering::default());
    assert_eq!(default_ids, vec![5, 2, 1]);
    assert_eq!(
        feed_ids(&service, &wsmith, FeedOrdering::parse(Some("-created_date")).unwrap()),
        default_ids
    );

    let ascending = feed_ids(&service, &wsmith, FeedOrdering::parse(Some("created_date")).unwrap());
    assert_eq!(ascending, vec![1, 2, 5]);
    assert_eq!(ascending, default_ids.iter().rev().copied().collect::<Vec<_>>());
}

#[test]
fn self_feed_covers_global_agency_and_owned_listing_audiences() {
    let conn = seeded_conn();
    let service = service(&conn);

    assert_eq!(
        feed_ids(&service, &caller(&conn, "jones"), FeedOrdering::default()),
        vec![4, 3, 2]
    );
    assert_eq!(
        feed_ids(&service, &caller(&conn, "julia"), FeedOrdering::default()),
        vec![6, 2]
    );
}

#[test]
fn self_feed_requires_authentication() {
    let conn = seeded_conn();
    let err = service(&conn)
        .list_self_feed(&Caller::Anonymous, FeedOrdering::default())
        .unwrap_err();
    assert!(matches!(err, NotificationError::Unauthenticated));
}

#[test]
fn dismissal_removes_only_for_that_user() {
    let conn = seeded_conn();
    let service = service(&conn);
    let wsmith = caller(&conn, "wsmith");
    let bigbrother = caller(&conn, "bigbrother");

    assert!(feed_ids(&service, &bigbrother, FeedOrdering::default()).contains(&5));

    service.dismiss(&wsmith, 5).unwrap();
    let after = feed_ids(&service, &wsmith, FeedOrdering::default());
    assert_eq!(after, vec![2, 1]);
    assert!(!feed_ids(&service, &wsmith, FeedOrdering::CreatedAsc).contains(&5));

    service.dismiss(&wsmith, 5).unwrap();
    assert_eq!(feed_ids(&service, &wsmith, FeedOrdering::default()), vec![2, 1]);

    assert!(feed_ids(&service, &bigbrother, FeedOrdering::default()).contains(&5));
    let steward_expired: Vec<i64> = service
        .list_expired(&bigbrother, None)
        .unwrap()
        .iter()
        .map(|item| item.id)
        .collect();
    assert!(steward_expired.contains(&5));
}

#[test]
fn dismissal_outside_audience_or_unknown_is_not_found() {
    let conn = seeded_conn();
    let service = service(&conn);
    let wsmith = caller(&conn, "wsmith");

    assert!(matches!(
        service.dismiss(&wsmith, 3).unwrap_err(),
        NotificationError::NotFound(3)
    ));
    assert!(matches!(
        service.dismiss(&wsmith, 404).unwrap_err(),
        NotificationError::NotFound(404)
    ));
}

#[test]
fn pending_and_expired_partition_the_catalog() {
    let conn = seeded_conn();
    let service = service(&conn);
    let wsmith = caller(&conn, "wsmith");

    let pending = service.list_pending(&wsmith, None).unwrap();
    let expired = service.list_expired(&wsmith, None).unwrap();
    assert_eq!(pending.iter().map(|item| item.id).collect::<Vec<_>>(), vec![6, 2, 1]);
    assert_eq!(expired.iter().map(|item| item.id).collect::<Vec<_>>(), vec![5, 4, 3]);
    assert!(pending.iter().all(|item| item.expires_date > now()));
    assert!(expired.iter().all(|item| item.expires_date <= now()));

    let for_listing = service.list_pending(&caller(&conn, "bigbrother"), Some(1)).unwrap();
    assert_eq!(for_listing.len(), 1);
    assert_eq!(for_listing[0].id, 1);
    assert!(service.list_expired(&wsmith, Some(1)).unwrap().is_empty());
}

#[test]
fn partition_moves_with_the_clock() {
    let conn = seeded_conn();
    let later = NotificationService::new(
        SqliteNotificationRepository::new(&conn),
        FixedClock(now() + Duration::hours(49)),
    );
    let wsmith = caller(&conn, "wsmith");

    let pending: Vec<i64> = later
        .list_pending(&wsmith, None)
        .unwrap()
        .iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(pending, vec![2, 1]);
    assert!(later
        .list_expired(&wsmith, None)
        .unwrap()
        .iter()
        .any(|item| item.id == 6));
}

#[test]
fn non_elevated_users_are_rejected_for_privileged_operations() {
    let conn = seeded_conn();
    let service = service(&conn);
    let jones = caller(&conn, "jones");

    for err in [
        service.list_pending(&jones, None).unwrap_err(),
        service.list_pending(&jones, Some(1)).unwrap_err(),
        service.list_expired(&jones, None).unwrap_err(),
        service
            .create(
                &jones,
                CreateNotification {
                    message: "a simple test".to_string(),
                    expires_date: now() + Duration::days(1),
                    audience: Audience::Global,
                },
            )
            .unwrap_err(),
    ] {
        assert!(matches!(
            err,
            NotificationError::AccessDenied {
                required: Role::OrgSteward
            }
        ));
    }
}

#[test]
fn elevated_user_creates_notification() {
    let conn = seeded_conn();
    let service = service(&conn);
    let bigbrother = caller(&conn, "bigbrother");

    let created = service
        .create(
            &bigbrother,
            CreateNotification {
                message: "a simple test".to_string(),
                expires_date: parse_timestamp("2016-09-01T15:45:55.322421Z").unwrap(),
                audience: Audience::Global,
            },
        )
        .unwrap();
    assert_eq!(created.id, 7);
    assert_eq!(created.message, "a simple test");
    assert_eq!(created.author, "bigbrother");
    assert_eq!(created.created_date, now());
    assert_eq!(created.listing, None);

    let wsmith = caller(&conn, "wsmith");
    assert_eq!(
        feed_ids(&service, &wsmith, FeedOrdering::default()),
        vec![7, 5, 2, 1]
    );
}

#[test]
fn create_checks_audience_target() {
    let conn = seeded_conn();
    let service = service(&conn);
    let err = service
        .create(
            &caller(&conn, "wsmith"),
            CreateNotification {
                message: "hello".to_string(),
                expires_date: now() + Duration::days(1),
                audience: Audience::Agency(99),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        NotificationError::AudienceNotFound(Audience::Agency(99))
    ));
}

#[test]
fn any_authenticated_user_can_update() {
    let conn = seeded_conn();
    let service = service(&conn);
    let jones = caller(&conn, "jones");

    let updated = service
        .update(
            &jones,
            1,
            NotificationUpdate {
                message: None,
                expires_date: Some(now()),
            },
        )
        .unwrap();
    assert_eq!(updated.expires_date, now());
    assert_eq!(updated.message, "Air Mail update scheduled");

    let pending = service
        .list_pending(&caller(&conn, "wsmith"), Some(1))
        .unwrap();
    assert!(pending.is_empty());

    let err = service
        .update(
            &jones,
            404,
            NotificationUpdate {
                message: Some("hello".to_string()),
                expires_date: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, NotificationError::NotFound(404)));
}
