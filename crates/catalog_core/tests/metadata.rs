use catalog_core::db::open_db_in_memory;
use catalog_core::db::seed::seed_sample_data;
use catalog_core::model::metadata::{
    AgencySummary, CategorySummary, ContactTypeSummary, IntentSummary, ListingTypeSummary,
};
use catalog_core::{
    CatalogRepository, MemoryCacheStore, MetadataService, RepoError, RepoResult,
    SqliteCatalogRepository,
};
use chrono::Utc;
use std::cell::Cell;
use std::time::Duration;

/// Delegates to SQLite but can be switched to fail the intents query.
struct SwitchableCatalog<'conn> {
    inner: SqliteCatalogRepository<'conn>,
    fail_intents: Cell<bool>,
    intent_calls: Cell<usize>,
}

impl CatalogRepository for &SwitchableCatalog<'_> {
    fn list_categories(&self) -> RepoResult<Vec<CategorySummary>> {
        self.inner.list_categories()
    }
    fn list_listing_types(&self) -> RepoResult<Vec<ListingTypeSummary>> {
        self.inner.list_listing_types()
    }
    fn list_agencies(&self) -> RepoResult<Vec<AgencySummary>> {
        self.inner.list_agencies()
    }
    fn list_contact_types(&self) -> RepoResult<Vec<ContactTypeSummary>> {
        self.inner.list_contact_types()
    }
    fn list_intents(&self) -> RepoResult<Vec<IntentSummary>> {
        self.intent_calls.set(self.intent_calls.get() + 1);
        if self.fail_intents.get() {
            return Err(RepoError::InvalidData("intents table locked".to_string()));
        }
        self.inner.list_intents()
    }
}

#[test]
fn metadata_projects_expected_fields() {
    let mut conn = open_db_in_memory().unwrap();
    seed_sample_data(&mut conn, Utc::now()).unwrap();
    let service = MetadataService::new(
        SqliteCatalogRepository::new(&conn),
        MemoryCacheStore::new(8, Duration::from_secs(60)),
    );

    let snapshot = service.get_metadata().unwrap();
    assert_eq!(snapshot.categories.len(), 3);
    assert_eq!(snapshot.categories[2].description, None);
    assert_eq!(snapshot.listing_types[0].title, "web application");
    assert_eq!(
        snapshot.agencies[0],
        AgencySummary {
            title: "Ministry of Truth".to_string(),
            short_name: "Minitrue".to_string(),
            icon_url: Some("https://localhost/icons/minitrue.png".to_string()),
        }
    );
    assert!(snapshot.contact_types[2].required);
    assert_eq!(snapshot.intents[1].icon, None);

    let value = serde_json::to_value(&snapshot).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    for expected in [
        "categories",
        "listing_types",
        "agencies",
        "contact_types",
        "intents",
    ] {
        assert!(keys.contains(&expected), "missing {expected}");
    }
    assert_eq!(
        value["intents"][0],
        serde_json::json!({
            "action": "/view",
            "media_type": "text/x-uri",
            "label": "view",
            "icon": "https://localhost/icons/view.png"
        })
    );
}

#[test]
fn metadata_is_cached_globally_and_faults_are_not_cached() {
    let mut conn = open_db_in_memory().unwrap();
    seed_sample_data(&mut conn, Utc::now()).unwrap();
    let catalog = SwitchableCatalog {
        inner: SqliteCatalogRepository::new(&conn),
        fail_intents: Cell::new(true),
        intent_calls: Cell::new(0),
    };
    let store = MemoryCacheStore::new(8, Duration::from_secs(60));
    let service = MetadataService::new(&catalog, &store);

    let err = service.get_metadata().unwrap_err();
    assert!(err.error);
    assert_eq!(
        err.msg,
        "Error getting metadata: invalid persisted data: intents table locked"
    );
    assert!(!store.contains_key("metadata"));

    catalog.fail_intents.set(false);
    let first = service.get_metadata().unwrap();
    assert!(store.contains_key("metadata"));

    catalog.fail_intents.set(true);
    let second = service.get_metadata().unwrap();
    assert_eq!(first, second);
    assert_eq!(catalog.intent_calls.get(), 2);
}
