use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tether_core::mapping::INITIAL_VERSION;
use tether_core::{ShortCode, TargetUrl};
use tether_storage::{
    Deadline, DeadlineSettings, MappingStore, ReadStore, SqliteSettings, SqliteStore, StoreError,
};

struct Fixture {
    store: SqliteStore,
}

impl Fixture {
    async fn start() -> Self {
        Self {
            store: SqliteStore::in_memory().await.expect("open sqlite"),
        }
    }
}

fn code(value: &str) -> ShortCode {
    ShortCode::parse(value).unwrap()
}

fn url(value: &str) -> TargetUrl {
    TargetUrl::parse(value).unwrap()
}

/// A fresh database file under a per-test temp directory.
fn file_database(name: &str) -> (PathBuf, SqliteSettings) {
    let dir = std::env::temp_dir().join(format!("tether-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let settings = SqliteSettings::builder()
        .database_url(format!("sqlite://{}", dir.join("urls.db").display()))
        .build();
    (dir, settings)
}

#[tokio::test]
async fn insert_and_get_live_mapping() {
    let fixture = Fixture::start().await;
    let short_code = code("abc123");

    let inserted = fixture
        .store
        .insert(&short_code, &url("https://example.com"))
        .await
        .unwrap();

    let got = fixture.store.get_by_code(&short_code).await.unwrap();
    assert_eq!(got, inserted);
    assert_eq!(got.target_url.as_str(), "https://example.com");
    assert_eq!(got.version, INITIAL_VERSION);
    assert!(got.deleted_at.is_none());
    assert_eq!(got.created_at, got.updated_at);
}

#[tokio::test]
async fn get_missing_code_is_not_found() {
    let fixture = Fixture::start().await;

    let err = fixture.store.get_by_code(&code("nope1")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn insert_conflicts_when_code_already_exists() {
    let fixture = Fixture::start().await;
    let short_code = code("abc123");

    fixture
        .store
        .insert(&short_code, &url("https://one.example"))
        .await
        .unwrap();

    let err = fixture
        .store
        .insert(&short_code, &url("https://two.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::DuplicateCode(_)));
}

#[tokio::test]
async fn update_bumps_version_and_rejects_stale_writers() {
    let fixture = Fixture::start().await;
    let short_code = code("upd01");

    let created = fixture
        .store
        .insert(&short_code, &url("https://a.example"))
        .await
        .unwrap();

    let updated = fixture
        .store
        .update(&short_code, &url("https://b.example"), created.version)
        .await
        .unwrap();
    assert_eq!(updated.version, created.version + 1);
    assert_eq!(updated.target_url.as_str(), "https://b.example");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= updated.created_at);

    let err = fixture
        .store
        .update(&short_code, &url("https://c.example"), created.version)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionMismatch {
            expected: 1,
            actual: 2,
            ..
        }
    ));

    let got = fixture.store.get_by_code(&short_code).await.unwrap();
    assert_eq!(got, updated);
}

#[tokio::test]
async fn update_missing_code_is_not_found() {
    let fixture = Fixture::start().await;

    let err = fixture
        .store
        .update(&code("ghost"), &url("https://x.com"), INITIAL_VERSION)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn soft_delete_leaves_tombstone_and_blocks_reuse() {
    let fixture = Fixture::start().await;
    let short_code = code("del01");

    fixture
        .store
        .insert(&short_code, &url("https://example.com"))
        .await
        .unwrap();
    fixture
        .store
        .soft_delete(&short_code, INITIAL_VERSION)
        .await
        .unwrap();

    let got = fixture.store.get_by_code(&short_code).await.unwrap();
    assert!(got.is_deleted());
    assert_eq!(got.version, INITIAL_VERSION + 1);
    assert_eq!(got.target_url.as_str(), "https://example.com");

    let err = fixture
        .store
        .insert(&short_code, &url("https://new.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateCode(_)));

    let err = fixture
        .store
        .update(&short_code, &url("https://new.example"), got.version)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Tombstoned(_)));
}

#[tokio::test]
async fn soft_delete_repeat_requires_post_delete_version() {
    let fixture = Fixture::start().await;
    let short_code = code("del02");

    fixture
        .store
        .insert(&short_code, &url("https://example.com"))
        .await
        .unwrap();
    fixture
        .store
        .soft_delete(&short_code, INITIAL_VERSION)
        .await
        .unwrap();

    let err = fixture
        .store
        .soft_delete(&short_code, INITIAL_VERSION)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::VersionMismatch { .. }));

    fixture
        .store
        .soft_delete(&short_code, INITIAL_VERSION + 1)
        .await
        .unwrap();
    let got = fixture.store.get_by_code(&short_code).await.unwrap();
    assert_eq!(got.version, INITIAL_VERSION + 1);
}

#[tokio::test]
async fn max_id_follows_surrogate_keys() {
    let fixture = Fixture::start().await;
    assert_eq!(fixture.store.max_id().await.unwrap(), None);

    let first = fixture
        .store
        .insert(&code("seq01"), &url("https://a.example"))
        .await
        .unwrap();
    let second = fixture
        .store
        .insert(&code("seq02"), &url("https://b.example"))
        .await
        .unwrap();

    assert!(second.id > first.id);
    assert_eq!(fixture.store.max_id().await.unwrap(), Some(second.id));
}

#[tokio::test]
async fn concurrent_updates_at_one_version_admit_exactly_one() {
    let fixture = Fixture::start().await;
    let store = Arc::new(fixture.store);
    let short_code = code("race1");

    store
        .insert(&short_code, &url("https://start.example"))
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 0..8 {
        let store = Arc::clone(&store);
        let short_code = short_code.clone();
        handles.push(tokio::spawn(async move {
            store
                .update(
                    &short_code,
                    &url(&format!("https://u{i}.example")),
                    INITIAL_VERSION,
                )
                .await
        }));
    }

    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => applied += 1,
            Err(err) => assert!(matches!(err, StoreError::VersionMismatch { .. })),
        }
    }

    assert_eq!(applied, 1);
    let got = store.get_by_code(&short_code).await.unwrap();
    assert_eq!(got.version, INITIAL_VERSION + 1);
}

#[tokio::test]
async fn out_of_range_expected_version_is_a_mismatch() {
    let fixture = Fixture::start().await;
    let live = code("big01");
    let gone = code("big02");

    for c in [&live, &gone] {
        fixture
            .store
            .insert(c, &url("https://example.com"))
            .await
            .unwrap();
    }
    fixture
        .store
        .soft_delete(&gone, INITIAL_VERSION)
        .await
        .unwrap();

    let err = fixture
        .store
        .update(&live, &url("https://x.example"), u64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionMismatch {
            expected: u64::MAX,
            actual: INITIAL_VERSION,
            ..
        }
    ));

    let err = fixture
        .store
        .update(&gone, &url("https://x.example"), u64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Tombstoned(_)));

    let err = fixture.store.soft_delete(&live, u64::MAX).await.unwrap_err();
    assert!(matches!(err, StoreError::VersionMismatch { .. }));

    let err = fixture
        .store
        .update(&code("ghost"), &url("https://x.example"), u64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = fixture
        .store
        .soft_delete(&code("ghost"), u64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let got = fixture.store.get_by_code(&live).await.unwrap();
    assert_eq!(got.version, INITIAL_VERSION);
}

#[tokio::test]
async fn open_reader_does_not_block_inserts() {
    let (dir, settings) = file_database("wal");
    let store = SqliteStore::connect(&settings).await.unwrap();

    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    store
        .insert(&code("read1"), &url("https://a.example"))
        .await
        .unwrap();

    // the first SELECT takes the read lock, held until the transaction ends
    let mut reader = store.pool().begin().await.unwrap();
    let rows = sqlx::query("SELECT * FROM url_mappings")
        .fetch_all(&mut *reader)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let bounded = Deadline::new(
        store.clone(),
        &DeadlineSettings::builder()
            .timeout(Duration::from_millis(500))
            .build(),
    );
    let inserted = bounded
        .insert(&code("write1"), &url("https://b.example"))
        .await
        .unwrap();
    assert_eq!(inserted.version, INITIAL_VERSION);

    reader.rollback().await.unwrap();
    let got = store.get_by_code(&code("write1")).await.unwrap();
    assert_eq!(got, inserted);

    store.pool().close().await;
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn file_database_persists_across_pools() {
    let (dir, settings) = file_database("persist");

    {
        let store = SqliteStore::connect(&settings).await.unwrap();
        store
            .insert(&code("keep1"), &url("https://kept.example"))
            .await
            .unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteStore::connect(&settings).await.unwrap();
    let got = reopened.get_by_code(&code("keep1")).await.unwrap();
    assert_eq!(got.target_url.as_str(), "https://kept.example");

    reopened.pool().close().await;
    let _ = std::fs::remove_dir_all(&dir);
}
