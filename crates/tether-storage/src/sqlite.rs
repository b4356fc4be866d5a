use async_trait::async_trait;
use jiff::Timestamp;
use serde::Deserialize;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tether_core::error::{Result, StoreError};
use tether_core::mapping::INITIAL_VERSION;
use tether_core::store::{guard_delete, guard_update, DeleteGuard, MappingStore, ReadStore};
use tether_core::{ShortCode, TargetUrl, UrlMapping};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

const SCHEMA: &str = include_str!("../ddl/sqlite/url_mappings.sql");

const INITIAL_SQL_VERSION: i64 = INITIAL_VERSION as i64;

const COLUMNS: &str = "id, short_code, target_url, created_at, updated_at, version, deleted_at";

/// Connection settings for [`SqliteStore`].
#[derive(Debug, Clone, TypedBuilder, Deserialize)]
#[serde(default)]
pub struct SqliteSettings {
    /// A `sqlite://` URL. The database file is created if missing.
    #[builder(default = "sqlite://urls.db".to_string(), setter(into))]
    pub database_url: String,
    #[builder(default = 5)]
    pub max_connections: u32,
    /// How long to wait for a pooled connection before reporting a timeout.
    #[builder(default = Duration::from_secs(2))]
    pub acquire_timeout: Duration,
    /// How long a write waits on another writer's lock before failing.
    #[builder(default = Duration::from_secs(1))]
    pub busy_timeout: Duration,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// SQLite implementation of the mapping store.
///
/// Mappings live in a single `url_mappings` table. The unique index on
/// `short_code` covers tombstoned rows too, so a deleted code is never
/// handed out again. Updates and deletes are single conditional
/// statements keyed on `version`, which closes the lost-update race inside
/// the database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store from an existing SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool and applies the schema.
    ///
    /// The database runs in WAL mode, so open readers never hold back a
    /// writer; only concurrent writers wait on each other, for at most
    /// `busy_timeout`.
    pub async fn connect(settings: &SqliteSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(settings.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        debug!(database_url = %settings.database_url, "sqlite store ready");
        Ok(store)
    }

    /// Opens a private in-memory database, mostly useful for tests.
    ///
    /// Every SQLite connection to `:memory:` is a separate database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_sqlx_error)?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Creates the table and unique index if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM url_mappings WHERE short_code = ? LIMIT 1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    /// Explains why a conditional update matched no row.
    async fn reject_update(&self, code: &ShortCode, expected_version: u64) -> Result<UrlMapping> {
        let current = self.get_by_code(code).await?;
        guard_update(&current, expected_version)?;
        Err(StoreError::VersionMismatch {
            code: code.to_string(),
            expected: expected_version,
            actual: current.version,
        })
    }

    /// Explains why a conditional delete matched no row. Deleting a
    /// tombstone at its current version is a no-op.
    async fn reject_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()> {
        let current = self.get_by_code(code).await?;
        match guard_delete(&current, expected_version)? {
            DeleteGuard::AlreadyDeleted => Ok(()),
            DeleteGuard::Apply => Err(StoreError::VersionMismatch {
                code: code.to_string(),
                expected: expected_version,
                actual: current.version,
            }),
        }
    }
}

/// The current time truncated to the precision stored in the table.
fn now_micros() -> Result<(Timestamp, i64)> {
    let micros = Timestamp::now().as_microsecond();
    Ok((parse_timestamp("now", micros)?, micros))
}

fn parse_timestamp(column: &str, micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StoreError::InvalidData(format!("invalid {column} timestamp '{micros}': {e}"))
    })
}

/// Converts an expected version for binding.
///
/// Stored versions always fit in an `i64`, so an expected version that does
/// not can never match and yields `None`.
fn expected_sql_version(version: u64) -> Option<i64> {
    i64::try_from(version).ok()
}

fn mapping_from_row(row: &SqliteRow) -> Result<UrlMapping> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let target_url: String = row.try_get("target_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;
    let version: i64 = row.try_get("version").map_err(map_sqlx_error)?;
    let deleted_at: Option<i64> = row.try_get("deleted_at").map_err(map_sqlx_error)?;

    Ok(UrlMapping {
        id,
        short_code: ShortCode::new_unchecked(short_code),
        target_url: TargetUrl::new_unchecked(target_url),
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
        version: u64::try_from(version)
            .map_err(|_| StoreError::InvalidData(format!("negative version {version}")))?,
        deleted_at: deleted_at
            .map(|value| parse_timestamp("deleted_at", value))
            .transpose()?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Configuration(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(message),
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl ReadStore for SqliteStore {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        trace!(code = %code, "loading mapping");
        self.fetch(code)
            .await?
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT MAX(id) AS max_id FROM url_mappings")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.try_get("max_id").map_err(map_sqlx_error)
    }
}

#[async_trait]
impl MappingStore for SqliteStore {
    async fn insert(&self, code: &ShortCode, target_url: &TargetUrl) -> Result<UrlMapping> {
        let (now, now_raw) = now_micros()?;

        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_code, target_url, created_at, updated_at, version, deleted_at)
            VALUES (?, ?, ?, ?, ?, NULL)
            RETURNING id
            "#,
        )
        .bind(code.as_str())
        .bind(target_url.as_str())
        .bind(now_raw)
        .bind(now_raw)
        .bind(INITIAL_SQL_VERSION)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
                trace!(code = %code, id, "inserted mapping");
                Ok(UrlMapping::new(id, code.clone(), target_url.clone(), now))
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::DuplicateCode(code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update(
        &self,
        code: &ShortCode,
        target_url: &TargetUrl,
        expected_version: u64,
    ) -> Result<UrlMapping> {
        let Some(expected) = expected_sql_version(expected_version) else {
            return self.reject_update(code, expected_version).await;
        };
        let (_, now_raw) = now_micros()?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE url_mappings
            SET target_url = ?,
                updated_at = MAX(updated_at, ?),
                version = version + 1
            WHERE short_code = ?
              AND version = ?
              AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(target_url.as_str())
        .bind(now_raw)
        .bind(code.as_str())
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = row {
            return mapping_from_row(&row);
        }

        self.reject_update(code, expected_version).await
    }

    async fn soft_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()> {
        let Some(expected) = expected_sql_version(expected_version) else {
            return self.reject_delete(code, expected_version).await;
        };
        let (_, now_raw) = now_micros()?;

        let result = sqlx::query(
            r#"
            UPDATE url_mappings
            SET deleted_at = MAX(updated_at, ?),
                updated_at = MAX(updated_at, ?),
                version = version + 1
            WHERE short_code = ?
              AND version = ?
              AND deleted_at IS NULL
            "#,
        )
        .bind(now_raw)
        .bind(now_raw)
        .bind(code.as_str())
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        self.reject_delete(code, expected_version).await
    }
}
