//! SQLite store implementation.
//!
//! Implements all three store ports on one `sqlx` pool. Timestamps are stored
//! as fixed-width RFC 3339 text (microseconds, `Z`), so lexical order is time
//! order. JSON columns (`payload`, `result`, `settings`) hold serde_json text.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, instrument};

use crate::domain::{
    Category, CategoryId, NewCategory, NewPost, NewProvider, NewTask, Post, PostId,
    ProviderConfig, ProviderId, ProviderKind, ProviderSettings, StoreError, TaskId, TaskPayload,
    TaskRecord, TaskResult, TaskStatistics, TaskStatus, TransitionError,
};
use crate::ports::{Clock, ContentStore, ProviderStore, SystemClock, TaskFilter, TaskStore};

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS ai_tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_type TEXT NOT NULL,
        payload TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        result TEXT,
        error_message TEXT,
        scheduled_at TEXT,
        started_at TEXT,
        completed_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ai_tasks_status_scheduled ON ai_tasks(status, scheduled_at)",
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL,
        description TEXT,
        color TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        content TEXT NOT NULL,
        category_id INTEGER NOT NULL REFERENCES categories(id),
        source_url TEXT,
        meta_description TEXT,
        featured_image TEXT,
        is_published INTEGER NOT NULL DEFAULT 0,
        published_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ai_providers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        api_key TEXT NOT NULL,
        model TEXT NOT NULL,
        base_url TEXT,
        settings TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        is_default INTEGER NOT NULL DEFAULT 0,
        priority INTEGER NOT NULL DEFAULT 0,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

const TASK_COLUMNS: &str = "id, task_type, payload, status, result, error_message, \
     scheduled_at, started_at, completed_at, created_at, updated_at";

const POST_COLUMNS: &str = "id, title, slug, content, category_id, source_url, \
     meta_description, featured_image, is_published, published_at, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, slug, description, color, is_active, created_at";

const PROVIDER_COLUMNS: &str = "id, name, kind, api_key, model, base_url, settings, \
     is_active, is_default, priority, description, created_at";

fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid timestamp `{raw}`: {e}")))
}

fn parse_opt_ts(raw: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    raw.as_deref().map(parse_ts).transpose()
}

/// Unique-constraint violations become `Conflict`; everything else stays a
/// database error.
fn conflict_or(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what()),
        _ => StoreError::Database(err),
    }
}

// Row types for sqlx queries

#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    task_type: String,
    payload: String,
    status: String,
    result: Option<String>,
    error_message: Option<String>,
    scheduled_at: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn into_record(self) -> Result<TaskRecord, StoreError> {
        let task_type = self
            .task_type
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("task {}: {e}", self.id)))?;
        let status = self
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("task {}: {e}", self.id)))?;
        let payload = TaskPayload::from_value(serde_json::from_str(&self.payload)?)
            .ok_or_else(|| StoreError::Corrupt(format!("task {}: payload is not an object", self.id)))?;
        let result = self
            .result
            .as_deref()
            .map(serde_json::from_str::<TaskResult>)
            .transpose()?;

        Ok(TaskRecord {
            id: TaskId::new(self.id),
            task_type,
            payload,
            status,
            result,
            error_message: self.error_message,
            scheduled_at: parse_opt_ts(self.scheduled_at)?,
            started_at: parse_opt_ts(self.started_at)?,
            completed_at: parse_opt_ts(self.completed_at)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    color: String,
    is_active: bool,
    created_at: String,
}

impl CategoryRow {
    fn into_category(self) -> Result<Category, StoreError> {
        Ok(Category {
            id: CategoryId::new(self.id),
            name: self.name,
            slug: self.slug,
            description: self.description,
            color: self.color,
            is_active: self.is_active,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    slug: String,
    content: String,
    category_id: i64,
    source_url: Option<String>,
    meta_description: Option<String>,
    featured_image: Option<String>,
    is_published: bool,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PostRow {
    fn into_post(self) -> Result<Post, StoreError> {
        Ok(Post {
            id: PostId::new(self.id),
            title: self.title,
            slug: self.slug,
            content: self.content,
            category_id: CategoryId::new(self.category_id),
            source_url: self.source_url,
            meta_description: self.meta_description,
            featured_image: self.featured_image,
            is_published: self.is_published,
            published_at: parse_opt_ts(self.published_at)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct ProviderRow {
    id: i64,
    name: String,
    kind: String,
    api_key: String,
    model: String,
    base_url: Option<String>,
    settings: String,
    is_active: bool,
    is_default: bool,
    priority: i64,
    description: Option<String>,
    created_at: String,
}

impl ProviderRow {
    fn into_config(self) -> Result<ProviderConfig, StoreError> {
        let settings: ProviderSettings = serde_json::from_str(&self.settings)?;
        Ok(ProviderConfig {
            id: ProviderId::new(self.id),
            name: self.name,
            kind: ProviderKind::parse_lenient(&self.kind),
            api_key: self.api_key,
            model: self.model,
            base_url: self.base_url,
            settings,
            is_active: self.is_active,
            is_default: self.is_default,
            priority: i32::try_from(self.priority)
                .map_err(|_| StoreError::Corrupt(format!("provider {}: priority out of range", self.id)))?,
            description: self.description,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

/// SQLite-backed store.
pub struct SqliteStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Connect and create the schema.
    ///
    /// # Example URLs
    /// - `sqlite://trendpress.db?mode=rwc` - file database, created if missing
    /// - `sqlite::memory:` - use [`SqliteStore::in_memory`] instead
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database. A single connection that never expires,
    /// since every new connection would see an empty database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            clock: Arc::new(SystemClock),
        };
        store.run_migrations().await?;
        Ok(store)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("sqlite schema ready");
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<TaskRecord, StoreError> {
        self.get_task(id).await?.ok_or(StoreError::NotFound {
            entity: "task",
            id: id.get(),
        })
    }

    /// Load, apply a domain transition, and write back only if the row is
    /// still in `expected`. A lost race reports the state that won.
    async fn transition<F>(&self, id: TaskId, expected: TaskStatus, apply: F) -> Result<TaskRecord, StoreError>
    where
        F: FnOnce(&mut TaskRecord, DateTime<Utc>) -> Result<(), TransitionError> + Send,
    {
        let mut task = self.load_task(id).await?;
        apply(&mut task, self.clock.now()).map_err(|e| StoreError::InvalidState {
            id,
            expected: e.expected,
            actual: e.actual,
        })?;

        let result = task.result.as_ref().map(serde_json::to_string).transpose()?;
        let updated = sqlx::query(
            "UPDATE ai_tasks SET status = ?, result = ?, error_message = ?, \
             started_at = ?, completed_at = ?, updated_at = ? \
             WHERE id = ? AND status = ?",
        )
        .bind(task.status.as_str())
        .bind(result)
        .bind(task.error_message.as_deref())
        .bind(task.started_at.map(ts))
        .bind(task.completed_at.map(ts))
        .bind(ts(task.updated_at))
        .bind(id.get())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            let current = self.load_task(id).await?;
            return Err(StoreError::InvalidState {
                id,
                expected,
                actual: current.status,
            });
        }
        Ok(task)
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    #[instrument(skip(self, new), fields(task_type = %new.task_type))]
    async fn insert_task(&self, new: NewTask) -> Result<TaskRecord, StoreError> {
        let now = self.clock.now();
        let payload = serde_json::to_string(&new.payload)?;
        let inserted = sqlx::query(
            "INSERT INTO ai_tasks (task_type, payload, status, scheduled_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.task_type.as_str())
        .bind(payload)
        .bind(TaskStatus::Pending.as_str())
        .bind(ts(new.scheduled_at))
        .bind(ts(now))
        .bind(ts(now))
        .execute(&self.pool)
        .await?;

        let id = TaskId::new(inserted.last_insert_rowid());
        self.load_task(id).await
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM ai_tasks WHERE id = ?");
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .map(TaskRow::into_record)
            .transpose()
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, StoreError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM ai_tasks WHERE (?1 IS NULL OR status = ?1) ORDER BY id LIMIT ?2"
        );
        let limit = filter.limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(filter.status.map(TaskStatus::as_str))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(TaskRow::into_record)
            .collect()
    }

    async fn pending_tasks(&self, limit: Option<usize>) -> Result<Vec<TaskRecord>, StoreError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM ai_tasks WHERE status = ? ORDER BY scheduled_at, id LIMIT ?"
        );
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(TaskStatus::Pending.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(TaskRow::into_record)
            .collect()
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn claim(&self, id: TaskId) -> Result<TaskRecord, StoreError> {
        self.transition(id, TaskStatus::Pending, |task, now| task.start(now))
            .await
    }

    #[instrument(skip(self, result), fields(task_id = %id))]
    async fn complete(&self, id: TaskId, result: TaskResult) -> Result<TaskRecord, StoreError> {
        self.transition(id, TaskStatus::Running, |task, now| task.complete(result, now))
            .await
    }

    #[instrument(skip(self, message), fields(task_id = %id))]
    async fn fail(&self, id: TaskId, message: &str) -> Result<TaskRecord, StoreError> {
        self.transition(id, TaskStatus::Running, |task, now| task.fail(message, now))
            .await
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn reset_for_retry(&self, id: TaskId) -> Result<TaskRecord, StoreError> {
        self.transition(id, TaskStatus::Failed, |task, now| task.reset_for_retry(now))
            .await
    }

    async fn statistics(&self) -> Result<TaskStatistics, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM ai_tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut stats = TaskStatistics::default();
        for (status, count) in rows {
            let status: TaskStatus = status
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("{e}")))?;
            stats.record(status, u64::try_from(count).unwrap_or(0));
        }
        Ok(stats)
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?");
        sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(CategoryRow::into_category)
            .transpose()
    }

    #[instrument(skip(self, new), fields(name = %new.name))]
    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let now = self.clock.now();
        let inserted = sqlx::query(
            "INSERT INTO categories (name, slug, description, color, is_active, created_at) \
             VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.description.as_deref())
        .bind(&new.color)
        .bind(ts(now))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("category `{}` already exists", new.name)))?;

        Ok(Category::new(
            CategoryId::new(inserted.last_insert_rowid()),
            new,
            now,
        ))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id");
        sqlx::query_as::<_, CategoryRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(CategoryRow::into_category)
            .collect()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM posts WHERE slug = ? LIMIT 1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    #[instrument(skip(self, new), fields(slug = %new.slug))]
    async fn insert_post(&self, new: NewPost) -> Result<Post, StoreError> {
        let now = ts(self.clock.now());
        let inserted = sqlx::query(
            "INSERT INTO posts (title, slug, content, category_id, source_url, meta_description, \
             is_published, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.content)
        .bind(new.category_id.get())
        .bind(new.source_url.as_deref())
        .bind(new.meta_description.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("post slug `{}` already exists", new.slug)))?;

        let id = PostId::new(inserted.last_insert_rowid());
        self.get_post(id).await?.ok_or(StoreError::NotFound {
            entity: "post",
            id: id.get(),
        })
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .map(PostRow::into_post)
            .transpose()
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id DESC");
        sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(PostRow::into_post)
            .collect()
    }

    async fn post_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ProviderStore for SqliteStore {
    #[instrument(skip(self, new), fields(name = %new.name, kind = %new.kind))]
    async fn insert_provider(&self, new: NewProvider) -> Result<ProviderConfig, StoreError> {
        let settings = serde_json::to_string(&new.settings)?;
        let mut tx = self.pool.begin().await?;
        if new.is_default {
            sqlx::query("UPDATE ai_providers SET is_default = 0")
                .execute(&mut *tx)
                .await?;
        }
        let inserted = sqlx::query(
            "INSERT INTO ai_providers (name, kind, api_key, model, base_url, settings, \
             is_active, is_default, priority, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(new.kind.as_str())
        .bind(&new.api_key)
        .bind(&new.model)
        .bind(new.base_url.as_deref())
        .bind(settings)
        .bind(new.is_active)
        .bind(new.is_default)
        .bind(i64::from(new.priority))
        .bind(new.description.as_deref())
        .bind(ts(self.clock.now()))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let id = ProviderId::new(inserted.last_insert_rowid());
        self.get_provider(id).await?.ok_or(StoreError::NotFound {
            entity: "provider",
            id: id.get(),
        })
    }

    async fn get_provider(&self, id: ProviderId) -> Result<Option<ProviderConfig>, StoreError> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM ai_providers WHERE id = ?");
        sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .map(ProviderRow::into_config)
            .transpose()
    }

    async fn list_providers(&self, active_only: bool) -> Result<Vec<ProviderConfig>, StoreError> {
        let sql = format!(
            "SELECT {PROVIDER_COLUMNS} FROM ai_providers WHERE (?1 = 0 OR is_active = 1) \
             ORDER BY priority DESC, id"
        );
        sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ProviderRow::into_config)
            .collect()
    }

    async fn default_provider(&self) -> Result<Option<ProviderConfig>, StoreError> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM ai_providers WHERE is_default = 1 LIMIT 1");
        sqlx::query_as::<_, ProviderRow>(&sql)
            .fetch_optional(&self.pool)
            .await?
            .map(ProviderRow::into_config)
            .transpose()
    }

    #[instrument(skip(self), fields(provider_id = %id))]
    async fn set_default(&self, id: ProviderId) -> Result<ProviderConfig, StoreError> {
        let mut tx = self.pool.begin().await?;
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM ai_providers WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound {
                entity: "provider",
                id: id.get(),
            });
        }
        sqlx::query("UPDATE ai_providers SET is_default = CASE WHEN id = ? THEN 1 ELSE 0 END")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get_provider(id).await?.ok_or(StoreError::NotFound {
            entity: "provider",
            id: id.get(),
        })
    }
}
