use chrono::{DateTime, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{Any, AnyPool, Executor, Row, Transaction};

use crate::config::{DatabaseConfig, DatabaseEngine};
use crate::model::{
    NewBenchmark, NewBenchmarkResult, NewDataset, NewSystem, NewSystemMetric, NewSystemPaper,
    System,
};
use crate::{Error, Result};

/// Every table in the store, in dependency order. Used for row-count
/// reporting.
pub const TABLES: &[&str] = &[
    "systems",
    "vocabulary_types",
    "functional_purposes",
    "system_vocabulary_types",
    "system_functional_purposes",
    "system_metrics",
    "system_papers",
    "datasets",
    "benchmarks",
    "benchmark_results",
    "speaker_dependency_types",
    "speech_types",
    "system_speaker_dependency",
    "system_speech_types",
];

/// DDL for the configured engine. The two backends differ only in the
/// surrogate-key and float column spellings.
fn schema_sql(engine: DatabaseEngine) -> String {
    let (pk, real) = match engine {
        DatabaseEngine::Sqlite => ("INTEGER PRIMARY KEY AUTOINCREMENT", "REAL"),
        DatabaseEngine::Postgres => ("BIGSERIAL PRIMARY KEY", "DOUBLE PRECISION"),
    };

    format!(
        r#"
CREATE TABLE IF NOT EXISTS systems (
    id {pk},
    name TEXT NOT NULL,
    developer TEXT,
    first_release_year BIGINT,
    description TEXT,
    source_url TEXT,
    license TEXT,
    architecture TEXT,
    languages TEXT,
    downloads BIGINT NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_systems_name ON systems(name);

CREATE TABLE IF NOT EXISTS vocabulary_types (
    id {pk},
    label TEXT NOT NULL UNIQUE,
    description TEXT,
    word_range TEXT
);

CREATE TABLE IF NOT EXISTS functional_purposes (
    id {pk},
    label TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS system_vocabulary_types (
    id {pk},
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    vocabulary_type_id BIGINT NOT NULL REFERENCES vocabulary_types(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS system_functional_purposes (
    id {pk},
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    functional_purpose_id BIGINT NOT NULL REFERENCES functional_purposes(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS system_metrics (
    id {pk},
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    metric_kind TEXT NOT NULL,
    value {real},
    dataset TEXT,
    language TEXT
);

CREATE INDEX IF NOT EXISTS idx_metrics_system ON system_metrics(system_id);

CREATE TABLE IF NOT EXISTS system_papers (
    id {pk},
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    arxiv_link TEXT,
    publication_year BIGINT,
    authors TEXT
);

CREATE INDEX IF NOT EXISTS idx_papers_system ON system_papers(system_id);

CREATE TABLE IF NOT EXISTS datasets (
    id {pk},
    name TEXT NOT NULL,
    description TEXT,
    size_hours {real},
    size_gb {real},
    language TEXT,
    license TEXT,
    source TEXT,
    url TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS benchmarks (
    id {pk},
    name TEXT NOT NULL,
    tasks TEXT,
    dataset TEXT,
    description TEXT,
    url TEXT,
    source TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS benchmark_results (
    id {pk},
    benchmark_id BIGINT NOT NULL REFERENCES benchmarks(id) ON DELETE CASCADE,
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    rank BIGINT,
    metric_kind TEXT NOT NULL,
    value {real},
    dataset_split TEXT,
    paper_link TEXT,
    code_link TEXT
);

CREATE INDEX IF NOT EXISTS idx_results_benchmark ON benchmark_results(benchmark_id);

CREATE TABLE IF NOT EXISTS speaker_dependency_types (
    id {pk},
    label TEXT NOT NULL UNIQUE,
    description TEXT,
    requires_training BOOLEAN NOT NULL
);

CREATE TABLE IF NOT EXISTS speech_types (
    id {pk},
    label TEXT NOT NULL UNIQUE,
    description TEXT,
    issues TEXT
);

CREATE TABLE IF NOT EXISTS system_speaker_dependency (
    id {pk},
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    speaker_dependency_id BIGINT NOT NULL REFERENCES speaker_dependency_types(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS system_speech_types (
    id {pk},
    system_id BIGINT NOT NULL REFERENCES systems(id) ON DELETE CASCADE,
    speech_type_id BIGINT NOT NULL REFERENCES speech_types(id) ON DELETE CASCADE
);
"#
    )
}

/// Handle over the relational store. One per process run; the loader
/// opens one transaction per interchange file through it.
pub struct Storage {
    pool: AnyPool,
    engine: DatabaseEngine,
}

impl Storage {
    /// Connect with the given configuration and create any missing
    /// tables.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(&config.url())
            .await?;

        let storage = Self {
            pool,
            engine: config.engine,
        };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// In-memory sqlite store, used by tests.
    pub async fn open_memory() -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self {
            pool,
            engine: DatabaseEngine::Sqlite,
        };
        storage.init_schema().await?;

        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in schema_sql(self.engine).split(';') {
            let statement = statement.trim();
            if !statement.is_empty() {
                sqlx::query(statement).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    #[must_use]
    pub fn engine(&self) -> DatabaseEngine {
        self.engine
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        Ok(self.pool.begin().await?)
    }

    /// Row counts per table, in schema order.
    pub async fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let mut counts = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            counts.push((*table, count_rows(&self.pool, table).await?));
        }
        Ok(counts)
    }
}

// Row operations. Each takes any executor so the loader can run them
// inside a file-scoped transaction while tests run them on the pool.

pub async fn count_rows<'e, E>(executor: E, table: &str) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(executor)
        .await?;
    Ok(count)
}

pub async fn insert_system<'e, E>(executor: E, system: &NewSystem) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let now = Utc::now().to_rfc3339();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO systems
            (name, developer, first_release_year, description, source_url,
             license, architecture, languages, downloads, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(&system.name)
    .bind(&system.developer)
    .bind(system.first_release_year)
    .bind(&system.description)
    .bind(&system.source_url)
    .bind(&system.license)
    .bind(&system.architecture)
    .bind(&system.languages)
    .bind(system.downloads)
    .bind(&now)
    .bind(&now)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// Exact-name lookup. When several systems share a name the lowest id
/// wins; disambiguation by an external key is an open product decision.
pub async fn find_system_id_by_name<'e, E>(executor: E, name: &str) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Any>,
{
    let id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM systems WHERE name = $1 ORDER BY id LIMIT 1")
            .bind(name)
            .fetch_optional(executor)
            .await?;
    Ok(id)
}

pub async fn get_system<'e, E>(executor: E, id: i64) -> Result<System>
where
    E: Executor<'e, Database = Any>,
{
    let row = sqlx::query(
        r#"
        SELECT id, name, developer, first_release_year, description, source_url,
               license, architecture, languages, downloads, created_at, updated_at
        FROM systems WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Error::SystemNotFound(id.to_string()))?;

    parse_system_row(&row)
}

pub async fn insert_system_metric<'e, E>(executor: E, metric: &NewSystemMetric) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO system_metrics (system_id, metric_kind, value, dataset, language)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(metric.system_id)
    .bind(&metric.metric_kind)
    .bind(metric.value)
    .bind(&metric.dataset)
    .bind(&metric.language)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

pub async fn insert_system_paper<'e, E>(executor: E, paper: &NewSystemPaper) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO system_papers (system_id, title, arxiv_link, publication_year, authors)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(paper.system_id)
    .bind(&paper.title)
    .bind(&paper.arxiv_link)
    .bind(paper.publication_year)
    .bind(&paper.authors)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

pub async fn insert_dataset<'e, E>(executor: E, dataset: &NewDataset) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO datasets
            (name, description, size_hours, size_gb, language, license, source, url, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(&dataset.name)
    .bind(&dataset.description)
    .bind(dataset.size_hours)
    .bind(dataset.size_gb)
    .bind(&dataset.language)
    .bind(&dataset.license)
    .bind(&dataset.source)
    .bind(&dataset.url)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(executor)
    .await?;

    Ok(id)
}

pub async fn insert_benchmark<'e, E>(executor: E, benchmark: &NewBenchmark) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO benchmarks (name, tasks, dataset, description, url, source, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&benchmark.name)
    .bind(&benchmark.tasks)
    .bind(&benchmark.dataset)
    .bind(&benchmark.description)
    .bind(&benchmark.url)
    .bind(&benchmark.source)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(executor)
    .await?;

    Ok(id)
}

pub async fn insert_benchmark_result<'e, E>(
    executor: E,
    result: &NewBenchmarkResult,
) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO benchmark_results
            (benchmark_id, system_id, rank, metric_kind, value, dataset_split,
             paper_link, code_link)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(result.benchmark_id)
    .bind(result.system_id)
    .bind(result.rank)
    .bind(&result.metric_kind)
    .bind(result.value)
    .bind(&result.dataset_split)
    .bind(&result.paper_link)
    .bind(&result.code_link)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

// Reference tables. Label uniqueness is enforced at the application
// level with query-before-insert; the UNIQUE constraint is a backstop.

pub async fn find_label_id<'e, E>(executor: E, table: &str, label: &str) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Any>,
{
    let id: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE label = $1"))
        .bind(label)
        .fetch_optional(executor)
        .await?;
    Ok(id)
}

pub async fn insert_vocabulary_type<'e, E>(
    executor: E,
    label: &str,
    description: &str,
    word_range: &str,
) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO vocabulary_types (label, description, word_range) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(label)
    .bind(description)
    .bind(word_range)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn insert_functional_purpose<'e, E>(
    executor: E,
    label: &str,
    description: &str,
) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO functional_purposes (label, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(label)
    .bind(description)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn insert_speaker_dependency_type<'e, E>(
    executor: E,
    label: &str,
    description: &str,
    requires_training: bool,
) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO speaker_dependency_types (label, description, requires_training)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(label)
    .bind(description)
    .bind(requires_training)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn insert_speech_type<'e, E>(
    executor: E,
    label: &str,
    description: &str,
    issues: &str,
) -> Result<i64>
where
    E: Executor<'e, Database = Any>,
{
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO speech_types (label, description, issues) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(label)
    .bind(description)
    .bind(issues)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

// Many-to-many links. Vocabulary and purpose links insert blindly;
// taxonomy links are guarded by an existence check so repeated
// characteristics loads never duplicate them.

pub async fn link_system_vocabulary<'e, E>(
    executor: E,
    system_id: i64,
    vocabulary_type_id: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query(
        "INSERT INTO system_vocabulary_types (system_id, vocabulary_type_id) VALUES ($1, $2)",
    )
    .bind(system_id)
    .bind(vocabulary_type_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn link_system_purpose<'e, E>(
    executor: E,
    system_id: i64,
    functional_purpose_id: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query(
        "INSERT INTO system_functional_purposes (system_id, functional_purpose_id) VALUES ($1, $2)",
    )
    .bind(system_id)
    .bind(functional_purpose_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn has_speaker_link<'e, E>(
    executor: E,
    system_id: i64,
    speaker_dependency_id: i64,
) -> Result<bool>
where
    E: Executor<'e, Database = Any>,
{
    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM system_speaker_dependency
        WHERE system_id = $1 AND speaker_dependency_id = $2
        LIMIT 1
        "#,
    )
    .bind(system_id)
    .bind(speaker_dependency_id)
    .fetch_optional(executor)
    .await?;
    Ok(id.is_some())
}

pub async fn link_system_speaker<'e, E>(
    executor: E,
    system_id: i64,
    speaker_dependency_id: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query(
        "INSERT INTO system_speaker_dependency (system_id, speaker_dependency_id) VALUES ($1, $2)",
    )
    .bind(system_id)
    .bind(speaker_dependency_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn has_speech_link<'e, E>(executor: E, system_id: i64, speech_type_id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Any>,
{
    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM system_speech_types
        WHERE system_id = $1 AND speech_type_id = $2
        LIMIT 1
        "#,
    )
    .bind(system_id)
    .bind(speech_type_id)
    .fetch_optional(executor)
    .await?;
    Ok(id.is_some())
}

pub async fn link_system_speech<'e, E>(executor: E, system_id: i64, speech_type_id: i64) -> Result<()>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query("INSERT INTO system_speech_types (system_id, speech_type_id) VALUES ($1, $2)")
        .bind(system_id)
        .bind(speech_type_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Vocabulary labels linked to a system, for lookups after a load.
pub async fn system_vocabulary_labels<'e, E>(executor: E, system_id: i64) -> Result<Vec<String>>
where
    E: Executor<'e, Database = Any>,
{
    let labels: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT v.label
        FROM vocabulary_types v
        JOIN system_vocabulary_types sv ON sv.vocabulary_type_id = v.id
        WHERE sv.system_id = $1
        ORDER BY v.label
        "#,
    )
    .bind(system_id)
    .fetch_all(executor)
    .await?;
    Ok(labels)
}

fn parse_system_row(row: &AnyRow) -> Result<System> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(System {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        developer: row.try_get("developer")?,
        first_release_year: row.try_get("first_release_year")?,
        description: row.try_get("description")?,
        source_url: row.try_get("source_url")?,
        license: row.try_get("license")?,
        architecture: row.try_get("architecture")?,
        languages: row.try_get("languages")?,
        downloads: row.try_get("downloads")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_insert_and_lookup() {
        let storage = Storage::open_memory().await.unwrap();

        let system = NewSystem::new("Whisper")
            .with_developer("openai")
            .with_architecture("whisper-large")
            .with_downloads(1000);

        let id = insert_system(storage.pool(), &system).await.unwrap();
        assert!(id > 0);

        let found = find_system_id_by_name(storage.pool(), "Whisper").await.unwrap();
        assert_eq!(found, Some(id));

        let missing = find_system_id_by_name(storage.pool(), "Kaldi").await.unwrap();
        assert_eq!(missing, None);

        let loaded = get_system(storage.pool(), id).await.unwrap();
        assert_eq!(loaded.name, "Whisper");
        assert_eq!(loaded.developer.as_deref(), Some("openai"));
        assert_eq!(loaded.downloads, 1000);
    }

    #[tokio::test]
    async fn test_duplicate_names_first_id_wins() {
        let storage = Storage::open_memory().await.unwrap();

        let first = insert_system(storage.pool(), &NewSystem::new("Conformer"))
            .await
            .unwrap();
        let second = insert_system(storage.pool(), &NewSystem::new("Conformer"))
            .await
            .unwrap();
        assert_ne!(first, second);

        let found = find_system_id_by_name(storage.pool(), "Conformer").await.unwrap();
        assert_eq!(found, Some(first));
    }

    #[tokio::test]
    async fn test_reference_label_lookup() {
        let storage = Storage::open_memory().await.unwrap();

        let id = insert_vocabulary_type(storage.pool(), "medium", "Mid-size vocabulary", "1000-10000 words")
            .await
            .unwrap();

        let found = find_label_id(storage.pool(), "vocabulary_types", "medium")
            .await
            .unwrap();
        assert_eq!(found, Some(id));

        let missing = find_label_id(storage.pool(), "vocabulary_types", "huge")
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_cascade_delete_papers() {
        let storage = Storage::open_memory().await.unwrap();

        // Foreign keys are off by default in sqlite sessions.
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(storage.pool())
            .await
            .unwrap();

        let id = insert_system(storage.pool(), &NewSystem::new("Tacotron"))
            .await
            .unwrap();
        insert_system_paper(
            storage.pool(),
            &NewSystemPaper::new(id, "Tacotron: Towards End-to-End Speech Synthesis"),
        )
        .await
        .unwrap();

        assert_eq!(count_rows(storage.pool(), "system_papers").await.unwrap(), 1);

        sqlx::query("DELETE FROM systems WHERE id = $1")
            .bind(id)
            .execute(storage.pool())
            .await
            .unwrap();

        assert_eq!(count_rows(storage.pool(), "system_papers").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_taxonomy_link_existence_check() {
        let storage = Storage::open_memory().await.unwrap();

        let system_id = insert_system(storage.pool(), &NewSystem::new("DeepSpeech"))
            .await
            .unwrap();
        let dep_id = insert_speaker_dependency_type(
            storage.pool(),
            "independent",
            "Works for any speaker without enrollment",
            false,
        )
        .await
        .unwrap();

        assert!(!has_speaker_link(storage.pool(), system_id, dep_id).await.unwrap());
        link_system_speaker(storage.pool(), system_id, dep_id).await.unwrap();
        assert!(has_speaker_link(storage.pool(), system_id, dep_id).await.unwrap());
    }
}
