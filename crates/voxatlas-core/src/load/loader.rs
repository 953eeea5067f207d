//! Interchange-file loader.
//!
//! One transaction per file, committed once at the end; inside the file
//! every record is isolated, so a bad element is logged under its
//! natural key and skipped while the rest of the file still lands. A
//! crash before the commit loses the whole file's progress.

use std::path::{Path, PathBuf};

use sqlx::{Any, AnyConnection, Transaction};
use tracing::{info, warn};

use super::context::ReferenceCache;
use crate::extract::classify::{first_match, KeywordRule, PIPELINE_ASR, PIPELINE_TTS};
use crate::interchange::{
    self, BenchmarkRecord, CharacteristicsRecord, DatasetRecord, ModelRecord, PaperRecord,
};
use crate::model::{
    NewBenchmark, NewBenchmarkResult, NewDataset, NewSystem, NewSystemMetric, NewSystemPaper,
    SystemKind,
};
use crate::storage::{self, Storage};
use crate::{Error, Result};

/// Developer label for systems synthesized from a bare name reference.
pub const UNKNOWN_DEVELOPER: &str = "Unknown";

struct VocabularySeed {
    label: &'static str,
    description: &'static str,
    word_range: &'static str,
}

const VOCABULARY_SEEDS: [VocabularySeed; 3] = [
    VocabularySeed {
        label: "small",
        description: "Systems with a restricted command vocabulary",
        word_range: "up to 1,000 words",
    },
    VocabularySeed {
        label: "medium",
        description: "Systems with a mid-size vocabulary",
        word_range: "1,000-10,000 words",
    },
    VocabularySeed {
        label: "large (LVCSR)",
        description: "Large Vocabulary Continuous Speech Recognition",
        word_range: "10,000+ words",
    },
];

const PURPOSE_SEEDS: [(&str, &str); 4] = [
    ("command", "Recognition of spoken commands"),
    ("dictation", "Speech-to-text transcription for dictation"),
    (
        "understanding (SLU)",
        "Spoken Language Understanding - extracting meaning from speech",
    ),
    ("dialogue", "Conversational systems and voice assistants"),
];

const SPEAKER_SEEDS: [(&str, &str, bool); 3] = [
    (
        "dependent",
        "Requires training on the target speaker's voice",
        true,
    ),
    (
        "independent",
        "Works for any speaker without prior enrollment",
        false,
    ),
    (
        "adaptive",
        "Adapts to the speaker's voice during use",
        true,
    ),
];

const SPEECH_SEEDS: [(&str, &str, &str); 3] = [
    (
        "discrete",
        "Recognition of isolated words",
        "Restricted vocabulary, needs deliberate articulation",
    ),
    (
        "continuous",
        "Recognition of connected natural speech",
        "Needs segmentation, word boundaries are ambiguous",
    ),
    (
        "spontaneous",
        "Recognition of unprepared speech with pauses and disfluencies",
        "Noise, unfinished phrases, colloquial contractions",
    ),
];

/// Vocabulary class assigned from the architecture label. Chain order is
/// load-bearing; no match falls through to "medium".
const VOCABULARY_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        label: "large (LVCSR)",
        keywords: &["whisper", "wav2vec"],
    },
    KeywordRule {
        label: "medium",
        keywords: &["tacotron", "fastspeech"],
    },
];

fn vocabulary_label(architecture: &str) -> &'static str {
    first_match(VOCABULARY_RULES, architecture).unwrap_or("medium")
}

fn purpose_labels(record: &ModelRecord) -> Vec<&'static str> {
    let mut labels = Vec::new();

    if record.system_type == SystemKind::Asr
        || record.pipeline_tags.iter().any(|t| t == PIPELINE_ASR)
    {
        labels.push("dictation");
    }
    if record.system_type == SystemKind::Tts
        || record.pipeline_tags.iter().any(|t| t == PIPELINE_TTS)
    {
        labels.push("dialogue");
    }

    labels
}

/// Four-digit year prefix of a date string, when present.
fn parse_year_prefix(date: &str) -> Option<i64> {
    date.get(..4).and_then(|year| year.parse().ok())
}

/// Counters for one load call. Skipped covers records dropped by the
/// per-record isolation, not files that failed to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

impl LoadStats {
    pub fn merge(&mut self, other: Self) {
        self.loaded += other.loaded;
        self.skipped += other.skipped;
    }
}

/// Drives interchange files into the store. Holds the reference cache
/// built by the seeding pass for the lifetime of the run.
pub struct Loader<'a> {
    storage: &'a Storage,
    cache: ReferenceCache,
}

impl<'a> Loader<'a> {
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            cache: ReferenceCache::new(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Seed all four reference tables. Idempotent: rows are matched by
    /// label and reused, so repeated runs never duplicate them.
    pub async fn seed_reference_tables(&mut self) -> Result<()> {
        self.seed_vocabulary_types().await?;
        self.seed_functional_purposes().await?;
        self.seed_speaker_dependency_types().await?;
        self.seed_speech_types().await?;
        Ok(())
    }

    pub async fn seed_vocabulary_types(&mut self) -> Result<()> {
        for seed in &VOCABULARY_SEEDS {
            let id = match storage::find_label_id(self.storage.pool(), "vocabulary_types", seed.label)
                .await?
            {
                Some(id) => id,
                None => {
                    storage::insert_vocabulary_type(
                        self.storage.pool(),
                        seed.label,
                        seed.description,
                        seed.word_range,
                    )
                    .await?
                }
            };
            self.cache.insert_vocabulary(seed.label, id);
        }

        info!(count = VOCABULARY_SEEDS.len(), "vocabulary types seeded");
        Ok(())
    }

    pub async fn seed_functional_purposes(&mut self) -> Result<()> {
        for (label, description) in &PURPOSE_SEEDS {
            let id = match storage::find_label_id(self.storage.pool(), "functional_purposes", label)
                .await?
            {
                Some(id) => id,
                None => {
                    storage::insert_functional_purpose(self.storage.pool(), label, description)
                        .await?
                }
            };
            self.cache.insert_purpose(*label, id);
        }

        info!(count = PURPOSE_SEEDS.len(), "functional purposes seeded");
        Ok(())
    }

    pub async fn seed_speaker_dependency_types(&mut self) -> Result<()> {
        for (label, description, requires_training) in &SPEAKER_SEEDS {
            let id = match storage::find_label_id(
                self.storage.pool(),
                "speaker_dependency_types",
                label,
            )
            .await?
            {
                Some(id) => id,
                None => {
                    storage::insert_speaker_dependency_type(
                        self.storage.pool(),
                        label,
                        description,
                        *requires_training,
                    )
                    .await?
                }
            };
            self.cache.insert_speaker_dependency(*label, id);
        }

        info!(count = SPEAKER_SEEDS.len(), "speaker dependency types seeded");
        Ok(())
    }

    pub async fn seed_speech_types(&mut self) -> Result<()> {
        for (label, description, issues) in &SPEECH_SEEDS {
            let id = match storage::find_label_id(self.storage.pool(), "speech_types", label).await? {
                Some(id) => id,
                None => {
                    storage::insert_speech_type(self.storage.pool(), label, description, issues)
                        .await?
                }
            };
            self.cache.insert_speech_type(*label, id);
        }

        info!(count = SPEECH_SEEDS.len(), "speech types seeded");
        Ok(())
    }

    pub async fn load_models_file(&self, path: &Path) -> Result<LoadStats> {
        let records: Vec<ModelRecord> = interchange::read_records(path)?;
        let mut tx = self.storage.begin().await?;
        let mut stats = LoadStats::default();

        for record in &records {
            match self.load_model_record(&mut tx, record).await {
                Ok(()) => stats.loaded += 1,
                Err(error) => {
                    warn!(model = %record.model_name, %error, "skipping model record");
                    stats.skipped += 1;
                }
            }
        }

        tx.commit().await?;
        info!(file = %path.display(), loaded = stats.loaded, skipped = stats.skipped, "models loaded");
        Ok(stats)
    }

    async fn load_model_record(
        &self,
        tx: &mut Transaction<'static, Any>,
        record: &ModelRecord,
    ) -> Result<()> {
        if record.model_name.trim().is_empty() {
            return Err(Error::MissingField {
                record: "model",
                field: "model_name",
            });
        }

        let mut system = NewSystem::new(&record.model_name)
            .with_developer(&record.author_organization)
            .with_description(&record.description)
            .with_source_url(&record.model_url)
            .with_license(&record.license)
            .with_architecture(&record.architecture)
            .with_languages(record.languages.join(", "))
            .with_downloads(record.downloads);
        if let Some(year) = parse_year_prefix(&record.created_date) {
            system = system.with_first_release_year(year);
        }

        let system_id = storage::insert_system(&mut **tx, &system).await?;

        if let Some(vocabulary_id) = self.cache.vocabulary(vocabulary_label(&record.architecture)) {
            storage::link_system_vocabulary(&mut **tx, system_id, vocabulary_id).await?;
        }

        for label in purpose_labels(record) {
            if let Some(purpose_id) = self.cache.purpose(label) {
                storage::link_system_purpose(&mut **tx, system_id, purpose_id).await?;
            }
        }

        for paper in &record.papers {
            let paper = NewSystemPaper::new(system_id, format!("Paper for {}", record.model_name))
                .with_arxiv_link(&paper.arxiv_link)
                .with_authors(UNKNOWN_DEVELOPER);
            storage::insert_system_paper(&mut **tx, &paper).await?;
        }

        Ok(())
    }

    pub async fn load_datasets_file(&self, path: &Path) -> Result<LoadStats> {
        let records: Vec<DatasetRecord> = interchange::read_records(path)?;
        let mut tx = self.storage.begin().await?;
        let mut stats = LoadStats::default();

        for record in &records {
            match load_dataset_record(&mut tx, record).await {
                Ok(()) => stats.loaded += 1,
                Err(error) => {
                    warn!(dataset = %record.dataset_name, %error, "skipping dataset record");
                    stats.skipped += 1;
                }
            }
        }

        tx.commit().await?;
        info!(file = %path.display(), loaded = stats.loaded, skipped = stats.skipped, "datasets loaded");
        Ok(stats)
    }

    pub async fn load_papers_file(&self, path: &Path) -> Result<LoadStats> {
        let records: Vec<PaperRecord> = interchange::read_records(path)?;
        let mut tx = self.storage.begin().await?;
        let mut stats = LoadStats::default();

        for record in &records {
            match load_paper_record(&mut tx, record).await {
                Ok(()) => stats.loaded += 1,
                Err(error) => {
                    warn!(paper = %record.paper_title, %error, "skipping paper record");
                    stats.skipped += 1;
                }
            }
        }

        tx.commit().await?;
        info!(file = %path.display(), loaded = stats.loaded, skipped = stats.skipped, "papers loaded");
        Ok(stats)
    }

    pub async fn load_benchmarks_file(&self, path: &Path) -> Result<LoadStats> {
        let records: Vec<BenchmarkRecord> = interchange::read_records(path)?;
        let mut tx = self.storage.begin().await?;
        let mut stats = LoadStats::default();

        for record in &records {
            match load_benchmark_record(&mut tx, record).await {
                Ok(()) => stats.loaded += 1,
                Err(error) => {
                    warn!(benchmark = %record.benchmark_name, %error, "skipping benchmark record");
                    stats.skipped += 1;
                }
            }
        }

        tx.commit().await?;
        info!(file = %path.display(), loaded = stats.loaded, skipped = stats.skipped, "benchmarks loaded");
        Ok(stats)
    }

    pub async fn load_characteristics_file(&self, path: &Path) -> Result<LoadStats> {
        let records: Vec<CharacteristicsRecord> = interchange::read_records(path)?;
        let mut tx = self.storage.begin().await?;
        let mut stats = LoadStats::default();

        for record in &records {
            match self.load_characteristics_record(&mut tx, record).await {
                Ok(()) => stats.loaded += 1,
                Err(error) => {
                    warn!(model = %record.model_name, %error, "skipping characteristics record");
                    stats.skipped += 1;
                }
            }
        }

        tx.commit().await?;
        info!(file = %path.display(), loaded = stats.loaded, skipped = stats.skipped, "characteristics loaded");
        Ok(stats)
    }

    async fn load_characteristics_record(
        &self,
        tx: &mut Transaction<'static, Any>,
        record: &CharacteristicsRecord,
    ) -> Result<()> {
        if record.model_name.trim().is_empty() {
            return Err(Error::MissingField {
                record: "characteristics",
                field: "model_name",
            });
        }

        // Unlike papers and benchmark results, characteristics never
        // synthesize a placeholder system.
        let Some(system_id) =
            storage::find_system_id_by_name(&mut **tx, &record.model_name).await?
        else {
            return Err(Error::SystemNotFound(record.model_name.clone()));
        };

        for label in &record.speaker_dependency_types {
            let Some(dependency_id) = self.cache.speaker_dependency(label) else {
                continue;
            };
            if !storage::has_speaker_link(&mut **tx, system_id, dependency_id).await? {
                storage::link_system_speaker(&mut **tx, system_id, dependency_id).await?;
            }
        }

        for label in &record.speech_types {
            let Some(speech_id) = self.cache.speech_type(label) else {
                continue;
            };
            if !storage::has_speech_link(&mut **tx, system_id, speech_id).await? {
                storage::link_system_speech(&mut **tx, system_id, speech_id).await?;
            }
        }

        Ok(())
    }

    /// Seed, then discover and load every interchange data file under
    /// `dir`. Sources load in dependency order (systems first, name
    /// references last); within a source, files load in name order.
    pub async fn load_directory(&mut self, dir: &Path) -> Result<LoadStats> {
        const SOURCE_ORDER: [&str; 5] = [
            "models_data_",
            "datasets_data_",
            "papers_data_",
            "benchmarks_data_",
            "characteristics_data_",
        ];

        info!(dir = %dir.display(), "starting full load");
        self.seed_reference_tables().await?;

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut total = LoadStats::default();
        for prefix in SOURCE_ORDER {
            for path in &paths {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if !name.starts_with(prefix) {
                    // Summary files and anything else are not loadable.
                    continue;
                }

                let stats = match prefix {
                    "models_data_" => self.load_models_file(path).await?,
                    "datasets_data_" => self.load_datasets_file(path).await?,
                    "papers_data_" => self.load_papers_file(path).await?,
                    "benchmarks_data_" => self.load_benchmarks_file(path).await?,
                    _ => self.load_characteristics_file(path).await?,
                };
                total.merge(stats);
            }
        }

        info!(loaded = total.loaded, skipped = total.skipped, "full load finished");
        Ok(total)
    }
}

async fn load_dataset_record(
    tx: &mut Transaction<'static, Any>,
    record: &DatasetRecord,
) -> Result<()> {
    if record.dataset_name.trim().is_empty() {
        return Err(Error::MissingField {
            record: "dataset",
            field: "dataset_name",
        });
    }

    let mut dataset = NewDataset::new(&record.dataset_name)
        .with_description(&record.description)
        .with_language(&record.language)
        .with_license(&record.license)
        .with_source(&record.source)
        .with_url(&record.url);
    if let Some(hours) = record.size_hours {
        dataset = dataset.with_size_hours(hours);
    }
    if let Some(gb) = record.size_gb {
        dataset = dataset.with_size_gb(gb);
    }

    storage::insert_dataset(&mut **tx, &dataset).await?;
    Ok(())
}

async fn load_paper_record(
    tx: &mut Transaction<'static, Any>,
    record: &PaperRecord,
) -> Result<()> {
    if record.model_name.trim().is_empty() {
        return Err(Error::MissingField {
            record: "paper",
            field: "model_name",
        });
    }

    let system_id = resolve_or_create_system(
        tx,
        &record.model_name,
        format!("System from paper {}", record.paper_title),
    )
    .await?;

    let mut paper = NewSystemPaper::new(system_id, &record.paper_title)
        .with_authors(record.authors.join(", "));
    if let Some(link) = &record.arxiv_link {
        paper = paper.with_arxiv_link(link);
    }
    if let Some(year) = record.publication_year {
        paper = paper.with_publication_year(year);
    }
    storage::insert_system_paper(&mut **tx, &paper).await?;

    for metric in &record.metrics {
        let metric_row = NewSystemMetric::new(system_id, &metric.kind)
            .with_value(metric.value)
            .with_dataset(&metric.dataset)
            .with_language(&metric.language);
        storage::insert_system_metric(&mut **tx, &metric_row).await?;
    }

    Ok(())
}

async fn load_benchmark_record(
    tx: &mut Transaction<'static, Any>,
    record: &BenchmarkRecord,
) -> Result<()> {
    if record.benchmark_name.trim().is_empty() {
        return Err(Error::MissingField {
            record: "benchmark",
            field: "benchmark_name",
        });
    }

    let benchmark = NewBenchmark::new(&record.benchmark_name)
        .with_tasks(record.tasks.join(", "))
        .with_dataset(&record.dataset)
        .with_description(&record.description)
        .with_url(&record.url)
        .with_source(&record.source);
    let benchmark_id = storage::insert_benchmark(&mut **tx, &benchmark).await?;

    for entry in &record.results {
        if entry.model_name.trim().is_empty() {
            warn!(benchmark = %record.benchmark_name, rank = entry.rank, "result without a system name, skipping");
            continue;
        }

        let system_id = resolve_or_create_system(
            tx,
            &entry.model_name,
            format!("System from benchmark {}", record.benchmark_name),
        )
        .await?;

        for metric in &entry.metrics {
            let result = NewBenchmarkResult::new(benchmark_id, system_id, &metric.kind)
                .with_rank(entry.rank)
                .with_value(metric.value)
                .with_dataset_split(&metric.dataset_split)
                .with_paper_link(&entry.paper_link)
                .with_code_link(&entry.code_link);
            storage::insert_benchmark_result(&mut **tx, &result).await?;
        }
    }

    Ok(())
}

/// Exact-name resolution; a miss synthesizes a placeholder system with
/// the "Unknown" developer label.
async fn resolve_or_create_system(
    conn: &mut AnyConnection,
    name: &str,
    description: String,
) -> Result<i64> {
    if let Some(id) = storage::find_system_id_by_name(&mut *conn, name).await? {
        return Ok(id);
    }

    let system = NewSystem::new(name)
        .with_developer(UNKNOWN_DEVELOPER)
        .with_description(description);
    storage::insert_system(&mut *conn, &system).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::count_rows;

    #[test]
    fn test_vocabulary_label_chain() {
        assert_eq!(vocabulary_label("whisper-small"), "large (LVCSR)");
        assert_eq!(vocabulary_label("Wav2Vec2-XLSR"), "large (LVCSR)");
        assert_eq!(vocabulary_label("tacotron2"), "medium");
        assert_eq!(vocabulary_label("fastspeech2"), "medium");
        assert_eq!(vocabulary_label("conformer"), "medium");
        assert_eq!(vocabulary_label(""), "medium");
    }

    #[test]
    fn test_purpose_labels() {
        let record = ModelRecord {
            system_type: SystemKind::Asr,
            ..Default::default()
        };
        assert_eq!(purpose_labels(&record), vec!["dictation"]);

        let record = ModelRecord {
            system_type: SystemKind::Unknown,
            pipeline_tags: vec![PIPELINE_TTS.to_string()],
            ..Default::default()
        };
        assert_eq!(purpose_labels(&record), vec!["dialogue"]);

        let record = ModelRecord::default();
        assert!(purpose_labels(&record).is_empty());
    }

    #[test]
    fn test_parse_year_prefix() {
        assert_eq!(parse_year_prefix("2022-05-01"), Some(2022));
        assert_eq!(parse_year_prefix("1998"), Some(1998));
        assert_eq!(parse_year_prefix("05-2022"), None);
        assert_eq!(parse_year_prefix(""), None);
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let storage = Storage::open_memory().await.unwrap();
        let mut loader = Loader::new(&storage);

        loader.seed_reference_tables().await.unwrap();
        let first_counts = reference_counts(&storage).await;
        assert_eq!(first_counts, (3, 4, 3, 3));
        assert!(loader.cache().is_seeded());

        loader.seed_reference_tables().await.unwrap();
        loader.seed_reference_tables().await.unwrap();
        assert_eq!(reference_counts(&storage).await, first_counts);

        // A fresh loader against the same store reuses the rows too.
        let mut second = Loader::new(&storage);
        second.seed_reference_tables().await.unwrap();
        assert_eq!(reference_counts(&storage).await, first_counts);
        assert_eq!(
            second.cache().vocabulary("large (LVCSR)"),
            loader.cache().vocabulary("large (LVCSR)")
        );
    }

    async fn reference_counts(storage: &Storage) -> (i64, i64, i64, i64) {
        (
            count_rows(storage.pool(), "vocabulary_types").await.unwrap(),
            count_rows(storage.pool(), "functional_purposes").await.unwrap(),
            count_rows(storage.pool(), "speaker_dependency_types").await.unwrap(),
            count_rows(storage.pool(), "speech_types").await.unwrap(),
        )
    }
}
