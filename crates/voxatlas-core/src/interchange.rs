//! Record shapes shared between collectors and the loader.
//!
//! A collector run produces two pretty-printed JSON files per source:
//! `<source>_data_<stamp>.json` holding one flat array of records, and a
//! sibling `<source>_summary_<stamp>.json` with aggregate counts. Every
//! record field carries a serde default so consumers can treat all of
//! them as optional.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::SystemKind;
use crate::Result;

/// An arXiv link harvested from a model description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperRef {
    #[serde(default)]
    pub arxiv_link: String,
    #[serde(default)]
    pub source: String,
}

/// One normalized model-registry record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub author_organization: String,
    #[serde(default)]
    pub system_type: SystemKind,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub downloads: i64,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pipeline_tags: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_url: String,
    #[serde(default)]
    pub papers: Vec<PaperRef>,
}

/// One normalized dataset-registry record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetRecord {
    #[serde(default)]
    pub dataset_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size_hours: Option<f64>,
    #[serde(default)]
    pub size_gb: Option<f64>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub downloads: i64,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dataset_type: String,
}

/// One metric mined from free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinedMetric {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub language: String,
}

/// One normalized paper-search record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(default)]
    pub paper_title: String,
    #[serde(default)]
    pub arxiv_link: Option<String>,
    #[serde(default)]
    pub arxiv_id: String,
    #[serde(default)]
    pub publication_year: Option<i64>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub system_type: SystemKind,
    #[serde(default)]
    pub metrics: Vec<MinedMetric>,
    #[serde(default)]
    pub model_name: String,
}

/// One metric within a leaderboard entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetric {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub dataset_split: String,
}

/// One ranked leaderboard entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub metrics: Vec<ResultMetric>,
    #[serde(default)]
    pub paper_link: String,
    #[serde(default)]
    pub code_link: String,
    #[serde(default)]
    pub submission_date: String,
}

/// One normalized benchmark (a task/dataset leaderboard with results).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(default)]
    pub benchmark_name: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub results: Vec<LeaderboardEntry>,
}

/// Taxonomy labels mined from a system description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacteristicsRecord {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub speaker_dependency_types: Vec<String>,
    #[serde(default)]
    pub speech_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSummary {
    pub total_models: usize,
    pub asr_models: usize,
    pub tts_models: usize,
    pub audio_to_audio_models: usize,
    pub collection_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_datasets: usize,
    pub huggingface_datasets: usize,
    pub openslr_datasets: usize,
    pub total_hours: f64,
    pub total_gb: f64,
    pub collection_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperSummary {
    pub total_papers: usize,
    pub asr_papers: usize,
    pub tts_papers: usize,
    pub voice_cloning_papers: usize,
    pub papers_with_metrics: usize,
    pub collection_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub total_benchmarks: usize,
    pub total_results: usize,
    pub asr_benchmarks: usize,
    pub tts_benchmarks: usize,
    pub collection_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacteristicsSummary {
    pub total_records: usize,
    pub with_speaker_dependency: usize,
    pub with_speech_type: usize,
    pub collection_date: String,
}

/// Paths of the two files a collector run produced.
#[derive(Debug, Clone)]
pub struct BatchPaths {
    pub data: PathBuf,
    pub summary: PathBuf,
}

/// RFC 3339 timestamp for summary payloads.
#[must_use]
pub fn collection_date() -> String {
    Utc::now().to_rfc3339()
}

fn file_stamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Write a record batch and its summary under timestamped names.
pub fn write_batch<R, S>(dir: &Path, source: &str, records: &[R], summary: &S) -> Result<BatchPaths>
where
    R: Serialize,
    S: Serialize,
{
    fs::create_dir_all(dir)?;
    let stamp = file_stamp();

    let data = dir.join(format!("{source}_data_{stamp}.json"));
    fs::write(&data, serde_json::to_string_pretty(records)?)?;

    let summary_path = dir.join(format!("{source}_summary_{stamp}.json"));
    fs::write(&summary_path, serde_json::to_string_pretty(summary)?)?;

    Ok(BatchPaths {
        data,
        summary: summary_path,
    })
}

/// Read a record array back from an interchange file.
pub fn read_records<T>(path: &Path) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fields_default_when_missing() {
        // Consumers must tolerate arbitrarily sparse records.
        let record: ModelRecord = serde_json::from_str(r#"{"model_name": "Whisper"}"#).unwrap();

        assert_eq!(record.model_name, "Whisper");
        assert_eq!(record.system_type, SystemKind::Unknown);
        assert_eq!(record.downloads, 0);
        assert!(record.languages.is_empty());
        assert!(record.papers.is_empty());
    }

    #[test]
    fn test_metric_kind_field_renamed() {
        let metric = MinedMetric {
            kind: "WER".to_string(),
            value: 2.5,
            dataset: "Librispeech".to_string(),
            language: "en".to_string(),
        };

        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["type"], "WER");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_write_and_read_batch() {
        let dir = tempfile::tempdir().unwrap();

        let records = vec![
            DatasetRecord {
                dataset_name: "LibriSpeech".to_string(),
                size_hours: Some(1000.0),
                ..Default::default()
            },
            DatasetRecord {
                dataset_name: "VoxForge".to_string(),
                ..Default::default()
            },
        ];
        let summary = DatasetSummary {
            total_datasets: 2,
            total_hours: 1000.0,
            collection_date: collection_date(),
            ..Default::default()
        };

        let paths = write_batch(dir.path(), "datasets", &records, &summary).unwrap();
        assert!(paths.data.file_name().unwrap().to_str().unwrap().starts_with("datasets_data_"));
        assert!(paths
            .summary
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("datasets_summary_"));

        let loaded: Vec<DatasetRecord> = read_records(&paths.data).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].dataset_name, "LibriSpeech");
        assert_eq!(loaded[0].size_hours, Some(1000.0));
    }
}
