use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad task family of a speech system, decided by classification chains
/// over registry tags or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SystemKind {
    Asr,
    Tts,
    AudioToAudio,
    VoiceCloning,
    #[default]
    Unknown,
}

impl SystemKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asr => "ASR",
            Self::Tts => "TTS",
            Self::AudioToAudio => "Audio-to-Audio",
            Self::VoiceCloning => "Voice Cloning",
            Self::Unknown => "unknown",
        }
    }

    /// Interchange files may carry labels written by other tools;
    /// anything unrecognized degrades to unknown.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "ASR" => Self::Asr,
            "TTS" => Self::Tts,
            "Audio-to-Audio" => Self::AudioToAudio,
            "Voice Cloning" => Self::VoiceCloning,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SystemKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SystemKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Performance metric families mined from free text. Leaderboard payloads
/// may carry arbitrary metric names; those stay plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "WER")]
    Wer,
    #[serde(rename = "CER")]
    Cer,
    #[serde(rename = "MOS")]
    Mos,
    #[serde(rename = "BLEU")]
    Bleu,
}

impl MetricKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wer => "WER",
            Self::Cer => "CER",
            Self::Mos => "MOS",
            Self::Bleu => "BLEU",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WER" => Ok(Self::Wer),
            "CER" => Ok(Self::Cer),
            "MOS" => Ok(Self::Mos),
            "BLEU" => Ok(Self::Bleu),
            _ => Err(crate::Error::UnknownMetricKind(s.to_string())),
        }
    }
}

/// A stored speech system row. Names are not unique; duplicate rows for
/// the same name are tolerated by every consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct System {
    pub id: i64,
    pub name: String,
    pub developer: Option<String>,
    pub first_release_year: Option<i64>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub license: Option<String>,
    pub architecture: Option<String>,
    pub languages: Option<String>,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert record for a system. The name is the only required field;
/// everything else defaults to NULL (downloads to 0).
#[derive(Debug, Clone, Default)]
pub struct NewSystem {
    pub name: String,
    pub developer: Option<String>,
    pub first_release_year: Option<i64>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub license: Option<String>,
    pub architecture: Option<String>,
    pub languages: Option<String>,
    pub downloads: i64,
}

impl NewSystem {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_developer(mut self, developer: impl Into<String>) -> Self {
        self.developer = Some(developer.into());
        self
    }

    #[must_use]
    pub fn with_first_release_year(mut self, year: i64) -> Self {
        self.first_release_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    #[must_use]
    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    #[must_use]
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = Some(languages.into());
        self
    }

    #[must_use]
    pub fn with_downloads(mut self, downloads: i64) -> Self {
        self.downloads = downloads;
        self
    }
}

/// One reported performance number attached to a system. No uniqueness
/// constraint: repeated loads accumulate repeated rows.
#[derive(Debug, Clone, Default)]
pub struct NewSystemMetric {
    pub system_id: i64,
    pub metric_kind: String,
    pub value: Option<f64>,
    pub dataset: Option<String>,
    pub language: Option<String>,
}

impl NewSystemMetric {
    #[must_use]
    pub fn new(system_id: i64, metric_kind: impl Into<String>) -> Self {
        Self {
            system_id,
            metric_kind: metric_kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// A paper attached to a system, cascade-deleted with it.
#[derive(Debug, Clone, Default)]
pub struct NewSystemPaper {
    pub system_id: i64,
    pub title: String,
    pub arxiv_link: Option<String>,
    pub publication_year: Option<i64>,
    pub authors: Option<String>,
}

impl NewSystemPaper {
    #[must_use]
    pub fn new(system_id: i64, title: impl Into<String>) -> Self {
        Self {
            system_id,
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_arxiv_link(mut self, link: impl Into<String>) -> Self {
        self.arxiv_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_publication_year(mut self, year: i64) -> Self {
        self.publication_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }
}

/// A standalone speech corpus. Unrelated to systems.
#[derive(Debug, Clone, Default)]
pub struct NewDataset {
    pub name: String,
    pub description: Option<String>,
    pub size_hours: Option<f64>,
    pub size_gb: Option<f64>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
}

impl NewDataset {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_size_hours(mut self, hours: f64) -> Self {
        self.size_hours = Some(hours);
        self
    }

    #[must_use]
    pub fn with_size_gb(mut self, gb: f64) -> Self {
        self.size_gb = Some(gb);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A named (task, dataset) leaderboard owning many results.
#[derive(Debug, Clone, Default)]
pub struct NewBenchmark {
    pub name: String,
    pub tasks: Option<String>,
    pub dataset: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

impl NewBenchmark {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tasks(mut self, tasks: impl Into<String>) -> Self {
        self.tasks = Some(tasks.into());
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// One leaderboard row, tied to a resolved system.
#[derive(Debug, Clone, Default)]
pub struct NewBenchmarkResult {
    pub benchmark_id: i64,
    pub system_id: i64,
    pub rank: Option<i64>,
    pub metric_kind: String,
    pub value: Option<f64>,
    pub dataset_split: Option<String>,
    pub paper_link: Option<String>,
    pub code_link: Option<String>,
}

impl NewBenchmarkResult {
    #[must_use]
    pub fn new(benchmark_id: i64, system_id: i64, metric_kind: impl Into<String>) -> Self {
        Self {
            benchmark_id,
            system_id,
            metric_kind: metric_kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_dataset_split(mut self, split: impl Into<String>) -> Self {
        self.dataset_split = Some(split.into());
        self
    }

    #[must_use]
    pub fn with_paper_link(mut self, link: impl Into<String>) -> Self {
        self.paper_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_code_link(mut self, link: impl Into<String>) -> Self {
        self.code_link = Some(link.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_kind_serde_names() {
        assert_eq!(serde_json::to_string(&SystemKind::Asr).unwrap(), "\"ASR\"");
        assert_eq!(
            serde_json::to_string(&SystemKind::AudioToAudio).unwrap(),
            "\"Audio-to-Audio\""
        );

        let parsed: SystemKind = serde_json::from_str("\"TTS\"").unwrap();
        assert_eq!(parsed, SystemKind::Tts);

        // Anything unrecognized degrades to unknown rather than failing.
        let parsed: SystemKind = serde_json::from_str("\"diffusion\"").unwrap();
        assert_eq!(parsed, SystemKind::Unknown);
    }

    #[test]
    fn test_metric_kind_round_trip() {
        for kind in [MetricKind::Wer, MetricKind::Cer, MetricKind::Mos, MetricKind::Bleu] {
            assert_eq!(kind.as_str().parse::<MetricKind>().ok(), Some(kind));
        }
        assert!("F1".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_new_system_builder_defaults() {
        let system = NewSystem::new("Whisper")
            .with_developer("openai")
            .with_downloads(500);

        assert_eq!(system.name, "Whisper");
        assert_eq!(system.developer.as_deref(), Some("openai"));
        assert_eq!(system.downloads, 500);
        assert!(system.first_release_year.is_none());
        assert!(system.architecture.is_none());
    }
}
