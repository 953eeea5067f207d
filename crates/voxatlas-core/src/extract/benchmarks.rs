//! Benchmark-leaderboard extractor.

use serde_json::Value;

use crate::interchange::{BenchmarkRecord, LeaderboardEntry, ResultMetric};

/// How many leaderboard rows are kept per dataset.
pub const TOP_RESULTS: usize = 10;

/// Build one benchmark record for a (task, dataset) leaderboard.
#[must_use]
pub fn dataset_benchmark(task: &str, dataset: &Value, results: Vec<LeaderboardEntry>) -> BenchmarkRecord {
    let name = dataset["name"].as_str().unwrap_or_default().to_string();

    BenchmarkRecord {
        benchmark_name: format!("{task} - {name}"),
        tasks: vec![task.to_string()],
        dataset: name,
        url: dataset["url"].as_str().unwrap_or_default().to_string(),
        description: dataset["description"].as_str().unwrap_or_default().to_string(),
        source: "paperswithcode".to_string(),
        results,
    }
}

/// Extract ranked entries out of an evaluations payload. Entries without
/// any usable metric are dropped; ranks follow the kept order.
#[must_use]
pub fn extract_results(raw: &Value) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    let Some(results) = raw["results"].as_array() else {
        return entries;
    };

    for result in results.iter().take(TOP_RESULTS) {
        let metrics = extract_result_metrics(&result["metrics"]);
        if metrics.is_empty() {
            continue;
        }

        entries.push(LeaderboardEntry {
            model_name: result["model"]["name"].as_str().unwrap_or_default().to_string(),
            rank: (entries.len() + 1) as i64,
            metrics,
            paper_link: result["paper"]["url"].as_str().unwrap_or_default().to_string(),
            code_link: result["model"]["url"].as_str().unwrap_or_default().to_string(),
            submission_date: result["date"].as_str().unwrap_or_default().to_string(),
        });
    }

    entries
}

/// One record per named metric; non-numeric values degrade to zero and
/// nulls are dropped.
fn extract_result_metrics(raw: &Value) -> Vec<ResultMetric> {
    let Some(metrics) = raw.as_object() else {
        return Vec::new();
    };

    metrics
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| ResultMetric {
            kind: name.to_uppercase(),
            value: value.as_f64().unwrap_or(0.0),
            dataset_split: "test".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_results_ranks_kept_entries() {
        let raw = json!({
            "results": [
                {
                    "model": {"name": "Whisper Large v3", "url": "https://github.com/openai/whisper"},
                    "paper": {"url": "https://arxiv.org/abs/2212.04356"},
                    "metrics": {"wer": 1.5},
                    "date": "2023-10-17"
                },
                {
                    "model": {"name": "NoMetrics"},
                    "metrics": {}
                },
                {
                    "model": {"name": "Conformer-CTC"},
                    "metrics": {"wer": 1.7, "rtf": null}
                }
            ]
        });

        let entries = extract_results(&raw);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].model_name, "Whisper Large v3");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].metrics, vec![ResultMetric {
            kind: "WER".to_string(),
            value: 1.5,
            dataset_split: "test".to_string(),
        }]);
        assert_eq!(entries[0].paper_link, "https://arxiv.org/abs/2212.04356");

        // The metric-less entry was dropped, so the next kept entry is
        // ranked 2, not 3.
        assert_eq!(entries[1].model_name, "Conformer-CTC");
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].metrics.len(), 1);
    }

    #[test]
    fn test_non_numeric_metric_degrades_to_zero() {
        let raw = json!({
            "results": [
                {"model": {"name": "X"}, "metrics": {"wer": "n/a"}}
            ]
        });

        let entries = extract_results(&raw);
        assert_eq!(entries.len(), 1);
        assert!((entries[0].metrics[0].value - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_top_results_cap() {
        let results: Vec<Value> = (0..25)
            .map(|i| json!({"model": {"name": format!("m{i}")}, "metrics": {"wer": 5.0}}))
            .collect();
        let raw = json!({ "results": results });

        assert_eq!(extract_results(&raw).len(), TOP_RESULTS);
    }

    #[test]
    fn test_dataset_benchmark_naming() {
        let dataset = json!({
            "name": "LibriSpeech",
            "url": "https://paperswithcode.com/dataset/librispeech",
            "description": "English read speech"
        });

        let record = dataset_benchmark("automatic-speech-recognition", &dataset, Vec::new());

        assert_eq!(record.benchmark_name, "automatic-speech-recognition - LibriSpeech");
        assert_eq!(record.tasks, vec!["automatic-speech-recognition"]);
        assert_eq!(record.dataset, "LibriSpeech");
        assert_eq!(record.source, "paperswithcode");
    }
}
