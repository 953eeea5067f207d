//! Dataset-registry collector.
//!
//! Walks the hosted registry for speech corpora and appends a built-in
//! catalog of well-known corpora that have no queryable API.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use super::{CollectionOutput, Collector};
use crate::config::CollectorConfig;
use crate::extract::extract_dataset;
use crate::interchange::{self, DatasetRecord, DatasetSummary};
use crate::net::ApiClient;
use crate::Result;

const BASE_URL: &str = "https://huggingface.co/api/datasets";

pub struct DatasetCollector {
    client: ApiClient,
    page_limit: usize,
}

impl DatasetCollector {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            page_limit: config.page_limit,
        })
    }

    async fn list_datasets(&self) -> Result<Vec<Value>> {
        let params = [
            ("limit", self.page_limit.to_string()),
            ("sort", "downloads".to_string()),
            ("direction", "-1".to_string()),
        ];

        let listing = self.client.get_json(BASE_URL, &params).await?;
        Ok(listing.as_array().cloned().unwrap_or_default())
    }

    async fn dataset_details(&self, dataset_id: &str) -> Result<Value> {
        self.client
            .get_json(&format!("{BASE_URL}/{dataset_id}"), &[])
            .await
    }
}

#[async_trait::async_trait]
impl Collector for DatasetCollector {
    fn name(&self) -> &'static str {
        "datasets"
    }

    async fn collect(&self, out_dir: &Path) -> Result<CollectionOutput> {
        let mut records = Vec::new();

        info!("collecting datasets from the registry");
        let listing = match self.list_datasets().await {
            Ok(listing) => listing,
            Err(error) => {
                warn!(%error, "dataset listing failed");
                Vec::new()
            }
        };

        for dataset in listing {
            let Some(dataset_id) = dataset["id"].as_str().filter(|id| !id.is_empty()) else {
                continue;
            };

            info!(dataset = dataset_id, "fetching dataset details");
            match self.dataset_details(dataset_id).await {
                Ok(details) => {
                    let record = extract_dataset(&details);
                    // Only speech corpora are of interest here.
                    if record.dataset_type == "speech" {
                        records.push(record);
                    }
                }
                Err(error) => warn!(dataset = dataset_id, %error, "detail fetch failed, skipping"),
            }

            self.client.pause().await;
        }

        info!("appending built-in corpus catalog");
        records.extend(builtin_catalog());

        let summary = summarize(&records);
        let paths = interchange::write_batch(out_dir, self.name(), &records, &summary)?;
        info!(count = records.len(), data = %paths.data.display(), "dataset collection finished");

        Ok(CollectionOutput {
            paths,
            record_count: records.len(),
        })
    }
}

/// Corpora published without a queryable API, carried as fixed records.
#[must_use]
pub fn builtin_catalog() -> Vec<DatasetRecord> {
    let entry = |name: &str, description: &str, hours: f64, gb: f64, language: &str, license: &str, url: &str| {
        DatasetRecord {
            dataset_name: name.to_string(),
            description: description.to_string(),
            size_hours: Some(hours),
            size_gb: Some(gb),
            language: language.to_string(),
            license: license.to_string(),
            source: "openslr".to_string(),
            url: url.to_string(),
            dataset_type: "speech".to_string(),
            ..Default::default()
        }
    };

    vec![
        entry(
            "LibriSpeech",
            "Large-scale English speech recognition corpus",
            1000.0,
            60.0,
            "en",
            "CC BY 4.0",
            "https://openslr.org/12/",
        ),
        entry(
            "Common Voice",
            "Multilingual speech dataset",
            14000.0,
            1000.0,
            "multilingual",
            "CC0",
            "https://openslr.org/70/",
        ),
        entry(
            "VoxForge",
            "Accented speech recognition dataset",
            100.0,
            5.0,
            "en",
            "GPL",
            "https://openslr.org/7/",
        ),
        entry(
            "TED-LIUM",
            "English speech recognition from TED talks",
            452.0,
            25.0,
            "en",
            "CC BY-NC-ND 3.0",
            "https://openslr.org/51/",
        ),
    ]
}

#[must_use]
pub fn summarize(records: &[DatasetRecord]) -> DatasetSummary {
    let count_source = |source: &str| records.iter().filter(|r| r.source == source).count();

    DatasetSummary {
        total_datasets: records.len(),
        huggingface_datasets: count_source("huggingface"),
        openslr_datasets: count_source("openslr"),
        total_hours: records.iter().filter_map(|r| r.size_hours).sum(),
        total_gb: records.iter().filter_map(|r| r.size_gb).sum(),
        collection_date: interchange::collection_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_speech_only() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.iter().all(|d| d.dataset_type == "speech"));
        assert!(catalog.iter().all(|d| d.source == "openslr"));
        assert!(catalog.iter().all(|d| !d.dataset_name.is_empty()));
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(&builtin_catalog());

        assert_eq!(summary.total_datasets, 4);
        assert_eq!(summary.openslr_datasets, 4);
        assert_eq!(summary.huggingface_datasets, 0);
        assert!((summary.total_hours - 15552.0).abs() < f64::EPSILON);
        assert!((summary.total_gb - 1090.0).abs() < f64::EPSILON);
    }
}
