//! Model-registry collector.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use super::{CollectionOutput, Collector};
use crate::config::CollectorConfig;
use crate::extract::classify::{PIPELINE_ASR, PIPELINE_AUDIO_TO_AUDIO, PIPELINE_TTS};
use crate::extract::extract_model;
use crate::interchange::{self, ModelRecord, ModelSummary};
use crate::model::SystemKind;
use crate::net::ApiClient;
use crate::Result;

const BASE_URL: &str = "https://huggingface.co/api/models";

const PIPELINE_TAGS: [&str; 3] = [PIPELINE_ASR, PIPELINE_TTS, PIPELINE_AUDIO_TO_AUDIO];

pub struct ModelCollector {
    client: ApiClient,
    page_limit: usize,
}

impl ModelCollector {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            page_limit: config.page_limit,
        })
    }

    async fn list_models(&self, pipeline_tag: &str) -> Result<Vec<Value>> {
        let params = [
            ("pipeline_tag", pipeline_tag.to_string()),
            ("limit", self.page_limit.to_string()),
            ("sort", "downloads".to_string()),
            ("direction", "-1".to_string()),
        ];

        let listing = self.client.get_json(BASE_URL, &params).await?;
        Ok(listing.as_array().cloned().unwrap_or_default())
    }

    async fn model_details(&self, model_id: &str) -> Result<Value> {
        self.client
            .get_json(&format!("{BASE_URL}/{model_id}"), &[])
            .await
    }
}

#[async_trait::async_trait]
impl Collector for ModelCollector {
    fn name(&self) -> &'static str {
        "models"
    }

    async fn collect(&self, out_dir: &Path) -> Result<CollectionOutput> {
        let mut records = Vec::new();

        for pipeline_tag in PIPELINE_TAGS {
            info!(pipeline_tag, "collecting models");

            let listing = match self.list_models(pipeline_tag).await {
                Ok(listing) => listing,
                Err(error) => {
                    warn!(pipeline_tag, %error, "listing failed, skipping pipeline");
                    continue;
                }
            };

            for model in listing {
                // Listings without a catalog id never reach the batch.
                let Some(model_id) = model["id"].as_str().filter(|id| !id.is_empty()) else {
                    continue;
                };

                info!(model = model_id, "fetching model details");
                match self.model_details(model_id).await {
                    Ok(details) => records.push(extract_model(&details)),
                    Err(error) => warn!(model = model_id, %error, "detail fetch failed, skipping"),
                }

                self.client.pause().await;
            }
        }

        let summary = summarize(&records);
        let paths = interchange::write_batch(out_dir, self.name(), &records, &summary)?;
        info!(count = records.len(), data = %paths.data.display(), "model collection finished");

        Ok(CollectionOutput {
            paths,
            record_count: records.len(),
        })
    }
}

#[must_use]
pub fn summarize(records: &[ModelRecord]) -> ModelSummary {
    let count_kind = |kind: SystemKind| records.iter().filter(|r| r.system_type == kind).count();

    ModelSummary {
        total_models: records.len(),
        asr_models: count_kind(SystemKind::Asr),
        tts_models: count_kind(SystemKind::Tts),
        audio_to_audio_models: count_kind(SystemKind::AudioToAudio),
        collection_date: interchange::collection_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_by_kind() {
        let record = |kind| ModelRecord {
            system_type: kind,
            ..Default::default()
        };

        let records = vec![
            record(SystemKind::Asr),
            record(SystemKind::Asr),
            record(SystemKind::Tts),
            record(SystemKind::Unknown),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.total_models, 4);
        assert_eq!(summary.asr_models, 2);
        assert_eq!(summary.tts_models, 1);
        assert_eq!(summary.audio_to_audio_models, 0);
        assert!(!summary.collection_date.is_empty());
    }
}
