//! Paper-search collector.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use super::{CollectionOutput, Collector};
use crate::config::CollectorConfig;
use crate::extract::{extract_paper, parse_feed};
use crate::interchange::{self, PaperRecord, PaperSummary};
use crate::mine::MetricMiner;
use crate::model::SystemKind;
use crate::net::ApiClient;
use crate::Result;

const BASE_URL: &str = "http://export.arxiv.org/api/query";

/// Fixed search vocabulary, queried one term at a time.
pub const SEARCH_TERMS: [&str; 7] = [
    "speech recognition",
    "text to speech",
    "speech synthesis",
    "voice cloning",
    "automatic speech recognition",
    "neural text to speech",
    "end-to-end speech recognition",
];

pub struct PaperCollector {
    client: ApiClient,
    miner: MetricMiner,
    max_results: usize,
}

impl PaperCollector {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            miner: MetricMiner::new(),
            max_results: config.page_limit,
        })
    }

    async fn search(&self, term: &str) -> Result<Vec<PaperRecord>> {
        let params = [
            ("search_query", format!("all:{term}")),
            ("start", "0".to_string()),
            ("max_results", self.max_results.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let feed = self.client.get_text(BASE_URL, &params).await?;
        let entries = parse_feed(&feed)?;

        Ok(entries
            .iter()
            .map(|entry| extract_paper(entry, &self.miner))
            .collect())
    }
}

#[async_trait::async_trait]
impl Collector for PaperCollector {
    fn name(&self) -> &'static str {
        "papers"
    }

    async fn collect(&self, out_dir: &Path) -> Result<CollectionOutput> {
        let mut records: Vec<PaperRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for term in SEARCH_TERMS {
            info!(term, "searching papers");

            match self.search(term).await {
                Ok(found) => {
                    for record in found {
                        // Identity dedup on the archive id; id-less
                        // records never reach the batch.
                        if record.arxiv_id.is_empty() || !seen.insert(record.arxiv_id.clone()) {
                            continue;
                        }
                        records.push(record);
                    }
                }
                Err(error) => warn!(term, %error, "search failed, skipping term"),
            }

            self.client.pause().await;
        }

        let summary = summarize(&records);
        let paths = interchange::write_batch(out_dir, self.name(), &records, &summary)?;
        info!(count = records.len(), data = %paths.data.display(), "paper collection finished");

        Ok(CollectionOutput {
            paths,
            record_count: records.len(),
        })
    }
}

#[must_use]
pub fn summarize(records: &[PaperRecord]) -> PaperSummary {
    let count_kind = |kind: SystemKind| records.iter().filter(|r| r.system_type == kind).count();

    PaperSummary {
        total_papers: records.len(),
        asr_papers: count_kind(SystemKind::Asr),
        tts_papers: count_kind(SystemKind::Tts),
        voice_cloning_papers: count_kind(SystemKind::VoiceCloning),
        papers_with_metrics: records.iter().filter(|r| !r.metrics.is_empty()).count(),
        collection_date: interchange::collection_date(),
    }
}
