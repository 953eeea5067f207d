//! Speech-characteristics collector.
//!
//! Offline: reads a `Name | description` text file and mines taxonomy
//! labels out of the free-text descriptions.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{CollectionOutput, Collector};
use crate::interchange::{self, CharacteristicsRecord, CharacteristicsSummary};
use crate::mine::CharacteristicsMiner;
use crate::Result;

pub struct CharacteristicsCollector {
    input: PathBuf,
    miner: CharacteristicsMiner,
}

impl CharacteristicsCollector {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            miner: CharacteristicsMiner::new(),
        }
    }

    fn mine_line(&self, line: &str) -> Option<CharacteristicsRecord> {
        let (name, description) = line.split_once('|')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let found = self.miner.mine(description.trim());

        Some(CharacteristicsRecord {
            model_name: name.to_string(),
            speaker_dependency_types: found.speaker_dependency,
            speech_types: found.speech_types,
        })
    }
}

#[async_trait::async_trait]
impl Collector for CharacteristicsCollector {
    fn name(&self) -> &'static str {
        "characteristics"
    }

    async fn collect(&self, out_dir: &Path) -> Result<CollectionOutput> {
        info!(input = %self.input.display(), "mining speech characteristics");

        let text = std::fs::read_to_string(&self.input)?;
        let records: Vec<CharacteristicsRecord> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| self.mine_line(line))
            .collect();

        let summary = summarize(&records);
        let paths = interchange::write_batch(out_dir, self.name(), &records, &summary)?;
        info!(count = records.len(), data = %paths.data.display(), "characteristics collection finished");

        Ok(CollectionOutput {
            record_count: records.len(),
            paths,
        })
    }
}

#[must_use]
pub fn summarize(records: &[CharacteristicsRecord]) -> CharacteristicsSummary {
    CharacteristicsSummary {
        total_records: records.len(),
        with_speaker_dependency: records
            .iter()
            .filter(|r| !r.speaker_dependency_types.is_empty())
            .count(),
        with_speech_type: records.iter().filter(|r| !r.speech_types.is_empty()).count(),
        collection_date: interchange::collection_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_collect_from_description_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("descriptions.txt");

        let mut file = std::fs::File::create(&input).unwrap();
        writeln!(
            file,
            "Whisper | End-to-end model. Supports speaker-independent continuous speech."
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not a record line").unwrap();
        writeln!(file, "Dragon | Dictation with speaker adaptation for isolated words.").unwrap();
        drop(file);

        let collector = CharacteristicsCollector::new(&input);
        let output = collector.collect(dir.path()).await.unwrap();

        assert_eq!(output.record_count, 2);

        let records: Vec<CharacteristicsRecord> =
            interchange::read_records(&output.paths.data).unwrap();
        assert_eq!(records[0].model_name, "Whisper");
        assert_eq!(records[0].speaker_dependency_types, vec!["independent"]);
        assert_eq!(records[0].speech_types, vec!["continuous"]);
        assert_eq!(records[1].model_name, "Dragon");
        assert_eq!(records[1].speaker_dependency_types, vec!["adaptive"]);
        assert_eq!(records[1].speech_types, vec!["discrete"]);
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            CharacteristicsRecord {
                model_name: "A".to_string(),
                speaker_dependency_types: vec!["independent".to_string()],
                speech_types: Vec::new(),
            },
            CharacteristicsRecord {
                model_name: "B".to_string(),
                speaker_dependency_types: Vec::new(),
                speech_types: vec!["continuous".to_string()],
            },
        ];

        let summary = summarize(&records);
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.with_speaker_dependency, 1);
        assert_eq!(summary.with_speech_type, 1);
    }
}
