//! Regex miners over free-text fields.
//!
//! The metric miner deliberately does not deduplicate: overlapping
//! patterns matching the same number emit one record each. Dataset
//! attribution takes the first known corpus named anywhere in the text,
//! with no proximity requirement, so it can mis-attribute when a passage
//! names several corpora.

use regex::Regex;
use tracing::warn;

use crate::interchange::MinedMetric;
use crate::model::MetricKind;

struct MetricPattern {
    kind: MetricKind,
    regex: Regex,
}

/// Corpus names probed for attribution, in priority order.
pub const DATASET_KEYWORDS: &[&str] = &[
    "librispeech",
    "common voice",
    "voxforge",
    "ted-lium",
    "wsj",
    "switchboard",
];

/// Mines performance numbers out of titles and abstracts. Patterns are
/// compiled once at construction and probed in a fixed order per kind.
pub struct MetricMiner {
    patterns: Vec<MetricPattern>,
}

impl MetricMiner {
    #[must_use]
    pub fn new() -> Self {
        let mut miner = Self {
            patterns: Vec::new(),
        };

        miner.add(MetricKind::Wer, r"wer[:\s]*(\d+\.?\d*)\s*%?");
        miner.add(MetricKind::Wer, r"word error rate[:\s]*(\d+\.?\d*)\s*%?");
        miner.add(MetricKind::Wer, r"(\d+\.?\d*)\s*%?\s*wer");
        miner.add(MetricKind::Cer, r"cer[:\s]*(\d+\.?\d*)\s*%?");
        miner.add(MetricKind::Cer, r"character error rate[:\s]*(\d+\.?\d*)\s*%?");
        miner.add(MetricKind::Mos, r"mos[:\s]*(\d+\.?\d*)");
        miner.add(MetricKind::Mos, r"mean opinion score[:\s]*(\d+\.?\d*)");
        miner.add(MetricKind::Bleu, r"bleu[:\s]*(\d+\.?\d*)");
        miner.add(MetricKind::Bleu, r"bleu score[:\s]*(\d+\.?\d*)");

        miner
    }

    fn add(&mut self, kind: MetricKind, pattern: &str) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push(MetricPattern { kind, regex });
        }
    }

    /// Every pattern match yields one record; a non-numeric capture
    /// drops only that record.
    #[must_use]
    pub fn mine(&self, text: &str) -> Vec<MinedMetric> {
        let lowered = text.to_lowercase();
        let dataset = attribute_dataset(&lowered);
        let mut metrics = Vec::new();

        for pattern in &self.patterns {
            for captures in pattern.regex.captures_iter(&lowered) {
                let Some(group) = captures.get(1) else {
                    continue;
                };
                let Ok(value) = group.as_str().parse::<f64>() else {
                    warn!(kind = pattern.kind.as_str(), capture = group.as_str(), "unparsable metric value");
                    continue;
                };

                metrics.push(MinedMetric {
                    kind: pattern.kind.as_str().to_string(),
                    value,
                    dataset: dataset.clone(),
                    language: "en".to_string(),
                });
            }
        }

        metrics
    }
}

impl Default for MetricMiner {
    fn default() -> Self {
        Self::new()
    }
}

/// First known corpus named in the (lowercased) text, title-cased for
/// display; "unknown" when none is named.
fn attribute_dataset(lowered: &str) -> String {
    for keyword in DATASET_KEYWORDS {
        if lowered.contains(keyword) {
            return keyword
                .replace('-', " ")
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    chars.next().map_or_else(String::new, |first| {
                        first.to_uppercase().collect::<String>() + chars.as_str()
                    })
                })
                .collect::<Vec<_>>()
                .join(" ");
        }
    }
    "unknown".to_string()
}

/// Corpus size mined from a description: (hours, gigabytes). Each family
/// tries its patterns in order and keeps the first hit.
#[must_use]
pub fn mine_sizes(description: &str) -> (Option<f64>, Option<f64>) {
    let hours = first_number(description, &[r"(?i)(\d+(?:\.\d+)?)\s*hours?", r"(?i)(\d+(?:\.\d+)?)\s*hrs?"]);
    let gigabytes = first_number(
        description,
        &[r"(?i)(\d+(?:\.\d+)?)\s*gb", r"(?i)(\d+(?:\.\d+)?)\s*gigabytes?"],
    );
    (hours, gigabytes)
}

fn first_number(text: &str, patterns: &[&str]) -> Option<f64> {
    for pattern in patterns {
        if let Ok(regex) = Regex::new(pattern) {
            if let Some(captures) = regex.captures(text) {
                if let Some(value) = captures.get(1).and_then(|g| g.as_str().parse().ok()) {
                    return Some(value);
                }
            }
        }
    }
    None
}

struct TriggerPhrase {
    regex: Regex,
    label: &'static str,
}

/// Taxonomy labels mined from a system description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinedCharacteristics {
    pub speaker_dependency: Vec<String>,
    pub speech_types: Vec<String>,
}

/// Scans descriptions for trigger phrases and maps them onto the seeded
/// taxonomy labels.
pub struct CharacteristicsMiner {
    speaker: Vec<TriggerPhrase>,
    speech: Vec<TriggerPhrase>,
}

impl CharacteristicsMiner {
    #[must_use]
    pub fn new() -> Self {
        let mut miner = Self {
            speaker: Vec::new(),
            speech: Vec::new(),
        };

        miner.add_speaker("speaker-independent", "independent");
        miner.add_speaker("speaker-dependent", "dependent");
        miner.add_speaker("speaker adaptation", "adaptive");

        miner.add_speech("continuous speech", "continuous");
        miner.add_speech("isolated words", "discrete");
        miner.add_speech("spontaneous speech", "spontaneous");

        miner
    }

    fn add_speaker(&mut self, phrase: &str, label: &'static str) {
        if let Some(trigger) = trigger(phrase, label) {
            self.speaker.push(trigger);
        }
    }

    fn add_speech(&mut self, phrase: &str, label: &'static str) {
        if let Some(trigger) = trigger(phrase, label) {
            self.speech.push(trigger);
        }
    }

    #[must_use]
    pub fn mine(&self, text: &str) -> MinedCharacteristics {
        MinedCharacteristics {
            speaker_dependency: hits(&self.speaker, text),
            speech_types: hits(&self.speech, text),
        }
    }
}

impl Default for CharacteristicsMiner {
    fn default() -> Self {
        Self::new()
    }
}

fn trigger(phrase: &str, label: &'static str) -> Option<TriggerPhrase> {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
    Regex::new(&pattern).ok().map(|regex| TriggerPhrase { regex, label })
}

fn hits(triggers: &[TriggerPhrase], text: &str) -> Vec<String> {
    triggers
        .iter()
        .filter(|t| t.regex.is_match(text))
        .map(|t| t.label.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mine_wer_with_dataset_attribution() {
        let miner = MetricMiner::new();
        let metrics = miner.mine("We achieve a WER: 2.7% on LibriSpeech test-clean.");

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].kind, "WER");
        assert!((metrics[0].value - 2.7).abs() < f64::EPSILON);
        assert_eq!(metrics[0].dataset, "Librispeech");
        assert_eq!(metrics[0].language, "en");
    }

    #[test]
    fn test_overlapping_patterns_emit_duplicate_records() {
        let miner = MetricMiner::new();
        // Two different error-rate patterns hit the same number: both
        // records are kept.
        let metrics = miner.mine("Reported WER: 5.2, i.e. 5.2 WER overall.");

        let wer: Vec<_> = metrics.iter().filter(|m| m.kind == "WER").collect();
        assert_eq!(wer.len(), 2);
        assert!((wer[0].value - 5.2).abs() < f64::EPSILON);
        assert!((wer[1].value - 5.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mos_and_bleu_mining() {
        let miner = MetricMiner::new();
        let metrics = miner.mine("MOS 4.38 for synthesis; translation BLEU: 31.2.");

        assert!(metrics.iter().any(|m| m.kind == "MOS" && (m.value - 4.38).abs() < f64::EPSILON));
        assert!(metrics.iter().any(|m| m.kind == "BLEU" && (m.value - 31.2).abs() < f64::EPSILON));
    }

    #[test]
    fn test_dataset_attribution_first_hit_wins() {
        let miner = MetricMiner::new();
        // Both corpora are named; attribution takes the keyword list
        // order, not proximity.
        let metrics = miner.mine("On Common Voice and LibriSpeech we get WER 8.1");
        assert_eq!(metrics[0].dataset, "Librispeech");
    }

    #[test]
    fn test_unknown_dataset() {
        let miner = MetricMiner::new();
        let metrics = miner.mine("A CER of cer: 1.3 on our internal corpus");
        assert!(!metrics.is_empty());
        assert_eq!(metrics[0].dataset, "unknown");
    }

    #[test]
    fn test_mine_sizes() {
        assert_eq!(mine_sizes("960 hours of read English speech, 60 GB"), (Some(960.0), Some(60.0)));
        assert_eq!(mine_sizes("about 13.5 hrs"), (Some(13.5), None));
        assert_eq!(mine_sizes("2.3 gigabytes of audio"), (None, Some(2.3)));
        assert_eq!(mine_sizes("a small corpus"), (None, None));
    }

    #[test]
    fn test_characteristics_single_hit_per_family() {
        let miner = CharacteristicsMiner::new();
        let found = miner.mine("supports speaker-independent continuous speech");

        assert_eq!(found.speaker_dependency, vec!["independent"]);
        assert_eq!(found.speech_types, vec!["continuous"]);
    }

    #[test]
    fn test_characteristics_word_boundaries() {
        let miner = CharacteristicsMiner::new();

        // "independent" alone is not a trigger; the full phrase is.
        let found = miner.mine("an independent evaluation of discontinuous speech");
        assert!(found.speaker_dependency.is_empty());
        assert!(found.speech_types.is_empty());

        let found = miner.mine("Speaker adaptation with isolated words input");
        assert_eq!(found.speaker_dependency, vec!["adaptive"]);
        assert_eq!(found.speech_types, vec!["discrete"]);
    }
}
