//! First-match-wins classification chains.
//!
//! Every heuristic here is an ordered list of (keywords, label) rules
//! evaluated in a fixed sequence; the first rule whose keyword set hits
//! decides the label. The order of the rule lists is load-bearing and
//! pinned by tests.

use crate::model::SystemKind;

/// One rule in a classification chain: the label wins when any keyword
/// occurs as a substring of the probed text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<L> {
    pub label: L,
    pub keywords: &'static [&'static str],
}

impl<L: Copy> KeywordRule<L> {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Evaluate a chain over lowercased text, returning the first match.
pub fn first_match<L: Copy>(rules: &[KeywordRule<L>], text: &str) -> Option<L> {
    let text = text.to_lowercase();
    rules.iter().find(|rule| rule.matches(&text)).map(|r| r.label)
}

/// Pipeline tags as published by the model registry.
pub const PIPELINE_ASR: &str = "automatic-speech-recognition";
pub const PIPELINE_TTS: &str = "text-to-speech";
pub const PIPELINE_AUDIO_TO_AUDIO: &str = "audio-to-audio";

const PIPELINE_RULES: &[KeywordRule<SystemKind>] = &[
    KeywordRule {
        label: SystemKind::Asr,
        keywords: &[PIPELINE_ASR],
    },
    KeywordRule {
        label: SystemKind::Tts,
        keywords: &[PIPELINE_TTS],
    },
    KeywordRule {
        label: SystemKind::AudioToAudio,
        keywords: &[PIPELINE_AUDIO_TO_AUDIO],
    },
];

/// Classify a model by its pipeline tags.
#[must_use]
pub fn classify_pipeline(pipeline_tags: &[String]) -> SystemKind {
    for rule in PIPELINE_RULES {
        if pipeline_tags.iter().any(|tag| rule.keywords.contains(&tag.as_str())) {
            return rule.label;
        }
    }
    SystemKind::Unknown
}

const TEXT_KIND_RULES: &[KeywordRule<SystemKind>] = &[
    KeywordRule {
        label: SystemKind::Asr,
        keywords: &["speech recognition", "asr", "automatic speech"],
    },
    KeywordRule {
        label: SystemKind::Tts,
        keywords: &["text to speech", "tts", "speech synthesis", "voice synthesis"],
    },
    KeywordRule {
        label: SystemKind::VoiceCloning,
        keywords: &["voice cloning", "voice conversion"],
    },
];

/// Classify a paper by its title and abstract.
#[must_use]
pub fn classify_text_kind(text: &str) -> SystemKind {
    first_match(TEXT_KIND_RULES, text).unwrap_or(SystemKind::Unknown)
}

/// Architecture-name fragments, probed against each tag in order. The
/// matching tag itself (not the fragment) becomes the label.
pub const ARCHITECTURE_KEYWORDS: &[&str] =
    &["transformer", "whisper", "wav2vec", "tacotron", "fastspeech"];

/// First tag containing a known architecture fragment, else "unknown".
#[must_use]
pub fn detect_architecture(tags: &[String]) -> String {
    for tag in tags {
        let lowered = tag.to_lowercase();
        if ARCHITECTURE_KEYWORDS.iter().any(|arch| lowered.contains(arch)) {
            return tag.clone();
        }
    }
    "unknown".to_string()
}

const DATASET_TYPE_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        label: "speech",
        keywords: &["speech", "audio", "asr", "tts"],
    },
    KeywordRule {
        label: "text",
        keywords: &["text", "nlp"],
    },
];

/// Classify a dataset by exact tag membership.
#[must_use]
pub fn classify_dataset_type(tags: &[String]) -> &'static str {
    for rule in DATASET_TYPE_RULES {
        if tags.iter().any(|tag| rule.keywords.contains(&tag.as_str())) {
            return rule.label;
        }
    }
    "unknown"
}

/// Loose language-code heuristic: any two-lowercase-ASCII-letter tag is
/// taken as an ISO code. Not validated against an ISO table.
#[must_use]
pub fn is_language_tag(tag: &str) -> bool {
    tag.len() == 2 && tag.chars().all(|c| c.is_ascii_lowercase())
}

/// Collect language tags in their original order.
#[must_use]
pub fn detect_languages(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter(|tag| is_language_tag(tag))
        .cloned()
        .collect()
}

/// Model names recognized in paper titles, probed in order.
pub const KNOWN_MODEL_NAMES: &[&str] = &[
    "whisper",
    "wav2vec",
    "tacotron",
    "fastspeech",
    "tacotron2",
    "waveglow",
    "melgan",
    "hifigan",
    "conformer",
    "transformer",
    "listen attend and spell",
    "deep speech",
    "jasper",
    "quartznet",
];

/// Title-case each word of a known model name.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First known model name contained in the title, falling back to the
/// first three title words.
#[must_use]
pub fn extract_model_name(title: &str) -> String {
    let lowered = title.to_lowercase();
    for name in KNOWN_MODEL_NAMES {
        if lowered.contains(name) {
            return title_case(name);
        }
    }

    title.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}
