//! Model-registry extractor.
//!
//! Total over malformed payloads: every output field is present, with
//! missing inputs degrading to "unknown", empty, or zero.

use serde_json::Value;

use super::classify::{classify_pipeline, detect_architecture, detect_languages};
use crate::interchange::{ModelRecord, PaperRef};

/// Map one raw registry payload to a normalized record.
#[must_use]
pub fn extract_model(raw: &Value) -> ModelRecord {
    let id = str_field(raw, "id");
    let tags = str_list(&raw["tags"]);
    let pipeline_tags = pipeline_tags(raw);
    let description = raw["cardData"]["description"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    ModelRecord {
        model_name: id.clone(),
        author_organization: str_field(raw, "author"),
        system_type: classify_pipeline(&pipeline_tags),
        architecture: detect_architecture(&tags),
        downloads: raw["downloads"].as_i64().unwrap_or(0),
        languages: detect_languages(&tags),
        license: str_field(raw, "license"),
        created_date: str_field(raw, "created_at"),
        last_modified: str_field(raw, "last_modified"),
        model_url: format!("https://huggingface.co/{id}"),
        papers: extract_paper_refs(&description),
        description,
        pipeline_tags,
        tags,
    }
}

/// The registry publishes `pipeline_tag` as a single string; tolerate an
/// array as well.
fn pipeline_tags(raw: &Value) -> Vec<String> {
    match &raw["pipeline_tag"] {
        Value::String(tag) => vec![tag.clone()],
        Value::Array(tags) => tags
            .iter()
            .filter_map(|t| t.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

/// Harvest arXiv abstract links out of a free-text description.
#[must_use]
pub fn extract_paper_refs(description: &str) -> Vec<PaperRef> {
    let mut papers = Vec::new();

    if let Ok(re) = regex::Regex::new(r"https://arxiv\.org/abs/\d+\.\d+") {
        for link in re.find_iter(description) {
            papers.push(PaperRef {
                arxiv_link: link.as_str().to_string(),
                source: "description".to_string(),
            });
        }
    }

    papers
}

fn str_field(raw: &Value, key: &str) -> String {
    raw[key].as_str().unwrap_or_default().to_string()
}

fn str_list(raw: &Value) -> Vec<String> {
    raw.as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SystemKind;
    use serde_json::json;

    #[test]
    fn test_extract_full_payload() {
        let raw = json!({
            "id": "openai/whisper-large-v3",
            "author": "openai",
            "pipeline_tag": "automatic-speech-recognition",
            "tags": ["whisper", "en", "de", "pytorch"],
            "downloads": 123_456,
            "license": "apache-2.0",
            "created_at": "2023-11-07T00:00:00.000Z",
            "last_modified": "2024-01-10T00:00:00.000Z",
            "cardData": {
                "description": "Robust ASR. See https://arxiv.org/abs/2212.04356 for details."
            }
        });

        let record = extract_model(&raw);

        assert_eq!(record.model_name, "openai/whisper-large-v3");
        assert_eq!(record.author_organization, "openai");
        assert_eq!(record.system_type, SystemKind::Asr);
        assert_eq!(record.architecture, "whisper");
        assert_eq!(record.downloads, 123_456);
        assert_eq!(record.languages, vec!["en", "de"]);
        assert_eq!(record.model_url, "https://huggingface.co/openai/whisper-large-v3");
        assert_eq!(record.papers.len(), 1);
        assert_eq!(record.papers[0].arxiv_link, "https://arxiv.org/abs/2212.04356");
        assert_eq!(record.papers[0].source, "description");
    }

    #[test]
    fn test_extract_is_total_over_empty_payload() {
        let record = extract_model(&json!({}));

        assert_eq!(record.model_name, "");
        assert_eq!(record.author_organization, "");
        assert_eq!(record.system_type, SystemKind::Unknown);
        assert_eq!(record.architecture, "unknown");
        assert_eq!(record.downloads, 0);
        assert!(record.languages.is_empty());
        assert!(record.tags.is_empty());
        assert!(record.papers.is_empty());
    }

    #[test]
    fn test_pipeline_tag_array_form() {
        let raw = json!({
            "id": "coqui/xtts",
            "pipeline_tag": ["text-to-speech"],
        });

        assert_eq!(extract_model(&raw).system_type, SystemKind::Tts);
    }

    #[test]
    fn test_multiple_paper_refs() {
        let refs = extract_paper_refs(
            "Based on https://arxiv.org/abs/2006.11477 and https://arxiv.org/abs/2212.04356.",
        );
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].arxiv_link, "https://arxiv.org/abs/2006.11477");
    }
}
