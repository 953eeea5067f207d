//! Dataset-registry extractor.

use serde_json::Value;

use super::classify::{classify_dataset_type, detect_languages};
use crate::interchange::DatasetRecord;
use crate::mine::mine_sizes;

/// Map one raw dataset payload to a normalized record.
#[must_use]
pub fn extract_dataset(raw: &Value) -> DatasetRecord {
    let id = raw["id"].as_str().unwrap_or_default().to_string();
    let tags: Vec<String> = raw["tags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let description = raw["cardData"]["description"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let (size_hours, size_gb) = mine_sizes(&description);

    let languages = detect_languages(&tags);
    let language = languages
        .first()
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());

    DatasetRecord {
        dataset_name: id.clone(),
        size_hours,
        size_gb,
        language,
        languages,
        license: raw["license"].as_str().unwrap_or_default().to_string(),
        source: "huggingface".to_string(),
        url: format!("https://huggingface.co/datasets/{id}"),
        downloads: raw["downloads"].as_i64().unwrap_or(0),
        created_date: raw["created_at"].as_str().unwrap_or_default().to_string(),
        dataset_type: classify_dataset_type(&tags).to_string(),
        description,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_speech_dataset() {
        let raw = json!({
            "id": "mozilla-foundation/common_voice_17_0",
            "tags": ["speech", "en", "de", "audio"],
            "license": "cc0-1.0",
            "downloads": 9000,
            "created_at": "2024-03-01T00:00:00.000Z",
            "cardData": {
                "description": "Crowd-sourced corpus with 3200 hours of validated audio (around 80 GB)."
            }
        });

        let record = extract_dataset(&raw);

        assert_eq!(record.dataset_name, "mozilla-foundation/common_voice_17_0");
        assert_eq!(record.dataset_type, "speech");
        assert_eq!(record.size_hours, Some(3200.0));
        assert_eq!(record.size_gb, Some(80.0));
        assert_eq!(record.language, "en");
        assert_eq!(record.languages, vec!["en", "de"]);
        assert_eq!(
            record.url,
            "https://huggingface.co/datasets/mozilla-foundation/common_voice_17_0"
        );
        assert_eq!(record.source, "huggingface");
    }

    #[test]
    fn test_extract_defaults_for_sparse_payload() {
        let record = extract_dataset(&json!({"id": "x/y"}));

        assert_eq!(record.dataset_type, "unknown");
        assert_eq!(record.language, "unknown");
        assert_eq!(record.size_hours, None);
        assert_eq!(record.size_gb, None);
        assert_eq!(record.downloads, 0);
    }
}
