//! Paper-search extractor: Atom feed parsing plus record normalization.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::classify::{classify_text_kind, extract_model_name};
use crate::interchange::PaperRecord;
use crate::mine::MetricMiner;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct AtomLink {
    pub href: String,
    pub link_type: String,
}

/// One `<entry>` of the search feed, as parsed.
#[derive(Debug, Clone, Default)]
pub struct AtomEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub authors: Vec<String>,
    pub links: Vec<AtomLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Parse the Atom response of the paper search API. Matching is on local
/// element names, so namespace prefixes do not matter.
pub fn parse_feed(xml: &str) -> Result<Vec<AtomEntry>> {
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut entry: Option<AtomEntry> = None;
    let mut in_author = false;
    let mut field: Option<TextField> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => entry = Some(AtomEntry::default()),
                    b"author" if entry.is_some() => in_author = true,
                    b"id" if entry.is_some() => field = Some(TextField::Id),
                    b"title" if entry.is_some() => field = Some(TextField::Title),
                    b"summary" if entry.is_some() => field = Some(TextField::Summary),
                    b"published" if entry.is_some() => field = Some(TextField::Published),
                    b"name" if in_author => {
                        if let Some(current) = entry.as_mut() {
                            current.authors.push(String::new());
                        }
                        field = Some(TextField::AuthorName);
                    }
                    b"link" => {
                        if let Some(current) = entry.as_mut() {
                            current.links.push(parse_link(&e));
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(current) = entry.as_mut() {
                        current.links.push(parse_link(&e));
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(current), Some(active)) = (entry.as_mut(), field) {
                    let text = t.unescape()?;
                    match active {
                        TextField::Id => current.id.push_str(&text),
                        TextField::Title => current.title.push_str(&text),
                        TextField::Summary => current.summary.push_str(&text),
                        TextField::Published => current.published.push_str(&text),
                        TextField::AuthorName => {
                            if let Some(author) = current.authors.last_mut() {
                                author.push_str(&text);
                            }
                        }
                    }
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => {
                        if let Some(done) = entry.take() {
                            entries.push(done);
                        }
                        field = None;
                    }
                    b"author" => in_author = false,
                    b"id" | b"title" | b"summary" | b"published" | b"name" => field = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn parse_link(element: &quick_xml::events::BytesStart<'_>) -> AtomLink {
    let mut link = AtomLink::default();

    for attr in element.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"href" => link.href = value.into_owned(),
            b"type" => link.link_type = value.into_owned(),
            _ => {}
        }
    }

    link
}

/// Map one feed entry to a normalized paper record, mining metrics from
/// the title and abstract along the way.
#[must_use]
pub fn extract_paper(entry: &AtomEntry, miner: &MetricMiner) -> PaperRecord {
    let title = entry.title.trim().to_string();
    let summary = entry.summary.trim().to_string();

    let publication_year = entry
        .published
        .get(..4)
        .and_then(|year| year.parse::<i64>().ok());

    let arxiv_link = entry
        .links
        .iter()
        .find(|link| link.link_type == "text/html")
        .map(|link| link.href.clone());

    let arxiv_id = entry
        .id
        .trim()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let metrics = miner.mine(&format!("{summary} {title}"));
    let system_type = classify_text_kind(&format!("{title} {summary}"));
    let model_name = extract_model_name(&title);

    PaperRecord {
        paper_title: title,
        arxiv_link,
        arxiv_id,
        publication_year,
        authors: entry.authors.iter().map(|a| a.trim().to_string()).collect(),
        summary,
        system_type,
        metrics,
        model_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SystemKind;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>search results</title>
  <entry>
    <id>http://arxiv.org/abs/2212.04356v1</id>
    <title>Robust Speech Recognition via Large-Scale Weak Supervision</title>
    <summary>Whisper reaches a WER: 2.7% on LibriSpeech test-clean.</summary>
    <published>2022-12-06T18:46:04Z</published>
    <author><name>Alec Radford</name></author>
    <author><name>Jong Wook Kim</name></author>
    <link href="http://arxiv.org/abs/2212.04356v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2212.04356v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2006.04558v8</id>
    <title>FastSpeech 2: Fast and High-Quality End-to-End Text to Speech</title>
    <summary>Achieves a MOS 4.25 on LJSpeech.</summary>
    <published>2020-06-08T17:00:00Z</published>
    <author><name>Yi Ren</name></author>
    <link href="http://arxiv.org/abs/2006.04558v8" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entries() {
        let entries = parse_feed(FEED).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.id.trim(), "http://arxiv.org/abs/2212.04356v1");
        assert_eq!(
            first.title.trim(),
            "Robust Speech Recognition via Large-Scale Weak Supervision"
        );
        assert_eq!(first.authors, vec!["Alec Radford", "Jong Wook Kim"]);
        assert_eq!(first.links.len(), 2);
        assert_eq!(first.links[0].link_type, "text/html");
    }

    #[test]
    fn test_extract_paper_record() {
        let entries = parse_feed(FEED).unwrap();
        let miner = MetricMiner::new();

        let record = extract_paper(&entries[0], &miner);

        assert_eq!(record.arxiv_id, "2212.04356v1");
        assert_eq!(record.publication_year, Some(2022));
        assert_eq!(
            record.arxiv_link.as_deref(),
            Some("http://arxiv.org/abs/2212.04356v1")
        );
        assert_eq!(record.system_type, SystemKind::Asr);
        // The known-model list probes the title only; "Whisper" appears
        // in the abstract, so the three-word fallback applies.
        assert_eq!(record.model_name, "Robust Speech Recognition");
        assert_eq!(record.metrics.len(), 1);
        assert_eq!(record.metrics[0].kind, "WER");
        assert_eq!(record.metrics[0].dataset, "Librispeech");

        let record = extract_paper(&entries[1], &miner);
        assert_eq!(record.system_type, SystemKind::Tts);
        assert_eq!(record.model_name, "Fastspeech");
        assert!(record.metrics.iter().any(|m| m.kind == "MOS"));
    }

    #[test]
    fn test_extract_tolerates_empty_entry() {
        let miner = MetricMiner::new();
        let record = extract_paper(&AtomEntry::default(), &miner);

        assert_eq!(record.paper_title, "");
        assert_eq!(record.arxiv_id, "");
        assert_eq!(record.publication_year, None);
        assert_eq!(record.arxiv_link, None);
        assert_eq!(record.system_type, SystemKind::Unknown);
        assert!(record.metrics.is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<feed><entry></feed>").is_err());
    }
}
