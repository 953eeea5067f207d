//! Per-source extractors: pure functions from one raw payload to one
//! normalized record, total over malformed input.

pub mod benchmarks;
pub mod classify;
pub mod datasets;
pub mod models;
pub mod papers;

pub use benchmarks::{dataset_benchmark, extract_results};
pub use classify::{
    classify_dataset_type, classify_pipeline, classify_text_kind, detect_architecture,
    detect_languages, extract_model_name, first_match, is_language_tag, KeywordRule,
};
pub use datasets::extract_dataset;
pub use models::{extract_model, extract_paper_refs};
pub use papers::{extract_paper, parse_feed, AtomEntry, AtomLink};
