//! Source collectors.
//!
//! Each collector walks one external source, applies its extractor,
//! accumulates records in memory, and writes a data/summary file pair.
//! Network failures degrade per item: the item is logged and skipped,
//! never the whole run. Control flow is strictly sequential; the only
//! scheduling is the fixed pause between calls.

pub mod benchmarks;
pub mod characteristics;
pub mod datasets;
pub mod models;
pub mod papers;

use std::path::Path;

use crate::interchange::BatchPaths;
use crate::Result;

pub use benchmarks::BenchmarkCollector;
pub use characteristics::CharacteristicsCollector;
pub use datasets::DatasetCollector;
pub use models::ModelCollector;
pub use papers::PaperCollector;

/// What one collector run produced.
#[derive(Debug, Clone)]
pub struct CollectionOutput {
    pub paths: BatchPaths,
    pub record_count: usize,
}

#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the full collection and write the batch under `out_dir`.
    async fn collect(&self, out_dir: &Path) -> Result<CollectionOutput>;
}
