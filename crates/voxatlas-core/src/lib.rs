pub mod collect;
pub mod config;
pub mod error;
pub mod extract;
pub mod interchange;
pub mod load;
pub mod mine;
pub mod model;
pub mod net;
pub mod storage;

pub use collect::{
    BenchmarkCollector, CharacteristicsCollector, CollectionOutput, Collector, DatasetCollector,
    ModelCollector, PaperCollector,
};
pub use config::{CollectorConfig, DatabaseConfig, DatabaseEngine};
pub use error::{Error, Result};
pub use load::{LoadStats, Loader, ReferenceCache};
pub use model::{MetricKind, System, SystemKind};
pub use net::ApiClient;
pub use storage::Storage;
