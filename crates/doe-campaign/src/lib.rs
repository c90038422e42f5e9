#![deny(missing_docs)]
#![doc = "Recommend/observe campaign orchestration: measurement log, recommendation cache, and lossless text serialization."]

pub mod cache;
pub mod campaign;
pub mod proposer;
pub mod simulate;
pub mod store;
pub mod textio;

pub use cache::{CachedBatch, RecommendationCache};
pub use campaign::Campaign;
pub use proposer::{Proposer, RandomProposer};
pub use simulate::{look_up_targets, simulate_experiment, IterationSummary, Lookup, TableLookup};
pub use store::{MeasurementRecord, MeasurementStore};
pub use textio::{from_text, load, save, to_text, validate_text, TEXT_SCHEMA_VERSION};
