//! Engauge - engagement scoring engine for classroom observation data
//!
//! Engauge turns per-student face/pose/emotion observations into a bounded
//! 0-100 engagement score through a deterministic pipeline: ingestion ->
//! per-zone baseline estimation -> scoring -> aggregation by region and
//! institution, with each run's wall-clock timing appended to a durable
//! session store.
//!
//! ## Modules
//!
//! - **types** / **error**: data model and error taxonomy
//! - **ingest**: delimited observation files with skip-and-count row policy
//! - **baseline**: exact per-zone median head pose per estimation scope
//! - **scoring**: the fixed numeric contract mapping one record to a score
//! - **aggregate**: incremental grouped means and report assembly
//! - **backend**: pluggable execution strategies with identical numerics
//! - **pipeline**: whole-dataset and chunked drivers
//! - **metrics**: append-only JSON session store for run timings

pub mod aggregate;
pub mod backend;
pub mod baseline;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod scoring;
pub mod types;

#[cfg(feature = "cli")]
pub mod generator;

pub use backend::{ColumnarBackend, EngineBackend, RowwiseBackend};
pub use baseline::ZoneBaselines;
pub use error::EngineError;
pub use metrics::{record_session, MetricsStore, SessionMetrics};
pub use pipeline::{
    generate_engagement_report, ChunkMode, EngagementPipeline, DEFAULT_CHUNK_SIZE,
};
pub use types::{AggregateReport, Record, ScoredRecord};

/// Engine version embedded in CLI output and logs
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI output and logs
pub const PRODUCER_NAME: &str = "engauge";
