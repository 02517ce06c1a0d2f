//! Pipeline orchestration
//!
//! Drives one run end to end: ingestion, per-scope baseline estimation,
//! scoring, and incremental aggregation, finishing with the assembled report.
//! A run either covers the whole dataset as a single estimation scope or
//! walks it in bounded chunks where each chunk estimates and uses its own
//! baseline.
//!
//! Per-chunk baselines are a deliberate, documented skew source: chunk
//! medians differ from the whole-dataset median, so chunked aggregates are
//! not required to match whole-dataset aggregates.
//!
//! Any stage error aborts the run and surfaces to the caller; partial
//! accumulators are discarded, never returned.

use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::aggregate::ScoreAccumulator;
use crate::backend::{ChunkScores, EngineBackend, RowwiseBackend};
use crate::baseline::ZoneBaselines;
use crate::error::EngineError;
use crate::ingest::CsvSource;
use crate::types::{AggregateReport, Record, RunDiagnostics};

/// Default number of records per chunk in chunked mode
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// How the dataset is partitioned into estimation scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    /// One scope covering the entire input
    WholeDataset,
    /// Fixed-size scopes; each chunk estimates and uses its own baseline
    Chunked(usize),
}

impl Default for ChunkMode {
    fn default() -> Self {
        ChunkMode::Chunked(DEFAULT_CHUNK_SIZE)
    }
}

/// Engagement pipeline over a pluggable execution backend.
pub struct EngagementPipeline<B: EngineBackend> {
    backend: B,
    mode: ChunkMode,
}

impl Default for EngagementPipeline<RowwiseBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngagementPipeline<RowwiseBackend> {
    /// Rowwise pipeline in default chunked mode
    pub fn new() -> Self {
        Self {
            backend: RowwiseBackend,
            mode: ChunkMode::default(),
        }
    }
}

impl<B: EngineBackend> EngagementPipeline<B> {
    pub fn with_backend(backend: B, mode: ChunkMode) -> Self {
        Self { backend, mode }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Run the full pipeline over the file at `path`.
    pub fn generate_report(&self, path: &Path) -> Result<AggregateReport, EngineError> {
        let started = Instant::now();

        let mut source = CsvSource::open(path)?;
        let mut accumulator = ScoreAccumulator::new();
        let mut diagnostics = RunDiagnostics::default();

        let limit = match self.mode {
            ChunkMode::WholeDataset => None,
            ChunkMode::Chunked(size) => Some(size),
        };

        loop {
            let chunk = self.backend.ingest(&mut source, limit)?;
            if chunk.is_empty() {
                break;
            }
            debug!("scoring chunk of {} records", chunk.len());

            let scores = self.score_batch(&chunk);
            diagnostics.unscored_records += scores.unscored;
            diagnostics.chunks += 1;
            accumulator.extend(&scores.scored);

            if limit.is_none() {
                break;
            }
        }

        diagnostics.rows_read = source.rows_read();
        diagnostics.malformed_rows = source.malformed_rows();
        diagnostics.scored_records = accumulator.scored_records();

        let elapsed_seconds = started.elapsed().as_secs_f64();
        info!(
            "{} run finished: {} scored, {} unscored, {} malformed in {:.3}s",
            self.backend.name(),
            diagnostics.scored_records,
            diagnostics.unscored_records,
            diagnostics.malformed_rows,
            elapsed_seconds
        );

        Ok(accumulator.into_report(self.backend.name(), elapsed_seconds, diagnostics))
    }

    /// Score an in-memory batch as one estimation scope: estimate the batch's
    /// baselines, then score every record against them.
    pub fn score_batch(&self, records: &[Record]) -> ChunkScores {
        let baselines = ZoneBaselines::estimate(records, &self.backend);
        self.backend.score_chunk(records, &baselines)
    }
}

/// Generate an engagement report with the default rowwise backend in chunked
/// mode. Library callers needing another backend or mode use
/// [`EngagementPipeline::with_backend`].
pub fn generate_engagement_report(path: &Path) -> Result<AggregateReport, EngineError> {
    EngagementPipeline::new().generate_report(path)
}
