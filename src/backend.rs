//! Execution backends
//!
//! The scoring and aggregation contract is written once; a backend only
//! decides how records are pulled from the source, how a median column is
//! reduced, and whether a chunk is scored row by row or column by column.
//! Every backend must produce identical numbers for the same input, so the
//! choice between them is purely a performance experiment.

use std::cmp::Ordering;

use crate::baseline::ZoneBaselines;
use crate::error::EngineError;
use crate::ingest::CsvSource;
use crate::scoring;
use crate::types::{PoseBaseline, Record, ScoredRecord};

/// Scored output of one chunk plus the count of records that could not be
/// scored because their zone had no baseline in the chunk's scope.
#[derive(Debug, Default)]
pub struct ChunkScores {
    pub scored: Vec<ScoredRecord>,
    pub unscored: u64,
}

/// One execution strategy for the engagement pipeline.
pub trait EngineBackend {
    /// Backend name used in reports and as the metrics-store bucket key.
    fn name(&self) -> &'static str;

    /// Pull up to `limit` records from the source (all remaining when `None`).
    fn ingest(
        &self,
        source: &mut CsvSource,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, EngineError> {
        source.read_chunk(limit)
    }

    /// Exact order-statistic median of `values`, `None` when empty.
    /// Even counts average the two middle values.
    fn median(&self, values: &mut Vec<f64>) -> Option<f64>;

    /// Score one chunk against its scope's baselines.
    fn score_chunk(&self, records: &[Record], baselines: &ZoneBaselines) -> ChunkScores;
}

/// Row-at-a-time backend: sorts columns for medians and scores each record
/// as it is visited.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowwiseBackend;

impl EngineBackend for RowwiseBackend {
    fn name(&self) -> &'static str {
        "rowwise"
    }

    fn median(&self, values: &mut Vec<f64>) -> Option<f64> {
        sort_median(values)
    }

    fn score_chunk(&self, records: &[Record], baselines: &ZoneBaselines) -> ChunkScores {
        let mut out = ChunkScores::default();

        for record in records {
            match scoring::score_record(record, baselines) {
                Some(scored) => out.scored.push(scored),
                None => out.unscored += 1,
            }
        }

        out
    }
}

/// Column-at-a-time backend: selection-based medians, deviation and score
/// columns materialized before the scored records are assembled. Numerically
/// identical to [`RowwiseBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnarBackend;

impl EngineBackend for ColumnarBackend {
    fn name(&self) -> &'static str {
        "columnar"
    }

    fn median(&self, values: &mut Vec<f64>) -> Option<f64> {
        select_median(values)
    }

    fn score_chunk(&self, records: &[Record], baselines: &ZoneBaselines) -> ChunkScores {
        let mut out = ChunkScores::default();

        let mut scorable: Vec<(&Record, &PoseBaseline)> = Vec::with_capacity(records.len());
        for record in records {
            match baselines.get(record.zone) {
                Some(baseline) => scorable.push((record, baseline)),
                None => out.unscored += 1,
            }
        }

        let yaw_scores: Vec<f64> = scorable
            .iter()
            .map(|(r, b)| scoring::axis_score((r.pose.yaw - b.median_yaw).abs()))
            .collect();
        let pitch_scores: Vec<f64> = scorable
            .iter()
            .map(|(r, b)| scoring::axis_score((r.pose.pitch - b.median_pitch).abs()))
            .collect();
        let weighted_emotions: Vec<f64> = scorable
            .iter()
            .map(|(r, _)| scoring::emotion_weight(r.emotion) * r.confidence)
            .collect();

        out.scored = scorable
            .iter()
            .enumerate()
            .map(|(i, (record, _))| ScoredRecord {
                engagement_score: scoring::combine(
                    yaw_scores[i],
                    pitch_scores[i],
                    weighted_emotions[i],
                ),
                zone: record.zone,
                region: record.region.clone(),
                college_name: record.college_name.clone(),
            })
            .collect();

        out
    }
}

/// Exact median by full sort.
pub(crate) fn sort_median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;

    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Exact median by quickselect; avoids sorting the whole column.
pub(crate) fn select_median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let n = values.len();
    let mid = n / 2;
    let (_, upper, _) =
        values.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let upper = *upper;

    if n % 2 == 1 {
        Some(upper)
    } else {
        // The partition left of `mid` holds the lower half; its maximum is
        // the other middle order statistic.
        let lower = values[..mid]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        Some((lower + upper) / 2.0)
    }
}
