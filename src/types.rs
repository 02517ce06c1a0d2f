//! Core types for the engagement pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw observation records, per-zone baselines, scored records, and
//! the final aggregate report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse horizontal seating position inferred from detection geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Left,
    Center,
    Right,
    Unrecognized,
}

impl Zone {
    /// The three positions a baseline can be estimated for
    pub const FIXED: [Zone; 3] = [Zone::Left, Zone::Center, Zone::Right];

    /// Parse a zone label; anything outside the closed set maps to
    /// `Unrecognized`, never a parse error.
    pub fn parse(s: &str) -> Self {
        match s {
            "left" => Zone::Left,
            "center" => Zone::Center,
            "right" => Zone::Right,
            _ => Zone::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Left => "left",
            Zone::Center => "center",
            Zone::Right => "right",
            Zone::Unrecognized => "unrecognized",
        }
    }
}

/// Detected facial emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprise,
    Fear,
    Disgust,
    Unrecognized,
}

impl Emotion {
    /// Parse an emotion label; anything outside the closed set maps to
    /// `Unrecognized`, never a parse error.
    pub fn parse(s: &str) -> Self {
        match s {
            "neutral" => Emotion::Neutral,
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "surprise" => Emotion::Surprise,
            "fear" => Emotion::Fear,
            "disgust" => Emotion::Disgust,
            _ => Emotion::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprise => "surprise",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Unrecognized => "unrecognized",
        }
    }
}

/// Head pose angles in signed degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// One face observation, as ingested from the dataset.
///
/// Records are created by ingestion, consumed immediately by scoring, and
/// never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Opaque detection identifier
    pub face_id: String,
    /// Region grouping key
    pub region: String,
    /// Institution grouping key
    pub college_name: String,
    pub zone: Zone,
    pub emotion: Emotion,
    /// Detection confidence (0-1)
    pub confidence: f64,
    pub pose: HeadPose,
}

/// Median head pose for one zone, computed over one estimation scope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseBaseline {
    pub median_pitch: f64,
    pub median_yaw: f64,
    pub median_roll: f64,
}

/// One scored observation. Derived, immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Composite engagement score (0-100)
    pub engagement_score: f64,
    pub zone: Zone,
    pub region: String,
    pub college_name: String,
}

/// Mean engagement for one grouping key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub key: String,
    pub mean_engagement: f64,
}

/// Per-run counters surfaced alongside the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Non-empty data rows seen in the input
    pub rows_read: u64,
    /// Rows that failed to parse and were skipped
    pub malformed_rows: u64,
    /// Records whose zone had no baseline in its scope
    pub unscored_records: u64,
    /// Records that produced an engagement score
    pub scored_records: u64,
    /// Estimation scopes processed
    pub chunks: u32,
}

/// Final output of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Unique identifier for this run
    pub run_id: String,
    /// Name of the backend that produced the report
    pub backend: String,
    /// When the report was finalized
    pub computed_at_utc: DateTime<Utc>,
    /// Region -> mean engagement, descending by score
    pub region_scores: Vec<GroupScore>,
    /// Institution -> mean engagement, descending by score
    pub institution_scores: Vec<GroupScore>,
    /// Mean engagement across all scored records (0.0 when nothing scored)
    pub overall_score: f64,
    /// Wall-clock duration of the run in seconds
    pub elapsed_seconds: f64,
    pub diagnostics: RunDiagnostics,
}
