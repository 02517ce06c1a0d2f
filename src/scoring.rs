//! Engagement scoring
//!
//! Maps one observation plus the baseline of its zone into a bounded 0-100
//! engagement score. The constants here are part of the output contract:
//! changing any of them changes every downstream aggregate.
//!
//! A record whose zone has no baseline in the current scope cannot be scored;
//! it is excluded from aggregation and counted as unscored.

use crate::baseline::ZoneBaselines;
use crate::types::{Emotion, Record, ScoredRecord};

/// Head deviation (degrees) at which an axis score reaches zero
pub const MAX_DEVIATION_DEG: f64 = 45.0;
/// Deviations are capped here before normalization
pub const DEVIATION_CAP_DEG: f64 = 100.0;

const YAW_WEIGHT: f64 = 0.7;
const PITCH_WEIGHT: f64 = 0.3;
const HEAD_POSE_WEIGHT: f64 = 0.8;
const EMOTION_WEIGHT: f64 = 0.2;

/// Affect weight for an emotion. Unrecognized emotions carry no weight.
pub fn emotion_weight(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Neutral => 20.0,
        Emotion::Happy => -5.0,
        Emotion::Sad => 20.0,
        Emotion::Angry => 5.0,
        Emotion::Surprise => -10.0,
        Emotion::Fear => -5.0,
        Emotion::Disgust => -30.0,
        Emotion::Unrecognized => 0.0,
    }
}

/// Score one axis from its absolute deviation against the baseline median.
pub(crate) fn axis_score(deviation: f64) -> f64 {
    let capped = deviation.min(DEVIATION_CAP_DEG);
    (100.0 - capped / MAX_DEVIATION_DEG * 100.0).clamp(0.0, 100.0)
}

/// Blend axis scores and the weighted emotion into the final score.
pub(crate) fn combine(yaw_score: f64, pitch_score: f64, weighted_emotion: f64) -> f64 {
    let head_pose_score = yaw_score * YAW_WEIGHT + pitch_score * PITCH_WEIGHT;
    let normalized_emotion = (weighted_emotion + 50.0).clamp(0.0, 100.0);
    (head_pose_score * HEAD_POSE_WEIGHT + normalized_emotion * EMOTION_WEIGHT).clamp(0.0, 100.0)
}

/// Score one record against the baselines of its scope.
///
/// Returns `None` when the record's zone has no baseline entry; the caller
/// counts such records in run diagnostics.
pub fn score_record(record: &Record, baselines: &ZoneBaselines) -> Option<ScoredRecord> {
    let baseline = baselines.get(record.zone)?;

    let weighted_emotion = emotion_weight(record.emotion) * record.confidence;
    let pitch_score = axis_score((record.pose.pitch - baseline.median_pitch).abs());
    let yaw_score = axis_score((record.pose.yaw - baseline.median_yaw).abs());

    Some(ScoredRecord {
        engagement_score: combine(yaw_score, pitch_score, weighted_emotion),
        zone: record.zone,
        region: record.region.clone(),
        college_name: record.college_name.clone(),
    })
}
