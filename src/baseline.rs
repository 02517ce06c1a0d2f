//! Per-zone baseline estimation
//!
//! A baseline is the median head pose of one seating zone over one estimation
//! scope (the whole dataset, or one chunk). It stands in for the "looking at
//! a common point" reference that per-record deviations are measured against.
//!
//! Medians are exact order-statistic medians; downstream clipping thresholds
//! are tuned to small baseline deviations, so approximation is not allowed.
//! A zone with no records in the scope gets no entry: not zero, not an error.

use std::collections::HashMap;

use crate::backend::EngineBackend;
use crate::types::{PoseBaseline, Record, Zone};

/// Baselines for one estimation scope.
///
/// Created per scope and discarded after the scope's records are scored;
/// never reused across scopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneBaselines {
    entries: HashMap<Zone, PoseBaseline>,
}

impl ZoneBaselines {
    /// Estimate per-zone medians over `records`.
    ///
    /// Only the three fixed zones are estimated; records in an unrecognized
    /// zone contribute to no baseline.
    pub fn estimate(records: &[Record], backend: &dyn EngineBackend) -> Self {
        let mut entries = HashMap::new();

        for zone in Zone::FIXED {
            let mut pitches = Vec::new();
            let mut yaws = Vec::new();
            let mut rolls = Vec::new();

            for record in records.iter().filter(|r| r.zone == zone) {
                pitches.push(record.pose.pitch);
                yaws.push(record.pose.yaw);
                rolls.push(record.pose.roll);
            }

            let (Some(median_pitch), Some(median_yaw), Some(median_roll)) = (
                backend.median(&mut pitches),
                backend.median(&mut yaws),
                backend.median(&mut rolls),
            ) else {
                continue;
            };

            entries.insert(
                zone,
                PoseBaseline {
                    median_pitch,
                    median_yaw,
                    median_roll,
                },
            );
        }

        Self { entries }
    }

    /// Build baselines from explicit entries, e.g. a whole-dataset baseline
    /// applied uniformly across chunks.
    pub fn from_entries(entries: impl IntoIterator<Item = (Zone, PoseBaseline)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Baseline for `zone`, if the zone was present in the scope.
    pub fn get(&self, zone: Zone) -> Option<&PoseBaseline> {
        self.entries.get(&zone)
    }

    /// Number of zones with a baseline in this scope
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
