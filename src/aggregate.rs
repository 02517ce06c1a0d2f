//! Score aggregation
//!
//! Reduces scored records into per-region and per-institution means and an
//! overall mean. Accumulation is incremental (running sum + count per key) so
//! chunks can be folded in without retaining their records, and any chunking
//! of the same records produces the same result as one batch pass, up to
//! floating-point summation order.

use chrono::Utc;
use uuid::Uuid;

use crate::types::{AggregateReport, GroupScore, RunDiagnostics, ScoredRecord};

/// Running sum/count for one group key
#[derive(Debug, Clone, Copy, Default)]
struct GroupStat {
    sum: f64,
    count: u64,
}

/// Incremental accumulator over grouped means.
///
/// First-encountered key order is retained so that the final stable
/// descending sort breaks ties by encounter order.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    stats: std::collections::HashMap<String, GroupStat>,
    order: Vec<String>,
}

impl GroupAccumulator {
    pub fn add(&mut self, key: &str, score: f64) {
        if !self.stats.contains_key(key) {
            self.order.push(key.to_string());
        }
        let stat = self.stats.entry(key.to_string()).or_default();
        stat.sum += score;
        stat.count += 1;
    }

    /// Group means in descending order; ties keep first-encountered order.
    pub fn sorted_means(&self) -> Vec<GroupScore> {
        let mut means: Vec<GroupScore> = self
            .order
            .iter()
            .map(|key| {
                let stat = &self.stats[key];
                GroupScore {
                    key: key.clone(),
                    mean_engagement: stat.sum / stat.count as f64,
                }
            })
            .collect();

        // sort_by is stable, preserving encounter order among equal means
        means.sort_by(|a, b| {
            b.mean_engagement
                .partial_cmp(&a.mean_engagement)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        means
    }
}

/// Accumulates scored records across chunks without retaining them.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    regions: GroupAccumulator,
    institutions: GroupAccumulator,
    total_sum: f64,
    total_count: u64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, scored: &ScoredRecord) {
        self.regions.add(&scored.region, scored.engagement_score);
        self.institutions
            .add(&scored.college_name, scored.engagement_score);
        self.total_sum += scored.engagement_score;
        self.total_count += 1;
    }

    pub fn extend<'a>(&mut self, scored: impl IntoIterator<Item = &'a ScoredRecord>) {
        for record in scored {
            self.accumulate(record);
        }
    }

    /// Records folded in so far
    pub fn scored_records(&self) -> u64 {
        self.total_count
    }

    /// Global mean engagement; 0.0 when nothing has been scored.
    pub fn overall_score(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.total_sum / self.total_count as f64
        }
    }

    /// Assemble the final report.
    pub fn into_report(
        self,
        backend: &str,
        elapsed_seconds: f64,
        diagnostics: RunDiagnostics,
    ) -> AggregateReport {
        AggregateReport {
            run_id: Uuid::new_v4().to_string(),
            backend: backend.to_string(),
            computed_at_utc: Utc::now(),
            overall_score: self.overall_score(),
            region_scores: self.regions.sorted_means(),
            institution_scores: self.institutions.sorted_means(),
            elapsed_seconds,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Zone;
    use pretty_assertions::assert_eq;

    fn scored(region: &str, college: &str, score: f64) -> ScoredRecord {
        ScoredRecord {
            engagement_score: score,
            zone: Zone::Center,
            region: region.to_string(),
            college_name: college.to_string(),
        }
    }

    #[test]
    fn test_region_means_sorted_descending() {
        let mut acc = ScoreAccumulator::new();
        acc.accumulate(&scored("North", "a", 40.0));
        acc.accumulate(&scored("North", "a", 60.0));
        acc.accumulate(&scored("South", "b", 90.0));
        acc.accumulate(&scored("East", "c", 10.0));
        acc.accumulate(&scored("East", "c", 30.0));

        let report = acc.into_report("rowwise", 0.0, RunDiagnostics::default());
        let keys: Vec<&str> = report.region_scores.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["South", "North", "East"]);
        assert_eq!(report.region_scores[0].mean_engagement, 90.0);
        assert_eq!(report.region_scores[1].mean_engagement, 50.0);
        assert_eq!(report.region_scores[2].mean_engagement, 20.0);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let mut acc = GroupAccumulator::default();
        acc.add("b_first", 50.0);
        acc.add("a_second", 50.0);
        acc.add("c_third", 50.0);

        let groups = acc.sorted_means();
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["b_first", "a_second", "c_third"]);
    }

    #[test]
    fn test_overall_score_is_global_mean() {
        let mut acc = ScoreAccumulator::new();
        acc.accumulate(&scored("North", "a", 20.0));
        acc.accumulate(&scored("South", "b", 40.0));
        acc.accumulate(&scored("South", "b", 90.0));

        assert_eq!(acc.overall_score(), 50.0);
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = ScoreAccumulator::new();
        assert_eq!(acc.overall_score(), 0.0);

        let report = acc.into_report("rowwise", 0.1, RunDiagnostics::default());
        assert!(report.region_scores.is_empty());
        assert!(report.institution_scores.is_empty());
        assert_eq!(report.overall_score, 0.0);
    }

    #[test]
    fn test_chunked_accumulation_matches_batch() {
        let records: Vec<ScoredRecord> = (0..1000)
            .map(|i| {
                let region = match i % 4 {
                    0 => "North",
                    1 => "South",
                    2 => "East",
                    _ => "West",
                };
                scored(region, "college", ((i * 13) % 101) as f64)
            })
            .collect();

        let mut batch = ScoreAccumulator::new();
        batch.extend(&records);

        for chunk_size in [1, 7, 100, 999, 1000] {
            let mut chunked = ScoreAccumulator::new();
            for chunk in records.chunks(chunk_size) {
                chunked.extend(chunk);
            }

            let rel = (chunked.overall_score() - batch.overall_score()).abs()
                / batch.overall_score().abs();
            assert!(rel < 1e-9, "chunk_size {} diverged: {}", chunk_size, rel);

            let batch_regions = batch.regions.sorted_means();
            let chunked_regions = chunked.regions.sorted_means();
            assert_eq!(batch_regions.len(), chunked_regions.len());
            for (a, b) in batch_regions.iter().zip(chunked_regions.iter()) {
                assert_eq!(a.key, b.key);
                assert!((a.mean_engagement - b.mean_engagement).abs() < 1e-9);
            }
        }
    }
}
