// src/analysis/aggregator.rs
//
// Session-level reduction of per-track results.
//
// Two populations on purpose:
//   - kinematic means/stds use only valid tracks (≥ MIN_SAMPLES_FOR_KINEMATICS
//     samples and VCL > 0)
//   - grade and pattern distributions use every track, short ones included
//     (they were graded immotile / D upstream)

use super::signal::{mean, std_dev};
use crate::types::{KinematicResult, MotilityPattern, TrackAnalysis, WhoGrade};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Samples needed before a track's kinematics enter the sample means.
pub const MIN_SAMPLES_FOR_KINEMATICS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub track_count: usize,
    pub valid_track_count: usize,
    /// Means over valid tracks.
    pub mean: KinematicResult,
    /// Population standard deviations over valid tracks.
    pub std: KinematicResult,
    pub grade_counts: BTreeMap<WhoGrade, usize>,
    pub grade_percents: BTreeMap<WhoGrade, f64>,
    /// Grades A + B.
    pub total_progressive_percent: f64,
    /// Everything except grade D.
    pub total_motile_percent: f64,
    pub pattern_counts: BTreeMap<MotilityPattern, usize>,
    /// Mean quality score over all tracks.
    pub mean_quality_score: f64,
}

impl SampleSummary {
    pub fn empty() -> Self {
        Self {
            track_count: 0,
            valid_track_count: 0,
            mean: KinematicResult::default(),
            std: KinematicResult::default(),
            grade_counts: WhoGrade::ALL.iter().map(|g| (*g, 0)).collect(),
            grade_percents: WhoGrade::ALL.iter().map(|g| (*g, 0.0)).collect(),
            total_progressive_percent: 0.0,
            total_motile_percent: 0.0,
            pattern_counts: MotilityPattern::ALL.iter().map(|p| (*p, 0)).collect(),
            mean_quality_score: 0.0,
        }
    }

    pub fn grade_count(&self, grade: WhoGrade) -> usize {
        self.grade_counts.get(&grade).copied().unwrap_or(0)
    }

    pub fn grade_percent(&self, grade: WhoGrade) -> f64 {
        self.grade_percents.get(&grade).copied().unwrap_or(0.0)
    }

    /// Flat key/value view, e.g. `vcl_mean`, `grade_a_percent`.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        let mut flat = BTreeMap::new();
        flat.insert("track_count".to_string(), self.track_count as f64);
        flat.insert("valid_track_count".to_string(), self.valid_track_count as f64);

        let means = self.mean.values();
        let stds = self.std.values();
        for (i, name) in KinematicResult::FIELD_NAMES.iter().enumerate() {
            flat.insert(format!("{}_mean", name), means[i]);
            flat.insert(format!("{}_std", name), stds[i]);
        }

        for grade in WhoGrade::ALL {
            let key = grade.as_str().to_lowercase();
            flat.insert(
                format!("grade_{}_count", key),
                self.grade_count(grade) as f64,
            );
            flat.insert(format!("grade_{}_percent", key), self.grade_percent(grade));
        }
        for (pattern, count) in &self.pattern_counts {
            flat.insert(format!("{}_count", pattern.as_str()), *count as f64);
        }

        flat.insert(
            "total_progressive_percent".to_string(),
            self.total_progressive_percent,
        );
        flat.insert("total_motile_percent".to_string(), self.total_motile_percent);
        flat.insert("mean_quality_score".to_string(), self.mean_quality_score);
        flat
    }
}

pub fn is_valid_track(analysis: &TrackAnalysis) -> bool {
    analysis.sample_count >= MIN_SAMPLES_FOR_KINEMATICS
        && analysis.kinematics.map(|k| k.vcl > 0.0).unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAggregator;

impl SampleAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, analyses: &[TrackAnalysis]) -> SampleSummary {
        let mut summary = SampleSummary::empty();
        if analyses.is_empty() {
            return summary;
        }

        let total = analyses.len();
        summary.track_count = total;

        // Distributions over all tracks
        for analysis in analyses {
            *summary
                .grade_counts
                .entry(analysis.classification.who_grade)
                .or_insert(0) += 1;
            *summary
                .pattern_counts
                .entry(analysis.classification.pattern)
                .or_insert(0) += 1;
        }
        for (grade, count) in &summary.grade_counts {
            summary
                .grade_percents
                .insert(*grade, percent(*count, total));
        }
        summary.total_progressive_percent = percent(
            summary.grade_count(WhoGrade::A) + summary.grade_count(WhoGrade::B),
            total,
        );
        summary.total_motile_percent = percent(total - summary.grade_count(WhoGrade::D), total);

        let qualities: Vec<f64> = analyses
            .iter()
            .map(|a| a.classification.quality_score)
            .collect();
        summary.mean_quality_score = mean(&qualities);

        // Kinematics over valid tracks only
        let valid: Vec<KinematicResult> = analyses
            .iter()
            .filter(|a| is_valid_track(a))
            .filter_map(|a| a.kinematics)
            .collect();
        summary.valid_track_count = valid.len();

        if !valid.is_empty() {
            let mut means = [0.0; 8];
            let mut stds = [0.0; 8];
            for field in 0..8 {
                let column: Vec<f64> = valid.iter().map(|k| k.values()[field]).collect();
                means[field] = mean(&column);
                stds[field] = std_dev(&column);
            }
            summary.mean = KinematicResult::from_values(means);
            summary.std = KinematicResult::from_values(stds);
        }

        summary
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
