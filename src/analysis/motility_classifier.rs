// src/analysis/motility_classifier.rs
//
// Per-track motility decision.
//
// Two independent classifications come out of one KinematicResult:
//   - movement pattern: first matching rule of PATTERN_RULES wins,
//     NonProgressive when none match
//   - WHO grade: first matching rule of GRADE_RULES wins, D when none match
//
// Tracks shorter than MIN_SAMPLES_FOR_GRADING are graded immotile / D
// without computing kinematics.

use super::kinematics::KinematicCalculator;
use crate::types::{
    KinematicResult, MotilityClassification, MotilityPattern, Track, TrackAnalysis, WhoGrade,
};
use tracing::trace;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Fewer samples than this are not graded at all.
pub const MIN_SAMPLES_FOR_GRADING: usize = 5;

/// VCL below this is immotile (µm/s).
pub const IMMOTILE_VCL: f64 = 5.0;
/// Rapid progressive: VSL (µm/s) and LIN (%) lower bounds.
pub const RAPID_VSL: f64 = 25.0;
pub const RAPID_LIN: f64 = 50.0;
/// Slow progressive: VSL (µm/s) and LIN (%) lower bounds.
pub const SLOW_VSL: f64 = 5.0;
pub const SLOW_LIN: f64 = 25.0;
/// Hyperactivated: ALH strictly above this (µm).
pub const HYPERACTIVATED_ALH: f64 = 2.0;

// Quality score caps, in points. They sum to 100.
const QUALITY_VELOCITY_CAP: f64 = 30.0;
const QUALITY_LINEARITY_CAP: f64 = 25.0;
const QUALITY_PROGRESSION_CAP: f64 = 25.0;
const QUALITY_STRAIGHTNESS_CAP: f64 = 20.0;
/// VCL at which the velocity term saturates.
const QUALITY_VELOCITY_FULL_SCALE: f64 = 100.0;
/// VSL at which the progression term saturates.
const QUALITY_PROGRESSION_FULL_SCALE: f64 = 50.0;

// ============================================================================
// RULE TABLES
// ============================================================================

pub struct Rule<T> {
    pub label: T,
    pub applies: fn(&KinematicResult) -> bool,
}

fn is_immotile(k: &KinematicResult) -> bool {
    k.vcl < IMMOTILE_VCL
}

fn is_rapid_progressive(k: &KinematicResult) -> bool {
    k.vsl >= RAPID_VSL && k.lin >= RAPID_LIN
}

fn is_slow_progressive(k: &KinematicResult) -> bool {
    k.vsl >= SLOW_VSL && k.lin >= SLOW_LIN
}

fn is_hyperactivated(k: &KinematicResult) -> bool {
    k.vcl >= IMMOTILE_VCL && k.alh > HYPERACTIVATED_ALH
}

fn has_net_displacement(k: &KinematicResult) -> bool {
    k.vsl > 0.0
}

/// Pattern rules in priority order.
pub const PATTERN_RULES: [Rule<MotilityPattern>; 4] = [
    Rule {
        label: MotilityPattern::Immotile,
        applies: is_immotile,
    },
    Rule {
        label: MotilityPattern::RapidProgressive,
        applies: is_rapid_progressive,
    },
    Rule {
        label: MotilityPattern::SlowProgressive,
        applies: is_slow_progressive,
    },
    Rule {
        label: MotilityPattern::Hyperactivated,
        applies: is_hyperactivated,
    },
];

/// WHO grade rules in priority order.
pub const GRADE_RULES: [Rule<WhoGrade>; 3] = [
    Rule {
        label: WhoGrade::A,
        applies: is_rapid_progressive,
    },
    Rule {
        label: WhoGrade::B,
        applies: is_slow_progressive,
    },
    Rule {
        label: WhoGrade::C,
        applies: has_net_displacement,
    },
];

fn first_match<T: Copy>(rules: &[Rule<T>], k: &KinematicResult, fallback: T) -> T {
    rules
        .iter()
        .find(|rule| (rule.applies)(k))
        .map(|rule| rule.label)
        .unwrap_or(fallback)
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct MotilityClassifier;

impl MotilityClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn pattern(&self, k: &KinematicResult) -> MotilityPattern {
        first_match(&PATTERN_RULES, k, MotilityPattern::NonProgressive)
    }

    pub fn who_grade(&self, k: &KinematicResult) -> WhoGrade {
        first_match(&GRADE_RULES, k, WhoGrade::D)
    }

    /// Weighted movement quality in [0, 100].
    pub fn quality_score(&self, k: &KinematicResult) -> f64 {
        let velocity = (k.vcl / QUALITY_VELOCITY_FULL_SCALE * QUALITY_VELOCITY_CAP)
            .min(QUALITY_VELOCITY_CAP);
        let linearity = (k.lin / 100.0 * QUALITY_LINEARITY_CAP).min(QUALITY_LINEARITY_CAP);
        let progression = (k.vsl / QUALITY_PROGRESSION_FULL_SCALE * QUALITY_PROGRESSION_CAP)
            .min(QUALITY_PROGRESSION_CAP);
        let straightness =
            (k.str / 100.0 * QUALITY_STRAIGHTNESS_CAP).min(QUALITY_STRAIGHTNESS_CAP);

        let total = velocity + linearity + progression + straightness;
        if total.is_nan() {
            return 0.0;
        }
        total.clamp(0.0, 100.0)
    }

    pub fn classify(&self, k: &KinematicResult) -> MotilityClassification {
        MotilityClassification {
            pattern: self.pattern(k),
            who_grade: self.who_grade(k),
            quality_score: self.quality_score(k),
        }
    }

    /// Kinematics plus classification for one track, with the short-track
    /// shortcut applied.
    pub fn classify_track(&self, calculator: &KinematicCalculator, track: &Track) -> TrackAnalysis {
        if track.len() < MIN_SAMPLES_FOR_GRADING {
            trace!(
                "Track {}: {} samples, graded immotile without kinematics",
                track.track_id,
                track.len()
            );
            return TrackAnalysis {
                track_id: track.track_id,
                sample_count: track.len(),
                kinematics: None,
                classification: MotilityClassification::insufficient_data(),
            };
        }

        let kinematics = calculator.analyze(track);
        TrackAnalysis {
            track_id: track.track_id,
            sample_count: track.len(),
            kinematics: Some(kinematics),
            classification: self.classify(&kinematics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CalibrationConfig, PositionSample};

    fn kin(vcl: f64, vsl: f64, lin: f64, alh: f64) -> KinematicResult {
        KinematicResult {
            vcl,
            vsl,
            vap: vcl,
            lin,
            str: 0.0,
            wob: 0.0,
            alh,
            bcf: 0.0,
        }
    }

    #[test]
    fn test_rule_immotile_has_priority() {
        let c = MotilityClassifier::new();
        // Would otherwise be rapid progressive
        assert_eq!(c.pattern(&kin(4.9, 30.0, 90.0, 0.0)), MotilityPattern::Immotile);
    }

    #[test]
    fn test_rule_rapid_progressive() {
        let c = MotilityClassifier::new();
        let k = kin(60.0, 25.0, 50.0, 5.0);
        assert_eq!(c.pattern(&k), MotilityPattern::RapidProgressive);
        assert_eq!(c.who_grade(&k), WhoGrade::A);
    }

    #[test]
    fn test_rule_slow_progressive() {
        let c = MotilityClassifier::new();
        // Fast but not linear enough for A
        let k = kin(60.0, 30.0, 49.9, 5.0);
        assert_eq!(c.pattern(&k), MotilityPattern::SlowProgressive);
        assert_eq!(c.who_grade(&k), WhoGrade::B);

        let k = kin(20.0, 5.0, 25.0, 0.0);
        assert_eq!(c.pattern(&k), MotilityPattern::SlowProgressive);
        assert_eq!(c.who_grade(&k), WhoGrade::B);
    }

    #[test]
    fn test_rule_hyperactivated() {
        let c = MotilityClassifier::new();
        let k = kin(80.0, 3.0, 4.0, 2.5);
        assert_eq!(c.pattern(&k), MotilityPattern::Hyperactivated);
        assert_eq!(c.who_grade(&k), WhoGrade::C);

        // ALH exactly at the bound is not hyperactivated
        let k = kin(80.0, 3.0, 4.0, 2.0);
        assert_eq!(c.pattern(&k), MotilityPattern::NonProgressive);
    }

    #[test]
    fn test_rule_fallback_non_progressive() {
        let c = MotilityClassifier::new();
        let k = kin(10.0, 0.0, 0.0, 0.5);
        assert_eq!(c.pattern(&k), MotilityPattern::NonProgressive);
        assert_eq!(c.who_grade(&k), WhoGrade::D);
    }

    #[test]
    fn test_grade_is_independent_of_pattern() {
        let c = MotilityClassifier::new();
        // Immotile pattern but still some net displacement → grade C
        let k = kin(3.0, 1.0, 33.0, 0.0);
        assert_eq!(c.pattern(&k), MotilityPattern::Immotile);
        assert_eq!(c.who_grade(&k), WhoGrade::C);
    }

    #[test]
    fn test_quality_score_bounds() {
        let c = MotilityClassifier::new();
        assert_eq!(c.quality_score(&KinematicResult::default()), 0.0);

        let extreme = KinematicResult {
            vcl: 1e9,
            vsl: 1e9,
            vap: 1e9,
            lin: 1e6,
            str: 1e6,
            wob: 1e6,
            alh: 1e3,
            bcf: 1e3,
        };
        assert_eq!(c.quality_score(&extreme), 100.0);

        let infinite = KinematicResult {
            vcl: f64::INFINITY,
            ..extreme
        };
        let q = c.quality_score(&infinite);
        assert!((0.0..=100.0).contains(&q));
    }

    #[test]
    fn test_quality_score_weights() {
        let c = MotilityClassifier::new();
        let k = KinematicResult {
            vcl: 50.0,
            vsl: 25.0,
            vap: 40.0,
            lin: 50.0,
            str: 62.5,
            wob: 80.0,
            alh: 1.0,
            bcf: 0.0,
        };
        // 15 + 12.5 + 12.5 + 12.5
        assert!((c.quality_score(&k) - 52.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_track_shortcut() {
        let c = MotilityClassifier::new();
        let calc = KinematicCalculator::new(CalibrationConfig::default()).unwrap();

        let mut track = Track::new(9);
        for i in 0..4 {
            track.samples.push(PositionSample {
                timestamp_ms: i as f64 * 33.0,
                position: (i as f64 * 50.0, 0.0),
                frame_index: i,
            });
        }

        let analysis = c.classify_track(&calc, &track);
        assert_eq!(analysis.sample_count, 4);
        assert!(analysis.kinematics.is_none());
        assert_eq!(analysis.classification.pattern, MotilityPattern::Immotile);
        assert_eq!(analysis.classification.who_grade, WhoGrade::D);
        assert_eq!(analysis.classification.quality_score, 0.0);
    }

    #[test]
    fn test_five_samples_are_graded() {
        let c = MotilityClassifier::new();
        let calc = KinematicCalculator::new(CalibrationConfig::default()).unwrap();

        // 5 samples, 20 px per 100 ms straight → 100 µm/s
        let mut track = Track::new(2);
        for i in 0..5u64 {
            track.samples.push(PositionSample {
                timestamp_ms: i as f64 * 100.0,
                position: (i as f64 * 20.0, 0.0),
                frame_index: i,
            });
        }

        let analysis = c.classify_track(&calc, &track);
        let k = analysis.kinematics.unwrap();
        assert!((k.vcl - 100.0).abs() < 1e-9);
        assert_eq!(
            analysis.classification.pattern,
            MotilityPattern::RapidProgressive
        );
        assert_eq!(analysis.classification.who_grade, WhoGrade::A);
    }
}
