// src/analysis/mod.rs
//
// Per-track kinematics and motility grading.
//
// Signal flow:
//   Track → path_smoother → kinematics ─→ motility_classifier → TrackAnalysis
//                                                                   │
//   [TrackAnalysis] ──────────────────────────→ aggregator → SampleSummary

pub mod aggregator;
pub mod geometry;
pub mod kinematics;
pub mod motility_classifier;
pub mod path_smoother;
pub mod signal;

pub use aggregator::{is_valid_track, SampleAggregator, SampleSummary, MIN_SAMPLES_FOR_KINEMATICS};
pub use kinematics::KinematicCalculator;
pub use motility_classifier::{MotilityClassifier, MIN_SAMPLES_FOR_GRADING};
pub use path_smoother::PathSmoother;
