// src/lib.rs
//
// CASA sperm-motility analysis: kinematics from tracked trajectories,
// WHO motility grading, sample aggregation and reference compliance.

pub mod analysis;
pub mod compliance;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod track_store;
pub mod types;

pub use analysis::{KinematicCalculator, MotilityClassifier, SampleAggregator, SampleSummary};
pub use compliance::{ClinicalInput, ComplianceEngine, ComplianceReport, ReferenceStandardSet};
pub use error::{ConfigError, IngestError, InvalidSampleError};
pub use pipeline::{AnalysisPipeline, SessionAnalysis};
pub use track_store::TrackStore;
pub use types::{CalibrationConfig, Config, KinematicResult, Track, TrackAnalysis};
