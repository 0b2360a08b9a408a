// src/pipeline/orchestrator.rs
//
// One session end to end:
//   TrackStore (finalized) → per-track analysis (rayon) → SampleSummary
//                                                       → ComplianceReport
//
// Tracks are independent, so per-track work fans out across the rayon pool.
// Results keep store order (ascending track id).

use super::metrics::PipelineMetrics;
use crate::analysis::{
    is_valid_track, KinematicCalculator, MotilityClassifier, SampleAggregator, SampleSummary,
};
use crate::compliance::{ClinicalInput, ComplianceEngine, ComplianceReport, ReferenceStandardSet};
use crate::error::{ClinicalInputError, ConfigError};
use crate::track_store::TrackStore;
use crate::types::{Config, TrackAnalysis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Full result for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub session_id: String,
    pub sample_count: usize,
    pub summary: SampleSummary,
    pub compliance: ComplianceReport,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<TrackAnalysis>,
}

impl SessionAnalysis {
    pub fn without_tracks(mut self) -> Self {
        self.tracks.clear();
        self
    }
}

pub struct AnalysisPipeline {
    calculator: KinematicCalculator,
    classifier: MotilityClassifier,
    aggregator: SampleAggregator,
    reference: ReferenceStandardSet,
    metrics: PipelineMetrics,
}

impl AnalysisPipeline {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            calculator: KinematicCalculator::new(config.calibration)?,
            classifier: MotilityClassifier::new(),
            aggregator: SampleAggregator::new(),
            reference: config.reference.clone(),
            metrics: PipelineMetrics::new(),
        })
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Kinematics and classification for every track in the store.
    pub fn analyze_tracks(&self, store: &TrackStore) -> Vec<TrackAnalysis> {
        store
            .tracks()
            .par_iter()
            .map(|track| self.classifier.classify_track(&self.calculator, track))
            .collect()
    }

    /// Finalize the store and run every stage for one session. Fails only
    /// when manual clinical values are invalid.
    pub fn analyze_session(
        &self,
        session_id: &str,
        store: &mut TrackStore,
        manual: Option<&ClinicalInput>,
    ) -> Result<SessionAnalysis, ClinicalInputError> {
        let started = Instant::now();
        store.finalize();

        let tracks = self.analyze_tracks(store);
        let summary = self.aggregator.aggregate(&tracks);
        let compliance = ComplianceEngine::new(&self.reference).evaluate_sample(&summary, manual)?;

        let valid = tracks.iter().filter(|t| is_valid_track(t)).count();
        let short = tracks.iter().filter(|t| t.kinematics.is_none()).count();
        self.metrics.inc(&self.metrics.sessions_analyzed);
        self.metrics
            .add(&self.metrics.samples_ingested, store.sample_count() as u64);
        self.metrics
            .add(&self.metrics.tracks_analyzed, tracks.len() as u64);
        self.metrics.add(&self.metrics.valid_tracks, valid as u64);
        self.metrics.add(&self.metrics.short_tracks, short as u64);
        let elapsed_us = started.elapsed().as_micros() as u64;
        self.metrics.add(&self.metrics.analysis_time_us, elapsed_us);

        debug!(
            "Session {}: {} tracks ({} valid, {} short) in {} µs",
            session_id,
            tracks.len(),
            valid,
            short,
            elapsed_us
        );
        info!(
            "🔬 {}: {} tracks, progressive {:.1}%, category {}",
            session_id,
            summary.track_count,
            summary.total_progressive_percent,
            compliance.diagnostic_category.as_str()
        );

        Ok(SessionAnalysis {
            session_id: session_id.to_string(),
            sample_count: store.sample_count(),
            summary,
            compliance,
            tracks,
        })
    }

    /// Compliance for manually entered values only, no tracking involved.
    pub fn evaluate_manual(
        &self,
        input: &ClinicalInput,
    ) -> Result<ComplianceReport, ClinicalInputError> {
        ComplianceEngine::new(&self.reference).evaluate(input)
    }
}
