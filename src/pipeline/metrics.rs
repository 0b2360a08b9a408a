// src/pipeline/metrics.rs
//
// Run-wide counters and timing. Shared across blocking analysis tasks, so
// every counter is atomic. Reported in logs at the end of a run.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub sessions_analyzed: Arc<AtomicU64>,
    pub sessions_failed: Arc<AtomicU64>,
    pub samples_ingested: Arc<AtomicU64>,
    pub tracks_analyzed: Arc<AtomicU64>,
    pub valid_tracks: Arc<AtomicU64>,
    /// Tracks below the grading minimum, graded immotile without kinematics.
    pub short_tracks: Arc<AtomicU64>,
    /// Cumulative per-session analysis time.
    pub analysis_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            sessions_analyzed: Arc::new(AtomicU64::new(0)),
            sessions_failed: Arc::new(AtomicU64::new(0)),
            samples_ingested: Arc::new(AtomicU64::new(0)),
            tracks_analyzed: Arc::new(AtomicU64::new(0)),
            valid_tracks: Arc::new(AtomicU64::new(0)),
            short_tracks: Arc::new(AtomicU64::new(0)),
            analysis_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn tracks_per_sec(&self) -> f64 {
        let tracks = self.tracks_analyzed.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            tracks as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let sessions = self.sessions_analyzed.load(Ordering::Relaxed);
        let analysis_time_us = self.analysis_time_us.load(Ordering::Relaxed);
        MetricsSummary {
            sessions_analyzed: sessions,
            sessions_failed: self.sessions_failed.load(Ordering::Relaxed),
            samples_ingested: self.samples_ingested.load(Ordering::Relaxed),
            tracks_analyzed: self.tracks_analyzed.load(Ordering::Relaxed),
            valid_tracks: self.valid_tracks.load(Ordering::Relaxed),
            short_tracks: self.short_tracks.load(Ordering::Relaxed),
            avg_session_us: if sessions > 0 {
                analysis_time_us / sessions
            } else {
                0
            },
            tracks_per_sec: self.tracks_per_sec(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub sessions_analyzed: u64,
    pub sessions_failed: u64,
    pub samples_ingested: u64,
    pub tracks_analyzed: u64,
    pub valid_tracks: u64,
    pub short_tracks: u64,
    pub avg_session_us: u64,
    pub tracks_per_sec: f64,
    pub elapsed_secs: f64,
}
