// src/pipeline/mod.rs

pub mod metrics;
pub mod orchestrator;

pub use metrics::{MetricsSummary, PipelineMetrics};
pub use orchestrator::{AnalysisPipeline, SessionAnalysis};
