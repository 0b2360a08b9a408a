// src/error.rs

use crate::types::TrackId;
use thiserror::Error;

/// A tracker sample the store refuses to record. Never recovered locally:
/// reordering or dropping samples would corrupt the velocity math.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidSampleError {
    #[error("track {track_id}: timestamp {timestamp_ms} ms precedes last recorded {last_ms} ms")]
    OutOfOrder {
        track_id: TrackId,
        timestamp_ms: f64,
        last_ms: f64,
    },
    #[error("track {track_id}: non-finite sample (t={timestamp_ms}, x={x}, y={y})")]
    NonFinite {
        track_id: TrackId,
        timestamp_ms: f64,
        x: f64,
        y: f64,
    },
    #[error("track store is finalized, rejected sample for track {track_id}")]
    Finalized { track_id: TrackId },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("pixel_to_micron must be a positive finite number, got {0}")]
    InvalidScale(f64),
    #[error("fps must be a positive finite number, got {0}")]
    InvalidFps(f64),
    #[error("reference pH range is empty: ph_min {min} must be below ph_max {max}")]
    InvalidPhRange { min: f64, max: f64 },
    #[error("input.extensions must list at least one file extension")]
    NoInputExtensions,
}

/// Failure turning tracker output into a track store.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("line {line}: malformed tracker record: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("track {track_id} at {timestamp_ms} ms: record has neither x/y nor bbox")]
    MissingPosition { track_id: TrackId, timestamp_ms: f64 },
    #[error(transparent)]
    InvalidSample(#[from] InvalidSampleError),
}

/// A clinical value the compliance engine cannot assess.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClinicalInputError {
    #[error("{field}: value must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field}: value must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}
