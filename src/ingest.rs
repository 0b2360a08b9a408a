// src/ingest.rs
//
// Tracker output → TrackStore.
//
// A track file holds one record per detection, either as a JSON array or as
// JSON Lines. Positions come from `x`/`y` when present, otherwise from the
// center of `bbox` ([x1, y1, x2, y2] in pixels).

use crate::error::IngestError;
use crate::track_store::TrackStore;
use crate::types::{Position, TrackId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub track_id: TrackId,
    pub timestamp_ms: f64,
    #[serde(default)]
    pub frame_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
}

impl TrackerRecord {
    pub fn position(&self) -> Option<Position> {
        match (self.x, self.y, self.bbox) {
            (Some(x), Some(y), _) => Some((x, y)),
            (_, _, Some([x1, y1, x2, y2])) => Some(((x1 + x2) / 2.0, (y1 + y2) / 2.0)),
            _ => None,
        }
    }
}

/// Parse a JSON array or JSON Lines document. Blank lines are ignored.
pub fn parse_records(text: &str) -> Result<Vec<TrackerRecord>, IngestError> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|source| IngestError::Parse {
            line: source.line(),
            source,
        });
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| IngestError::Parse { line: i + 1, source })
        })
        .collect()
}

/// Record every sample in file order. Stops at the first rejected sample.
pub fn ingest_records(store: &mut TrackStore, records: &[TrackerRecord]) -> Result<usize, IngestError> {
    for record in records {
        let position = record.position().ok_or(IngestError::MissingPosition {
            track_id: record.track_id,
            timestamp_ms: record.timestamp_ms,
        })?;
        store.record(
            record.track_id,
            record.timestamp_ms,
            position,
            record.frame_index,
        )?;
    }
    Ok(records.len())
}

/// Parse a whole document into a fresh (unfinalized) store.
pub fn store_from_str(text: &str) -> Result<TrackStore, IngestError> {
    let records = parse_records(text)?;
    let mut store = TrackStore::new();
    let count = ingest_records(&mut store, &records)?;
    debug!("Ingested {} samples into {} tracks", count, store.len());
    Ok(store)
}

pub fn load_track_file(path: &Path) -> Result<TrackStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read track file {}", path.display()))?;
    store_from_str(&text).with_context(|| format!("Invalid track file {}", path.display()))
}

/// Track files under `dir` (recursive), sorted by path. Extension matching
/// ignores case.
pub fn find_track_files(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    info!("Found {} track files in {}", files.len(), dir.display());
    files
}

/// Session name for a track file: its stem.
pub fn session_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
