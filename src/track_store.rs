// src/track_store.rs
//
// Per-session sample store fed by the external tracker.
//
// Tracks are created on their first sample and appended to afterwards.
// Delivery order across tracks is free; within a track timestamps must be
// non-decreasing. Once finalized the store is read-only.

use crate::error::InvalidSampleError;
use crate::types::{Position, PositionSample, Track, TrackId};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: BTreeMap<TrackId, Track>,
    finalized: bool,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to `track_id`, creating the track if absent.
    pub fn record(
        &mut self,
        track_id: TrackId,
        timestamp_ms: f64,
        position: Position,
        frame_index: u64,
    ) -> Result<(), InvalidSampleError> {
        if self.finalized {
            return Err(InvalidSampleError::Finalized { track_id });
        }

        let (x, y) = position;
        if !timestamp_ms.is_finite() || !x.is_finite() || !y.is_finite() {
            return Err(InvalidSampleError::NonFinite {
                track_id,
                timestamp_ms,
                x,
                y,
            });
        }

        let track = self.tracks.entry(track_id).or_insert_with(|| {
            debug!("New track {}", track_id);
            Track::new(track_id)
        });

        if let Some(last_ms) = track.last_timestamp() {
            if timestamp_ms < last_ms {
                return Err(InvalidSampleError::OutOfOrder {
                    track_id,
                    timestamp_ms,
                    last_ms,
                });
            }
        }

        track.samples.push(PositionSample {
            timestamp_ms,
            position,
            frame_index,
        });
        Ok(())
    }

    /// Snapshot of all tracks, ordered by track id.
    pub fn tracks(&self) -> Vec<&Track> {
        self.tracks.values().collect()
    }

    pub fn get(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Mark the session over. Later `record` calls fail.
    pub fn finalize(&mut self) {
        if !self.finalized {
            debug!(
                "Track store finalized: {} tracks, {} samples",
                self.tracks.len(),
                self.sample_count()
            );
        }
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.tracks.values().map(Track::len).sum()
    }
}
