// src/types.rs

use crate::compliance::ReferenceStandardSet;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Reference thresholds. Defaults to the WHO 6th edition (2021) table.
    #[serde(default)]
    pub reference: ReferenceStandardSet,
}

/// Microscope calibration, fixed for one analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub pixel_to_micron: f64,
    /// Acquisition frame rate. Informational only: velocities use the
    /// tracker's real timestamps.
    pub fps: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            pixel_to_micron: 0.5,
            fps: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub dir: String,
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: "tracks".to_string(),
            extensions: vec!["json".to_string(), "jsonl".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for JSON reports. Reports go to stdout when unset.
    pub dir: Option<String>,
    pub format: OutputFormat,
    /// Include per-track analyses in JSON reports.
    pub include_tracks: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: OutputFormat::Console,
            include_tracks: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "casa_motility=info".to_string(),
        }
    }
}

// ============================================================================
// TRACK DATA
// ============================================================================

pub type TrackId = u64;

/// Position in pixel space, `(x, y)`.
pub type Position = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub timestamp_ms: f64,
    pub position: Position,
    pub frame_index: u64,
}

/// Time-ordered position history of one tracked cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: TrackId,
    pub samples: Vec<PositionSample>,
}

impl Track {
    pub fn new(track_id: TrackId) -> Self {
        Self {
            track_id,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.samples.iter().map(|s| s.position).collect()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp_ms).collect()
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.samples.last().map(|s| s.timestamp_ms)
    }
}

// ============================================================================
// PER-TRACK RESULTS
// ============================================================================

/// CASA kinematics of one track. Velocities in µm/s, ratios in percent,
/// ALH in µm, BCF in Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicResult {
    pub vcl: f64,
    pub vsl: f64,
    pub vap: f64,
    pub lin: f64,
    pub str: f64,
    pub wob: f64,
    pub alh: f64,
    pub bcf: f64,
}

impl KinematicResult {
    pub const FIELD_NAMES: [&'static str; 8] =
        ["vcl", "vsl", "vap", "lin", "str", "wob", "alh", "bcf"];

    pub fn values(&self) -> [f64; 8] {
        [
            self.vcl, self.vsl, self.vap, self.lin, self.str, self.wob, self.alh, self.bcf,
        ]
    }

    pub fn from_values(v: [f64; 8]) -> Self {
        Self {
            vcl: v[0],
            vsl: v[1],
            vap: v[2],
            lin: v[3],
            str: v[4],
            wob: v[5],
            alh: v[6],
            bcf: v[7],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotilityPattern {
    Immotile,
    RapidProgressive,
    SlowProgressive,
    Hyperactivated,
    NonProgressive,
}

impl MotilityPattern {
    pub const ALL: [MotilityPattern; 5] = [
        Self::RapidProgressive,
        Self::SlowProgressive,
        Self::Hyperactivated,
        Self::NonProgressive,
        Self::Immotile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immotile => "immotile",
            Self::RapidProgressive => "rapid_progressive",
            Self::SlowProgressive => "slow_progressive",
            Self::Hyperactivated => "hyperactivated",
            Self::NonProgressive => "non_progressive",
        }
    }
}

/// WHO motility grade: A rapid progressive, B slow progressive,
/// C non-progressive, D immotile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WhoGrade {
    A,
    B,
    C,
    D,
}

impl WhoGrade {
    pub const ALL: [WhoGrade; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::A => "rapid progressive",
            Self::B => "slow progressive",
            Self::C => "non-progressive",
            Self::D => "immotile",
        }
    }

    pub fn is_progressive(&self) -> bool {
        matches!(self, Self::A | Self::B)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotilityClassification {
    pub pattern: MotilityPattern,
    pub who_grade: WhoGrade,
    pub quality_score: f64,
}

impl MotilityClassification {
    /// Classification for tracks too short to trust any kinematics.
    pub fn insufficient_data() -> Self {
        Self {
            pattern: MotilityPattern::Immotile,
            who_grade: WhoGrade::D,
            quality_score: 0.0,
        }
    }
}

/// Everything computed for one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    pub track_id: TrackId,
    pub sample_count: usize,
    /// `None` when the track was too short to compute kinematics.
    pub kinematics: Option<KinematicResult>,
    pub classification: MotilityClassification,
}
