// src/analysis/kinematics.rs
//
// CASA kinematics for a single track.
//
//   VCL  curvilinear velocity     sum of point-to-point distances / time
//   VSL  straight-line velocity   first-to-last chord / time
//   VAP  average-path velocity    VCL formula over a moving-average path
//   LIN  VSL/VCL, STR VSL/VAP, WOB VAP/VCL (percent)
//   ALH  mean perpendicular deviation of interior points from the chord
//   BCF  deviation peaks per second
//
// ALH and BCF use the first-to-last chord as the movement axis. That is an
// approximation: curved or looping tracks bias both values compared with a
// best-fit or smoothed axis.
//
// Every degenerate case (too few samples, zero elapsed time, zero
// denominators) resolves to 0 rather than an error or NaN.

use super::geometry::{path_length, point_to_line_distance, scale};
use super::path_smoother::PathSmoother;
use super::signal::{find_peaks, std_dev};
use crate::error::ConfigError;
use crate::types::{CalibrationConfig, KinematicResult, Position, Track};
use tracing::trace;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum samples for ALH.
pub const MIN_SAMPLES_FOR_ALH: usize = 3;
/// Minimum samples for BCF.
pub const MIN_SAMPLES_FOR_BCF: usize = 10;
/// Moving-average window for the VAP path.
pub const VAP_SMOOTHING_WINDOW: usize = 5;
/// BCF peaks must reach this fraction of the deviation standard deviation.
const BCF_PEAK_HEIGHT_STD_FRACTION: f64 = 0.5;

// ============================================================================
// CALCULATOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct KinematicCalculator {
    calibration: CalibrationConfig,
}

impl KinematicCalculator {
    pub fn new(calibration: CalibrationConfig) -> Result<Self, ConfigError> {
        if !(calibration.pixel_to_micron.is_finite() && calibration.pixel_to_micron > 0.0) {
            return Err(ConfigError::InvalidScale(calibration.pixel_to_micron));
        }
        if !(calibration.fps.is_finite() && calibration.fps > 0.0) {
            return Err(ConfigError::InvalidFps(calibration.fps));
        }
        Ok(Self { calibration })
    }

    /// All eight CASA parameters for one track.
    pub fn analyze(&self, track: &Track) -> KinematicResult {
        let positions = track.positions();
        let timestamps = track.timestamps();

        let (vcl, vsl, vap) = self.velocities(&positions, &timestamps);
        let (lin, str, wob) = Self::linearity(vcl, vsl, vap);
        let alh = self.lateral_amplitude(&positions);
        let bcf = self.beat_cross_frequency(&positions, &timestamps);

        trace!(
            "Track {}: VCL={:.1} VSL={:.1} VAP={:.1} LIN={:.1} ALH={:.2} BCF={:.2}",
            track.track_id,
            vcl,
            vsl,
            vap,
            lin,
            alh,
            bcf
        );

        KinematicResult {
            vcl,
            vsl,
            vap,
            lin,
            str,
            wob,
            alh,
            bcf,
        }
    }

    /// `(vcl, vsl, vap)` in µm/s. Positions in pixels, timestamps in ms.
    pub fn velocities(&self, positions: &[Position], timestamps_ms: &[f64]) -> (f64, f64, f64) {
        let n = positions.len().min(timestamps_ms.len());
        if n < 2 {
            return (0.0, 0.0, 0.0);
        }

        let elapsed_s = (timestamps_ms[n - 1] - timestamps_ms[0]) / 1000.0;
        if elapsed_s <= 0.0 {
            return (0.0, 0.0, 0.0);
        }

        let path_um = self.to_microns(&positions[..n]);

        let vcl = path_length(&path_um) / elapsed_s;
        let vsl = super::geometry::euclidean(path_um[0], path_um[n - 1]) / elapsed_s;

        let smoothed = PathSmoother::new(VAP_SMOOTHING_WINDOW).smooth(&path_um);
        let vap = if smoothed.len() < 2 {
            vsl
        } else {
            path_length(&smoothed) / elapsed_s
        };

        (vcl, vsl, vap)
    }

    /// `(lin, str, wob)` in percent.
    pub fn linearity(vcl: f64, vsl: f64, vap: f64) -> (f64, f64, f64) {
        let lin = ratio_percent(vsl, vcl);
        let str = ratio_percent(vsl, vap);
        let wob = ratio_percent(vap, vcl);
        (lin, str, wob)
    }

    /// ALH in µm.
    pub fn lateral_amplitude(&self, positions: &[Position]) -> f64 {
        if positions.len() < MIN_SAMPLES_FOR_ALH {
            return 0.0;
        }

        let path_um = self.to_microns(positions);
        let start = path_um[0];
        let end = path_um[path_um.len() - 1];

        let interior = &path_um[1..path_um.len() - 1];
        let total: f64 = interior
            .iter()
            .map(|&p| point_to_line_distance(p, start, end))
            .sum();
        total / interior.len() as f64
    }

    /// BCF in Hz.
    pub fn beat_cross_frequency(&self, positions: &[Position], timestamps_ms: &[f64]) -> f64 {
        let n = positions.len().min(timestamps_ms.len());
        if n < MIN_SAMPLES_FOR_BCF {
            return 0.0;
        }

        let path_um = self.to_microns(&positions[..n]);
        let start = path_um[0];
        let end = path_um[n - 1];

        let deviations: Vec<f64> = path_um
            .iter()
            .map(|&p| point_to_line_distance(p, start, end))
            .collect();

        let min_height = std_dev(&deviations) * BCF_PEAK_HEIGHT_STD_FRACTION;
        let peaks = find_peaks(&deviations, min_height);

        let elapsed_s = (timestamps_ms[n - 1] - timestamps_ms[0]) / 1000.0;
        if elapsed_s > 0.0 && peaks.len() > 1 {
            peaks.len() as f64 / elapsed_s
        } else {
            0.0
        }
    }

    fn to_microns(&self, positions: &[Position]) -> Vec<Position> {
        scale(positions, self.calibration.pixel_to_micron)
    }
}

fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> KinematicCalculator {
        KinematicCalculator::new(CalibrationConfig::default()).unwrap()
    }

    fn reference_track() -> (Vec<Position>, Vec<f64>) {
        let positions = vec![
            (100.0, 100.0),
            (102.0, 101.0),
            (105.0, 102.0),
            (108.0, 104.0),
            (112.0, 105.0),
            (115.0, 107.0),
            (119.0, 108.0),
            (122.0, 110.0),
            (126.0, 111.0),
            (130.0, 113.0),
        ];
        let timestamps = vec![0.0, 33.0, 66.0, 100.0, 133.0, 166.0, 200.0, 233.0, 266.0, 300.0];
        (positions, timestamps)
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let bad_scale = CalibrationConfig {
            pixel_to_micron: 0.0,
            fps: 30.0,
        };
        assert_eq!(
            KinematicCalculator::new(bad_scale).unwrap_err(),
            ConfigError::InvalidScale(0.0)
        );

        let bad_fps = CalibrationConfig {
            pixel_to_micron: 0.5,
            fps: -1.0,
        };
        assert_eq!(
            KinematicCalculator::new(bad_fps).unwrap_err(),
            ConfigError::InvalidFps(-1.0)
        );
    }

    #[test]
    fn test_fewer_than_two_samples_is_zero() {
        let calc = calculator();
        assert_eq!(calc.velocities(&[], &[]), (0.0, 0.0, 0.0));
        assert_eq!(calc.velocities(&[(1.0, 1.0)], &[0.0]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_elapsed_time_is_zero() {
        let calc = calculator();
        let positions = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)];
        assert_eq!(
            calc.velocities(&positions, &[50.0, 50.0, 50.0]),
            (0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_straight_constant_speed_track() {
        let calc = calculator();
        let positions: Vec<Position> = (0..12).map(|i| (10.0 + 4.0 * i as f64, 20.0)).collect();
        let timestamps: Vec<f64> = (0..12).map(|i| i as f64 * 100.0).collect();

        let (vcl, vsl, vap) = calc.velocities(&positions, &timestamps);
        // 44 px * 0.5 µm/px over 1.1 s
        assert!((vcl - 20.0).abs() < 1e-9);
        assert!((vsl - vcl).abs() < 1e-9);
        // One-sided edge windows shorten the average path to 36 px
        assert!((vap - 180.0 / 11.0).abs() < 1e-9, "vap = {}", vap);

        let (lin, str, wob) = KinematicCalculator::linearity(vcl, vsl, vap);
        assert!((lin - 100.0).abs() < 1e-9);
        assert!((str - 122.2222).abs() < 1e-3, "str = {}", str);
        assert!((wob - 81.8182).abs() < 1e-3, "wob = {}", wob);

        assert!(calc.lateral_amplitude(&positions).abs() < 1e-9);
        assert_eq!(calc.beat_cross_frequency(&positions, &timestamps), 0.0);
    }

    #[test]
    fn test_closed_loop_has_zero_vsl() {
        let calc = calculator();
        let positions = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];
        let timestamps = [0.0, 100.0, 200.0, 300.0, 400.0];

        let (vcl, vsl, vap) = calc.velocities(&positions, &timestamps);
        assert!(vcl > 0.0);
        assert_eq!(vsl, 0.0);

        let (lin, str, _) = KinematicCalculator::linearity(vcl, vsl, vap);
        assert_eq!(lin, 0.0);
        assert_eq!(str, 0.0);
    }

    #[test]
    fn test_linearity_zero_denominators() {
        assert_eq!(KinematicCalculator::linearity(0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
        let (lin, str, wob) = KinematicCalculator::linearity(0.0, 5.0, 0.0);
        assert_eq!((lin, str, wob), (0.0, 0.0, 0.0));
        let (lin, str, wob) = KinematicCalculator::linearity(10.0, 5.0, 0.0);
        assert!((lin - 50.0).abs() < 1e-12);
        assert_eq!(str, 0.0);
        assert_eq!(wob, 0.0);
    }

    #[test]
    fn test_reference_track_regression() {
        let calc = calculator();
        let (positions, timestamps) = reference_track();

        let (vcl, vsl, vap) = calc.velocities(&positions, &timestamps);
        // Path length 33.0566 px, chord sqrt(30² + 13²) px, both at 0.5 µm/px over 0.3 s
        let expected_vsl = (30.0_f64.powi(2) + 13.0_f64.powi(2)).sqrt() * 0.5 / 0.3;
        assert!((vcl - 55.094).abs() < 0.01, "vcl = {}", vcl);
        assert!((vsl - expected_vsl).abs() < 1e-9, "vsl = {}", vsl);
        assert!((vap - 43.0667).abs() < 1e-3, "vap = {}", vap);

        let (lin, str, wob) = KinematicCalculator::linearity(vcl, vsl, vap);
        assert!((lin - 98.9083).abs() < 1e-3, "lin = {}", lin);
        // Shortened average path puts STR above 100
        assert!((str - 126.5306).abs() < 1e-3, "str = {}", str);
        assert!((wob - 78.1694).abs() < 1e-3, "wob = {}", wob);

        let alh = calc.lateral_amplitude(&positions);
        assert!((alh - 0.14337).abs() < 1e-4, "alh = {}", alh);

        // Deviation peaks at indices 3, 5 and 7 over 0.3 s
        let bcf = calc.beat_cross_frequency(&positions, &timestamps);
        assert!((bcf - 10.0).abs() < 1e-9, "bcf = {}", bcf);
    }

    #[test]
    fn test_alh_requires_three_samples() {
        let calc = calculator();
        assert_eq!(calc.lateral_amplitude(&[(0.0, 0.0), (5.0, 5.0)]), 0.0);
    }

    #[test]
    fn test_alh_zigzag() {
        let calc = calculator();
        // Interior points alternate 4 px above/below the x-axis chord
        let positions = [(0.0, 0.0), (2.0, 4.0), (4.0, -4.0), (6.0, 4.0), (8.0, 0.0)];
        let alh = calc.lateral_amplitude(&positions);
        assert!((alh - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_bcf_requires_ten_samples() {
        let calc = calculator();
        let positions: Vec<Position> = (0..9)
            .map(|i| (i as f64 * 2.0, if i % 2 == 0 { 0.0 } else { 6.0 }))
            .collect();
        let timestamps: Vec<f64> = (0..9).map(|i| i as f64 * 33.0).collect();
        assert_eq!(calc.beat_cross_frequency(&positions, &timestamps), 0.0);
    }

    #[test]
    fn test_bcf_counts_deviation_peaks() {
        let calc = calculator();
        // 11 samples, start and end on the x-axis, oscillating in between
        let ys = [0.0, 6.0, 0.0, 6.0, 0.0, 6.0, 0.0, 6.0, 0.0, 6.0, 0.0];
        let positions: Vec<Position> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64 * 2.0, y))
            .collect();
        let timestamps: Vec<f64> = (0..11).map(|i| i as f64 * 100.0).collect();

        // 5 peaks over 1.0 s
        let bcf = calc.beat_cross_frequency(&positions, &timestamps);
        assert!((bcf - 5.0).abs() < 1e-9, "bcf = {}", bcf);
    }

    #[test]
    fn test_bcf_single_peak_is_zero() {
        let calc = calculator();
        // One bulge: deviation rises then falls once
        let ys = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0];
        let positions: Vec<Position> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        let timestamps: Vec<f64> = (0..11).map(|i| i as f64 * 33.0).collect();
        assert_eq!(calc.beat_cross_frequency(&positions, &timestamps), 0.0);
    }

    #[test]
    fn test_analyze_track() {
        let calc = calculator();
        let (positions, timestamps) = reference_track();
        let mut track = Track::new(1);
        for (i, (p, t)) in positions.iter().zip(timestamps.iter()).enumerate() {
            track.samples.push(crate::types::PositionSample {
                timestamp_ms: *t,
                position: *p,
                frame_index: i as u64,
            });
        }

        let result = calc.analyze(&track);
        let (vcl, vsl, vap) = calc.velocities(&positions, &timestamps);
        assert_eq!(result.vcl, vcl);
        assert_eq!(result.vsl, vsl);
        assert_eq!(result.vap, vap);
        assert!(result.alh >= 0.0);
        assert!(result.bcf >= 0.0);
    }
}
