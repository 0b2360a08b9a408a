// src/analysis/geometry.rs

use crate::types::Position;

pub fn euclidean(a: Position, b: Position) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Sum of segment lengths along a polyline.
pub fn path_length(points: &[Position]) -> f64 {
    points.windows(2).map(|w| euclidean(w[0], w[1])).sum()
}

/// Perpendicular distance from `point` to the infinite line through
/// `line_start` and `line_end`. When the two line points coincide the line
/// is undefined and the distance to `line_start` is returned instead.
pub fn point_to_line_distance(point: Position, line_start: Position, line_end: Position) -> f64 {
    let (x0, y0) = point;
    let (x1, y1) = line_start;
    let (x2, y2) = line_end;

    if x1 == x2 && y1 == y2 {
        return euclidean(point, line_start);
    }

    let numerator = ((y2 - y1) * x0 - (x2 - x1) * y0 + x2 * y1 - y2 * x1).abs();
    let denominator = (y2 - y1).hypot(x2 - x1);
    numerator / denominator
}

pub fn scale(points: &[Position], factor: f64) -> Vec<Position> {
    points.iter().map(|&(x, y)| (x * factor, y * factor)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_line_distance() {
        // Horizontal line y=0, point 3 above
        let d = point_to_line_distance((5.0, 3.0), (0.0, 0.0), (10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-12);

        // Point beyond the segment still measures to the infinite line
        let d = point_to_line_distance((20.0, -4.0), (0.0, 0.0), (10.0, 0.0));
        assert!((d - 4.0).abs() < 1e-12);

        // Diagonal line y=x
        let d = point_to_line_distance((0.0, 2.0), (0.0, 0.0), (1.0, 1.0));
        assert!((d - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_line_uses_point_distance() {
        let d = point_to_line_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_path_length() {
        let pts = [(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)];
        assert!((path_length(&pts) - 11.0).abs() < 1e-12);
        assert_eq!(path_length(&pts[..1]), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }
}
