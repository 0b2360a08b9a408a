// src/analysis/path_smoother.rs

use crate::types::Position;

/// Centered moving-average smoother used to build the average path for VAP.
pub struct PathSmoother {
    window_size: usize,
}

impl PathSmoother {
    /// Create a smoother with the given maximum window size
    ///
    /// # Arguments
    /// * `window_size` - Number of samples averaged around each point (e.g., 5)
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }

    /// Smooth a path with a centered window of at most `min(window_size, n)`
    /// samples.
    ///
    /// Near the ends of the path the window is cut off at the sequence
    /// boundary, so edge windows are one-sided and pull the first and last
    /// points inward. Paths shorter than 3 points are returned unchanged.
    pub fn smooth(&self, path: &[Position]) -> Vec<Position> {
        if path.len() < 3 {
            return path.to_vec();
        }

        let n = path.len();
        let half = self.window_size.min(n) / 2;

        (0..n)
            .map(|i| {
                let start = i.saturating_sub(half);
                let end = (i + half + 1).min(n);
                Self::centroid(&path[start..end])
            })
            .collect()
    }

    fn centroid(window: &[Position]) -> Position {
        let n = window.len() as f64;
        let (sx, sy) = window
            .iter()
            .fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
        (sx / n, sy / n)
    }
}

impl Default for PathSmoother {
    fn default() -> Self {
        Self::new(5)
    }
}
