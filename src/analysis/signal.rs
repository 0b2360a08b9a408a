// src/analysis/signal.rs
//
// Small numeric helpers shared by the kinematic calculator and the
// sample aggregator.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Indices of local maxima whose value is at least `min_height`.
///
/// A peak is a sample strictly higher than both neighbours. A flat top
/// (several equal samples bounded by lower samples on both sides) counts
/// once, at its middle index (rounded down). The first and last samples are
/// never peaks.
pub fn find_peaks(values: &[f64], min_height: f64) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            // Walk across a possible plateau
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                let peak = (left_edge + right_edge) / 2;
                if values[peak] >= min_height {
                    peaks.push(peak);
                }
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}
