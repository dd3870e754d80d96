//! Thresholded difference trace between two channels

/// Keep `a[i]` where the channels differ by more than `threshold`.
///
/// Indices where `|a[i] − b[i]| ≤ threshold` become NaN so the plot shows a
/// gap. The result is as long as the shorter input.
pub fn threshold_difference(a: &[f64], b: &[f64], threshold: f64) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| if (x - y).abs() > threshold { x } else { f64::NAN })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaps_where_channels_agree() {
        let out = threshold_difference(&[1.0, 2.0, 3.0, 9.0], &[1.0, 2.5, 0.0], 0.5);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_eq!(out[2], 3.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(threshold_difference(&[], &[1.0], 0.1).is_empty());
    }
}
