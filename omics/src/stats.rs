/// Calculate the arithmetic mean of a slice, NaN if empty
#[inline]
pub fn mean(slice: &[f64]) -> f64 {
    if slice.is_empty() {
        return f64::NAN;
    }
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Calculate the standard deviation (sample, ddof = 1) of a slice
///
/// Fewer than two values leaves the deviation undefined, and NaN is returned
#[inline]
pub fn stddev(slice: &[f64]) -> f64 {
    if slice.len() < 2 {
        return f64::NAN;
    }
    let m = mean(slice);
    let n = (slice.len() - 1) as f64;
    (slice.iter().fold(0.0f64, |acc, x| acc + (x - m).powi(2)) / n).sqrt()
}

/// log2 fold change from condition A to condition B, with a pseudocount of 1
///
/// The pseudocount keeps zero means finite, at the cost of compressing fold
/// changes between near-zero means.
#[inline]
pub fn log2fc(mean_a: f64, mean_b: f64) -> f64 {
    (mean_b + 1.0).log2() - (mean_a + 1.0).log2()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mean_stddev() {
        assert_eq!(mean(&[1., 2., 3., 4.]), 2.5);
        assert!(mean(&[]).is_nan());
        assert!((stddev(&[2., 4., 4., 4., 5., 5., 7., 9.]) - 2.13809).abs() < 1e-5);
        assert_eq!(stddev(&[3., 3.]), 0.0);
        assert!(stddev(&[3.]).is_nan());
        assert!(stddev(&[]).is_nan());
    }

    #[test]
    fn fold_change() {
        assert_eq!(log2fc(1.0, 3.0), 1.0);
        assert_eq!(log2fc(0.0, 0.0), 0.0);
        for &(a, b) in &[(0.0, 7.0), (12.5, 3.25), (1e-3, 4e4), (100.0, 100.0)] {
            assert_eq!(log2fc(a, b), -log2fc(b, a));
            assert_eq!(log2fc(a, a), 0.0);
        }
        assert!(log2fc(f64::NAN, 1.0).is_nan());
    }
}
