/// Arithmetic mean over a slice of present values.
///
/// Returns `None` for an empty slice; callers decide how to surface the
/// missing result.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson correlation coefficient over paired observations.
///
/// Returns `None` when fewer than two pairs are available or when either
/// side has zero variance (the coefficient is undefined there, not 0).
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = pairs.iter().map(|&(x, _)| x).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|&(_, y)| y).sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0, 6.0]), Some(5.0));
    }

    #[test]
    fn test_pearson_perfect_positive() {
        let pairs = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        let r = pearson(&pairs).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_self_is_one() {
        let xs = [20.0, 22.0, 24.0, 26.0];
        let pairs: Vec<(f64, f64)> = xs.iter().map(|&x| (x, x)).collect();
        assert!((pearson(&pairs).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_symmetric() {
        let ab = [(20.0, 8.0), (22.0, 8.0), (24.0, 10.0), (26.0, 10.0)];
        let ba: Vec<(f64, f64)> = ab.iter().map(|&(a, b)| (b, a)).collect();
        assert_eq!(pearson(&ab), pearson(&ba));
    }

    #[test]
    fn test_pearson_small_sample() {
        // age vs plan duration over four records
        let pairs = [(20.0, 8.0), (22.0, 8.0), (24.0, 10.0), (26.0, 10.0)];
        let r = pearson(&pairs).unwrap();
        // cov = 8, sd_x = sqrt(20), sd_y = 2
        assert!((r - 8.0 / (20.0f64.sqrt() * 2.0)).abs() < 1e-12);
        assert!((r - 0.8944).abs() < 1e-4);
    }

    #[test]
    fn test_pearson_zero_variance_is_none() {
        let pairs = [(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)];
        assert_eq!(pearson(&pairs), None);
    }

    #[test]
    fn test_pearson_too_few_pairs() {
        assert_eq!(pearson(&[(1.0, 2.0)]), None);
        assert_eq!(pearson(&[]), None);
    }
}
