//! Normalizers mapping raw counts onto [0, 1]

/// Logarithmic scaling for heavy-tailed counts (stars, forks, contributors).
///
/// Early increments move the score more than later ones. Values at or below
/// `min` map to 0, values at or above `max` map to 1.
pub fn normalize_log(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || value <= min {
        return 0.0;
    }
    if value >= max {
        return 1.0;
    }
    ((value - min + 1.0).ln() / (max - min + 1.0).ln()).clamp(0.0, 1.0)
}

/// Linear interpolation between `min` and `max`, clamped to [0, 1]
pub fn normalize_linear(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || value <= min {
        return 0.0;
    }
    if value >= max {
        return 1.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_bounds() {
        assert_eq!(normalize_log(0.0, 0.0, 1000.0), 0.0);
        assert_eq!(normalize_log(1000.0, 0.0, 1000.0), 1.0);
        assert_eq!(normalize_log(10_000.0, 0.0, 1000.0), 1.0);
        assert_eq!(normalize_log(-5.0, 0.0, 1000.0), 0.0);
        assert_eq!(normalize_log(1.0, 1.0, 50.0), 0.0);
    }

    #[test]
    fn test_log_midrange() {
        let v = normalize_log(3.0, 1.0, 50.0);
        let expected = 3f64.ln() / 50f64.ln();
        assert!((v - expected).abs() < 1e-12, "got {v}");

        // Early increments matter more
        let first = normalize_log(10.0, 0.0, 1000.0) - normalize_log(0.0, 0.0, 1000.0);
        let later = normalize_log(510.0, 0.0, 1000.0) - normalize_log(500.0, 0.0, 1000.0);
        assert!(first > later);
    }

    #[test]
    fn test_linear() {
        assert_eq!(normalize_linear(0.0, 0.0, 50.0), 0.0);
        assert_eq!(normalize_linear(25.0, 0.0, 50.0), 0.5);
        assert_eq!(normalize_linear(50.0, 0.0, 50.0), 1.0);
        assert_eq!(normalize_linear(500.0, 0.0, 50.0), 1.0);
    }

    #[test]
    fn test_monotonic() {
        let mut prev_log = 0.0;
        let mut prev_lin = 0.0;
        for i in 0..=1200 {
            let v = i as f64;
            let log = normalize_log(v, 0.0, 1000.0);
            let lin = normalize_linear(v, 0.0, 1000.0);
            assert!(log >= prev_log, "log not monotonic at {v}");
            assert!(lin >= prev_lin, "linear not monotonic at {v}");
            assert!((0.0..=1.0).contains(&log));
            assert!((0.0..=1.0).contains(&lin));
            prev_log = log;
            prev_lin = lin;
        }
    }

    #[test]
    fn test_nan_is_zero() {
        assert_eq!(normalize_log(f64::NAN, 0.0, 10.0), 0.0);
        assert_eq!(normalize_linear(f64::NAN, 0.0, 10.0), 0.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(7.25), 7.3);
        assert_eq!(round1(7.24), 7.2);
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(0.0), 0.0);
    }
}
