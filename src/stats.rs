//! Small numeric helpers shared by the scoring rules.
//!
//! Every function here tolerates degenerate input (empty or single-valued
//! distributions, zero variance) by returning a neutral value or `None`
//! instead of panicking.

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Shannon entropy (natural log) of a distribution given as raw counts.
///
/// Counts are normalized to probabilities; zero counts contribute nothing.
/// An all-zero or empty distribution has zero entropy.
pub fn shannon_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let counts: Vec<f64> = counts.into_iter().filter(|c| *c > 0.0).collect();
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    counts
        .iter()
        .map(|c| {
            let p = c / total;
            -p * p.ln()
        })
        .sum()
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in `[0, 100]`. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Ordinary least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `(x, y)` points.
    ///
    /// Returns `None` with fewer than two points or when every `x` is equal.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });

        if sxx <= f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.1 + 0.2), 0.3);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0, 9.0]), Some(5.0));
    }

    #[test]
    fn test_entropy() {
        assert_eq!(shannon_entropy(Vec::<f64>::new()), 0.0);
        assert_eq!(shannon_entropy(vec![7.0]), 0.0);
        assert_eq!(shannon_entropy(vec![0.0, 0.0]), 0.0);

        let uniform = shannon_entropy(vec![3.0, 3.0, 3.0, 3.0, 3.0]);
        assert!((uniform - 5f64.ln()).abs() < 1e-12);

        let skewed = shannon_entropy(vec![5.0, 3.0]);
        assert!((skewed - 0.6616).abs() < 1e-4);
    }

    #[test]
    fn test_percentile_interpolates() {
        let scores: Vec<f64> = (1..=10).map(|i| i as f64 / 10.0).collect();
        let p85 = percentile(&scores, 85.0).unwrap();
        assert!((p85 - 0.865).abs() < 1e-9);

        assert_eq!(percentile(&[0.4], 85.0), Some(0.4));
        assert_eq!(percentile(&[], 85.0), None);
        assert_eq!(percentile(&[3.0, 1.0, 2.0], 0.0), Some(1.0));
        assert_eq!(percentile(&[3.0, 1.0, 2.0], 100.0), Some(3.0));
    }

    #[test]
    fn test_linear_fit() {
        let points = [(0.0, 100.0), (60.0, 160.0), (120.0, 220.0)];
        let fit = LinearFit::fit(&points).unwrap();
        assert!((fit.slope - 1.0).abs() < 1e-9);
        assert!((fit.predict(180.0) - 280.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_fit_degenerate_axis() {
        assert!(LinearFit::fit(&[(5.0, 1.0), (5.0, 9.0), (5.0, 3.0)]).is_none());
        assert!(LinearFit::fit(&[(1.0, 1.0)]).is_none());
    }
}
