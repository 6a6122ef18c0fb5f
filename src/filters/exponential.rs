use super::SignalFilter;

/// Exponential smoothing filter over a 2D position, one scalar filter per axis
pub struct ExponentialFilter {
    x: ScalarExponentialFilter,
    y: ScalarExponentialFilter,
}

impl ExponentialFilter {
    /// Create a new exponential filter
    ///
    /// # Panics
    ///
    /// Panics if alpha is not in the range (0, 1]
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self {
            x: ScalarExponentialFilter::new(alpha),
            y: ScalarExponentialFilter::new(alpha),
        }
    }

    /// Current smoothed value, `None` until the first sample
    #[must_use]
    pub fn smoothed(&self) -> Option<(f64, f64)> {
        self.x.smoothed().zip(self.y.smoothed())
    }
}

impl SignalFilter for ExponentialFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (self.x.update(x), self.y.update(y))
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}

/// Exponential smoothing for a single scalar such as inter-eye distance
#[derive(Debug, Clone)]
pub struct ScalarExponentialFilter {
    alpha: f64,
    smoothed: Option<f64>,
}

impl ScalarExponentialFilter {
    /// Create a new scalar exponential filter
    ///
    /// # Panics
    ///
    /// Panics if alpha is not in the range (0, 1]
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self { alpha, smoothed: None }
    }

    /// Feed one raw value and return the smoothed value
    pub fn update(&mut self, raw: f64) -> f64 {
        let next = match self.smoothed {
            Some(last) => last * (1.0 - self.alpha) + raw * self.alpha,
            None => raw,
        };
        self.smoothed = Some(next);
        next
    }

    /// Current smoothed value, `None` until the first sample
    #[must_use]
    pub const fn smoothed(&self) -> Option<f64> {
        self.smoothed
    }

    /// Forget the smoothed value; the next sample passes through unchanged
    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_filter() {
        let mut filter = ExponentialFilter::new(0.5);

        // First value passes through
        let (x1, y1) = filter.apply(0.2, -0.4);
        assert_eq!(x1, 0.2);
        assert_eq!(y1, -0.4);

        // Second value is smoothed
        let (x2, y2) = filter.apply(0.4, 0.0);
        assert!((x2 - 0.3).abs() < 1e-12); // 0.5 * 0.4 + 0.5 * 0.2
        assert!((y2 + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_bounds() {
        // High alpha = less smoothing
        let mut filter1 = ExponentialFilter::new(0.9);
        filter1.apply(10.0, 20.0);
        let (x, _y) = filter1.apply(20.0, 30.0);
        assert!((x - 19.0).abs() < 0.001);

        // Low alpha = more smoothing
        let mut filter2 = ExponentialFilter::new(0.1);
        filter2.apply(10.0, 20.0);
        let (x, _y) = filter2.apply(20.0, 30.0);
        assert!((x - 11.0).abs() < 0.001);
    }

    #[test]
    fn test_reset_passes_next_sample_through() {
        let mut filter = ExponentialFilter::new(0.1);
        filter.apply(-1.0, -1.0);
        filter.apply(1.0, 1.0);
        filter.reset();
        assert!(filter.smoothed().is_none());
        assert_eq!(filter.apply(0.7, 0.3), (0.7, 0.3));
    }

    #[test]
    fn test_scalar_filter() {
        let mut filter = ScalarExponentialFilter::new(0.1);
        assert_eq!(filter.update(0.10), 0.10);
        let second = filter.update(0.20);
        assert!((second - 0.11).abs() < 1e-12);

        filter.reset();
        assert_eq!(filter.smoothed(), None);
        assert_eq!(filter.update(0.05), 0.05);
    }
}
