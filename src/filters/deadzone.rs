use serde::{Deserialize, Serialize};

/// How the per-axis deadzone checks combine for a 2D position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisGate {
    /// Update when either axis moved past the threshold
    #[default]
    Any,
    /// Update only when both axes moved past the threshold
    All,
}

/// Hysteresis band that holds the previous output during stillness
#[derive(Debug, Clone, Copy)]
pub struct Deadzone {
    threshold: f64,
}

impl Deadzone {
    /// Create a deadzone with the given threshold
    ///
    /// # Panics
    ///
    /// Panics if the threshold is negative or not finite
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        assert!(
            threshold.is_finite() && threshold >= 0.0,
            "Threshold must be non-negative"
        );
        Self { threshold }
    }

    /// Scalar deadzone: keep `previous` unless `current` moved at least `threshold` away
    #[must_use]
    pub fn apply(&self, current: f64, previous: Option<f64>) -> f64 {
        match previous {
            Some(prev) if (current - prev).abs() < self.threshold => prev,
            _ => current,
        }
    }

    /// Position deadzone, each axis checked on its own and combined by `gate`
    #[must_use]
    pub fn apply_position(
        &self,
        current: (f64, f64),
        previous: Option<(f64, f64)>,
        gate: AxisGate,
    ) -> (f64, f64) {
        let Some(prev) = previous else {
            return current;
        };

        let moved_x = (current.0 - prev.0).abs() >= self.threshold;
        let moved_y = (current.1 - prev.1).abs() >= self.threshold;
        let passes = match gate {
            AxisGate::Any => moved_x || moved_y,
            AxisGate::All => moved_x && moved_y,
        };

        if passes {
            current
        } else {
            prev
        }
    }
}
