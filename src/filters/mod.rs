//! Signal filtering for the gaze control signal.
//!
//! Smoothing removes detector noise; the deadzone adds hysteresis so the
//! output stays piecewise-constant while the viewer holds still.

/// Exponential filters for responsive smoothing
pub mod exponential;

/// Deadzone (hysteresis) stage applied after smoothing
pub mod deadzone;

use crate::Result;

/// Trait for 2-axis position filters
pub trait SignalFilter: Send + Sync {
    /// Apply filter to input values
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl SignalFilter for NoFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a position filter by spec string, e.g. `none`, `exponential` or `exponential:0.2`
///
/// # Errors
///
/// Returns `FilterError` for unknown filter names or out-of-range parameters
pub fn create_filter(spec: &str) -> Result<Box<dyn SignalFilter>> {
    let spec = spec.to_lowercase();
    let mut parts = spec.split(':');
    let name = parts.next().unwrap_or_default();
    let param = parts.next();

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" | "ema" => {
            let alpha = match param {
                Some(raw) => raw
                    .parse::<f64>()
                    .map_err(|e| crate::Error::FilterError(format!("Invalid alpha '{raw}': {e}")))?,
                None => crate::constants::DEFAULT_POSITION_ALPHA,
            };
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(crate::Error::FilterError(format!(
                    "Alpha must be in (0, 1], got {alpha}"
                )));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {spec}"))),
    }
}
