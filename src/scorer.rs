//! Reconstruction-error scoring and threshold calibration.
//!
//! Scoring compares an input vector against its reconstruction: a model that
//! has only seen nominal telemetry reconstructs nominal vectors well and
//! off-nominal vectors poorly, so the mean squared reconstruction error is
//! the anomaly signal. The decision boundary is a percentile of the errors
//! observed on the training corpus, frozen when training finishes.

use serde::{Deserialize, Serialize};

use crate::error::{SentinelError, SentinelResult};

/// Mean squared error between a vector and its reconstruction.
#[must_use]
pub fn reconstruction_error(original: &[f64], reconstructed: &[f64]) -> f64 {
    debug_assert_eq!(original.len(), reconstructed.len());
    if original.is_empty() {
        return 0.0;
    }
    let sum: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    sum / original.len() as f64
}

/// Anomaly decision boundary calibrated from training-corpus errors.
///
/// An error strictly above the boundary is flagged as an anomaly. The
/// boundary is frozen at calibration time; scoring never moves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorThreshold(f64);

impl ErrorThreshold {
    /// Threshold at the given percentile of the observed errors, using
    /// linear interpolation between the two nearest order statistics
    /// (rank `p/100 * (n - 1)`).
    pub fn from_errors(errors: &[f64], percentile: f64) -> SentinelResult<Self> {
        if errors.is_empty() {
            return Err(SentinelError::invalid_input(
                "cannot calibrate a threshold from zero errors",
            ));
        }
        let mut sorted = errors.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let value = if lower == upper {
            sorted[lower]
        } else {
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        };
        Ok(Self(value))
    }

    /// The boundary value itself.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether an error falls strictly above the boundary.
    #[must_use]
    pub fn is_exceeded_by(self, error: f64) -> bool {
        error > self.0
    }

    /// Distance-below-threshold signal: `1 - error/threshold` clamped to
    /// [0, 1], and 0 whenever the error meets or exceeds the boundary.
    ///
    /// This is a rough "how far inside nominal" indicator, not a calibrated
    /// probability; values near 0 only say the error sits close to the
    /// boundary.
    #[must_use]
    pub fn confidence_for(self, error: f64) -> f64 {
        if error >= self.0 {
            return 0.0;
        }
        (1.0 - error / self.0).clamp(0.0, 1.0)
    }
}
