//! Engine-facing verdict and status types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Readiness of the anomaly-detection engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// A trained snapshot is installed and scoring is meaningful.
    Operational,
    /// No training has completed; scoring returns safe defaults.
    Untrained,
}

impl EngineStatus {
    /// Whether a trained snapshot is installed.
    #[must_use]
    pub const fn is_operational(self) -> bool {
        matches!(self, Self::Operational)
    }
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operational => write!(f, "operational"),
            Self::Untrained => write!(f, "untrained"),
        }
    }
}

/// Verdict for a single scored feature vector.
///
/// `confidence` is a distance-below-threshold signal: `1 - error/threshold`
/// clamped to [0, 1], and 0 whenever `error >= threshold`. It is NOT a
/// calibrated probability and says nothing near the threshold boundary
/// beyond "close to it".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    /// Engine readiness at scoring time.
    pub status: EngineStatus,
    /// Whether the reconstruction error exceeded the threshold.
    pub anomaly: bool,
    /// Distance-below-threshold signal in [0, 1].
    pub confidence: f64,
    /// Number of vectors in the batch this verdict was produced in.
    pub samples_processed: usize,
}

impl AnomalyVerdict {
    /// The declared safe default for an engine that has not been trained:
    /// not an anomaly, zero confidence, nothing processed.
    #[must_use]
    pub const fn untrained() -> Self {
        Self {
            status: EngineStatus::Untrained,
            anomaly: false,
            confidence: 0.0,
            samples_processed: 0,
        }
    }

    /// Verdict from a trained engine.
    #[must_use]
    pub const fn operational(anomaly: bool, confidence: f64, samples_processed: usize) -> Self {
        Self {
            status: EngineStatus::Operational,
            anomaly,
            confidence,
            samples_processed,
        }
    }
}

/// Point-in-time description of the engine, for status queries and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineReport {
    /// Engine readiness.
    pub status: EngineStatus,
    /// Feature dimension of the installed snapshot, if any.
    pub input_dim: Option<usize>,
    /// Bottleneck width of the installed snapshot, if any.
    pub bottleneck_dim: Option<usize>,
    /// Anomaly threshold of the installed snapshot, if any.
    pub threshold: Option<f64>,
    /// Identity of the installed snapshot, if any.
    pub model_id: Option<Uuid>,
    /// When the installed snapshot finished training, if any.
    pub trained_at: Option<DateTime<Utc>>,
}

impl EngineReport {
    /// Report for an engine with no installed snapshot.
    #[must_use]
    pub const fn untrained() -> Self {
        Self {
            status: EngineStatus::Untrained,
            input_dim: None,
            bottleneck_dim: None,
            threshold: None,
            model_id: None,
            trained_at: None,
        }
    }
}
