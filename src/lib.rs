//! # Telemetry Sentinel
//!
//! Onboard anomaly detection for crewed-mission telemetry, plus the small
//! crew-safety utilities that ride along with it.
//!
//! The detection pipeline learns what "normal" looks like from a reference
//! corpus and flags vectors it can no longer explain:
//!
//! 1. **Normalization** ([`FeatureStats`]): per-feature z-scoring fitted
//!    once on the reference corpus, with a unit-scale fallback for
//!    zero-variance features.
//! 2. **Reconstruction** ([`ReconstructionModel`]): a seeded bottleneck
//!    autoencoder trained by mini-batch SGD on the normalized corpus.
//! 3. **Scoring** ([`ErrorThreshold`]): mean squared reconstruction error
//!    against a percentile threshold frozen at training time, yielding an
//!    [`AnomalyVerdict`] per vector.
//! 4. **Engine** ([`TelemetrySentinel`]): owns the
//!    stats/model/threshold triple as one atomically-swapped snapshot, and
//!    scores safely (never errors) before training.
//!
//! Alongside the engine, three stateless utilities:
//! [`assess_biometrics`] classifies crew biometric readings against an
//! ordered rule table, [`evaluate_vitals`] runs activity-aware range checks
//! over vital samples, and [`lookup_procedure`] resolves keyword queries to
//! onboard checklists.
//!
//! ## Example
//!
//! ```
//! use telemetry_sentinel::{EngineConfig, EngineStatus, TelemetrySentinel};
//!
//! let config = EngineConfig::builder().epochs(20).batch_size(8).build();
//! let engine = TelemetrySentinel::new(config).unwrap();
//!
//! // Reference telemetry: three channels around a stable operating point.
//! let corpus: Vec<Vec<f64>> = (0..24)
//!     .map(|i| {
//!         let t = i as f64 / 24.0;
//!         vec![0.5 + 0.1 * t, 1.0 - 0.2 * t, 0.3 + 0.05 * (i % 4) as f64]
//!     })
//!     .collect();
//! engine.fit_and_train(&corpus).unwrap();
//!
//! let verdict = engine.score_one(&[50.0, -40.0, 12.0]).unwrap();
//! assert_eq!(verdict.status, EngineStatus::Operational);
//! assert!(verdict.anomaly);
//! ```

#![forbid(unsafe_code)]

pub mod biometrics;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod procedures;
pub mod scorer;
pub mod trainer;
pub mod types;
pub mod vitals;

// Re-export commonly used items at the crate root
pub use biometrics::{
    assess_biometrics, AlertLevel, BiometricReading, PhysiologicalAssessment, PhysiologicalState,
};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::{TelemetrySentinel, TrainedSnapshot};
pub use error::{SentinelError, SentinelResult};
pub use model::{default_bottleneck, ReconstructionModel};
pub use normalizer::FeatureStats;
pub use procedures::{lookup_procedure, Procedure};
pub use scorer::{reconstruction_error, ErrorThreshold};
pub use trainer::{clip_gradients, SgdOptimizer, TrainingReport};
pub use types::{AnomalyVerdict, EngineReport, EngineStatus};
pub use vitals::{
    evaluate_vitals, ActivityContext, AlertSeverity, VitalAlert, VitalLimits, VitalSample,
    VitalSign,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// ```rust
/// use telemetry_sentinel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::biometrics::{assess_biometrics, BiometricReading, PhysiologicalAssessment};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{TelemetrySentinel, TrainedSnapshot};
    pub use crate::error::{SentinelError, SentinelResult};
    pub use crate::procedures::lookup_procedure;
    pub use crate::types::{AnomalyVerdict, EngineReport, EngineStatus};
    pub use crate::vitals::{evaluate_vitals, VitalAlert, VitalLimits, VitalSample};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
