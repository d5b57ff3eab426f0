//! Telemetry anomaly-detection engine.
//!
//! `TelemetrySentinel` ties the pipeline together: fit normalization stats on
//! a reference corpus, train the reconstruction model on the normalized
//! corpus, freeze an error threshold from the reference errors, then score
//! incoming vectors against the frozen triple. The three artifacts live in
//! one immutable [`TrainedSnapshot`] behind an `RwLock`, so a retrain swaps
//! them atomically and scoring never observes a half-updated engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{SentinelError, SentinelResult};
use crate::model::ReconstructionModel;
use crate::normalizer::FeatureStats;
use crate::scorer::{reconstruction_error, ErrorThreshold};
use crate::trainer::{train, TrainingReport};
use crate::types::{AnomalyVerdict, EngineReport, EngineStatus};

// ── Trained snapshot ─────────────────────────────────────────────────────

/// Immutable artifacts of one completed training run.
///
/// Stats, model, and threshold were produced together from the same corpus
/// and are only ever replaced together.
#[derive(Debug, Clone)]
pub struct TrainedSnapshot {
    model_id: Uuid,
    trained_at: DateTime<Utc>,
    stats: FeatureStats,
    model: ReconstructionModel,
    threshold: ErrorThreshold,
    report: TrainingReport,
}

impl TrainedSnapshot {
    /// Normalization statistics fitted on the reference corpus.
    pub fn stats(&self) -> &FeatureStats {
        &self.stats
    }

    /// The trained reconstruction model.
    pub fn model(&self) -> &ReconstructionModel {
        &self.model
    }

    /// The frozen anomaly threshold.
    pub fn threshold(&self) -> ErrorThreshold {
        self.threshold
    }

    /// Diagnostics from the training run that produced this snapshot.
    pub fn training_report(&self) -> &TrainingReport {
        &self.report
    }

    /// Unique identity of this snapshot, for log correlation.
    pub fn model_id(&self) -> Uuid {
        self.model_id
    }

    /// When training finished.
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    fn score_vector(&self, vector: &[f64], batch_len: usize) -> SentinelResult<AnomalyVerdict> {
        let normalized = self.stats.transform(vector)?;
        let reconstructed = self.model.reconstruct(&normalized);
        let error = reconstruction_error(&normalized, &reconstructed);
        let anomaly = self.threshold.is_exceeded_by(error);
        let confidence = self.threshold.confidence_for(error);
        Ok(AnomalyVerdict::operational(anomaly, confidence, batch_len))
    }
}

// ── Engine ───────────────────────────────────────────────────────────────

/// Reconstruction-based anomaly detector over fixed-length telemetry vectors.
///
/// Starts untrained; [`fit_and_train`](Self::fit_and_train) installs a
/// snapshot and [`score`](Self::score) evaluates batches against it. An
/// untrained engine scores to safe defaults rather than failing.
pub struct TelemetrySentinel {
    config: EngineConfig,
    snapshot: RwLock<Option<Arc<TrainedSnapshot>>>,
}

impl Default for TelemetrySentinel {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            snapshot: RwLock::new(None),
        }
    }
}

impl TelemetrySentinel {
    /// Creates an untrained engine after validating the configuration.
    pub fn new(config: EngineConfig) -> SentinelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            snapshot: RwLock::new(None),
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a trained snapshot is installed.
    pub fn is_trained(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// The installed snapshot, if training has completed.
    pub fn snapshot(&self) -> Option<Arc<TrainedSnapshot>> {
        self.snapshot.read().clone()
    }

    /// Fits normalization stats, trains the model, and freezes the anomaly
    /// threshold, all from one reference corpus assumed to be normal.
    ///
    /// The whole snapshot is built before the engine is touched, then
    /// installed with a single write, so concurrent scorers see either the
    /// old snapshot or the new one, never a mix. Returns the new snapshot.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty corpus or zero-width vectors,
    /// `DimensionMismatch` for ragged rows, `InsufficientSamples` when the
    /// corpus is smaller than one batch, and `Config` when a bottleneck
    /// override does not fit the corpus dimension.
    #[instrument(skip(self, corpus), fields(corpus_len = corpus.len()))]
    pub fn fit_and_train(&self, corpus: &[Vec<f64>]) -> SentinelResult<Arc<TrainedSnapshot>> {
        let Some(first) = corpus.first() else {
            return Err(SentinelError::invalid_input("training corpus is empty"));
        };
        let input_dim = first.len();
        if input_dim == 0 {
            return Err(SentinelError::invalid_input(
                "telemetry vectors need at least one feature",
            ));
        }
        if corpus.len() < self.config.batch_size {
            return Err(SentinelError::insufficient_samples(
                self.config.batch_size,
                corpus.len(),
            ));
        }
        let bottleneck_dim = self.config.resolve_bottleneck(input_dim)?;

        let stats = FeatureStats::fit(corpus)?;
        let normalized = stats.transform_batch(corpus)?;

        let mut model = ReconstructionModel::new(input_dim, bottleneck_dim, self.config.seed);
        let report = train(&mut model, &normalized, &self.config);

        let errors: Vec<f64> = normalized
            .iter()
            .map(|v| reconstruction_error(v, &model.reconstruct(v)))
            .collect();
        let threshold = ErrorThreshold::from_errors(&errors, self.config.percentile)?;

        let snapshot = Arc::new(TrainedSnapshot {
            model_id: Uuid::new_v4(),
            trained_at: report.trained_at,
            stats,
            model,
            threshold,
            report,
        });
        *self.snapshot.write() = Some(Arc::clone(&snapshot));
        info!(
            input_dim,
            bottleneck_dim,
            threshold = threshold.value(),
            final_loss = snapshot.report.final_loss,
            model_id = %snapshot.model_id,
            "trained snapshot installed"
        );
        Ok(snapshot)
    }

    /// Scores a batch of telemetry vectors, one verdict per vector in input
    /// order.
    ///
    /// Before training this returns the untrained safe default for every
    /// vector instead of an error. Once trained, each vector must match the
    /// snapshot's input dimension.
    #[instrument(skip(self, batch), fields(batch_len = batch.len()))]
    pub fn score(&self, batch: &[Vec<f64>]) -> SentinelResult<Vec<AnomalyVerdict>> {
        let snapshot = self.snapshot.read().clone();
        let Some(snapshot) = snapshot else {
            debug!("scoring before training, returning safe defaults");
            return Ok(vec![AnomalyVerdict::untrained(); batch.len()]);
        };
        let mut verdicts = Vec::with_capacity(batch.len());
        for vector in batch {
            verdicts.push(snapshot.score_vector(vector, batch.len())?);
        }
        Ok(verdicts)
    }

    /// Scores a single vector; equivalent to a one-element batch.
    pub fn score_one(&self, vector: &[f64]) -> SentinelResult<AnomalyVerdict> {
        match self.snapshot.read().clone() {
            None => Ok(AnomalyVerdict::untrained()),
            Some(snapshot) => snapshot.score_vector(vector, 1),
        }
    }

    /// Point-in-time status report for logs and health queries.
    pub fn report(&self) -> EngineReport {
        match self.snapshot.read().as_ref() {
            Some(snap) => EngineReport {
                status: EngineStatus::Operational,
                input_dim: Some(snap.model.input_dim()),
                bottleneck_dim: Some(snap.model.bottleneck_dim()),
                threshold: Some(snap.threshold.value()),
                model_id: Some(snap.model_id),
                trained_at: Some(snap.trained_at),
            },
            None => EngineReport::untrained(),
        }
    }
}
