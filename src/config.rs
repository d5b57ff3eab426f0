//! Engine configuration.
//!
//! All knobs for fitting and scoring live in [`EngineConfig`]. Defaults
//! match the reference deployment (50 epochs, batch 32, 95th percentile
//! threshold); a builder with range clamping is provided for callers that
//! prefer not to touch struct fields directly.

use serde::{Deserialize, Serialize};

use crate::error::{SentinelError, SentinelResult};
use crate::model::default_bottleneck;

/// Configuration for training and scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of passes over the reference corpus (default 50).
    pub epochs: usize,
    /// Mini-batch size; the corpus must hold at least this many samples
    /// (default 32).
    pub batch_size: usize,
    /// Percentile of reference reconstruction errors used as the anomaly
    /// threshold, in (0, 100) (default 95).
    pub percentile: f64,
    /// Bottleneck width override. `None` applies the
    /// `min(32, input_dim / 2)` rule (default `None`).
    pub bottleneck_dim: Option<usize>,
    /// SGD learning rate (default 0.01).
    pub learning_rate: f64,
    /// SGD momentum coefficient in [0, 1) (default 0.9).
    pub momentum: f64,
    /// L2 weight decay (default 1e-4).
    pub weight_decay: f64,
    /// Global L2 gradient clipping norm (default 5.0).
    pub max_grad_norm: f64,
    /// Seed for weight initialization and epoch shuffling (default 42).
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            percentile: 95.0,
            bottleneck_dim: None,
            learning_rate: 0.01,
            momentum: 0.9,
            weight_decay: 1e-4,
            max_grad_norm: 5.0,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Checks field ranges for directly constructed configurations.
    ///
    /// # Errors
    ///
    /// `Config` naming the first offending field.
    pub fn validate(&self) -> SentinelResult<()> {
        if self.epochs == 0 {
            return Err(SentinelError::config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(SentinelError::config("batch_size must be at least 1"));
        }
        if !(self.percentile > 0.0 && self.percentile < 100.0) {
            return Err(SentinelError::config(format!(
                "percentile must be in (0, 100), got {}",
                self.percentile
            )));
        }
        if self.learning_rate <= 0.0 {
            return Err(SentinelError::config("learning_rate must be positive"));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(SentinelError::config(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        if self.weight_decay < 0.0 {
            return Err(SentinelError::config("weight_decay must be non-negative"));
        }
        if self.max_grad_norm <= 0.0 {
            return Err(SentinelError::config("max_grad_norm must be positive"));
        }
        Ok(())
    }

    /// Resolves the bottleneck width for a concrete input dimension.
    ///
    /// `input_dim <= 1` always resolves to `input_dim` (the identity
    /// special case); otherwise the override must satisfy
    /// `1 <= bottleneck < input_dim`.
    ///
    /// # Errors
    ///
    /// `Config` when an override falls outside the valid range.
    pub fn resolve_bottleneck(&self, input_dim: usize) -> SentinelResult<usize> {
        if input_dim <= 1 {
            return Ok(input_dim);
        }
        match self.bottleneck_dim {
            None => Ok(default_bottleneck(input_dim)),
            Some(dim) if dim >= 1 && dim < input_dim => Ok(dim),
            Some(dim) => Err(SentinelError::config(format!(
                "bottleneck_dim {dim} must be in [1, {input_dim}) for input_dim {input_dim}"
            ))),
        }
    }
}

/// Builder for [`EngineConfig`] with range clamping on setters.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the number of training epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = epochs.max(1);
        self
    }

    /// Set the mini-batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size.max(1);
        self
    }

    /// Set the threshold percentile.
    pub fn percentile(mut self, percentile: f64) -> Self {
        self.config.percentile = percentile.clamp(0.01, 99.99);
        self
    }

    /// Override the bottleneck width.
    pub fn bottleneck_dim(mut self, dim: usize) -> Self {
        self.config.bottleneck_dim = Some(dim.max(1));
        self
    }

    /// Set the learning rate.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.config.learning_rate = lr.max(1e-6);
        self
    }

    /// Set the momentum coefficient.
    pub fn momentum(mut self, momentum: f64) -> Self {
        self.config.momentum = momentum.clamp(0.0, 0.999);
        self
    }

    /// Set the weight decay.
    pub fn weight_decay(mut self, weight_decay: f64) -> Self {
        self.config.weight_decay = weight_decay.max(0.0);
        self
    }

    /// Set the gradient clipping norm.
    pub fn max_grad_norm(mut self, max_norm: f64) -> Self {
        self.config.max_grad_norm = max_norm.max(1e-6);
        self
    }

    /// Set the deterministic seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
