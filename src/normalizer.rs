//! Feature normalization for telemetry vectors.
//!
//! Per-feature center/scale statistics are fitted once from a reference
//! corpus of normal telemetry using Welford accumulation for numerical
//! stability, then applied as z-score normalization. A zero-variance feature
//! falls back to scale 1 so the transform never divides by zero; that
//! fallback is part of the contract, not an error.

use serde::{Deserialize, Serialize};

use crate::error::{SentinelError, SentinelResult};

/// Welford online accumulator for one feature column.
#[derive(Debug, Clone, Default)]
struct WelfordAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl WelfordAccumulator {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Population variance (divide by n), defined for a single sample.
    fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.m2 / self.count as f64
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Per-feature (mean, scale) pairs fitted from a reference corpus.
///
/// `scale[i]` is the population standard deviation of feature `i`, or `1.0`
/// when that deviation is zero (below `1e-10`). Immutable once fitted; a new
/// fit produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl FeatureStats {
    /// Fits per-feature mean and standard deviation across the corpus.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the corpus is empty; `DimensionMismatch` if any
    /// vector's length disagrees with the first vector's.
    pub fn fit(corpus: &[Vec<f64>]) -> SentinelResult<Self> {
        let first = corpus
            .first()
            .ok_or_else(|| SentinelError::invalid_input("reference corpus is empty"))?;
        let input_dim = first.len();

        let mut columns = vec![WelfordAccumulator::default(); input_dim];
        for vector in corpus {
            if vector.len() != input_dim {
                return Err(SentinelError::dimension_mismatch(input_dim, vector.len()));
            }
            for (acc, &value) in columns.iter_mut().zip(vector) {
                acc.update(value);
            }
        }

        let means = columns.iter().map(|c| c.mean).collect();
        let scales = columns
            .iter()
            .map(|c| {
                let sd = c.std_dev();
                if sd < 1e-10 {
                    1.0
                } else {
                    sd
                }
            })
            .collect();
        Ok(Self { means, scales })
    }

    /// Number of features these statistics describe.
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.means.len()
    }

    /// Per-feature means.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Per-feature scales (standard deviation, or 1 for constant features).
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Maps a raw vector into normalized form: `(v[i] - mean[i]) / scale[i]`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `v` has the wrong length.
    pub fn transform(&self, v: &[f64]) -> SentinelResult<Vec<f64>> {
        self.check_dim(v)?;
        Ok(v.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&x, (&mean, &scale))| (x - mean) / scale)
            .collect())
    }

    /// Normalizes a batch, preserving order.
    pub fn transform_batch(&self, vs: &[Vec<f64>]) -> SentinelResult<Vec<Vec<f64>>> {
        vs.iter().map(|v| self.transform(v)).collect()
    }

    /// Maps a normalized vector back to engineering units:
    /// `v[i] * scale[i] + mean[i]`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `v` has the wrong length.
    pub fn inverse_transform(&self, v: &[f64]) -> SentinelResult<Vec<f64>> {
        self.check_dim(v)?;
        Ok(v.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&x, (&mean, &scale))| x * scale + mean)
            .collect())
    }

    fn check_dim(&self, v: &[f64]) -> SentinelResult<()> {
        if v.len() != self.means.len() {
            return Err(SentinelError::dimension_mismatch(self.means.len(), v.len()));
        }
        Ok(())
    }
}
