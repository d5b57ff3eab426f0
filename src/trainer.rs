//! Mini-batch SGD training loop for the reconstruction model.
//!
//! Training minimizes mean squared reconstruction error over a normalized
//! corpus. Each epoch reshuffles the corpus and walks it in batches; the
//! final partial batch is trained on like any other. A run always completes:
//! a loss that fails to improve is reported, not treated as an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::model::{ReconstructionModel, Rng64};

// ── Optimizer ────────────────────────────────────────────────────────────

/// SGD with momentum and weight decay.
#[derive(Debug)]
pub struct SgdOptimizer {
    lr: f64,
    momentum: f64,
    weight_decay: f64,
    velocity: Vec<f64>,
}

impl SgdOptimizer {
    pub fn new(lr: f64, momentum: f64, weight_decay: f64) -> Self {
        Self {
            lr,
            momentum,
            weight_decay,
            velocity: Vec::new(),
        }
    }

    /// v = mu*v + grad + wd*param; param -= lr*v
    pub fn step(&mut self, params: &mut [f64], gradients: &[f64]) {
        if self.velocity.len() != params.len() {
            self.velocity = vec![0.0; params.len()];
        }
        for i in 0..params.len().min(gradients.len()) {
            let g = gradients[i] + self.weight_decay * params[i];
            self.velocity[i] = self.momentum * self.velocity[i] + g;
            params[i] -= self.lr * self.velocity[i];
        }
    }
}

/// Clip gradients in place by global L2 norm.
pub fn clip_gradients(gradients: &mut [f64], max_norm: f64) {
    let norm = gradients.iter().map(|g| g * g).sum::<f64>().sqrt();
    if norm > max_norm && norm > 0.0 {
        let s = max_norm / norm;
        gradients.iter_mut().for_each(|g| *g *= s);
    }
}

// ── Training report ──────────────────────────────────────────────────────

/// Summary of a completed training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Number of epochs actually run.
    pub epochs_run: usize,
    /// Mean loss of the first epoch.
    pub initial_loss: f64,
    /// Mean loss of the last epoch.
    pub final_loss: f64,
    /// Mean loss of every epoch, in order.
    pub epoch_losses: Vec<f64>,
    /// When the run finished.
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    /// Whether the final loss came in below the initial loss.
    #[must_use]
    pub fn improved(&self) -> bool {
        self.final_loss < self.initial_loss
    }

    /// Absolute loss reduction over the run (negative if loss rose).
    #[must_use]
    pub fn loss_reduction(&self) -> f64 {
        self.initial_loss - self.final_loss
    }
}

// ── Training loop ────────────────────────────────────────────────────────

/// Fisher-Yates shuffle driven by the crate PRNG.
fn shuffle<T>(items: &mut [T], rng: &mut Rng64) {
    for i in (1..items.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

/// Runs mini-batch SGD over a normalized corpus for `config.epochs` epochs.
///
/// The caller is responsible for a non-empty corpus of vectors matching the
/// model's input dimension. For the identity model there is nothing to
/// optimize and every epoch reports zero loss.
pub fn train(
    model: &mut ReconstructionModel,
    corpus: &[Vec<f64>],
    config: &EngineConfig,
) -> TrainingReport {
    debug_assert!(!corpus.is_empty());

    let mut optimizer =
        SgdOptimizer::new(config.learning_rate, config.momentum, config.weight_decay);
    // Weight init consumes seed and seed+1; shuffling gets its own stream.
    let mut rng = Rng64::new(config.seed.wrapping_add(2));

    // Shuffling swaps whole vectors, so one working copy serves every epoch.
    let mut working: Vec<Vec<f64>> = corpus.to_vec();
    let batch_size = config.batch_size.max(1);
    let mut params = Vec::with_capacity(model.param_count());
    let mut epoch_losses = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        shuffle(&mut working, &mut rng);

        let mut epoch_loss = 0.0f64;
        let mut batches = 0usize;
        for batch in working.chunks(batch_size) {
            let (loss, mut grad) = model.batch_gradient(batch);
            clip_gradients(&mut grad, config.max_grad_norm);
            params.clear();
            model.flatten_into(&mut params);
            optimizer.step(&mut params, &grad);
            model.unflatten_from(&params);
            epoch_loss += loss;
            batches += 1;
        }

        let mean_loss = epoch_loss / batches.max(1) as f64;
        debug!(epoch, loss = mean_loss, "epoch finished");
        epoch_losses.push(mean_loss);
    }

    let initial_loss = epoch_losses.first().copied().unwrap_or(0.0);
    let final_loss = epoch_losses.last().copied().unwrap_or(0.0);
    if epoch_losses.len() > 1 && final_loss >= initial_loss && model.param_count() > 0 {
        warn!(initial_loss, final_loss, "loss did not improve over the run");
    }

    TrainingReport {
        epochs_run: epoch_losses.len(),
        initial_loss,
        final_loss,
        epoch_losses,
        trained_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_corpus(n: usize) -> Vec<Vec<f64>> {
        // Rank-1 data: every vector is t * [1, 1, 1, 1].
        (0..n)
            .map(|i| {
                let t = -1.0 + 2.0 * i as f64 / (n - 1) as f64;
                vec![t; 4]
            })
            .collect()
    }

    #[test]
    fn plain_sgd_step_moves_against_gradient() {
        let mut opt = SgdOptimizer::new(0.1, 0.0, 0.0);
        let mut params = [1.0f64];
        opt.step(&mut params, &[2.0]);
        assert!((params[0] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let mut opt = SgdOptimizer::new(0.1, 0.9, 0.0);
        let mut params = [1.0f64];
        opt.step(&mut params, &[2.0]);
        let first_delta = 1.0 - params[0];
        let before = params[0];
        opt.step(&mut params, &[2.0]);
        let second_delta = before - params[0];
        assert!((first_delta - 0.2).abs() < 1e-12);
        assert!((second_delta - 0.38).abs() < 1e-12);
    }

    #[test]
    fn weight_decay_pulls_params_toward_zero() {
        let mut opt = SgdOptimizer::new(0.1, 0.0, 0.1);
        let mut params = [1.0f64];
        opt.step(&mut params, &[0.0]);
        assert!((params[0] - 0.99).abs() < 1e-12);
    }

    #[test]
    fn clip_rescales_to_max_norm() {
        let mut grad = [3.0f64, 4.0];
        clip_gradients(&mut grad, 1.0);
        assert!((grad[0] - 0.6).abs() < 1e-12);
        assert!((grad[1] - 0.8).abs() < 1e-12);
        let norm = (grad[0] * grad[0] + grad[1] * grad[1]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clip_leaves_small_gradients_untouched() {
        let mut grad = [0.3f64, -0.4];
        clip_gradients(&mut grad, 1.0);
        assert_eq!(grad, [0.3, -0.4]);
    }

    #[test]
    fn training_reduces_loss_on_rank_one_corpus() {
        let config = EngineConfig::builder().epochs(40).batch_size(4).build();
        let mut model = ReconstructionModel::new(4, 2, config.seed);
        let report = train(&mut model, &line_corpus(16), &config);
        assert_eq!(report.epochs_run, 40);
        assert!(report.improved(), "loss should drop: {report:?}");
        assert!(report.final_loss < report.initial_loss);
        assert!(report.loss_reduction() > 0.0);
    }

    #[test]
    fn training_is_deterministic_for_a_fixed_seed() {
        let config = EngineConfig::builder().epochs(5).batch_size(4).build();
        let corpus = line_corpus(12);
        let mut a = ReconstructionModel::new(4, 2, config.seed);
        let mut b = ReconstructionModel::new(4, 2, config.seed);
        let ra = train(&mut a, &corpus, &config);
        let rb = train(&mut b, &corpus, &config);
        assert_eq!(ra.epoch_losses, rb.epoch_losses);
        let v = vec![0.5; 4];
        assert_eq!(a.reconstruct(&v), b.reconstruct(&v));
    }

    #[test]
    fn different_seeds_give_different_trajectories() {
        let base = EngineConfig::builder().epochs(5).batch_size(4);
        let corpus = line_corpus(12);
        let ca = base.clone().seed(1).build();
        let cb = base.seed(2).build();
        let mut a = ReconstructionModel::new(4, 2, ca.seed);
        let mut b = ReconstructionModel::new(4, 2, cb.seed);
        let ra = train(&mut a, &corpus, &ca);
        let rb = train(&mut b, &corpus, &cb);
        assert_ne!(ra.epoch_losses, rb.epoch_losses);
    }

    #[test]
    fn partial_final_batch_is_trained() {
        let config = EngineConfig::builder().epochs(3).batch_size(2).build();
        let mut model = ReconstructionModel::new(4, 2, config.seed);
        // 5 vectors with batch 2 leaves a 1-vector tail every epoch.
        let report = train(&mut model, &line_corpus(5), &config);
        assert_eq!(report.epoch_losses.len(), 3);
        assert!(report.epoch_losses.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn identity_model_trains_to_zero_loss_trivially() {
        let config = EngineConfig::builder().epochs(4).batch_size(2).build();
        let mut model = ReconstructionModel::new(1, 1, config.seed);
        let corpus = vec![vec![0.1], vec![-0.4], vec![0.9]];
        let report = train(&mut model, &corpus, &config);
        assert_eq!(report.epochs_run, 4);
        assert!(report.epoch_losses.iter().all(|&l| l == 0.0));
        assert!(!report.improved());
    }

    #[test]
    fn report_arithmetic_is_consistent() {
        let report = TrainingReport {
            epochs_run: 2,
            initial_loss: 0.8,
            final_loss: 0.3,
            epoch_losses: vec![0.8, 0.3],
            trained_at: Utc::now(),
        };
        assert!(report.improved());
        assert!((report.loss_reduction() - 0.5).abs() < 1e-12);
    }
}
