//! Reconstruction model for normalized telemetry vectors.
//!
//! A compact two-layer autoencoder: a ReLU encoder squeezes each vector
//! through a bottleneck with fewer degrees of freedom than the input, and a
//! linear decoder maps it back. Trained on normal data only, the model
//! reconstructs normal vectors well and anomalous ones poorly, which is what
//! the scorer exploits. All math is pure `std`; weights are deterministically
//! initialized from a seed.

/// Xorshift64 PRNG for deterministic weight initialization and epoch
/// shuffling.
#[derive(Debug, Clone)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF_CAFE_1234 } else { seed },
        }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform f64 in (-1, 1).
    pub(crate) fn next_f64(&mut self) -> f64 {
        let f = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        f * 2.0 - 1.0
    }
}

#[inline]
fn relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Default bottleneck width for a given input dimension:
/// `min(32, input_dim / 2)`, floored at 1.
///
/// Only meaningful for `input_dim > 1`; a one-feature model has no room for
/// a bottleneck and is handled by the identity special case in
/// [`ReconstructionModel::new`].
#[must_use]
pub fn default_bottleneck(input_dim: usize) -> usize {
    (input_dim / 2).min(32).max(1)
}

// ── Linear layer ─────────────────────────────────────────────────────────

/// Dense linear transformation y = Wx + b (row-major weights).
#[derive(Debug, Clone)]
pub struct Linear {
    in_features: usize,
    out_features: usize,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl Linear {
    /// Xavier/Glorot uniform init with explicit seed.
    pub fn with_seed(in_features: usize, out_features: usize, seed: u64) -> Self {
        let mut rng = Rng64::new(seed);
        let limit = (6.0 / (in_features + out_features) as f64).sqrt();
        let weights = (0..out_features)
            .map(|_| (0..in_features).map(|_| rng.next_f64() * limit).collect())
            .collect();
        Self {
            in_features,
            out_features,
            weights,
            bias: vec![0.0; out_features],
        }
    }

    /// All-zero weights (for testing).
    pub fn zeros(in_features: usize, out_features: usize) -> Self {
        Self {
            in_features,
            out_features,
            weights: vec![vec![0.0; in_features]; out_features],
            bias: vec![0.0; out_features],
        }
    }

    /// Forward pass: y = Wx + b.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.in_features,
            "Linear input mismatch: expected {}, got {}",
            self.in_features,
            input.len()
        );
        let mut out = vec![0.0f64; self.out_features];
        for (i, row) in self.weights.iter().enumerate() {
            let mut s = self.bias[i];
            for (w, x) in row.iter().zip(input) {
                s += w * x;
            }
            out[i] = s;
        }
        out
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn set_weights(&mut self, w: Vec<Vec<f64>>) {
        assert_eq!(w.len(), self.out_features);
        for row in &w {
            assert_eq!(row.len(), self.in_features);
        }
        self.weights = w;
    }

    pub fn set_bias(&mut self, b: Vec<f64>) {
        assert_eq!(b.len(), self.out_features);
        self.bias = b;
    }

    /// Push all weights (row-major) then bias into a flat vec.
    pub fn flatten_into(&self, out: &mut Vec<f64>) {
        for row in &self.weights {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.bias);
    }

    /// Restore from a flat slice. Returns (Self, number of f64s consumed).
    pub fn unflatten_from(data: &[f64], in_f: usize, out_f: usize) -> (Self, usize) {
        let n = in_f * out_f + out_f;
        assert!(
            data.len() >= n,
            "unflatten_from: need {n} floats, got {}",
            data.len()
        );
        let mut weights = Vec::with_capacity(out_f);
        for r in 0..out_f {
            let start = r * in_f;
            weights.push(data[start..start + in_f].to_vec());
        }
        let bias = data[in_f * out_f..n].to_vec();
        (
            Self {
                in_features: in_f,
                out_features: out_f,
                weights,
                bias,
            },
            n,
        )
    }

    /// Total number of trainable parameters.
    pub fn param_count(&self) -> usize {
        self.in_features * self.out_features + self.out_features
    }
}

// ── Reconstruction model ─────────────────────────────────────────────────

/// Layer stack behind a [`ReconstructionModel`].
///
/// `Identity` is the declared fallback for `input_dim <= 1`, where a
/// bottleneck narrower than the input cannot exist; it passes vectors
/// through untouched and has no trainable parameters.
#[derive(Debug, Clone)]
enum ModelInner {
    Identity,
    Bottleneck { encoder: Linear, decoder: Linear },
}

/// Trainable `input_dim -> bottleneck_dim -> input_dim` reconstruction map.
///
/// The encoder applies a ReLU nonlinearity; the decoder is linear, so
/// reconstructions can take any real value the normalized inputs can.
#[derive(Debug, Clone)]
pub struct ReconstructionModel {
    input_dim: usize,
    bottleneck_dim: usize,
    inner: ModelInner,
}

impl ReconstructionModel {
    /// Builds a model with deterministically seeded weights.
    ///
    /// `input_dim <= 1` yields the identity special case (no parameters).
    /// Callers are expected to have validated `1 <= bottleneck_dim <
    /// input_dim` for wider inputs; see [`crate::config::EngineConfig`].
    pub fn new(input_dim: usize, bottleneck_dim: usize, seed: u64) -> Self {
        if input_dim <= 1 {
            return Self {
                input_dim,
                bottleneck_dim: input_dim,
                inner: ModelInner::Identity,
            };
        }
        debug_assert!(bottleneck_dim >= 1 && bottleneck_dim < input_dim);
        let encoder = Linear::with_seed(input_dim, bottleneck_dim, seed);
        let decoder = Linear::with_seed(bottleneck_dim, input_dim, seed.wrapping_add(1));
        Self {
            input_dim,
            bottleneck_dim,
            inner: ModelInner::Bottleneck { encoder, decoder },
        }
    }

    /// Input (and output) dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Bottleneck dimension (equals `input_dim` for the identity case).
    pub fn bottleneck_dim(&self) -> usize {
        self.bottleneck_dim
    }

    /// Whether this model is the untrainable identity fallback.
    pub fn is_identity(&self) -> bool {
        matches!(self.inner, ModelInner::Identity)
    }

    /// Reconstructs one normalized vector. Pure; no training side effects.
    pub fn reconstruct(&self, input: &[f64]) -> Vec<f64> {
        match &self.inner {
            ModelInner::Identity => input.to_vec(),
            ModelInner::Bottleneck { encoder, decoder } => {
                let mut hidden = encoder.forward(input);
                for h in hidden.iter_mut() {
                    *h = relu(*h);
                }
                decoder.forward(&hidden)
            }
        }
    }

    /// Reconstructs a batch of normalized vectors, preserving order.
    pub fn reconstruct_batch(&self, inputs: &[Vec<f64>]) -> Vec<Vec<f64>> {
        inputs.iter().map(|v| self.reconstruct(v)).collect()
    }

    /// Total number of trainable parameters (0 for the identity case).
    pub fn param_count(&self) -> usize {
        match &self.inner {
            ModelInner::Identity => 0,
            ModelInner::Bottleneck { encoder, decoder } => {
                encoder.param_count() + decoder.param_count()
            }
        }
    }

    /// Push all parameters (encoder then decoder) into a flat vec.
    pub fn flatten_into(&self, out: &mut Vec<f64>) {
        if let ModelInner::Bottleneck { encoder, decoder } = &self.inner {
            encoder.flatten_into(out);
            decoder.flatten_into(out);
        }
    }

    /// Restore parameters from a flat slice in `flatten_into` order.
    pub fn unflatten_from(&mut self, data: &[f64]) {
        if let ModelInner::Bottleneck { encoder, decoder } = &mut self.inner {
            let (enc, used) = Linear::unflatten_from(data, self.input_dim, self.bottleneck_dim);
            let (dec, _) = Linear::unflatten_from(&data[used..], self.bottleneck_dim, self.input_dim);
            *encoder = enc;
            *decoder = dec;
        }
    }

    /// Mean squared reconstruction loss over a batch plus the analytic
    /// gradient in `flatten_into` order.
    ///
    /// The two-layer MSE objective has a closed-form gradient, so there is
    /// no need for finite-difference estimation. Returns `(0.0, [])` for the
    /// identity case, which reconstructs exactly.
    pub(crate) fn batch_gradient(&self, batch: &[Vec<f64>]) -> (f64, Vec<f64>) {
        let (encoder, decoder) = match &self.inner {
            ModelInner::Identity => return (0.0, Vec::new()),
            ModelInner::Bottleneck { encoder, decoder } => (encoder, decoder),
        };
        let d = self.input_dim;
        let b = self.bottleneck_dim;
        let mut g_enc_w = vec![vec![0.0f64; d]; b];
        let mut g_enc_b = vec![0.0f64; b];
        let mut g_dec_w = vec![vec![0.0f64; b]; d];
        let mut g_dec_b = vec![0.0f64; d];
        let mut loss = 0.0f64;

        for x in batch {
            let z = encoder.forward(x);
            let h: Vec<f64> = z.iter().map(|&v| relu(v)).collect();
            let y = decoder.forward(&h);

            // dL/dy for L = mean_i (y_i - x_i)^2
            let mut dy = vec![0.0f64; d];
            for i in 0..d {
                let e = y[i] - x[i];
                loss += e * e / d as f64;
                dy[i] = 2.0 * e / d as f64;
            }

            for i in 0..d {
                for j in 0..b {
                    g_dec_w[i][j] += dy[i] * h[j];
                }
                g_dec_b[i] += dy[i];
            }

            // Backprop through the decoder weights and the ReLU gate.
            let dec_w = decoder.weights();
            for j in 0..b {
                if z[j] <= 0.0 {
                    continue;
                }
                let mut dz = 0.0f64;
                for i in 0..d {
                    dz += dec_w[i][j] * dy[i];
                }
                for (k, &xk) in x.iter().enumerate() {
                    g_enc_w[j][k] += dz * xk;
                }
                g_enc_b[j] += dz;
            }
        }

        let inv = 1.0 / batch.len().max(1) as f64;
        let mut grad = Vec::with_capacity(self.param_count());
        for row in &g_enc_w {
            grad.extend(row.iter().map(|g| g * inv));
        }
        grad.extend(g_enc_b.iter().map(|g| g * inv));
        for row in &g_dec_w {
            grad.extend(row.iter().map(|g| g * inv));
        }
        grad.extend(g_dec_b.iter().map(|g| g * inv));
        (loss * inv, grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_forward_computes_wx_plus_b() {
        let mut layer = Linear::zeros(2, 2);
        layer.set_weights(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        layer.set_bias(vec![0.5, -0.5]);
        let out = layer.forward(&[1.0, 1.0]);
        assert!((out[0] - 3.5).abs() < 1e-12);
        assert!((out[1] - 6.5).abs() < 1e-12);
    }

    #[test]
    fn xavier_init_is_deterministic_per_seed() {
        let a = Linear::with_seed(4, 3, 7);
        let b = Linear::with_seed(4, 3, 7);
        let c = Linear::with_seed(4, 3, 8);
        assert_eq!(a.weights(), b.weights());
        assert_ne!(a.weights(), c.weights());
    }

    #[test]
    fn linear_flatten_round_trip_preserves_forward() {
        let layer = Linear::with_seed(5, 3, 11);
        let mut flat = Vec::new();
        layer.flatten_into(&mut flat);
        assert_eq!(flat.len(), layer.param_count());
        let (restored, used) = Linear::unflatten_from(&flat, 5, 3);
        assert_eq!(used, flat.len());
        let input = [0.3, -1.2, 0.0, 2.5, 0.7];
        assert_eq!(layer.forward(&input), restored.forward(&input));
    }

    #[test]
    fn default_bottleneck_follows_halving_rule() {
        assert_eq!(default_bottleneck(2), 1);
        assert_eq!(default_bottleneck(3), 1);
        assert_eq!(default_bottleneck(10), 5);
        assert_eq!(default_bottleneck(64), 32);
        assert_eq!(default_bottleneck(100), 32);
    }

    #[test]
    fn one_feature_model_is_identity() {
        let model = ReconstructionModel::new(1, 1, 42);
        assert!(model.is_identity());
        assert_eq!(model.param_count(), 0);
        assert_eq!(model.reconstruct(&[3.25]), vec![3.25]);
        let (loss, grad) = model.batch_gradient(&[vec![1.0]]);
        assert_eq!(loss, 0.0);
        assert!(grad.is_empty());
    }

    #[test]
    fn reconstruct_preserves_dimension_and_order() {
        let model = ReconstructionModel::new(6, 3, 42);
        let batch = vec![vec![0.1; 6], vec![0.5; 6], vec![-0.2; 6]];
        let recon = model.reconstruct_batch(&batch);
        assert_eq!(recon.len(), 3);
        for r in &recon {
            assert_eq!(r.len(), 6);
        }
    }

    #[test]
    fn model_flatten_round_trip_preserves_reconstruction() {
        let model = ReconstructionModel::new(6, 2, 9);
        let mut flat = Vec::new();
        model.flatten_into(&mut flat);
        assert_eq!(flat.len(), model.param_count());
        let mut other = ReconstructionModel::new(6, 2, 1234);
        other.unflatten_from(&flat);
        let v = vec![0.4, -0.9, 1.1, 0.0, -0.3, 2.2];
        assert_eq!(model.reconstruct(&v), other.reconstruct(&v));
    }

    /// Central-difference check of the analytic gradient.
    #[test]
    fn analytic_gradient_matches_central_difference() {
        let model = ReconstructionModel::new(4, 2, 3);
        let batch = vec![vec![0.5, -1.0, 0.25, 1.5], vec![-0.75, 0.3, 1.0, -0.1]];
        let (_, analytic) = model.batch_gradient(&batch);

        let mut params = Vec::new();
        model.flatten_into(&mut params);
        let eps = 1e-6;
        for (i, &g) in analytic.iter().enumerate() {
            let mut scratch = model.clone();
            let mut p = params.clone();
            p[i] += eps;
            scratch.unflatten_from(&p);
            let (loss_plus, _) = scratch.batch_gradient(&batch);
            p[i] = params[i] - eps;
            scratch.unflatten_from(&p);
            let (loss_minus, _) = scratch.batch_gradient(&batch);
            let numeric = (loss_plus - loss_minus) / (2.0 * eps);
            assert!(
                (numeric - g).abs() < 1e-6,
                "param {i}: analytic {g} vs numeric {numeric}"
            );
        }
    }

    #[test]
    fn gradient_step_reduces_reconstruction_loss() {
        let mut model = ReconstructionModel::new(4, 2, 42);
        let batch = vec![vec![1.0, -0.5, 0.2, 0.8], vec![0.9, -0.4, 0.1, 0.7]];
        let (initial, _) = model.batch_gradient(&batch);
        for _ in 0..50 {
            let (_, grad) = model.batch_gradient(&batch);
            let mut params = Vec::new();
            model.flatten_into(&mut params);
            for (p, g) in params.iter_mut().zip(&grad) {
                *p -= 0.05 * g;
            }
            model.unflatten_from(&params);
        }
        let (trained, _) = model.batch_gradient(&batch);
        assert!(
            trained < initial,
            "loss should decrease: {initial} -> {trained}"
        );
    }
}
