use crate::{math::matrix::Matrix, activation::activation::Activation};

/// Fully-connected link from one layer of neurons into the next, together
/// with the target layer's scratch buffers.
///
/// `weights` has one row per source neuron plus, when bias is enabled, a final
/// bias row whose input is always `1.0`. `last_change` mirrors its shape and is
/// only read by the built-in momentum rule.
#[derive(Debug, Clone)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub last_change: Matrix,
    pub activator: Activation,
    /// Pre-activation sums from the last forward pass.
    pub(crate) sums: Vec<f64>,
    /// Activation outputs from the last forward pass.
    pub(crate) outputs: Vec<f64>,
    /// Deltas from the last backward pass.
    pub(crate) deltas: Vec<f64>,
}

impl Layer {
    pub fn new(size: usize, input_size: usize, bias: bool, activation: Activation) -> Layer {
        let rows = input_size + usize::from(bias);
        Layer {
            size,
            input_size,
            weights: Matrix::zeros(rows, size),
            last_change: Matrix::zeros(rows, size),
            activator: activation,
            sums: vec![0.0; size],
            outputs: vec![0.0; size],
            deltas: vec![0.0; size],
        }
    }

    pub fn has_bias(&self) -> bool {
        self.weights.rows > self.input_size
    }

    /// Computes weighted sums over `input` (plus the bias row) and applies
    /// the activation, softmax over the whole vector.
    pub fn feed_from(&mut self, input: &[f64]) {
        let bias = self.has_bias();
        for j in 0..self.size {
            let mut z = self.weights.column_dot(j, input);
            if bias {
                z += self.weights.data[self.input_size][j];
            }
            self.sums[j] = z;
        }
        self.activator.apply(&self.sums, &mut self.outputs);
    }

    /// Deltas for this (hidden) layer from the deltas of the layer it feeds:
    /// `δ_j = f'(a_j) · Σ_k δ_k · w[j][k]`.
    pub fn backprop_from(&mut self, next: &Layer) {
        for j in 0..self.size {
            let error = next.weights.row_dot(j, &next.deltas);
            self.deltas[j] = error * self.activator.backward(self.outputs[j], self.sums[j]);
        }
    }

    /// Built-in momentum rule:
    /// `Δw[i][j] = lr·δ_j·a_i + momentum·last_change[i][j]`.
    pub fn apply_momentum(&mut self, input: &[f64], lr: f64, momentum: f64) {
        let rows = self.weights.rows;
        for i in 0..rows {
            let a_i = if i < self.input_size { input[i] } else { 1.0 };
            for j in 0..self.size {
                let change = lr * self.deltas[j] * a_i + momentum * self.last_change.data[i][j];
                self.weights.data[i][j] += change;
                self.last_change.data[i][j] = change;
            }
        }
    }

    /// Gradients `∂L/∂w[i][j] = -δ_j·a_i`, row-major like `weights.flatten()`.
    pub fn gradients(&self, input: &[f64]) -> Vec<f64> {
        let mut grads = Vec::with_capacity(self.weights.rows * self.size);
        for i in 0..self.weights.rows {
            let a_i = if i < self.input_size { input[i] } else { 1.0 };
            grads.extend(self.deltas.iter().map(|d| -d * a_i));
        }
        grads
    }

    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }
}
