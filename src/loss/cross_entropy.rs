/// Cross-entropy loss. Predicted probabilities are clamped into
/// `[EPS, 1 - EPS]` before any logarithm is taken.
pub struct CrossEntropyLoss;

/// Clamp margin that keeps `log(0)` out of the loss.
pub const EPS: f64 = 1e-12;

fn clamp(p: f64) -> f64 {
    p.max(EPS).min(1.0 - EPS)
}

impl CrossEntropyLoss {
    /// Categorical form for a softmax output:
    ///   L = -Σ expected[i] · log(p[i])
    pub fn categorical(expected: &[f64], actual: &[f64]) -> f64 {
        expected.iter().zip(actual.iter())
            .map(|(e, p)| -e * clamp(*p).ln())
            .sum()
    }

    /// Per-unit form for independent outputs (sigmoid and friends):
    ///   L = -Σ (e · log p + (1 - e) · log(1 - p))
    pub fn binary(expected: &[f64], actual: &[f64]) -> f64 {
        expected.iter().zip(actual.iter())
            .map(|(e, p)| {
                let p = clamp(*p);
                -(e * p.ln() + (1.0 - e) * (1.0 - p).ln())
            })
            .sum()
    }

    /// Gradient of the per-unit form w.r.t. each output:
    ///   ∂L/∂p = (p - e) / (p · (1 - p))
    ///
    /// The output activation's derivative still has to be applied on top.
    pub fn derivative(expected: &[f64], actual: &[f64]) -> Vec<f64> {
        expected.iter().zip(actual.iter())
            .map(|(e, p)| {
                let p = clamp(*p);
                (p - e) / (p * (1.0 - p))
            })
            .collect()
    }

    /// Gradient of softmax + cross-entropy w.r.t. the logits:
    ///   ∂L/∂z_i = p[i] - expected[i]
    pub fn softmax_derivative(expected: &[f64], actual: &[f64]) -> Vec<f64> {
        expected.iter().zip(actual.iter())
            .map(|(e, p)| p - e)
            .collect()
    }
}
