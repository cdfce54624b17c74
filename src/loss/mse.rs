pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: 0.5 · Σ(expected - actual)²
    pub fn loss(expected: &[f64], actual: &[f64]) -> f64 {
        0.5 * expected.iter().zip(actual.iter())
            .map(|(e, a)| (e - a).powi(2))
            .sum::<f64>()
    }

    /// Per-output gradient ∂L/∂a: actual - expected
    pub fn derivative(expected: &[f64], actual: &[f64]) -> Vec<f64> {
        expected.iter().zip(actual.iter())
            .map(|(e, a)| a - e)
            .collect()
    }
}
