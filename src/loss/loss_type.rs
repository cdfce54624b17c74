use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::NetError;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;

/// Selects the loss the network trains against.
///
/// - `Mse`          — `0.5 · Σ(e - a)²`; the output delta multiplies the error
///   by the output activation's derivative.
/// - `CrossEntropy` — with a Softmax output the delta collapses to the plain
///   error `e - a`; with any other output the per-unit form is used and the
///   activation derivative is applied explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Mse,
    CrossEntropy,
}

impl LossType {
    pub fn from_name(name: &str) -> Result<LossType, NetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mse" | "mean_squared_error" => Ok(LossType::Mse),
            "cross_entropy" | "crossentropy" | "cross-entropy" => Ok(LossType::CrossEntropy),
            _ => Err(NetError::UnknownLoss(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossType::Mse => "mse",
            LossType::CrossEntropy => "cross_entropy",
        }
    }

    /// Scalar loss for one example. `output` is the activation of the output
    /// layer; it decides which cross-entropy form applies.
    pub fn loss(&self, expected: &[f64], actual: &[f64], output: &Activation) -> f64 {
        match self {
            LossType::Mse => MseLoss::loss(expected, actual),
            LossType::CrossEntropy if output.is_softmax() => {
                CrossEntropyLoss::categorical(expected, actual)
            }
            LossType::CrossEntropy => CrossEntropyLoss::binary(expected, actual),
        }
    }

    /// Output-layer deltas, written into `deltas`.
    ///
    /// Deltas carry the descent direction (`-∂L/∂z`), so the weight update
    /// adds `lr · δ_j · a_i`. `sums` are the pre-activation values of the
    /// output layer.
    pub fn output_deltas(
        &self,
        expected: &[f64],
        actual: &[f64],
        sums: &[f64],
        output: &Activation,
        deltas: &mut [f64],
    ) {
        let gradient = match self {
            LossType::CrossEntropy if output.is_softmax() => {
                // softmax + cross-entropy: no derivative multiplication
                for (d, g) in deltas.iter_mut()
                    .zip(CrossEntropyLoss::softmax_derivative(expected, actual))
                {
                    *d = -g;
                }
                return;
            }
            LossType::CrossEntropy => CrossEntropyLoss::derivative(expected, actual),
            LossType::Mse => MseLoss::derivative(expected, actual),
        };
        for (k, d) in deltas.iter_mut().enumerate() {
            *d = -gradient[k] * output.backward(actual[k], sums[k]);
        }
    }
}

impl FromStr for LossType {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LossType::from_name(s)
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
