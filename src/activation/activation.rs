use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::NetError;

/// A caller-supplied activation. Both functions must be pure; `backward`
/// receives the forward *output*, like every built-in variant.
///
/// Custom activations are never persisted: a network holding one refuses to
/// serialize.
#[derive(Debug, Clone, Copy)]
pub struct CustomActivation {
    pub name: &'static str,
    pub forward: fn(f64) -> f64,
    pub backward: fn(f64) -> f64,
}

/// Per-layer activation function.
///
/// `backward` is always expressed through the value `forward` produced, so the
/// network only has to keep each layer's outputs around for the backward pass.
/// `Swish` is the one exception: its derivative cannot be recovered from the
/// output alone, so it also reads the retained pre-activation input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Swish { beta: f64 },
    /// Vector-valued; applied over the whole layer by `apply`. The element-wise
    /// `backward` is the diagonal `o·(1-o)`, not the full Jacobian.
    Softmax,
    #[serde(alias = "identity")]
    Linear,
    #[serde(skip)]
    Custom(CustomActivation),
}

impl Activation {
    /// Builds an activation from its symbol. Parameterised variants get their
    /// usual defaults (`alpha = 0.01` for leaky ReLU, `alpha = 1` for ELU,
    /// `beta = 1` for swish).
    pub fn from_name(name: &str) -> Result<Activation, NetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sigmoid" | "logistic" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::ReLU),
            "leaky_relu" | "leakyrelu" => Ok(Activation::LeakyReLU { alpha: 0.01 }),
            "elu" => Ok(Activation::Elu { alpha: 1.0 }),
            "swish" => Ok(Activation::Swish { beta: 1.0 }),
            "softmax" => Ok(Activation::Softmax),
            "linear" | "identity" => Ok(Activation::Linear),
            _ => Err(NetError::UnknownActivation(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::ReLU => "relu",
            Activation::LeakyReLU { .. } => "leaky_relu",
            Activation::Elu { .. } => "elu",
            Activation::Swish { .. } => "swish",
            Activation::Softmax => "softmax",
            Activation::Linear => "linear",
            Activation::Custom(c) => c.name,
        }
    }

    pub fn is_softmax(&self) -> bool {
        matches!(self, Activation::Softmax)
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Activation::Custom(_))
    }

    /// Element-wise activation. For `Softmax` this is the logistic function;
    /// the layer-level `apply` is what normalises a whole vector.
    pub fn forward(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid | Activation::Softmax => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::ReLU => if x > 0.0 { x } else { 0.0 },
            Activation::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            Activation::Elu { alpha } => if x > 0.0 { x } else { alpha * (x.exp() - 1.0) },
            Activation::Swish { beta } => x * sigmoid(beta * x),
            Activation::Linear => x,
            Activation::Custom(c) => (c.forward)(x),
        }
    }

    /// Derivative at the point that produced `output`.
    ///
    /// `input` is the pre-activation value and is only consulted by `Swish`.
    pub fn backward(&self, output: f64, input: f64) -> f64 {
        match self {
            Activation::Sigmoid | Activation::Softmax => output * (1.0 - output),
            Activation::Tanh => 1.0 - output * output,
            Activation::ReLU => if output > 0.0 { 1.0 } else { 0.0 },
            Activation::LeakyReLU { alpha } => if output > 0.0 { 1.0 } else { *alpha },
            // below zero: f = α(eˣ-1)  =>  f' = αeˣ = f + α
            Activation::Elu { alpha } => if output > 0.0 { 1.0 } else { output + alpha },
            Activation::Swish { beta } => {
                let s = sigmoid(beta * input);
                beta * output + s * (1.0 - beta * output)
            }
            Activation::Linear => 1.0,
            Activation::Custom(c) => (c.backward)(output),
        }
    }

    /// Applies the activation over a layer's weighted sums, writing into `out`.
    pub fn apply(&self, sums: &[f64], out: &mut [f64]) {
        match self {
            Activation::Softmax => softmax_into(sums, out),
            _ => {
                for (o, &z) in out.iter_mut().zip(sums) {
                    *o = self.forward(z);
                }
            }
        }
    }
}

impl PartialEq for Activation {
    /// Custom activations compare by name only.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Activation::LeakyReLU { alpha: a }, Activation::LeakyReLU { alpha: b }) => a == b,
            (Activation::Elu { alpha: a }, Activation::Elu { alpha: b }) => a == b,
            (Activation::Swish { beta: a }, Activation::Swish { beta: b }) => a == b,
            (Activation::Custom(a), Activation::Custom(b)) => a.name == b.name,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl FromStr for Activation {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activation::from_name(s)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax: the maximum is subtracted before exponentiating.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; values.len()];
    softmax_into(values, &mut out);
    out
}

fn softmax_into(values: &[f64], out: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for (o, &v) in out.iter_mut().zip(values) {
        *o = (v - max).exp();
        total += *o;
    }
    for o in out.iter_mut() {
        *o /= total;
    }
}

/// Diagonal softmax derivative `o·(1-o)` for each component.
pub fn softmax_backward(outputs: &[f64]) -> Vec<f64> {
    outputs.iter().map(|o| o * (1.0 - o)).collect()
}
