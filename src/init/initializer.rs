use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::NetError;

/// Caller-supplied initializer: `(layer, source neuron, target neuron) -> weight`.
/// The source index equals the layer size for the bias row.
pub type CustomInit = fn(usize, usize, usize) -> f64;

/// Strategy for the initial value of every connection weight.
///
/// Fan-in and fan-out are the neuron counts on either side of the layer
/// boundary, bias excluded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform on [-1, 1).
    Uniform,
    /// Glorot: uniform on [-l, l) with `l = sqrt(6 / (fan_in + fan_out))`.
    Xavier,
    /// He: uniform on [-l, l) with `l = sqrt(6 / fan_in)`.
    He,
    #[serde(skip)]
    Custom(CustomInit),
}

impl WeightInit {
    pub fn from_name(name: &str) -> Result<WeightInit, NetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "uniform" | "random" => Ok(WeightInit::Uniform),
            "xavier" | "glorot" => Ok(WeightInit::Xavier),
            "he" | "kaiming" => Ok(WeightInit::He),
            _ => Err(NetError::UnknownInitializer(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeightInit::Uniform => "uniform",
            WeightInit::Xavier => "xavier",
            WeightInit::He => "he",
            WeightInit::Custom(_) => "custom",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, WeightInit::Custom(_))
    }

    /// Half-width of the sampling interval for a boundary with the given fans.
    pub fn limit(&self, fan_in: usize, fan_out: usize) -> f64 {
        match self {
            WeightInit::Uniform | WeightInit::Custom(_) => 1.0,
            WeightInit::Xavier => (6.0 / (fan_in + fan_out) as f64).sqrt(),
            WeightInit::He => (6.0 / fan_in as f64).sqrt(),
        }
    }

    /// Initial weight for the connection `from -> to` between layer `layer`
    /// and layer `layer + 1` of `architecture`.
    pub fn weight<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        architecture: &[usize],
        layer: usize,
        from: usize,
        to: usize,
    ) -> f64 {
        if let WeightInit::Custom(f) = self {
            return f(layer, from, to);
        }
        let limit = self.limit(architecture[layer], architecture[layer + 1]);
        rng.gen_range(-limit..limit)
    }
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Uniform
    }
}

impl PartialEq for WeightInit {
    /// Custom initializers never compare equal to anything but another custom
    /// initializer; function identity is not meaningful here.
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl FromStr for WeightInit {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeightInit::from_name(s)
    }
}

impl fmt::Display for WeightInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
