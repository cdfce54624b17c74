use std::fmt;

use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::init::initializer::WeightInit;
use crate::loss::loss_type::LossType;

/// How activations are assigned to the non-input layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivationSelection {
    /// Nothing chosen: sigmoid everywhere, except that cross-entropy switches
    /// the output layer to softmax.
    #[default]
    Default,
    /// One activation for every non-input layer.
    Uniform(Activation),
    /// One activation per non-input layer, in order.
    PerLayer(Vec<Activation>),
}

impl ActivationSelection {
    /// One symbol selects `Uniform`, several select `PerLayer`.
    pub fn from_names(names: &[&str]) -> Result<ActivationSelection> {
        match names {
            [] => Ok(ActivationSelection::Default),
            [one] => Ok(ActivationSelection::Uniform(Activation::from_name(one)?)),
            many => many
                .iter()
                .map(|n| Activation::from_name(n))
                .collect::<Result<Vec<_>>>()
                .map(ActivationSelection::PerLayer),
        }
    }

    pub fn is_explicit(&self) -> bool {
        !matches!(self, ActivationSelection::Default)
    }

    /// Resolves one activation per non-input layer for `layers` such layers.
    /// Also reports the output change cross-entropy induced, if any.
    pub fn resolve(
        &self,
        layers: usize,
        loss: LossType,
    ) -> Result<(Vec<Activation>, Option<OutputCoupling>)> {
        match self {
            ActivationSelection::Default => {
                let mut acts = vec![Activation::Sigmoid; layers];
                if loss == LossType::CrossEntropy {
                    acts[layers - 1] = Activation::Softmax;
                    let coupling = OutputCoupling {
                        replaced: Activation::Sigmoid,
                        with: Activation::Softmax,
                    };
                    return Ok((acts, Some(coupling)));
                }
                Ok((acts, None))
            }
            ActivationSelection::Uniform(a) => Ok((vec![a.clone(); layers], None)),
            ActivationSelection::PerLayer(list) => {
                if list.len() != layers {
                    return Err(NetError::ActivationCountMismatch {
                        expected: layers,
                        got: list.len(),
                    });
                }
                Ok((list.clone(), None))
            }
        }
    }
}

/// Output-layer activation change induced by selecting cross-entropy without
/// choosing activations explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCoupling {
    pub replaced: Activation,
    pub with: Activation,
}

impl fmt::Display for OutputCoupling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output activation {} -> {} (cross-entropy)", self.replaced, self.with)
    }
}

/// Numeric behaviour of a `Network`.
///
/// ```
/// use backprop_nn::{NetworkConfig, LossType, WeightInit};
///
/// let config = NetworkConfig::default()
///     .with_learning_rate(0.5)
///     .with_momentum(0.2)
///     .with_weight_init(WeightInit::Xavier)
///     .with_loss(LossType::Mse)
///     .with_seed(7);
/// assert_eq!(config.learning_rate, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub learning_rate: f64,
    pub momentum: f64,
    pub bias: bool,
    pub activation: ActivationSelection,
    pub loss: LossType,
    pub weight_init: WeightInit,
    /// Seed for weight initialization; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            learning_rate: 0.3,
            momentum: 0.1,
            bias: true,
            activation: ActivationSelection::Default,
            loss: LossType::Mse,
            weight_init: WeightInit::Uniform,
            seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Same activation for every non-input layer.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = ActivationSelection::Uniform(activation);
        self
    }

    /// One activation per non-input layer; the count is checked when the
    /// network is built.
    pub fn with_activations(mut self, activations: Vec<Activation>) -> Self {
        self.activation = ActivationSelection::PerLayer(activations);
        self
    }

    pub fn with_loss(mut self, loss: LossType) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = weight_init;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_couples_cross_entropy_to_softmax() {
        let (acts, coupling) = ActivationSelection::Default
            .resolve(2, LossType::CrossEntropy)
            .unwrap();
        assert_eq!(acts, vec![Activation::Sigmoid, Activation::Softmax]);
        let coupling = coupling.unwrap();
        assert_eq!(coupling.with, Activation::Softmax);
        assert_eq!(coupling.to_string(), "output activation sigmoid -> softmax (cross-entropy)");

        let (acts, coupling) = ActivationSelection::Default.resolve(2, LossType::Mse).unwrap();
        assert_eq!(acts, vec![Activation::Sigmoid; 2]);
        assert!(coupling.is_none());
    }

    #[test]
    fn explicit_selection_is_never_rewritten() {
        let sel = ActivationSelection::Uniform(Activation::Tanh);
        let (acts, coupling) = sel.resolve(3, LossType::CrossEntropy).unwrap();
        assert_eq!(acts, vec![Activation::Tanh; 3]);
        assert!(coupling.is_none());
    }

    #[test]
    fn per_layer_length_must_match() {
        let sel = ActivationSelection::from_names(&["relu", "sigmoid"]).unwrap();
        assert!(sel.resolve(2, LossType::Mse).is_ok());
        let err = sel.resolve(3, LossType::Mse).unwrap_err();
        assert!(matches!(err, NetError::ActivationCountMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn from_names_rejects_unknown_symbols() {
        assert!(ActivationSelection::from_names(&["relu", "bogus"]).is_err());
        assert_eq!(
            ActivationSelection::from_names(&["tanh"]).unwrap(),
            ActivationSelection::Uniform(Activation::Tanh)
        );
        assert_eq!(ActivationSelection::from_names(&[]).unwrap(), ActivationSelection::Default);
    }
}
