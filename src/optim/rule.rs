use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::NetError;

/// Gradient update rule and its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// `p' = p - lr·g`
    GradientDescent,
    /// `v' = β·v - lr·g`, `p' = p + v'`
    Momentum { beta: f64 },
    /// `acc += g²`, `p' = p - lr·g / (sqrt(acc) + ε)`
    AdaGrad { epsilon: f64 },
    /// `acc = ρ·acc + (1-ρ)·g²`, `p' = p - lr·g / (sqrt(acc) + ε)`
    RmsProp { decay: f64, epsilon: f64 },
    /// Bias-corrected first and second moment estimates.
    Adam { beta1: f64, beta2: f64, epsilon: f64 },
}

impl UpdateRule {
    pub fn momentum() -> UpdateRule {
        UpdateRule::Momentum { beta: 0.9 }
    }

    pub fn adagrad() -> UpdateRule {
        UpdateRule::AdaGrad { epsilon: 1e-8 }
    }

    pub fn rmsprop() -> UpdateRule {
        UpdateRule::RmsProp { decay: 0.9, epsilon: 1e-8 }
    }

    pub fn adam() -> UpdateRule {
        UpdateRule::Adam { beta1: 0.9, beta2: 0.999, epsilon: 1e-8 }
    }

    /// Parses a rule symbol; parameterised rules get their default constants.
    pub fn from_name(name: &str) -> Result<UpdateRule, NetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sgd" | "gradient_descent" | "gd" => Ok(UpdateRule::GradientDescent),
            "momentum" => Ok(UpdateRule::momentum()),
            "adagrad" => Ok(UpdateRule::adagrad()),
            "rmsprop" => Ok(UpdateRule::rmsprop()),
            "adam" => Ok(UpdateRule::adam()),
            _ => Err(NetError::UnknownOptimizer(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpdateRule::GradientDescent => "gradient_descent",
            UpdateRule::Momentum { .. } => "momentum",
            UpdateRule::AdaGrad { .. } => "adagrad",
            UpdateRule::RmsProp { .. } => "rmsprop",
            UpdateRule::Adam { .. } => "adam",
        }
    }

    /// Decay factors must lie in [0, 1); epsilons must be positive.
    pub fn validate(&self) -> Result<(), NetError> {
        let unit = |name: &'static str, value: f64| {
            if (0.0..1.0).contains(&value) {
                Ok(())
            } else {
                Err(NetError::InvalidHyperparameter { name, value })
            }
        };
        let positive = |name: &'static str, value: f64| {
            if value > 0.0 {
                Ok(())
            } else {
                Err(NetError::InvalidHyperparameter { name, value })
            }
        };
        match *self {
            UpdateRule::GradientDescent => Ok(()),
            UpdateRule::Momentum { beta } => unit("beta", beta),
            UpdateRule::AdaGrad { epsilon } => positive("epsilon", epsilon),
            UpdateRule::RmsProp { decay, epsilon } => {
                unit("decay", decay)?;
                positive("epsilon", epsilon)
            }
            UpdateRule::Adam { beta1, beta2, epsilon } => {
                unit("beta1", beta1)?;
                unit("beta2", beta2)?;
                positive("epsilon", epsilon)
            }
        }
    }
}

impl FromStr for UpdateRule {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpdateRule::from_name(s)
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
