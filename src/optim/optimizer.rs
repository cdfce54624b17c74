use std::collections::HashMap;

use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::optim::rule::UpdateRule;

/// Stable identity of one scalar parameter: a caller-chosen group (the
/// network uses the layer index) and the flattened index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId {
    pub group: usize,
    pub index: usize,
}

/// Running state kept per parameter. Which fields are used depends on the
/// rule: momentum keeps its velocity in `first`, AdaGrad and RMSProp their
/// squared-gradient accumulator in `second`, Adam both moments.
#[derive(Debug, Clone, Copy, Default)]
struct ParamState {
    first: f64,
    second: f64,
}

/// Pluggable gradient-update rule with its own per-parameter state.
///
/// State is created lazily the first time a parameter is touched and is never
/// shared with another optimizer. Only the rule and learning rate are
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimizer {
    rule: UpdateRule,
    learning_rate: f64,
    #[serde(skip)]
    iteration: u64,
    #[serde(skip)]
    state: HashMap<ParamId, ParamState>,
}

impl Optimizer {
    pub fn new(rule: UpdateRule, learning_rate: f64) -> Result<Optimizer> {
        rule.validate()?;
        Ok(Optimizer {
            rule,
            learning_rate,
            iteration: 0,
            state: HashMap::new(),
        })
    }

    /// Builds an optimizer from a rule symbol such as `"adam"`.
    pub fn from_name(name: &str, learning_rate: f64) -> Result<Optimizer> {
        Optimizer::new(UpdateRule::from_name(name)?, learning_rate)
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    /// Number of logical steps taken since creation or the last `reset`.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Number of parameters that currently carry state.
    pub fn tracked_parameters(&self) -> usize {
        self.state.len()
    }

    /// Advances the iteration counter. Call once per logical step, before
    /// applying that step's gradients to every parameter group.
    pub fn step(&mut self) {
        self.iteration += 1;
    }

    /// Clears all per-parameter state and the iteration counter.
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.state.clear();
    }

    /// Single-group convenience: one step over `parameters`, returned as a
    /// new vector of the same length.
    pub fn update(&mut self, parameters: &[f64], gradients: &[f64]) -> Result<Vec<f64>> {
        check_shape(parameters, gradients)?;
        let mut out = parameters.to_vec();
        self.step();
        self.apply(0, &mut out, gradients)?;
        Ok(out)
    }

    /// Updates `params` in place from `grads`, keying state by
    /// `(group, index)`. Does not advance the iteration counter.
    pub fn apply(&mut self, group: usize, params: &mut [f64], grads: &[f64]) -> Result<()> {
        check_shape(params, grads)?;
        let lr = self.learning_rate;
        // bias correction needs t >= 1 even if the caller skipped `step`
        let t = i32::try_from(self.iteration.max(1)).unwrap_or(i32::MAX);

        if let UpdateRule::GradientDescent = self.rule {
            for (p, g) in params.iter_mut().zip(grads) {
                *p -= lr * g;
            }
            return Ok(());
        }

        for (index, (p, &g)) in params.iter_mut().zip(grads).enumerate() {
            let s = self.state.entry(ParamId { group, index }).or_default();
            match self.rule {
                UpdateRule::GradientDescent => unreachable!(),
                UpdateRule::Momentum { beta } => {
                    s.first = beta * s.first - lr * g;
                    *p += s.first;
                }
                UpdateRule::AdaGrad { epsilon } => {
                    s.second += g * g;
                    *p -= lr * g / (s.second.sqrt() + epsilon);
                }
                UpdateRule::RmsProp { decay, epsilon } => {
                    s.second = decay * s.second + (1.0 - decay) * g * g;
                    *p -= lr * g / (s.second.sqrt() + epsilon);
                }
                UpdateRule::Adam { beta1, beta2, epsilon } => {
                    s.first = beta1 * s.first + (1.0 - beta1) * g;
                    s.second = beta2 * s.second + (1.0 - beta2) * g * g;
                    let m_hat = s.first / (1.0 - beta1.powi(t));
                    let v_hat = s.second / (1.0 - beta2.powi(t));
                    *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
                }
            }
        }
        Ok(())
    }
}

fn check_shape(params: &[f64], grads: &[f64]) -> Result<()> {
    if params.len() != grads.len() {
        return Err(NetError::ParameterShape {
            what: "optimizer gradients",
            expected: params.len().to_string(),
            got: grads.len().to_string(),
        });
    }
    Ok(())
}
