use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::init::initializer::WeightInit;
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::config::{NetworkConfig, OutputCoupling};
use crate::optim::optimizer::Optimizer;

/// Fully-connected feedforward network trained by backpropagation.
///
/// Weights are created lazily on the first `eval`/`train` call or by an
/// explicit `initialize`. The per-layer activation buffers are scratch space
/// reused across calls; everything returned across the public surface is a
/// copy.
///
/// A `Network` is not meant to be shared between threads while training; use
/// one instance per worker.
#[derive(Debug, Clone)]
pub struct Network {
    architecture: Vec<usize>,
    pub(crate) config: NetworkConfig,
    pub(crate) activations: Vec<Activation>,
    coupling: Option<OutputCoupling>,
    pub(crate) layers: Vec<Layer>,
    input: Vec<f64>,
    rng: StdRng,
    pub(crate) optimizer: Option<Optimizer>,
}

impl Network {
    /// Builds a network for `architecture` (neuron count per layer, input
    /// first). Fails on fewer than two layers, a zero-sized layer, or an
    /// activation list of the wrong length.
    pub fn new(architecture: &[usize], config: NetworkConfig) -> Result<Network> {
        validate_architecture(architecture)?;
        let (activations, coupling) = config
            .activation
            .resolve(architecture.len() - 1, config.loss)?;
        if let Some(c) = &coupling {
            info!("{c}");
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            "network {:?}: activations [{}], loss {}, init {}",
            architecture,
            activations.iter().map(|a| a.name()).collect::<Vec<_>>().join(", "),
            config.loss,
            config.weight_init,
        );
        Ok(Network {
            architecture: architecture.to_vec(),
            config,
            activations,
            coupling,
            layers: Vec::new(),
            input: vec![0.0; architecture[0]],
            rng,
            optimizer: None,
        })
    }

    /// Replaces the built-in momentum rule with a pluggable optimizer.
    pub fn with_optimizer(mut self, optimizer: Optimizer) -> Network {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn set_optimizer(&mut self, optimizer: Option<Optimizer>) {
        self.optimizer = optimizer;
    }

    pub fn optimizer(&self) -> Option<&Optimizer> {
        self.optimizer.as_ref()
    }

    pub fn optimizer_mut(&mut self) -> Option<&mut Optimizer> {
        self.optimizer.as_mut()
    }

    // -----------------------------------------------------------------------
    // Weights
    // -----------------------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        !self.layers.is_empty()
    }

    /// (Re)draws every weight from the configured initializer. The last-change
    /// buffer and any optimizer state are reset with it.
    pub fn initialize(&mut self) {
        let bias = self.config.bias;
        let init = self.config.weight_init;
        let mut layers = Vec::with_capacity(self.architecture.len() - 1);
        for l in 0..self.architecture.len() - 1 {
            let (from, to) = (self.architecture[l], self.architecture[l + 1]);
            let mut layer = Layer::new(to, from, bias, self.activations[l].clone());
            let (rng, arch) = (&mut self.rng, &self.architecture);
            layer.weights = Matrix::from_fn(layer.weights.rows, to, |i, j| {
                init.weight(&mut *rng, arch, l, i, j)
            });
            layers.push(layer);
        }
        self.layers = layers;
        if let Some(opt) = self.optimizer.as_mut() {
            opt.reset();
        }
        debug!("initialized {} weight matrices with {}", self.layers.len(), init);
    }

    fn ensure_initialized(&mut self) {
        if !self.is_initialized() {
            self.initialize();
        }
    }

    /// Switches the initializer and re-initializes; existing weights are lost.
    pub fn set_weight_init(&mut self, weight_init: WeightInit) {
        self.config.weight_init = weight_init;
        self.initialize();
    }

    /// Installs explicit weight matrices, one per layer boundary, each shaped
    /// `[source (+1 with bias), target]`. Clears the last-change buffer.
    pub fn set_weights(&mut self, weights: Vec<Matrix>) -> Result<()> {
        let expected = self.architecture.len() - 1;
        if weights.len() != expected {
            return Err(NetError::ParameterShape {
                what: "weight tensor count",
                expected: expected.to_string(),
                got: weights.len().to_string(),
            });
        }
        let bias = usize::from(self.config.bias);
        for (l, w) in weights.iter().enumerate() {
            let shape = (self.architecture[l] + bias, self.architecture[l + 1]);
            if w.shape() != shape {
                return Err(NetError::ParameterShape {
                    what: "weight matrix",
                    expected: format!("{shape:?}"),
                    got: format!("{:?}", w.shape()),
                });
            }
            w.check_consistent()?;
        }
        let mut layers = Vec::with_capacity(expected);
        for (l, w) in weights.into_iter().enumerate() {
            let mut layer = Layer::new(
                self.architecture[l + 1],
                self.architecture[l],
                self.config.bias,
                self.activations[l].clone(),
            );
            layer.weights = w;
            layers.push(layer);
        }
        self.layers = layers;
        if let Some(opt) = self.optimizer.as_mut() {
            opt.reset();
        }
        Ok(())
    }

    /// Selects a new loss. When activations were never chosen explicitly the
    /// output activation follows the loss, and the induced change is returned.
    pub fn set_loss(&mut self, loss: LossType) -> Result<Option<OutputCoupling>> {
        let (activations, coupling) = self
            .config
            .activation
            .resolve(self.architecture.len() - 1, loss)?;
        self.config.loss = loss;
        for (layer, act) in self.layers.iter_mut().zip(activations.iter()) {
            layer.activator = act.clone();
        }
        self.activations = activations;
        if let Some(c) = &coupling {
            info!("{c}");
        }
        self.coupling = coupling.clone();
        Ok(coupling)
    }

    // -----------------------------------------------------------------------
    // Inference
    // -----------------------------------------------------------------------

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.architecture[0] {
            return Err(NetError::InputSize {
                expected: self.architecture[0],
                got: input.len(),
            });
        }
        Ok(())
    }

    fn check_expected(&self, expected: &[f64]) -> Result<()> {
        let out = self.output_size();
        if expected.len() != out {
            return Err(NetError::OutputSize { expected: out, got: expected.len() });
        }
        Ok(())
    }

    /// Forward pass into the internal buffers. Input length must already be
    /// checked.
    fn forward(&mut self) {
        for l in 0..self.layers.len() {
            let (before, rest) = self.layers.split_at_mut(l);
            let input = match before.last() {
                Some(prev) => prev.outputs(),
                None => self.input.as_slice(),
            };
            rest[0].feed_from(input);
        }
    }

    fn output(&self) -> &[f64] {
        self.layers.last().map(|l| l.outputs()).unwrap_or(&[])
    }

    /// Runs the network on `input` and returns a copy of the output layer.
    pub fn eval(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        self.ensure_initialized();
        self.input.copy_from_slice(input);
        self.forward();
        Ok(self.output().to_vec())
    }

    /// Index of the largest output.
    pub fn eval_result(&mut self, input: &[f64]) -> Result<usize> {
        Ok(argmax(&self.eval(input)?))
    }

    /// Mean loss over a dataset; weights are left untouched.
    pub fn evaluate(&mut self, inputs: &[Vec<f64>], expecteds: &[Vec<f64>]) -> Result<f64> {
        self.check_dataset(inputs, expecteds)?;
        let mut total = 0.0;
        for (input, expected) in inputs.iter().zip(expecteds) {
            let output = self.eval(input)?;
            total += self.config.loss.loss(expected, &output, self.output_activation());
        }
        Ok(total / inputs.len() as f64)
    }

    /// Fraction of examples classified correctly: argmax match for several
    /// outputs, a 0.5 threshold for a single output.
    pub fn accuracy(&mut self, inputs: &[Vec<f64>], expecteds: &[Vec<f64>]) -> Result<f64> {
        self.check_dataset(inputs, expecteds)?;
        let mut correct = 0usize;
        for (input, expected) in inputs.iter().zip(expecteds) {
            let output = self.eval(input)?;
            if is_correct(&output, expected) {
                correct += 1;
            }
        }
        Ok(correct as f64 / inputs.len() as f64)
    }

    // -----------------------------------------------------------------------
    // Training
    // -----------------------------------------------------------------------

    /// Checks every pair up front so a rejected dataset never causes a
    /// partial update.
    pub(crate) fn check_dataset(&self, inputs: &[Vec<f64>], expecteds: &[Vec<f64>]) -> Result<()> {
        if inputs.len() != expecteds.len() {
            return Err(NetError::DatasetMismatch {
                inputs: inputs.len(),
                outputs: expecteds.len(),
            });
        }
        if inputs.is_empty() {
            return Err(NetError::EmptyDataset);
        }
        for (input, expected) in inputs.iter().zip(expecteds) {
            self.check_input(input)?;
            self.check_expected(expected)?;
        }
        Ok(())
    }

    /// One forward pass, one backward pass and one weight update. Returns the
    /// loss measured before the update.
    pub fn train(&mut self, input: &[f64], expected: &[f64]) -> Result<f64> {
        self.check_input(input)?;
        self.check_expected(expected)?;
        self.train_unchecked(input, expected)
    }

    fn train_unchecked(&mut self, input: &[f64], expected: &[f64]) -> Result<f64> {
        self.ensure_initialized();
        self.input.copy_from_slice(input);
        self.forward();
        let loss = self
            .config
            .loss
            .loss(expected, self.output(), self.output_activation());
        self.backward(expected);
        self.update_weights()?;
        Ok(loss)
    }

    /// Trains example by example (each one updates the weights immediately)
    /// and returns the mean loss.
    pub fn train_batch(&mut self, inputs: &[Vec<f64>], expecteds: &[Vec<f64>]) -> Result<f64> {
        self.check_dataset(inputs, expecteds)?;
        let pairs = inputs
            .iter()
            .zip(expecteds)
            .map(|(i, e)| (i.as_slice(), e.as_slice()));
        self.train_batch_unchecked(pairs)
    }

    pub(crate) fn train_batch_unchecked<'a, I>(&mut self, pairs: I) -> Result<f64>
    where
        I: IntoIterator<Item = (&'a [f64], &'a [f64])>,
    {
        let mut total = 0.0;
        let mut n = 0usize;
        for (input, expected) in pairs {
            total += self.train_unchecked(input, expected)?;
            n += 1;
        }
        Ok(if n == 0 { 0.0 } else { total / n as f64 })
    }

    /// Computes the deltas of every layer, output first.
    fn backward(&mut self, expected: &[f64]) {
        let loss = self.config.loss;
        if let Some(out) = self.layers.last_mut() {
            let Layer { outputs, sums, deltas, activator, .. } = out;
            loss.output_deltas(expected, outputs, sums, activator, deltas);
        }
        for l in (0..self.layers.len().saturating_sub(1)).rev() {
            let (head, tail) = self.layers.split_at_mut(l + 1);
            head[l].backprop_from(&tail[0]);
        }
    }

    fn update_weights(&mut self) -> Result<()> {
        let (lr, momentum) = (self.config.learning_rate, self.config.momentum);
        if let Some(opt) = self.optimizer.as_mut() {
            opt.step();
        }
        for l in 0..self.layers.len() {
            let (before, rest) = self.layers.split_at_mut(l);
            let input = match before.last() {
                Some(prev) => prev.outputs(),
                None => self.input.as_slice(),
            };
            let layer = &mut rest[0];
            match self.optimizer.as_mut() {
                Some(opt) => {
                    let grads = layer.gradients(input);
                    let mut params = layer.weights.flatten();
                    opt.apply(l, &mut params, &grads)?;
                    layer.weights.assign_flat(&params);
                }
                None => layer.apply_momentum(input, lr, momentum),
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn architecture(&self) -> &[usize] {
        &self.architecture
    }

    pub fn input_size(&self) -> usize {
        self.architecture[0]
    }

    pub fn output_size(&self) -> usize {
        self.architecture[self.architecture.len() - 1]
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Weight matrices, one per layer boundary; empty before initialization.
    pub fn weights(&self) -> Vec<&Matrix> {
        self.layers.iter().map(|l| &l.weights).collect()
    }

    /// Last applied weight changes, shaped like `weights()`.
    pub fn last_changes(&self) -> Vec<&Matrix> {
        self.layers.iter().map(|l| &l.last_change).collect()
    }

    /// Copies of the activation buffers from the latest forward pass, input
    /// layer first.
    pub fn activations(&self) -> Vec<Vec<f64>> {
        let mut all = Vec::with_capacity(self.architecture.len());
        all.push(self.input.clone());
        if self.is_initialized() {
            all.extend(self.layers.iter().map(|l| l.outputs().to_vec()));
        } else {
            all.extend(self.architecture[1..].iter().map(|&n| vec![0.0; n]));
        }
        all
    }

    /// Activation of non-input layer `layer` (1-based: 1 is the first hidden
    /// layer).
    pub fn activation_for_layer(&self, layer: usize) -> Option<&Activation> {
        layer.checked_sub(1).and_then(|i| self.activations.get(i))
    }

    pub fn output_activation(&self) -> &Activation {
        &self.activations[self.activations.len() - 1]
    }

    pub fn output_coupling(&self) -> Option<&OutputCoupling> {
        self.coupling.as_ref()
    }

    pub fn loss(&self) -> LossType {
        self.config.loss
    }

    pub fn weight_init(&self) -> WeightInit {
        self.config.weight_init
    }

    /// Rate driving the updates: the plugged-in optimizer's when one is set,
    /// otherwise the built-in momentum rule's.
    pub fn learning_rate(&self) -> f64 {
        match &self.optimizer {
            Some(opt) => opt.learning_rate(),
            None => self.config.learning_rate,
        }
    }

    /// Sets the rate of the built-in rule and, when present, of the
    /// plugged-in optimizer.
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.config.learning_rate = learning_rate;
        if let Some(opt) = self.optimizer.as_mut() {
            opt.set_learning_rate(learning_rate);
        }
    }

    /// Only read by the built-in rule.
    pub fn momentum(&self) -> f64 {
        self.config.momentum
    }

    pub fn set_momentum(&mut self, momentum: f64) {
        self.config.momentum = momentum;
    }

    pub(crate) fn restore_layers(&mut self, weights: Vec<Matrix>, changes: Vec<Matrix>) -> Result<()> {
        self.set_weights(weights)?;
        for (layer, change) in self.layers.iter_mut().zip(changes) {
            if change.shape() != layer.weights.shape() {
                return Err(NetError::SnapshotMismatch(format!(
                    "last-change shape {:?} does not match weights {:?}",
                    change.shape(),
                    layer.weights.shape()
                )));
            }
            change.check_consistent()?;
            layer.last_change = change;
        }
        Ok(())
    }

    pub(crate) fn warn_custom_init(&self) {
        if self.config.weight_init.is_custom() {
            warn!("custom weight initializer is not persisted; stored as uniform");
        }
    }
}

fn validate_architecture(architecture: &[usize]) -> Result<()> {
    let reason = if architecture.len() < 2 {
        "at least an input and an output layer are required"
    } else if architecture.contains(&0) {
        "every layer needs at least one neuron"
    } else {
        return Ok(());
    };
    Err(NetError::InvalidArchitecture { layers: architecture.to_vec(), reason })
}

/// Index of the maximum element in a slice.
pub(crate) fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(crate) fn is_correct(output: &[f64], expected: &[f64]) -> bool {
    if output.len() == 1 {
        (output[0] >= 0.5) == (expected[0] >= 0.5)
    } else {
        argmax(output) == argmax(expected)
    }
}
