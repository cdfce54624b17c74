use backprop_nn::{
    Activation, LossType, Matrix, NetError, Network, NetworkConfig, Optimizer, TrainConfig,
    UpdateRule, WeightInit,
};

/// Deterministic, asymmetric starting weights.
fn wavy(layer: usize, from: usize, to: usize) -> f64 {
    (1.7 * (layer + 1) as f64 + 2.3 * from as f64 + 3.1 * to as f64 + 0.5).sin()
}

fn xor() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    (
        vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    )
}

fn sigmoid_net(arch: &[usize], lr: f64, momentum: f64) -> Network {
    let config = NetworkConfig::default()
        .with_activation(Activation::Sigmoid)
        .with_weight_init(WeightInit::Custom(wavy))
        .with_learning_rate(lr)
        .with_momentum(momentum);
    Network::new(arch, config).unwrap()
}

fn correct_rows(net: &mut Network, inputs: &[Vec<f64>], outputs: &[Vec<f64>]) -> usize {
    inputs
        .iter()
        .zip(outputs)
        .filter(|(x, y)| (net.eval(x).unwrap()[0] > 0.5) == (y[0] > 0.5))
        .count()
}

#[test]
fn output_length_matches_architecture() {
    for arch in [vec![1, 1], vec![2, 3, 1], vec![4, 5, 6, 3], vec![3, 1, 7]] {
        let mut net = Network::new(&arch, NetworkConfig::default().with_seed(0)).unwrap();
        let input = vec![0.5; arch[0]];
        assert_eq!(net.eval(&input).unwrap().len(), arch[arch.len() - 1]);

        let wrong = vec![0.5; arch[0] + 1];
        assert!(matches!(net.eval(&wrong), Err(NetError::InputSize { .. })));
    }
}

#[test]
fn identical_weights_give_identical_outputs() {
    let mut a = sigmoid_net(&[3, 4, 2], 0.3, 0.1);
    let mut b = sigmoid_net(&[3, 4, 2], 0.3, 0.1);
    for x in [[0.0, 0.0, 0.0], [1.0, -2.0, 0.5], [10.0, 3.0, -7.0]] {
        assert_eq!(a.eval(&x).unwrap(), b.eval(&x).unwrap());
    }

    // same for seeded random initialization
    let mut c = Network::new(&[3, 4, 2], NetworkConfig::default().with_seed(99)).unwrap();
    let mut d = Network::new(&[3, 4, 2], NetworkConfig::default().with_seed(99)).unwrap();
    assert_eq!(c.eval(&[0.1, 0.2, 0.3]).unwrap(), d.eval(&[0.1, 0.2, 0.3]).unwrap());
}

#[test]
fn xor_converges_with_momentum_sgd() {
    let (x, y) = xor();
    let mut net = sigmoid_net(&[2, 4, 1], 0.5, 0.2);
    let losses = net.train_epochs(&x, &y, &TrainConfig::new(2000)).unwrap();
    assert_eq!(losses.len(), 2000);
    assert!(losses[losses.len() - 1] < 0.1);
    assert!(losses[losses.len() - 1] < losses[0]);
    assert!(correct_rows(&mut net, &x, &y) >= 3);
}

#[test]
fn xor_scenario_two_three_one() {
    let (x, y) = xor();
    let mut net = sigmoid_net(&[2, 3, 1], 0.5, 0.2);
    net.train_epochs(&x, &y, &TrainConfig::new(2000)).unwrap();
    assert!(net.eval(&[0.0, 1.0]).unwrap()[0] > 0.7);
    assert!(net.eval(&[1.0, 1.0]).unwrap()[0] < 0.3);
    assert!((net.accuracy(&x, &y).unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn xor_converges_with_adam() {
    let (x, y) = xor();
    let opt = Optimizer::new(UpdateRule::adam(), 0.05).unwrap();
    let mut net = sigmoid_net(&[2, 4, 1], 0.0, 0.0).with_optimizer(opt);
    let losses = net.train_epochs(&x, &y, &TrainConfig::new(1000)).unwrap();
    assert!(losses[losses.len() - 1] < 0.01);
    assert_eq!(correct_rows(&mut net, &x, &y), 4);
    // one optimizer step per trained example
    assert_eq!(net.optimizer().unwrap().iteration(), 4000);
}

#[test]
fn softmax_cross_entropy_learns_three_classes() {
    let inputs = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
    let labels = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    let config = NetworkConfig::default()
        .with_loss(LossType::CrossEntropy)
        .with_weight_init(WeightInit::Custom(wavy));
    let mut net = Network::new(&[2, 5, 3], config).unwrap();
    assert_eq!(net.output_activation(), &Activation::Softmax);

    let report = backprop_nn::train_loop(&mut net, &inputs, &labels, &TrainConfig::new(500)).unwrap();
    assert!(report.losses[499] < report.losses[0]);
    assert!(report.losses[499] < 0.1);
    // cross-entropy runs always track accuracy
    assert_eq!(report.stats[499].accuracy, Some(1.0));
    let classes: Vec<usize> = inputs.iter().map(|x| net.eval_result(x).unwrap()).collect();
    assert_eq!(classes, vec![0, 1, 1, 2]);
}

#[test]
fn shuffled_runs_replay_with_the_same_seed() {
    let (x, y) = xor();
    let run = |seed: u64| {
        let mut net = sigmoid_net(&[2, 3, 1], 0.5, 0.2);
        let config = TrainConfig::new(50).with_batch_size(2).with_shuffle(Some(seed));
        net.train_epochs(&x, &y, &config).unwrap()
    };
    let first = run(17);
    assert_eq!(first, run(17));
    assert_ne!(first, run(18));
}

#[test]
fn early_stopping_truncates_history() {
    let (x, y) = xor();
    let mut net = sigmoid_net(&[2, 3, 1], 0.0, 0.0);
    let config = TrainConfig::new(1000).with_early_stopping(5, 1e-6);
    let losses = net.train_epochs(&x, &y, &config).unwrap();
    // frozen weights: epoch 1 is the last improvement
    assert_eq!(losses.len(), 1 + 5);

    // a large min_delta stops a network that is still learning slowly
    let mut learning = sigmoid_net(&[2, 3, 1], 0.5, 0.2);
    let config = TrainConfig::new(1000).with_early_stopping(3, 10.0);
    assert_eq!(learning.train_epochs(&x, &y, &config).unwrap().len(), 4);
}

#[test]
fn early_stopping_counts_patience_from_last_real_improvement() {
    // one linear unit fitting 1 -> 1: the error shrinks by 0.9 every epoch,
    // so epoch-to-epoch gains decay geometrically
    let config = NetworkConfig::default()
        .with_activation(Activation::Linear)
        .with_learning_rate(0.05)
        .with_momentum(0.0);
    let mut net = Network::new(&[1, 1], config).unwrap();
    net.set_weights(vec![Matrix::zeros(2, 1)]).unwrap();

    let config = TrainConfig::new(1000).with_early_stopping(3, 1e-4);
    let losses = net.train_epochs(&[vec![1.0]], &[vec![1.0]], &config).unwrap();

    let last_gain = losses
        .windows(2)
        .rposition(|w| w[0] - w[1] > 1e-4)
        .map(|i| i + 2)
        .unwrap();
    assert_eq!(last_gain, 34);
    assert_eq!(losses.len(), last_gain + 3);
}

#[test]
fn explicit_weights_drive_a_known_output() {
    let config = NetworkConfig::default().with_activation(Activation::Linear);
    let mut net = Network::new(&[2, 1], config).unwrap();
    net.set_weights(vec![Matrix::from_data(vec![vec![2.0], vec![-1.0], vec![0.5]]).unwrap()])
        .unwrap();
    assert_eq!(net.eval(&[3.0, 4.0]).unwrap(), vec![2.5]);
    assert_eq!(net.activations(), vec![vec![3.0, 4.0], vec![2.5]]);

    let wrong = vec![Matrix::zeros(2, 1)];
    assert!(net.set_weights(wrong).unwrap_err().is_dimension());
}

#[test]
fn non_finite_inputs_propagate() {
    let mut net = sigmoid_net(&[2, 2, 1], 0.5, 0.2);
    let out = net.eval(&[f64::NAN, 0.0]).unwrap();
    assert!(out[0].is_nan());
    let loss = net.train(&[f64::NAN, 0.0], &[1.0]).unwrap();
    assert!(loss.is_nan());
}
