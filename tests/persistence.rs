use backprop_nn::{
    Activation, CustomActivation, LossType, NetError, Network, NetworkConfig, Optimizer,
    TrainConfig, UpdateRule, WeightInit,
};

fn trained(config: NetworkConfig) -> Network {
    let inputs = vec![vec![0.0, 1.0, 0.5], vec![1.0, 0.0, -0.5], vec![0.3, 0.3, 0.3]];
    let outputs = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
    let mut net = Network::new(&[3, 4, 2], config).unwrap();
    net.train_epochs(&inputs, &outputs, &TrainConfig::new(25)).unwrap();
    net
}

#[test]
fn json_round_trip_preserves_outputs() {
    let configs = vec![
        NetworkConfig::default().with_seed(1),
        NetworkConfig::default().with_seed(2).with_loss(LossType::CrossEntropy),
        NetworkConfig::default()
            .with_seed(3)
            .with_activations(vec![Activation::LeakyReLU { alpha: 0.05 }, Activation::Tanh])
            .with_weight_init(WeightInit::He)
            .with_bias(false),
        NetworkConfig::default()
            .with_seed(4)
            .with_activations(vec![Activation::Swish { beta: 1.5 }, Activation::Linear]),
    ];
    for config in configs {
        let mut net = trained(config);
        let mut restored = Network::from_json(&net.to_json().unwrap()).unwrap();
        for x in [[0.0, 0.0, 0.0], [0.9, -0.4, 2.0], [-3.0, 1.0, 0.1]] {
            assert_eq!(restored.eval(&x).unwrap(), net.eval(&x).unwrap());
        }
        assert_eq!(restored.last_changes(), net.last_changes());
        assert_eq!(restored.architecture(), net.architecture());
        assert_eq!(restored.learning_rate(), net.learning_rate());
        assert_eq!(restored.momentum(), net.momentum());
    }
}

#[test]
fn restored_network_keeps_training_identically() {
    let mut net = trained(NetworkConfig::default().with_seed(8));
    let mut restored = Network::from_json(&net.to_json().unwrap()).unwrap();
    // the last-change buffer is restored, so momentum carries over exactly
    let a = net.train(&[0.2, 0.4, 0.6], &[0.0, 1.0]).unwrap();
    let b = restored.train(&[0.2, 0.4, 0.6], &[0.0, 1.0]).unwrap();
    assert_eq!(a, b);
    assert_eq!(restored.weights(), net.weights());
}

#[test]
fn file_round_trip() {
    let mut net = trained(NetworkConfig::default().with_seed(5));
    let path = std::env::temp_dir().join(format!("backprop-nn-{}.json", std::process::id()));
    net.save_json(&path).unwrap();
    let mut loaded = Network::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.eval(&[0.1, 0.2, 0.3]).unwrap(), net.eval(&[0.1, 0.2, 0.3]).unwrap());

    let missing = std::env::temp_dir().join("backprop-nn-does-not-exist.json");
    assert!(matches!(Network::load_json(&missing), Err(NetError::Io(_))));
    assert!(matches!(Network::from_json("{ not json"), Err(NetError::Json(_))));
}

#[test]
fn optimizer_settings_survive_but_state_does_not() {
    let opt = Optimizer::new(UpdateRule::rmsprop(), 0.01).unwrap();
    let mut net = Network::new(&[2, 2, 1], NetworkConfig::default().with_seed(6))
        .unwrap()
        .with_optimizer(opt);
    net.train(&[1.0, 0.0], &[1.0]).unwrap();
    assert!(net.optimizer().unwrap().tracked_parameters() > 0);

    let restored = Network::from_json(&net.to_json().unwrap()).unwrap();
    let opt = restored.optimizer().unwrap();
    assert_eq!(opt.rule(), UpdateRule::rmsprop());
    assert_eq!(opt.learning_rate(), 0.01);
    assert_eq!(opt.tracked_parameters(), 0);
    assert_eq!(opt.iteration(), 0);
}

#[test]
fn custom_functions_are_not_persisted() {
    let cube = Activation::Custom(CustomActivation {
        name: "cube",
        forward: |x| x * x * x,
        backward: |o| 3.0 * o.cbrt() * o.cbrt(),
    });
    let net = Network::new(&[2, 1], NetworkConfig::default().with_activation(cube)).unwrap();
    assert!(matches!(net.to_json(), Err(NetError::NotSerializable(_))));

    let config = NetworkConfig::default().with_weight_init(WeightInit::Custom(|_, from, _| from as f64));
    let mut net = Network::new(&[2, 1], config).unwrap();
    let before = net.eval(&[1.0, 1.0]).unwrap();
    let mut restored = Network::from_json(&net.to_json().unwrap()).unwrap();
    assert_eq!(restored.weight_init(), WeightInit::Uniform);
    assert_eq!(restored.eval(&[1.0, 1.0]).unwrap(), before);
}
