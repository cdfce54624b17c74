use backprop_nn::{Network, NetworkConfig, Optimizer, TrainConfig, UpdateRule, WeightInit};

fn main() -> backprop_nn::Result<()> {
    env_logger::init();

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    // built-in momentum rule
    let mut network = Network::new(
        &[2, 4, 1],
        NetworkConfig::default().with_learning_rate(0.5).with_momentum(0.2).with_seed(7),
    )?;
    let config = TrainConfig::new(10000)
        .with_batch_size(1)
        .with_shuffle(Some(42))
        .with_early_stopping(200, 1e-7);
    let losses = network.train_epochs(&inputs, &expected_outputs, &config)?;
    for (epoch, loss) in losses.iter().enumerate().step_by(1000) {
        println!("Epoch {epoch}: loss = {loss:.6}");
    }
    println!("stopped after {} epochs", losses.len());

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.eval(input)?[0]);
    }

    // same problem with Adam and Xavier initialization
    let mut adam = Network::new(
        &[2, 4, 1],
        NetworkConfig::default().with_weight_init(WeightInit::Xavier).with_seed(7),
    )?
    .with_optimizer(Optimizer::new(UpdateRule::adam(), 0.05)?);
    let losses = adam.train_epochs(&inputs, &expected_outputs, &TrainConfig::new(2000))?;
    println!("adam: final loss = {:.6}", losses[losses.len() - 1]);
    Ok(())
}
