// The binary is a small demo; all network logic lives in the library.
// More demos:
//   cargo run --example xor
//   cargo run --example classifier
use backprop_nn::{Network, NetworkConfig, TrainConfig};

fn main() -> backprop_nn::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let outputs = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];

    let config = NetworkConfig::default()
        .with_learning_rate(0.5)
        .with_momentum(0.2)
        .with_seed(1);
    let mut network = Network::new(&[2, 3, 1], config)?;

    let train = TrainConfig::new(2000).with_log_every(500);
    let losses = network.train_epochs(&inputs, &outputs, &train)?;
    println!("final loss after {} epochs: {:.6}", losses.len(), losses[losses.len() - 1]);

    for input in &inputs {
        println!("{:?} -> {:.4}", input, network.eval(input)?[0]);
    }
    Ok(())
}
