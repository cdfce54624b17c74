use backprop_nn::{LossType, Network, NetworkConfig, TrainConfig};

/// Three clusters in the plane, one-hot labels, cross-entropy with the
/// induced softmax output.
fn main() -> backprop_nn::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let centers = [(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)];
    let mut inputs = Vec::new();
    let mut labels = Vec::new();
    for (class, &(cx, cy)) in centers.iter().enumerate() {
        for k in 0..10 {
            let angle = k as f64 * 0.628;
            inputs.push(vec![cx + 0.1 * angle.cos(), cy + 0.1 * angle.sin()]);
            let mut one_hot = vec![0.0; centers.len()];
            one_hot[class] = 1.0;
            labels.push(one_hot);
        }
    }

    let config = NetworkConfig::default()
        .with_loss(LossType::CrossEntropy)
        .with_learning_rate(0.1)
        .with_seed(3);
    let mut network = Network::new(&[2, 6, 3], config)?;
    if let Some(coupling) = network.output_coupling() {
        println!("note: {coupling}");
    }

    let train = TrainConfig::new(500)
        .with_batch_size(5)
        .with_shuffle(Some(1))
        .with_log_every(100);
    let report = backprop_nn::train_loop(&mut network, &inputs, &labels, &train)?;
    if let Some(last) = report.stats.last() {
        println!("epoch {}: loss {:.4}, accuracy {:?}", last.epoch, last.loss, last.accuracy);
    }

    for (i, &(cx, cy)) in centers.iter().enumerate() {
        println!("center {i} -> class {}", network.eval_result(&[cx, cy])?);
    }
    println!("{}", network.to_json()?);
    Ok(())
}
