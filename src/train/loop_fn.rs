use std::time::Instant;

use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::{NetError, Result};
use crate::loss::loss_type::LossType;
use crate::network::network::Network;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` for up to `config.epochs` epochs and returns the full
/// report.
///
/// # Arguments
/// - `network` — mutable reference to the network; modified in place
/// - `inputs`  — training samples, each of length `input_size`
/// - `outputs` — corresponding targets, same count as `inputs`
/// - `config`  — epochs, batching, shuffling, early stopping, progress channel
///
/// # Errors
/// The whole dataset is validated before the first update: empty or
/// mismatched sets, wrongly sized examples and a zero batch size are rejected
/// without touching the network.
pub fn train_loop(
    network: &mut Network,
    inputs: &[Vec<f64>],
    outputs: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<TrainReport> {
    network.check_dataset(inputs, outputs)?;
    let n = inputs.len();
    let batch_size = config.batch_size.unwrap_or(n);
    if batch_size == 0 {
        return Err(NetError::InvalidBatchSize);
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..n).collect();
    let track_accuracy = config.track_accuracy || network.loss() == LossType::CrossEntropy;

    let mut report = TrainReport {
        losses: Vec::new(),
        stats: Vec::new(),
        best_loss: f64::INFINITY,
        stopped_early: false,
    };
    let mut stale_epochs = 0usize;
    let mut warned_non_finite = false;

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        if config.shuffle {
            order.shuffle(&mut rng);
        }

        // ── One full pass over the training data ───────────────────────────
        let loss = run_one_epoch(network, inputs, outputs, &order, batch_size)?;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        if !loss.is_finite() && !warned_non_finite {
            warn!("epoch {epoch}: loss is {loss}; non-finite values are propagating");
            warned_non_finite = true;
        }

        let accuracy = if track_accuracy {
            Some(network.accuracy(inputs, outputs)?)
        } else {
            None
        };

        debug!("epoch {epoch}/{}: loss = {loss:.6}", config.epochs);
        if config.log_every > 0 && epoch % config.log_every == 0 {
            info!("epoch {epoch}: loss = {loss:.6}");
        }

        // ── Emit progress ─────────────────────────────────────────────────
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            loss,
            accuracy,
            elapsed_ms,
        };
        if let Some(ref tx) = config.progress_tx {
            // no cancellation: a dropped receiver just stops receiving
            let _ = tx.send(stats.clone());
        }
        report.losses.push(loss);
        report.stats.push(stats);

        // ── Early stopping ────────────────────────────────────────────────
        let improvement = report.best_loss - loss;
        if loss < report.best_loss {
            report.best_loss = loss;
        }
        if let Some(es) = config.early_stopping {
            if improvement > es.min_delta {
                stale_epochs = 0;
            } else {
                stale_epochs += 1;
                if stale_epochs >= es.patience {
                    info!(
                        "early stop after epoch {epoch}: no improvement above {} for {} epochs (best {:.6})",
                        es.min_delta, es.patience, report.best_loss
                    );
                    report.stopped_early = true;
                    break;
                }
            }
        }
    }

    Ok(report)
}

/// Trains and returns only the per-epoch losses.
pub fn train_epochs(
    network: &mut Network,
    inputs: &[Vec<f64>],
    outputs: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<Vec<f64>> {
    train_loop(network, inputs, outputs, config).map(|report| report.losses)
}

impl Network {
    /// See [`train_epochs`].
    pub fn train_epochs(
        &mut self,
        inputs: &[Vec<f64>],
        outputs: &[Vec<f64>],
        config: &TrainConfig,
    ) -> Result<Vec<f64>> {
        train_epochs(self, inputs, outputs, config)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one epoch in `order`, batch by batch. Returns the batch-length-weighted
/// mean loss.
fn run_one_epoch(
    network: &mut Network,
    inputs: &[Vec<f64>],
    outputs: &[Vec<f64>],
    order: &[usize],
    batch_size: usize,
) -> Result<f64> {
    let mut weighted = 0.0;
    for batch in order.chunks(batch_size) {
        let pairs = batch
            .iter()
            .map(|&i| (inputs[i].as_slice(), outputs[i].as_slice()));
        let batch_loss = network.train_batch_unchecked(pairs)?;
        weighted += batch_loss * batch.len() as f64;
    }
    Ok(weighted / order.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::network::config::NetworkConfig;

    fn xor() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        (
            vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
            vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
        )
    }

    fn frozen() -> Network {
        // learning rate 0 and no momentum: the loss never changes
        let config = NetworkConfig::default()
            .with_learning_rate(0.0)
            .with_momentum(0.0)
            .with_seed(5);
        Network::new(&[2, 3, 1], config).unwrap()
    }

    #[test]
    fn plateau_stops_after_patience() {
        let (x, y) = xor();
        let mut net = frozen();
        let config = TrainConfig::new(100).with_early_stopping(3, 1e-9);
        let report = train_loop(&mut net, &x, &y, &config).unwrap();
        // epoch 1 improves on +inf, then three stale epochs
        assert_eq!(report.losses.len(), 4);
        assert!(report.stopped_early);
        assert_eq!(report.best_loss, report.losses[0]);
    }

    #[test]
    fn unbounded_epoch_cap_relies_on_early_stopping() {
        let (x, y) = xor();
        let mut net = frozen();
        let config = TrainConfig::new(usize::MAX).with_early_stopping(2, 1e-6);
        let report = train_loop(&mut net, &x, &y, &config).unwrap();
        assert_eq!(report.losses.len(), 3);
        assert_eq!(report.stats[2].total_epochs, usize::MAX);
    }

    #[test]
    fn no_early_stopping_runs_every_epoch() {
        let (x, y) = xor();
        let mut net = frozen();
        let losses = net.train_epochs(&x, &y, &TrainConfig::new(7)).unwrap();
        assert_eq!(losses.len(), 7);
    }

    #[test]
    fn epoch_loss_is_length_weighted() {
        let (x, y) = xor();
        let mut net = frozen();
        let expected = net.evaluate(&x, &y).unwrap();
        // batches of 3 and 1 must still average over all four examples
        let losses = train_epochs(&mut net, &x, &y, &TrainConfig::new(1).with_batch_size(3)).unwrap();
        assert!((losses[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn progress_channel_gets_every_epoch() {
        let (x, y) = xor();
        let mut net = frozen();
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(5).with_accuracy().with_progress(tx);
        train_loop(&mut net, &x, &y, &config).unwrap();
        drop(config);
        let stats: Vec<EpochStats> = rx.iter().collect();
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[4].epoch, 5);
        assert!(stats.iter().all(|s| s.accuracy.is_some() && s.total_epochs == 5));
    }

    #[test]
    fn dropped_receiver_does_not_cancel() {
        let (x, y) = xor();
        let mut net = frozen();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let losses = train_epochs(&mut net, &x, &y, &TrainConfig::new(3).with_progress(tx)).unwrap();
        assert_eq!(losses.len(), 3);
    }

    #[test]
    fn same_seed_same_losses() {
        let (x, y) = xor();
        let run = |seed: u64| {
            let mut net = Network::new(&[2, 3, 1], NetworkConfig::default().with_seed(9)).unwrap();
            let config = TrainConfig::new(20).with_batch_size(2).with_shuffle(Some(seed));
            train_epochs(&mut net, &x, &y, &config).unwrap()
        };
        assert_eq!(run(1), run(1));
        assert_ne!(run(1), run(2));
    }

    #[test]
    fn rejects_bad_runs_up_front() {
        let (x, y) = xor();
        let mut net = frozen();
        let zero = TrainConfig::new(1).with_batch_size(0);
        assert!(matches!(train_loop(&mut net, &x, &y, &zero), Err(NetError::InvalidBatchSize)));
        assert!(matches!(
            train_epochs(&mut net, &x, &y[..3], &TrainConfig::new(1)),
            Err(NetError::DatasetMismatch { inputs: 4, outputs: 3 })
        ));
        assert!(matches!(
            train_epochs(&mut net, &[], &[], &TrainConfig::new(1)),
            Err(NetError::EmptyDataset)
        ));
    }
}
