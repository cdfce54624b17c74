use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Maximum epochs requested for this run.
    pub total_epochs: usize,
    /// Batch-length-weighted mean training loss of this epoch.
    pub loss: f64,
    /// Accuracy as a fraction in [0, 1], measured after the epoch.
    pub accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome of a full `train_loop` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Loss of every completed epoch, in order.
    pub losses: Vec<f64>,
    pub stats: Vec<EpochStats>,
    /// Best epoch loss seen.
    pub best_loss: f64,
    /// True when early stopping ended the run before `epochs`.
    pub stopped_early: bool,
}
