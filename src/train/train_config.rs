use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// Stop once the epoch loss has failed to beat the best loss so far by more
/// than `min_delta` for `patience` consecutive epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyStopping {
    pub patience: usize,
    pub min_delta: f64,
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`         — maximum number of full passes over the data
/// - `batch_size`     — examples per batch; `None` trains the whole set as one
///                      batch. Batches only group the loss bookkeeping: every
///                      example still updates the weights immediately.
/// - `shuffle`        — reorder the examples before every epoch
/// - `seed`           — seed for the shuffling order; the same seed replays the
///                      same orders. `None` draws one from the OS.
/// - `early_stopping` — optional plateau detection
/// - `track_accuracy` — also measure accuracy after each epoch (always on for
///                      cross-entropy)
/// - `log_every`      — log the epoch loss at `info` every N epochs (0: never)
/// - `progress_tx`    — optional channel sender; one `EpochStats` is sent per
///                      completed epoch. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: Option<usize>,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub early_stopping: Option<EarlyStopping>,
    pub track_accuracy: bool,
    pub log_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig`: full-set batches, no shuffling, no
    /// early stopping, no progress channel.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size: None,
            shuffle: false,
            seed: None,
            early_stopping: None,
            track_accuracy: false,
            log_every: 0,
            progress_tx: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Enables shuffling with a fixed seed.
    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn with_early_stopping(mut self, patience: usize, min_delta: f64) -> Self {
        self.early_stopping = Some(EarlyStopping { patience, min_delta });
        self
    }

    pub fn with_accuracy(mut self) -> Self {
        self.track_accuracy = true;
        self
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    pub fn with_progress(mut self, progress_tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }
}
