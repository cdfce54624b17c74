use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Every failure the engine can report.
///
/// Configuration variants are raised while building or reconfiguring a
/// network. Dimension variants are raised per call, before any weight or
/// buffer is touched.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("invalid architecture {layers:?}: {reason}")]
    InvalidArchitecture { layers: Vec<usize>, reason: &'static str },

    #[error("unknown activation `{0}`")]
    UnknownActivation(String),

    #[error("unknown loss `{0}`")]
    UnknownLoss(String),

    #[error("unknown weight initializer `{0}`")]
    UnknownInitializer(String),

    #[error("unknown optimizer `{0}`")]
    UnknownOptimizer(String),

    #[error("expected {expected} activations (one per non-input layer), got {got}")]
    ActivationCountMismatch { expected: usize, got: usize },

    #[error("invalid hyperparameter `{name}`: {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    #[error("input has {got} values but the input layer has {expected} neurons")]
    InputSize { expected: usize, got: usize },

    #[error("expected output has {got} values but the output layer has {expected} neurons")]
    OutputSize { expected: usize, got: usize },

    #[error("{inputs} inputs were given with {outputs} expected outputs")]
    DatasetMismatch { inputs: usize, outputs: usize },

    #[error("parameter shape mismatch for {what}: expected {expected}, got {got}")]
    ParameterShape { what: &'static str, expected: String, got: String },

    #[error("training set is empty")]
    EmptyDataset,

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("cannot serialize {0}: custom functions are not persisted")]
    NotSerializable(&'static str),

    #[error("snapshot is inconsistent: {0}")]
    SnapshotMismatch(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetError {
    /// True for errors raised while configuring a network, as opposed to a
    /// single rejected call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NetError::InvalidArchitecture { .. }
                | NetError::UnknownActivation(_)
                | NetError::UnknownLoss(_)
                | NetError::UnknownInitializer(_)
                | NetError::UnknownOptimizer(_)
                | NetError::ActivationCountMismatch { .. }
                | NetError::InvalidHyperparameter { .. }
        )
    }

    /// True for input/expected-output length errors.
    pub fn is_dimension(&self) -> bool {
        matches!(
            self,
            NetError::InputSize { .. }
                | NetError::OutputSize { .. }
                | NetError::DatasetMismatch { .. }
                | NetError::ParameterShape { .. }
        )
    }
}
