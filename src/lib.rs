pub mod error;
pub mod math;
pub mod activation;
pub mod init;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NetError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::{Activation, CustomActivation};
pub use init::initializer::WeightInit;
pub use layers::dense::Layer;
pub use network::{ActivationSelection, Network, NetworkConfig, NetworkSnapshot, OutputCoupling};
pub use loss::loss_type::LossType;
pub use optim::{Optimizer, UpdateRule};
pub use train::{train_epochs, train_loop, EarlyStopping, EpochStats, TrainConfig, TrainReport};
