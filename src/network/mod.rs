pub mod config;
pub mod network;
pub mod snapshot;

pub use config::{ActivationSelection, NetworkConfig, OutputCoupling};
pub use network::Network;
pub use snapshot::NetworkSnapshot;
