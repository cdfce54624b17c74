use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::debug;
use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::init::initializer::WeightInit;
use crate::math::matrix::Matrix;
use crate::network::config::NetworkConfig;
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;

/// Everything needed to rebuild a trained `Network`.
///
/// Functions are stored by symbol only. Custom activations cannot be stored
/// at all; a custom initializer is stored as `uniform` since the weights it
/// produced are saved anyway. Optimizer hyperparameters are kept, its running
/// state is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub architecture: Vec<usize>,
    pub config: NetworkConfig,
    /// Resolved activation per non-input layer, after any loss coupling.
    pub activations: Vec<Activation>,
    /// Empty when the network was never initialized.
    pub weights: Vec<Matrix>,
    pub last_changes: Vec<Matrix>,
    #[serde(default)]
    pub optimizer: Option<Optimizer>,
}

impl Network {
    pub fn to_snapshot(&self) -> Result<NetworkSnapshot> {
        if self.activations.iter().any(Activation::is_custom) {
            return Err(NetError::NotSerializable("custom activation"));
        }
        let mut config = self.config.clone();
        if config.weight_init.is_custom() {
            self.warn_custom_init();
            config.weight_init = WeightInit::Uniform;
        }
        Ok(NetworkSnapshot {
            architecture: self.architecture().to_vec(),
            config,
            activations: self.activations.clone(),
            weights: self.weights().into_iter().cloned().collect(),
            last_changes: self.last_changes().into_iter().cloned().collect(),
            optimizer: self.optimizer.clone(),
        })
    }

    /// Rebuilds a network, re-deriving every function from its stored symbol.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Network> {
        let NetworkSnapshot { architecture, config, activations, weights, last_changes, optimizer } =
            snapshot;
        let mut net = Network::new(&architecture, config)?;
        if net.activations != activations {
            return Err(NetError::SnapshotMismatch(format!(
                "stored activations {:?} do not match configuration {:?}",
                activations, net.activations
            )));
        }
        if !weights.is_empty() {
            if last_changes.len() != weights.len() {
                return Err(NetError::SnapshotMismatch(format!(
                    "{} weight matrices but {} last-change matrices",
                    weights.len(),
                    last_changes.len()
                )));
            }
            net.restore_layers(weights, last_changes)?;
        }
        net.optimizer = optimizer;
        debug!("restored network {:?}", net.architecture());
        Ok(net)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot()?)?)
    }

    pub fn from_json(json: &str) -> Result<Network> {
        Network::from_snapshot(serde_json::from_str(json)?)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = self.to_snapshot()?;
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let reader = BufReader::new(File::open(path)?);
        Network::from_snapshot(serde_json::from_reader(reader)?)
    }
}
