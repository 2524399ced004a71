use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::network::network::Network;

/// Architecture of the classifier's hidden stack.
///
/// Each entry of `hidden_sizes` becomes `Dense -> BatchNorm1d -> ReLU`; a
/// final `Dense` maps to the class logits. Input size and class count come
/// from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub hidden_sizes: Vec<usize>,
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec { hidden_sizes: vec![7500, 5000, 2500, 1250, 625] }
    }
}

impl ModelSpec {
    pub fn build<R: Rng + ?Sized>(&self, input_size: usize, n_classes: usize, rng: &mut R) -> Network {
        Network::mlp(input_size, &self.hidden_sizes, n_classes, rng)
    }

    /// Layer widths from input to logits, e.g. `30000 -> 7500 -> ... -> 5`.
    pub fn describe(&self, input_size: usize, n_classes: usize) -> String {
        std::iter::once(input_size)
            .chain(self.hidden_sizes.iter().copied())
            .chain(std::iter::once(n_classes))
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
