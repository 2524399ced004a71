use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::layers::{BatchNorm1d, Dense, Layer, Mode, Nonlinearity, Param};
use crate::math::matrix::Matrix;

/// A feed-forward stack of layers mapping flattened images to class logits.
#[derive(Debug)]
pub struct Network {
    pub layers: Vec<Layer>,
    mode: Mode,
}

impl Network {
    pub fn from_layers(layers: Vec<Layer>) -> Network {
        Network { layers, mode: Mode::Train }
    }

    /// Builds `input -> [Dense -> BatchNorm1d -> ReLU] per hidden size -> Dense(n_classes)`.
    ///
    /// Dense weights use He initialisation; the network starts in training mode.
    pub fn mlp<R: Rng + ?Sized>(
        input_size: usize,
        hidden_sizes: &[usize],
        n_classes: usize,
        rng: &mut R,
    ) -> Network {
        let mut layers = Vec::with_capacity(hidden_sizes.len() * 3 + 1);
        let mut fan_in = input_size;
        for &size in hidden_sizes {
            layers.push(Layer::Dense(Dense::new(fan_in, size, rng)));
            layers.push(Layer::BatchNorm(BatchNorm1d::new(size)));
            layers.push(Layer::Nonlinearity(Nonlinearity::new(ActivationFunction::ReLU)));
            fan_in = size;
        }
        layers.push(Layer::Dense(Dense::new(fan_in, n_classes, rng)));
        Network::from_layers(layers)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Forward pass; returns logits of shape (batch, n_classes).
    /// In training mode each layer caches what its backward pass needs.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let mode = self.mode;
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current, mode)?;
        }
        Ok(current)
    }

    /// Backpropagates ∂L/∂logits through every layer, accumulating gradients.
    pub fn backward(&mut self, grad_logits: &Matrix) {
        let mut delta = grad_logits.clone();
        for layer in self.layers.iter_mut().rev() {
            delta = layer.backward(&delta);
        }
    }

    pub fn zero_grad(&mut self) {
        for param in self.params_mut() {
            param.zero_grad();
        }
    }

    /// Trainable parameters in a stable order (layer order, then weight/bias).
    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        self.layers.iter_mut().flat_map(|l| l.params_mut()).collect()
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter().flat_map(|l| l.params()).map(|p| p.len()).sum()
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.iter().find_map(|l| match l {
            Layer::Dense(d) => Some(d.input_size()),
            _ => None,
        })
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|l| match l {
            Layer::Dense(d) => Some(d.size()),
            _ => None,
        })
    }
}
