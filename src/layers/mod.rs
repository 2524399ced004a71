pub mod batch_norm;
pub mod dense;
pub mod nonlinearity;

use crate::error::Result;
use crate::math::matrix::Matrix;

pub use batch_norm::BatchNorm1d;
pub use dense::Dense;
pub use nonlinearity::Nonlinearity;

/// Whether layers use batch statistics and cache activations for backprop
/// (`Train`) or behave as a pure function of their parameters (`Eval`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Eval,
}

/// A trainable tensor and its accumulated gradient (same shape).
#[derive(Debug, Clone)]
pub struct Param {
    pub value: Matrix,
    pub grad: Matrix,
}

impl Param {
    pub fn new(value: Matrix) -> Param {
        let grad = Matrix::zeros(value.rows, value.cols);
        Param { value, grad }
    }

    pub fn zero_grad(&mut self) {
        self.grad.data.iter_mut().for_each(|g| *g = 0.0);
    }

    pub fn len(&self) -> usize {
        self.value.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.data.is_empty()
    }
}

/// One stage of the feed-forward stack.
#[derive(Debug)]
pub enum Layer {
    Dense(Dense),
    BatchNorm(BatchNorm1d),
    Nonlinearity(Nonlinearity),
}

impl Layer {
    pub fn forward(&mut self, input: &Matrix, mode: Mode) -> Result<Matrix> {
        match self {
            Layer::Dense(l) => Ok(l.forward(input, mode)),
            Layer::BatchNorm(l) => l.forward(input, mode),
            Layer::Nonlinearity(l) => Ok(l.forward(input, mode)),
        }
    }

    /// Accumulates parameter gradients and returns ∂L/∂input.
    pub fn backward(&mut self, grad_output: &Matrix) -> Matrix {
        match self {
            Layer::Dense(l) => l.backward(grad_output),
            Layer::BatchNorm(l) => l.backward(grad_output),
            Layer::Nonlinearity(l) => l.backward(grad_output),
        }
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        match self {
            Layer::Dense(l) => vec![&mut l.weights, &mut l.biases],
            Layer::BatchNorm(l) => vec![&mut l.gamma, &mut l.beta],
            Layer::Nonlinearity(_) => vec![],
        }
    }

    pub fn params(&self) -> Vec<&Param> {
        match self {
            Layer::Dense(l) => vec![&l.weights, &l.biases],
            Layer::BatchNorm(l) => vec![&l.gamma, &l.beta],
            Layer::Nonlinearity(_) => vec![],
        }
    }
}
