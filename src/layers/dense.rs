use rand::Rng;

use crate::layers::{Mode, Param};
use crate::math::matrix::Matrix;

/// Fully-connected layer: `y = xW + b`.
#[derive(Debug)]
pub struct Dense {
    pub weights: Param,  // (input_size, size)
    pub biases: Param,   // (1, size)
    input: Option<Matrix>,  // cached in training mode for the weight gradient
}

impl Dense {
    /// He-initialised weights (fan-in = `input_size`) and zero biases.
    pub fn new<R: Rng + ?Sized>(input_size: usize, size: usize, rng: &mut R) -> Dense {
        Dense {
            weights: Param::new(Matrix::he(input_size, size, input_size, rng)),
            biases: Param::new(Matrix::zeros(1, size)),
            input: None,
        }
    }

    pub fn from_parts(weights: Matrix, biases: Matrix) -> Dense {
        assert_eq!(biases.rows, 1, "Dense biases must be a single row");
        assert_eq!(weights.cols, biases.cols, "Dense weights/biases width mismatch");
        Dense { weights: Param::new(weights), biases: Param::new(biases), input: None }
    }

    pub fn input_size(&self) -> usize {
        self.weights.value.rows
    }

    pub fn size(&self) -> usize {
        self.weights.value.cols
    }

    pub fn forward(&mut self, input: &Matrix, mode: Mode) -> Matrix {
        let z = input.matmul(&self.weights.value).add_row(&self.biases.value);
        self.input = match mode {
            Mode::Train => Some(input.clone()),
            Mode::Eval => None,
        };
        z
    }

    pub fn backward(&mut self, grad_output: &Matrix) -> Matrix {
        let input = match self.input.as_ref() {
            Some(x) => x,
            None => panic!("Dense::backward called without a training-mode forward pass"),
        };

        self.weights.grad.add_matmul_transpose_a(input, grad_output);
        self.biases.grad += &grad_output.sum_rows();

        grad_output.matmul_transpose_b(&self.weights.value)
    }
}
