use crate::activation::activation::ActivationFunction;
use crate::layers::Mode;
use crate::math::matrix::Matrix;

/// Applies an `ActivationFunction` element-wise.
#[derive(Debug)]
pub struct Nonlinearity {
    pub function: ActivationFunction,
    pre_activation: Option<Matrix>,
}

impl Nonlinearity {
    pub fn new(function: ActivationFunction) -> Nonlinearity {
        Nonlinearity { function, pre_activation: None }
    }

    pub fn forward(&mut self, input: &Matrix, mode: Mode) -> Matrix {
        let out = input.map(|x| self.function.function(x));
        self.pre_activation = match mode {
            Mode::Train => Some(input.clone()),
            Mode::Eval => None,
        };
        out
    }

    pub fn backward(&mut self, grad_output: &Matrix) -> Matrix {
        let z = match self.pre_activation.as_ref() {
            Some(z) => z,
            None => panic!("Nonlinearity::backward called without a training-mode forward pass"),
        };
        // δ = grad ⊙ σ'(z)
        grad_output.hadamard(&z.map(|x| self.function.derivative(x)))
    }
}
