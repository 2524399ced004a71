use crate::error::{Result, RiceError};
use crate::layers::{Mode, Param};
use crate::math::matrix::Matrix;

pub const DEFAULT_MOMENTUM: f64 = 0.1;
pub const DEFAULT_EPS: f64 = 1e-5;

/// Per-feature batch normalisation over the rows of a (batch, features)
/// matrix.
///
/// In training mode the layer normalises with the statistics of the current
/// batch and folds them into `running_mean` / `running_var`. In evaluation
/// mode it normalises with the running statistics and mutates nothing.
#[derive(Debug)]
pub struct BatchNorm1d {
    pub gamma: Param,
    pub beta: Param,
    pub running_mean: Vec<f64>,
    pub running_var: Vec<f64>,
    pub momentum: f64,
    pub eps: f64,
    cache: Option<Cache>,
}

#[derive(Debug)]
struct Cache {
    x_hat: Matrix,
    inv_std: Vec<f64>,
}

impl BatchNorm1d {
    pub fn new(num_features: usize) -> BatchNorm1d {
        BatchNorm1d {
            gamma: Param::new(Matrix::filled(1, num_features, 1.0)),
            beta: Param::new(Matrix::zeros(1, num_features)),
            running_mean: vec![0.0; num_features],
            running_var: vec![1.0; num_features],
            momentum: DEFAULT_MOMENTUM,
            eps: DEFAULT_EPS,
            cache: None,
        }
    }

    pub fn num_features(&self) -> usize {
        self.gamma.value.cols
    }

    pub fn forward(&mut self, input: &Matrix, mode: Mode) -> Result<Matrix> {
        assert_eq!(
            input.cols,
            self.num_features(),
            "BatchNorm1d expects {} features, got {}",
            self.num_features(),
            input.cols
        );

        match mode {
            Mode::Eval => {
                self.cache = None;
                let inv_std: Vec<f64> = self.running_var.iter()
                    .map(|v| 1.0 / (v + self.eps).sqrt())
                    .collect();
                let x_hat = self.normalise(input, &self.running_mean, &inv_std);
                Ok(self.scale_shift(&x_hat))
            }
            Mode::Train => {
                let n = input.rows;
                if n < 2 {
                    return Err(RiceError::InvalidInput(format!(
                        "batch normalisation in training mode needs at least 2 rows, got {}",
                        n
                    )));
                }

                let mean = input.sum_rows().scale(1.0 / n as f64).data;
                let mut var = vec![0.0; input.cols];
                for i in 0..n {
                    for (j, &x) in input.row(i).iter().enumerate() {
                        var[j] += (x - mean[j]).powi(2);
                    }
                }
                var.iter_mut().for_each(|v| *v /= n as f64);

                let inv_std: Vec<f64> = var.iter().map(|v| 1.0 / (v + self.eps).sqrt()).collect();
                let x_hat = self.normalise(input, &mean, &inv_std);
                let out = self.scale_shift(&x_hat);

                // Running variance tracks the unbiased estimate.
                let unbias = n as f64 / (n as f64 - 1.0);
                let m = self.momentum;
                for j in 0..input.cols {
                    self.running_mean[j] = (1.0 - m) * self.running_mean[j] + m * mean[j];
                    self.running_var[j] = (1.0 - m) * self.running_var[j] + m * var[j] * unbias;
                }

                self.cache = Some(Cache { x_hat, inv_std });
                Ok(out)
            }
        }
    }

    pub fn backward(&mut self, grad_output: &Matrix) -> Matrix {
        let cache = match self.cache.as_ref() {
            Some(c) => c,
            None => panic!("BatchNorm1d::backward called without a training-mode forward pass"),
        };
        let n = grad_output.rows as f64;
        let cols = grad_output.cols;

        // dx = inv_std / n · (n·dx̂ − Σdx̂ − x̂·Σ(dx̂·x̂)), with dx̂ = g·γ
        let mut dx_hat = grad_output.clone();
        for i in 0..dx_hat.rows {
            for (g, &gamma) in dx_hat.row_mut(i).iter_mut().zip(&self.gamma.value.data) {
                *g *= gamma;
            }
        }
        let sum_dx_hat = dx_hat.sum_rows();
        let sum_dx_hat_x_hat = dx_hat.hadamard(&cache.x_hat).sum_rows();

        let mut grad_input = Matrix::zeros(grad_output.rows, cols);
        for i in 0..grad_output.rows {
            for j in 0..cols {
                let value = cache.inv_std[j] / n
                    * (n * dx_hat.get(i, j)
                        - sum_dx_hat.data[j]
                        - cache.x_hat.get(i, j) * sum_dx_hat_x_hat.data[j]);
                grad_input.set(i, j, value);
            }
        }

        self.gamma.grad += &grad_output.hadamard(&cache.x_hat).sum_rows();
        self.beta.grad += &grad_output.sum_rows();

        grad_input
    }

    fn normalise(&self, input: &Matrix, mean: &[f64], inv_std: &[f64]) -> Matrix {
        let mut x_hat = input.clone();
        for i in 0..x_hat.rows {
            for (j, x) in x_hat.row_mut(i).iter_mut().enumerate() {
                *x = (*x - mean[j]) * inv_std[j];
            }
        }
        x_hat
    }

    fn scale_shift(&self, x_hat: &Matrix) -> Matrix {
        let mut out = x_hat.clone();
        for i in 0..out.rows {
            for (j, x) in out.row_mut(i).iter_mut().enumerate() {
                *x = *x * self.gamma.value.data[j] + self.beta.value.data[j];
            }
        }
        out
    }
}
