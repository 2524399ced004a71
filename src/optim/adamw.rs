use crate::layers::Param;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Adam with decoupled weight decay.
///
/// Moment buffers are created on the first `step` and matched to parameters
/// by position, so the optimizer must always be stepped with the same network.
pub struct AdamW {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    pub weight_decay: f64,
    t: u64,
    moments: Vec<(Matrix, Matrix)>,
}

impl AdamW {
    pub fn new(learning_rate: f64, weight_decay: f64) -> AdamW {
        AdamW {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay,
            t: 0,
            moments: Vec::new(),
        }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.t
    }

    /// Applies one update to every parameter of `network` from its
    /// accumulated gradients.
    pub fn step(&mut self, network: &mut Network) {
        let mut params = network.params_mut();
        if self.moments.is_empty() {
            self.moments = params.iter()
                .map(|p| {
                    let (r, c) = p.value.shape();
                    (Matrix::zeros(r, c), Matrix::zeros(r, c))
                })
                .collect();
        }
        assert_eq!(
            self.moments.len(),
            params.len(),
            "AdamW stepped with a different network than it was initialised with"
        );

        self.t += 1;
        let (lr, beta1, beta2, eps) = (self.learning_rate, self.beta1, self.beta2, self.eps);
        let bias1 = 1.0 - beta1.powi(self.t as i32);
        let bias2 = 1.0 - beta2.powi(self.t as i32);
        let decay = 1.0 - lr * self.weight_decay;

        for (param, (m, v)) in params.iter_mut().zip(self.moments.iter_mut()) {
            let Param { value, grad } = &mut **param;
            for (((p, &g), m), v) in value.data.iter_mut()
                .zip(&grad.data)
                .zip(m.data.iter_mut())
                .zip(v.data.iter_mut())
            {
                *p *= decay;
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            }
        }
    }
}
