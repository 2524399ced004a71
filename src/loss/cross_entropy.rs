use crate::math::matrix::Matrix;

/// Multi-class cross-entropy computed directly on logits (softmax is folded
/// into the loss).
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Mean over rows of `-Σ_k y_k · log_softmax(z)_k`.
    ///
    /// `logits`  — shape (batch, n_classes)
    /// `targets` — one-hot (or soft) distributions, same shape
    pub fn loss(logits: &Matrix, targets: &Matrix) -> f64 {
        assert_eq!(logits.shape(), targets.shape(), "cross-entropy: shape mismatch");
        if logits.rows == 0 {
            return 0.0;
        }
        let total: f64 = (0..logits.rows)
            .map(|i| {
                let log_probs = log_softmax(logits.row(i));
                log_probs.iter().zip(targets.row(i))
                    .map(|(lp, y)| -y * lp)
                    .sum::<f64>()
            })
            .sum();
        total / logits.rows as f64
    }

    /// Gradient of the mean loss w.r.t. the logits:
    ///   ∂L/∂z = (softmax(z) - y) / batch
    pub fn derivative(logits: &Matrix, targets: &Matrix) -> Matrix {
        assert_eq!(logits.shape(), targets.shape(), "cross-entropy: shape mismatch");
        let n = logits.rows as f64;
        let mut grad = Matrix::zeros(logits.rows, logits.cols);
        for i in 0..logits.rows {
            let probs = softmax(logits.row(i));
            for (j, (p, y)) in probs.iter().zip(targets.row(i)).enumerate() {
                grad.set(i, j, (p - y) / n);
            }
        }
        grad
    }
}

/// Numerically stable softmax of one row.
pub fn softmax(row: &[f64]) -> Vec<f64> {
    log_softmax(row).into_iter().map(f64::exp).collect()
}

fn log_softmax(row: &[f64]) -> Vec<f64> {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let log_sum = row.iter().map(|z| (z - max).exp()).sum::<f64>().ln() + max;
    row.iter().map(|z| z - log_sum).collect()
}
