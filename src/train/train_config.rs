use serde::{Serialize, Deserialize};

use crate::error::{Result, RiceError};

/// Hyperparameters for a training run.
///
/// # Fields
/// - `iterations`        — optimizer steps, each on a fresh random train batch
/// - `batch_size`        — samples per training and evaluation batch
/// - `learning_rate`     — AdamW step size
/// - `weight_decay`      — AdamW decoupled weight decay
/// - `eval_interval`     — evaluate every this many iterations (iteration 0 included)
/// - `eval_batches`      — batches per split in each periodic evaluation
/// - `test_steps`        — batches in the final held-out test pass
/// - `test_batch_size`   — samples per test-pass batch
/// - `test_report_every` — log running test accuracy every this many test steps
/// - `smoothing_window`  — chunk size used to smooth the loss curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub iterations: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub eval_interval: usize,
    pub eval_batches: usize,
    pub test_steps: usize,
    pub test_batch_size: usize,
    pub test_report_every: usize,
    pub smoothing_window: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            iterations: 20_000,
            batch_size: 50,
            learning_rate: 1e-3,
            weight_decay: 0.01,
            eval_interval: 50,
            eval_batches: 20,
            test_steps: 300,
            test_batch_size: 50,
            test_report_every: 50,
            smoothing_window: 100,
        }
    }
}

impl TrainConfig {
    /// Rejects values the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        // Batch normalisation needs two rows to estimate a variance.
        if self.batch_size < 2 {
            return Err(RiceError::Config(format!(
                "batch_size must be at least 2, got {}",
                self.batch_size
            )));
        }
        let positive = [
            ("eval_interval", self.eval_interval),
            ("eval_batches", self.eval_batches),
            ("test_batch_size", self.test_batch_size),
            ("test_report_every", self.test_report_every),
            ("smoothing_window", self.smoothing_window),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(RiceError::Config(format!("{} must be at least 1", name)));
            }
        }
        if !(self.learning_rate > 0.0) || !(self.weight_decay >= 0.0) {
            return Err(RiceError::Config(format!(
                "learning_rate must be positive and weight_decay non-negative (got {} and {})",
                self.learning_rate, self.weight_decay
            )));
        }
        Ok(())
    }
}
