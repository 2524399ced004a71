use serde::{Serialize, Deserialize};

use crate::dataset::split::Split;

/// Result of one periodic evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalStats {
    /// Optimizer steps completed when the evaluation ran.
    pub steps: usize,
    /// Mean loss over the evaluation batches drawn from the train split.
    pub train_loss: f64,
    /// Mean loss over the evaluation batches drawn from the validation split.
    pub val_loss: f64,
    /// Mean per-batch validation accuracy, in percent.
    pub val_accuracy: f64,
}

/// Accumulated outcome of the final pass over the test split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub correct: usize,
    pub tested: usize,
    /// log10 of each batch loss, in order.
    pub losses_log10: Vec<f64>,
}

impl TestReport {
    /// Accuracy in percent; 0 when nothing was tested.
    pub fn accuracy(&self) -> f64 {
        if self.tested == 0 {
            0.0
        } else {
            self.correct as f64 / self.tested as f64 * 100.0
        }
    }
}

/// Everything a full run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// log10 of every training-step loss.
    pub train_losses_log10: Vec<f64>,
    pub evaluations: Vec<EvalStats>,
    /// One eval-mode batch loss per split after training.
    pub final_losses: Vec<(Split, f64)>,
    /// Mean of `val_accuracy` over all periodic evaluations.
    pub average_val_accuracy: Option<f64>,
    pub test: TestReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_is_a_percentage() {
        let report = TestReport { correct: 45, tested: 50, losses_log10: vec![] };
        assert!((report.accuracy() - 90.0).abs() < 1e-12);
        assert_eq!(TestReport::default().accuracy(), 0.0);
    }
}
