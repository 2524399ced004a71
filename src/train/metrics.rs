use crate::math::matrix::Matrix;

/// Number of rows whose arg-max logit hits a 1.0 in the target row. A target
/// row without a hot entry never counts as correct.
pub fn count_correct_preds(logits: &Matrix, targets: &Matrix) -> usize {
    assert_eq!(logits.shape(), targets.shape(), "count_correct_preds: shape mismatch");
    (0..logits.rows)
        .filter(|&i| targets.get(i, logits.argmax_row(i)) == 1.0)
        .count()
}

/// Means over consecutive chunks of `window` values. A trailing partial chunk
/// is averaged on its own.
pub fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window > 0, "smoothing window must be at least 1");
    values.chunks(window)
        .map(|chunk| chunk.iter().sum::<f64>() / chunk.len() as f64)
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logits() -> Matrix {
        Matrix::from_rows(vec![
            vec![5.0, 1.0, 1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 5.0],
        ])
    }

    #[test]
    fn all_predictions_correct() {
        let targets = Matrix::from_rows(vec![
            vec![1.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(count_correct_preds(&logits(), &targets), 2);
    }

    #[test]
    fn one_prediction_wrong() {
        let targets = Matrix::from_rows(vec![
            vec![0.0, 1.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(count_correct_preds(&logits(), &targets), 1);
    }

    #[test]
    fn all_zero_target_row_is_never_correct() {
        let targets = Matrix::from_rows(vec![
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(count_correct_preds(&logits(), &targets), 1);
    }

    #[test]
    fn smoothing_averages_chunks() {
        let values = [1.0, 3.0, 5.0, 7.0, 10.0];
        assert_eq!(smooth(&values, 2), vec![2.0, 6.0, 10.0]);
        assert_eq!(smooth(&values, 5), vec![5.2]);
        assert!(smooth(&[], 3).is_empty());
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
