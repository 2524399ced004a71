pub mod chart;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::train::eval_stats::TrainingReport;
use crate::train::metrics::smooth;

pub use chart::{render_line_chart, write_line_chart};

/// Writes `training_loss.svg` and `test_loss.svg` into `dir`, each showing
/// the log10 losses averaged over chunks of `window` steps.
pub fn write_loss_curves(report: &TrainingReport, dir: &Path, window: usize) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;

    let train_path = dir.join("training_loss.svg");
    write_line_chart(
        "Training loss",
        &format!("chunk of {} steps", window),
        "log10 loss",
        &smooth(&report.train_losses_log10, window),
        &train_path,
    )?;

    let test_path = dir.join("test_loss.svg");
    write_line_chart(
        "Test loss",
        &format!("chunk of {} batches", window),
        "log10 loss",
        &smooth(&report.test.losses_log10, window),
        &test_path,
    )?;

    Ok((train_path, test_path))
}
