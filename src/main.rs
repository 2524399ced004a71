//! Trains the rice variety classifier.
//!
//! Usage: `rice-mlp [CONFIG.json]`. Without a config file the built-in
//! defaults are used (images under `Dataset/Images`, 20,000 AdamW steps).

use std::process::ExitCode;

use tracing::{error, info, warn};

use rice_mlp::dataset::RICE_VARIETIES;
use rice_mlp::logging::{init_logging, LogConfig};
use rice_mlp::report::write_loss_curves;
use rice_mlp::{Result, RunConfig, Split, Trainer};

fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(path) => match RunConfig::load_json(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("cannot load config '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => RunConfig::default(),
    };

    if let Err(e) = init_logging(&LogConfig::with_level_name(&config.log_level)) {
        eprintln!("{}", e);
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RunConfig) -> Result<()> {
    let mut trainer = Trainer::from_config(config)?;

    let varieties = trainer.sampler().varieties();
    if varieties.len() != RICE_VARIETIES.len() {
        warn!(found = varieties.len(), "expected {} rice varieties", RICE_VARIETIES.len());
    }
    let ranges = trainer.sampler().ranges();
    info!(
        varieties = ?varieties,
        train = ?ranges.train,
        validation = ?ranges.validation,
        test = ?ranges.test,
        "dataset layout"
    );
    for split in Split::ALL {
        info!("{} images per variety: {}", split, ranges.len(split));
    }
    info!(
        layers = %config.model.describe(config.dataset.input_size(), varieties.len()),
        "model"
    );

    let report = trainer.run()?;

    info!(
        "Correct predictions: {} / {} | Accuracy(%): {:.2}",
        report.test.correct,
        report.test.tested,
        report.test.accuracy()
    );

    let (train_chart, test_chart) =
        write_loss_curves(&report, &config.plot_dir, config.train.smoothing_window)?;
    info!(
        training = %train_chart.display(),
        test = %test_chart.display(),
        "loss curves written"
    );
    Ok(())
}
