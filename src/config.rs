use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::config::DatasetConfig;
use crate::error::Result;
use crate::network::spec::ModelSpec;
use crate::train::train_config::TrainConfig;

/// Complete configuration of a training run.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seeds weight initialisation and batch sampling.
    pub seed: u64,
    /// "trace", "debug", "info", "warn" or "error".
    pub log_level: String,
    /// Directory the loss-curve charts are written to.
    pub plot_dir: PathBuf,
    pub dataset: DatasetConfig,
    pub model: ModelSpec,
    pub train: TrainConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            seed: 2000,
            log_level: "info".to_string(),
            plot_dir: PathBuf::from("plots"),
            dataset: DatasetConfig::default(),
            model: ModelSpec::default(),
            train: TrainConfig::default(),
        }
    }
}

impl RunConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file; absent fields take defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<RunConfig> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
