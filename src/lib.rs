pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod dataset;
pub mod train;
pub mod report;
pub mod config;
pub mod error;
pub mod logging;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{Layer, Mode};
pub use network::{Network, ModelSpec};
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::adamw::AdamW;
pub use dataset::{Batch, BatchSampler, DatasetConfig, ImageIndexer, Split, SplitRanges};
pub use train::{Trainer, TrainConfig, TrainingReport, count_correct_preds};
pub use config::RunConfig;
pub use error::{Result, RiceError};
