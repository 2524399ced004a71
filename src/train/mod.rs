pub mod eval_stats;
pub mod metrics;
pub mod train_config;
pub mod trainer;

pub use eval_stats::{EvalStats, TestReport, TrainingReport};
pub use metrics::{count_correct_preds, smooth};
pub use train_config::TrainConfig;
pub use trainer::Trainer;
