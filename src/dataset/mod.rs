pub mod config;
pub mod indexer;
pub mod sampler;
pub mod split;
pub mod variety;

pub use config::{DatasetConfig, RICE_VARIETIES};
pub use indexer::ImageIndexer;
pub use sampler::{Batch, BatchSampler, ImageRecord};
pub use split::{Split, SplitRanges};
