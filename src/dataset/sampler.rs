use rand::Rng;
use tracing::trace;

use crate::dataset::config::DatasetConfig;
use crate::dataset::indexer::ImageIndexer;
use crate::dataset::split::{Split, SplitRanges};
use crate::dataset::variety::resolve_varieties;
use crate::error::{Result, RiceError};
use crate::math::matrix::Matrix;

/// One sampled image: 0-based variety label and 1-based image index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRecord {
    pub variety: usize,
    pub index: usize,
}

/// A freshly sampled batch.
///
/// `pixels` is (batch, width·height·3), `labels` is (batch, n_varieties) with
/// one-hot rows.
#[derive(Debug, Clone)]
pub struct Batch {
    pub pixels: Matrix,
    pub labels: Matrix,
    pub records: Vec<ImageRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Draws random batches from a split. Holds only immutable layout data; all
/// randomness comes from the caller's RNG.
#[derive(Debug, Clone)]
pub struct BatchSampler {
    indexer: ImageIndexer,
    varieties: Vec<String>,
    ranges: SplitRanges,
}

impl BatchSampler {
    pub fn new(indexer: ImageIndexer, varieties: Vec<String>, ranges: SplitRanges) -> Result<BatchSampler> {
        if varieties.is_empty() {
            return Err(RiceError::Config("at least one variety is required".into()));
        }
        Ok(BatchSampler { indexer, varieties, ranges })
    }

    /// Resolves varieties and split ranges from `config`.
    pub fn from_config(config: &DatasetConfig) -> Result<BatchSampler> {
        config.validate()?;
        let varieties = resolve_varieties(&config.root, config.varieties.as_deref())?;
        let ranges = SplitRanges::compute(
            config.images_per_variety,
            config.test_fraction,
            config.val_fraction,
        )?;
        let indexer = ImageIndexer::new(&config.root, config.image_width, config.image_height);
        BatchSampler::new(indexer, varieties, ranges)
    }

    pub fn varieties(&self) -> &[String] {
        &self.varieties
    }

    pub fn n_classes(&self) -> usize {
        self.varieties.len()
    }

    pub fn ranges(&self) -> &SplitRanges {
        &self.ranges
    }

    pub fn indexer(&self) -> &ImageIndexer {
        &self.indexer
    }

    /// Draws `batch_size` records uniformly with replacement: variety over
    /// all classes, then image index over the split's range.
    pub fn sample_records<R: Rng + ?Sized>(&self, split: Split, batch_size: usize, rng: &mut R) -> Vec<ImageRecord> {
        let range = self.ranges.range(split).clone();
        let varieties: Vec<usize> = (0..batch_size)
            .map(|_| rng.gen_range(0..self.varieties.len()))
            .collect();
        varieties.into_iter()
            .map(|variety| ImageRecord { variety, index: rng.gen_range(range.clone()) })
            .collect()
    }

    /// Samples records and decodes them into a batch.
    ///
    /// Any missing or unreadable image aborts the whole batch.
    pub fn sample<R: Rng + ?Sized>(&self, split: Split, batch_size: usize, rng: &mut R) -> Result<Batch> {
        if batch_size == 0 {
            return Err(RiceError::InvalidInput("batch size must be at least 1".into()));
        }
        let records = self.sample_records(split, batch_size, rng);
        self.assemble(records)
    }

    /// Decodes `records` into pixel and one-hot label matrices.
    pub fn assemble(&self, records: Vec<ImageRecord>) -> Result<Batch> {
        let n_classes = self.n_classes();
        let mut pixels = Matrix::zeros(records.len(), self.indexer.sample_len());
        let mut labels = Matrix::zeros(records.len(), n_classes);

        for (row, record) in records.iter().enumerate() {
            let name = self.varieties.get(record.variety).ok_or_else(|| {
                RiceError::InvalidInput(format!(
                    "variety {} out of range for {} classes",
                    record.variety, n_classes
                ))
            })?;
            trace!(variety = %name, index = record.index, "loading image");
            self.indexer.load_into(name, record.index, pixels.row_mut(row))?;
            labels.set(row, record.variety, 1.0);
        }

        Ok(Batch { pixels, labels, records })
    }
}
