//! Partitioning of each variety's 1-based image indices into train,
//! validation and test ranges.
//!
//! The ranges are contiguous and laid out in index order: train first, then
//! validation, then test at the top of the range. With 15,000 images and
//! 10% / 10% held out this gives train 1..=12000, validation 12001..=13500
//! and test 13501..=15000.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "Train"),
            Split::Validation => write!(f, "Val"),
            Split::Test => write!(f, "Test"),
        }
    }
}

impl FromStr for Split {
    type Err = RiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Train" | "train" => Ok(Split::Train),
            "Val" | "val" | "Validation" | "validation" => Ok(Split::Validation),
            "Test" | "test" => Ok(Split::Test),
            other => Err(RiceError::InvalidInput(format!("unknown split '{}'", other))),
        }
    }
}

/// The three index ranges for one variety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRanges {
    pub train: RangeInclusive<usize>,
    pub validation: RangeInclusive<usize>,
    pub test: RangeInclusive<usize>,
}

impl SplitRanges {
    /// Computes the ranges for `total_images` per variety.
    ///
    /// `floor(total · fraction)` images go to each held-out split; the rest
    /// is training data. Every range must end up non-empty.
    ///
    /// The product is nudged by `FRACTION_EPS` before flooring so that
    /// fractions like 0.29 of 100 give 29 rather than 28.
    pub fn compute(total_images: usize, test_fraction: f64, val_fraction: f64) -> Result<SplitRanges> {
        for (name, fraction) in [("test", test_fraction), ("validation", val_fraction)] {
            if !(0.0..1.0).contains(&fraction) {
                return Err(RiceError::Config(format!(
                    "{} fraction must be in [0, 1), got {}",
                    name, fraction
                )));
            }
        }

        let n_test = held_out_count(total_images, test_fraction);
        let n_val = held_out_count(total_images, val_fraction);
        if n_test == 0 || n_val == 0 || n_test + n_val >= total_images {
            return Err(RiceError::Config(format!(
                "{} images per variety with test fraction {} and validation fraction {} \
                 leaves an empty split (test {}, validation {})",
                total_images, test_fraction, val_fraction, n_test, n_val
            )));
        }

        let train_end = total_images - n_test - n_val;
        let val_end = total_images - n_test;
        Ok(SplitRanges {
            train: 1..=train_end,
            validation: train_end + 1..=val_end,
            test: val_end + 1..=total_images,
        })
    }

    pub fn range(&self, split: Split) -> &RangeInclusive<usize> {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }

    pub fn len(&self, split: Split) -> usize {
        let r = self.range(split);
        r.end() + 1 - r.start()
    }
}

/// Absorbs binary representation error in `total · fraction`.
const FRACTION_EPS: f64 = 1e-9;

fn held_out_count(total_images: usize, fraction: f64) -> usize {
    (total_images as f64 * fraction + FRACTION_EPS).floor() as usize
}
