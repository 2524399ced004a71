use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiceError};

/// The five varieties of the Rice Image Dataset, in label order.
pub const RICE_VARIETIES: [&str; 5] = ["Arborio", "Basmati", "Ipsala", "Jasmine", "Karacadag"];

/// Where the images live and how they are split and preprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Directory holding one sub-directory per variety.
    pub root: PathBuf,
    /// Explicit label order. When `None` the sub-directories of `root` are
    /// listed and sorted by name.
    pub varieties: Option<Vec<String>>,
    pub images_per_variety: usize,
    pub test_fraction: f64,
    pub val_fraction: f64,
    /// Images are resized to exactly `image_width × image_height`.
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            root: PathBuf::from("Dataset/Images"),
            varieties: None,
            images_per_variety: 15_000,
            test_fraction: 0.1,
            val_fraction: 0.1,
            image_width: 100,
            image_height: 100,
        }
    }
}

impl DatasetConfig {
    /// Length of one flattened RGB sample.
    pub fn input_size(&self) -> usize {
        self.image_width as usize * self.image_height as usize * 3
    }

    /// Rejects image sizes that would flatten to an empty sample.
    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RiceError::Config(format!(
                "image size must be non-zero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        Ok(())
    }
}
