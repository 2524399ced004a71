use std::path::PathBuf;

use image::imageops::FilterType;

use crate::error::{Result, RiceError};

/// Resolves `(variety, index)` records to files under the dataset root and
/// decodes them into flat RGB vectors.
#[derive(Debug, Clone)]
pub struct ImageIndexer {
    root: PathBuf,
    width: u32,
    height: u32,
}

impl ImageIndexer {
    pub fn new(root: impl Into<PathBuf>, width: u32, height: u32) -> ImageIndexer {
        ImageIndexer { root: root.into(), width, height }
    }

    /// Length of every vector produced by `load`.
    pub fn sample_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// `<root>/<variety>/<variety> (<index>).jpg`, index 1-based.
    pub fn image_path(&self, variety: &str, index: usize) -> PathBuf {
        self.root.join(variety).join(format!("{} ({}).jpg", variety, index))
    }

    /// Decodes the image, resizes it to `width × height` (bilinear) and
    /// flattens it as R, G, B, R, G, B, ... normalized to [0, 1].
    pub fn load(&self, variety: &str, index: usize) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.sample_len()];
        self.load_into(variety, index, &mut out)?;
        Ok(out)
    }

    /// Same as `load` but writes into `out`, which must have `sample_len()`
    /// elements. The decoded image is dropped before returning.
    pub fn load_into(&self, variety: &str, index: usize, out: &mut [f64]) -> Result<()> {
        assert_eq!(out.len(), self.sample_len(), "load_into: output slice has the wrong length");

        let path = self.image_path(variety, index);
        let img = image::open(&path).map_err(|source| RiceError::Decode { path, source })?;

        let img = if img.width() == self.width && img.height() == self.height {
            img
        } else {
            img.resize_exact(self.width, self.height, FilterType::Triangle)
        };
        let rgb = img.to_rgb8();

        for (dst, &c) in out.iter_mut().zip(rgb.as_raw().iter()) {
            *dst = c as f64 / 255.0;
        }
        Ok(())
    }
}
