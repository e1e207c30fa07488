use crate::models::{BitMatrix, Raster};

/// Global threshold binarization.
///
/// A pixel is black (true) when its intensity is at or below `threshold`,
/// so with the usual mid-range threshold of 128 the value 128 itself counts
/// as ink.
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BitMatrix {
    let mut binary = BitMatrix::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            binary.set(x, y, gray[idx] <= threshold);
        }
    }

    binary
}

/// Binarize a whole raster
pub fn binarize_raster(raster: &Raster, threshold: u8) -> BitMatrix {
    threshold_binarize(raster.pixels(), raster.width(), raster.height(), threshold)
}

/// Black/white pixel counts of a binarized image or region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InkCounts {
    /// Pixels classified as ink
    pub black: usize,
    /// Pixels classified as background
    pub white: usize,
}

impl InkCounts {
    /// Total pixels counted
    pub fn total(&self) -> usize {
        self.black + self.white
    }

    /// Black fraction, `None` for an empty region
    pub fn black_fraction(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.black as f64 / total as f64),
        }
    }
}

/// Count ink over the whole matrix
pub fn ink_counts(binary: &BitMatrix) -> InkCounts {
    let black = binary.count_ones();
    InkCounts {
        black,
        white: binary.len() - black,
    }
}

/// Count ink inside `[x0, x1) x [y0, y1)`, clipped to the matrix
pub fn ink_counts_in(binary: &BitMatrix, x0: usize, y0: usize, x1: usize, y1: usize) -> InkCounts {
    let x1 = x1.min(binary.width());
    let y1 = y1.min(binary.height());
    if x0 >= x1 || y0 >= y1 {
        return InkCounts::default();
    }
    let black = binary.count_ones_in(x0, y0, x1, y1);
    InkCounts {
        black,
        white: (x1 - x0) * (y1 - y0) - black,
    }
}
