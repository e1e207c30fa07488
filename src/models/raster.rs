use crate::utils::grayscale::{rgb_to_grayscale, rgb_to_grayscale_parallel};

/// Images at or above this many pixels are converted row-parallel
const PARALLEL_PIXELS: usize = 1024 * 1024;

/// Single-channel 8-bit intensity image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap an existing grayscale buffer.
    ///
    /// Returns `None` when the buffer length does not match `width * height`.
    pub fn from_gray(pixels: Vec<u8>, width: usize, height: usize) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert packed RGB bytes (3 per pixel) to a grayscale raster
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> Option<Self> {
        if rgb.len() != width * height * 3 {
            return None;
        }
        let pixels = if width * height >= PARALLEL_PIXELS {
            rgb_to_grayscale_parallel(rgb, width, height)
        } else {
            rgb_to_grayscale(rgb, width, height)
        };
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode any raster format the `image` crate understands (PNG, JPEG, ...).
    ///
    /// With `max_dimension`, images whose longer side exceeds it are
    /// downscaled (aspect kept) before grayscale conversion.
    pub fn decode(bytes: &[u8], max_dimension: Option<u32>) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let rgb = match max_dimension {
            Some(max) if img.width().max(img.height()) > max => img
                .resize(max, max, image::imageops::FilterType::Triangle)
                .to_rgb8(),
            _ => img.to_rgb8(),
        };
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        Self::from_rgb(rgb.as_raw(), width, height).ok_or_else(|| {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw grayscale pixels
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Intensity at (x, y); caller keeps coordinates in bounds
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }
}
