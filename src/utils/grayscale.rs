//! RGB to luminance conversion.
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed with integer arithmetic:
//! Y = (76*R + 150*G + 29*B) >> 8

use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert packed RGB (3 bytes per pixel) to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    rgb.chunks_exact(3)
        .take(pixel_count)
        .map(|px| luminance(px[0], px[1], px[2]))
        .collect()
}

/// Convert RGB to grayscale, processing rows in parallel
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            *out = luminance(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
        }
    });

    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = rgb_to_grayscale(&[255, 255, 255], 1, 1);
        assert!(gray[0] >= 254);

        // Pure black
        let gray = rgb_to_grayscale(&[0, 0, 0], 1, 1);
        assert_eq!(gray[0], 0);

        // Pure red sits between the extremes
        let gray = rgb_to_grayscale(&[255, 0, 0], 1, 1);
        assert!(gray[0] > 0 && gray[0] < 255);

        // Green dominates luminance
        let gray = rgb_to_grayscale(&[0, 255, 0], 1, 1);
        assert!(gray[0] > 100);

        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        assert_eq!(rgb_to_grayscale(&img, 2, 2).len(), 4);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (w, h) = (37, 23);
        let rgb: Vec<u8> = (0..w * h * 3).map(|i| (i * 31 % 256) as u8).collect();
        assert_eq!(
            rgb_to_grayscale(&rgb, w, h),
            rgb_to_grayscale_parallel(&rgb, w, h)
        );
    }
}
