//! Image processing helpers shared by raster decoding and the structural analyzer:
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Global threshold binarization and ink counting

pub mod binarization;
pub mod grayscale;
