//! Geometry and pixel-statistic features.
//!
//! Everything here is derived from the raster alone (plus optional corner
//! geometry); the payload is never consulted.

use crate::config::StructuralConfig;
use crate::models::{QrGeometry, Raster, StructuralMetrics};
use crate::utils::binarization::{binarize_raster, ink_counts, ink_counts_in};

/// Computes `StructuralMetrics` for a raster
#[derive(Debug, Clone)]
pub struct StructuralAnalyzer {
    config: StructuralConfig,
}

impl StructuralAnalyzer {
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    /// Analyze one raster; `geometry` only feeds `relative_size`
    pub fn analyze(&self, raster: &Raster, geometry: Option<&QrGeometry>) -> StructuralMetrics {
        let binary = binarize_raster(raster, self.config.binarization_threshold);
        let counts = ink_counts(&binary);

        let bw_ratio = counts.black as f64 / (counts.white as f64 + 1.0);
        let density = counts.black_fraction().unwrap_or(0.0);

        let (w, h) = (raster.width(), raster.height());
        let start = self.config.logo_region_start;
        let end = self.config.logo_region_end;
        let x0 = (w as f64 * start) as usize;
        let x1 = (w as f64 * end) as usize;
        let y0 = (h as f64 * start) as usize;
        let y1 = (h as f64 * end) as usize;
        let center = ink_counts_in(&binary, x0, y0, x1, y1);
        let center_black_ratio = center.black_fraction();
        let has_logo = center_black_ratio
            .map(|ratio| ratio < self.config.logo_black_ratio_max)
            .unwrap_or(false);

        StructuralMetrics {
            relative_size: relative_size(geometry, w, h),
            bw_ratio,
            density,
            has_logo,
            center_black_ratio: center_black_ratio.unwrap_or(0.0),
            black_pixels: counts.black,
            white_pixels: counts.white,
            has_geometry: geometry.is_some(),
        }
    }

    /// Located code covers too little of the frame
    pub fn is_small(&self, metrics: &StructuralMetrics) -> bool {
        metrics.has_geometry && metrics.relative_size < self.config.small_size_threshold
    }

    /// Ink-to-background ratio outside the configured band
    pub fn is_bw_ratio_abnormal(&self, metrics: &StructuralMetrics) -> bool {
        !(self.config.bw_ratio_min..=self.config.bw_ratio_max).contains(&metrics.bw_ratio)
    }

    /// Ink density outside the configured band
    pub fn is_density_abnormal(&self, metrics: &StructuralMetrics) -> bool {
        !(self.config.density_min..=self.config.density_max).contains(&metrics.density)
    }
}

/// Bounding-box area of `geometry` over image area, clamped to [0, 1]
pub fn relative_size(geometry: Option<&QrGeometry>, width: usize, height: usize) -> f64 {
    let area = width * height;
    match geometry {
        Some(g) if area > 0 => (g.bounding_area() / area as f64).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn analyzer() -> StructuralAnalyzer {
        StructuralAnalyzer::new(StructuralConfig::default())
    }

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> QrGeometry {
        QrGeometry::new([
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    /// White frame with a 10px checkerboard inside `[lo, hi)` on both axes
    fn checker(size: usize, lo: usize, hi: usize) -> Raster {
        let mut px = vec![255u8; size * size];
        for y in lo..hi {
            for x in lo..hi {
                if ((x - lo) / 10 + (y - lo) / 10) % 2 == 0 {
                    px[y * size + x] = 0;
                }
            }
        }
        Raster::from_gray(px, size, size).unwrap()
    }

    #[test]
    fn test_all_white_is_finite() {
        let raster = Raster::from_gray(vec![255; 100], 10, 10).unwrap();
        let m = analyzer().analyze(&raster, None);
        assert_eq!(m.black_pixels, 0);
        assert_eq!(m.bw_ratio, 0.0);
        assert!(m.bw_ratio.is_finite());
        assert_eq!(m.density, 0.0);
        // Blank center reads as an occluded logo region
        assert!(m.has_logo);
    }

    #[test]
    fn test_all_black() {
        let raster = Raster::from_gray(vec![0; 100], 10, 10).unwrap();
        let m = analyzer().analyze(&raster, None);
        assert_eq!(m.bw_ratio, 100.0);
        assert_eq!(m.density, 1.0);
        assert!(!m.has_logo);
    }

    #[test]
    fn test_empty_raster() {
        let raster = Raster::from_gray(Vec::new(), 0, 0).unwrap();
        let m = analyzer().analyze(&raster, None);
        assert_eq!(m.density, 0.0);
        assert_eq!(m.bw_ratio, 0.0);
        assert!(!m.has_logo);
        assert_eq!(m.relative_size, 0.0);
    }

    #[test]
    fn test_checkerboard_metrics() {
        let raster = checker(200, 30, 170);
        let geometry = square(30.0, 30.0, 170.0, 170.0);
        let a = analyzer();
        let m = a.analyze(&raster, Some(&geometry));

        assert_eq!(m.black_pixels, 9800);
        assert_eq!(m.white_pixels, 40000 - 9800);
        assert!((m.density - 0.245).abs() < 1e-9);
        assert!((m.relative_size - 0.49).abs() < 1e-9);
        assert!(!m.has_logo);
        assert!(!a.is_small(&m));
        assert!(!a.is_bw_ratio_abnormal(&m));
        assert!(!a.is_density_abnormal(&m));
    }

    #[test]
    fn test_blank_center_is_logo() {
        let mut raster = checker(200, 30, 170);
        let mut px = raster.pixels().to_vec();
        for y in 70..130 {
            for x in 70..130 {
                px[y * 200 + x] = 255;
            }
        }
        raster = Raster::from_gray(px, 200, 200).unwrap();
        let m = analyzer().analyze(&raster, None);
        assert!(m.has_logo);
        assert!(m.center_black_ratio < 0.15);
    }

    #[test]
    fn test_relative_size_small_code() {
        // 150x150 code in a 1000x1000 frame
        let g = square(400.0, 400.0, 550.0, 550.0);
        let rs = relative_size(Some(&g), 1000, 1000);
        assert!((rs - 0.0225).abs() < 1e-9);

        let raster = Raster::from_gray(vec![255; 1000 * 1000], 1000, 1000).unwrap();
        let a = analyzer();
        let m = a.analyze(&raster, Some(&g));
        assert!(a.is_small(&m));
    }

    #[test]
    fn test_missing_geometry_is_not_small() {
        let raster = checker(200, 30, 170);
        let a = analyzer();
        let m = a.analyze(&raster, None);
        assert_eq!(m.relative_size, 0.0);
        assert!(!m.has_geometry);
        assert!(!a.is_small(&m));
    }

    #[test]
    fn test_relative_size_clamped() {
        let g = square(-50.0, -50.0, 150.0, 150.0);
        assert_eq!(relative_size(Some(&g), 100, 100), 1.0);
        assert_eq!(relative_size(None, 100, 100), 0.0);
    }

    #[test]
    fn test_density_in_unit_interval() {
        for seed in 1..20usize {
            let pixels: Vec<u8> = (0..37 * 29).map(|i| ((i * seed * 13) % 256) as u8).collect();
            let raster = Raster::from_gray(pixels, 37, 29).unwrap();
            let m = analyzer().analyze(&raster, None);
            assert!((0.0..=1.0).contains(&m.density));
            assert!(m.bw_ratio.is_finite() && m.bw_ratio >= 0.0);
        }
    }
}
