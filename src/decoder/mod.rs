//! QR payload extraction.
//!
//! Locating and error-correcting the code is delegated to `rqrr`; this module
//! only adapts its output to the three outcomes the pipeline cares about.

use crate::models::{Point, QrGeometry, Raster};

/// Result of trying to read a code from a raster
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// No QR pattern was located
    NotFound,
    /// A code was located but its payload bytes did not decode
    Corrupted {
        /// Corners of the located code
        geometry: QrGeometry,
    },
    /// Payload decoded
    Decoded {
        /// Decoded text
        payload: String,
        /// Corners, when the reader could localize the code
        geometry: Option<QrGeometry>,
    },
}

/// Capability that turns a grayscale raster into a QR payload.
///
/// Implementations must not panic or error on arbitrary input; a raster
/// with nothing readable is `DecodeOutcome::NotFound`.
pub trait QrReader: Send + Sync {
    fn read(&self, raster: &Raster) -> DecodeOutcome;
}

/// Production reader backed by `rqrr`
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrReader;

impl RqrrReader {
    pub fn new() -> Self {
        Self
    }
}

fn geometry_from_bounds(bounds: &[rqrr::Point; 4]) -> QrGeometry {
    QrGeometry::new(bounds.map(|p| Point::new(p.x as f32, p.y as f32)))
}

impl QrReader for RqrrReader {
    fn read(&self, raster: &Raster) -> DecodeOutcome {
        let (w, h) = (raster.width(), raster.height());
        if w == 0 || h == 0 {
            return DecodeOutcome::NotFound;
        }

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| raster.get(x, y));
        let grids = prepared.detect_grids();

        let mut first_located: Option<QrGeometry> = None;
        for grid in &grids {
            let geometry = geometry_from_bounds(&grid.bounds);
            match grid.decode() {
                Ok((_, payload)) => {
                    return DecodeOutcome::Decoded {
                        payload,
                        geometry: Some(geometry),
                    };
                }
                Err(err) => {
                    tracing::debug!(error = %err, "located QR grid failed to decode");
                    first_located.get_or_insert(geometry);
                }
            }
        }

        match first_located {
            Some(geometry) => DecodeOutcome::Corrupted { geometry },
            None => DecodeOutcome::NotFound,
        }
    }
}
