pub mod features;
pub mod matrix;
pub mod point;
pub mod raster;
pub mod verdict;

pub use features::{ContentSignals, ContentType, FEATURE_NAMES, FeatureVector, StructuralMetrics};
pub use matrix::BitMatrix;
pub use point::{Point, QrGeometry};
pub use raster::Raster;
pub use verdict::{Confidence, UnreadableCause, Verdict, truncate_payload};
