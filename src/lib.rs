pub mod base_classifier;
pub mod boosting_tracker;
pub mod detector;
pub mod error;
pub mod gauss;
pub mod haar;
pub mod image;
pub mod object_tracker;
pub mod patches;
pub mod rect;
pub mod semi_boosting_tracker;
pub mod strong_classifier;
pub mod weak_classifier;

pub use boosting_tracker::BoostingTracker;
pub use detector::Detector;
pub use error::TrackError;
pub use image::ImageRepresentation;
pub use object_tracker::{Algorithm, ObjectTracker, ObjectTrackerParams, TrackState};
pub use patches::{Anchor, Patches, PatchesRegularScan, PatchesRegularScaleScan};
pub use rect::{Point2D, Rect, Size};
pub use semi_boosting_tracker::SemiBoostingTracker;
pub use strong_classifier::{
    StrongClassifier, StrongClassifierDirectSelection, StrongClassifierStandard,
    StrongClassifierStandardSemi,
};

#[cfg(test)]
mod test_classifier;
#[cfg(test)]
mod test_gauss;
#[cfg(test)]
mod test_haar;
#[cfg(test)]
mod test_patches;
#[cfg(test)]
mod test_rect;
