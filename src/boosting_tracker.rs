use crate::detector::Detector;
use crate::image::ImageRepresentation;
use crate::patches::{Anchor, Patches, PatchesRegularScan};
use crate::rect::{Point2D, Rect, Size};
use crate::strong_classifier::{StrongClassifier, StrongClassifierDirectSelection};
use log::debug;
use rand::Rng;

/*------------------------------------------------------------------------------
 * BoostingTracker
 *------------------------------------------------------------------------------*/

const ITERATION_INIT: usize = 50;
const INIT_OVERLAP: f32 = 0.99;
const INIT_SEARCH_FACTOR: f32 = 2.0;

/// Tracked patch scaled by `search_factor`, clamped to the valid region on
/// the bottom and right edges (scaling already clamps the origin at zero).
pub(crate) fn search_region(tracked_patch: Rect, valid_roi: Rect, search_factor: f32) -> Rect {
    let mut region = tracked_patch.scaled(search_factor);
    if region.upper + region.height > valid_roi.height {
        region.height = valid_roi.height - region.upper;
    }
    if region.left + region.width > valid_roi.width {
        region.width = valid_roi.width - region.left;
    }
    region
}

/// Supervised online-boosting tracker: a direct-selection strong classifier
/// retrained each frame with the tracked patch as positive and the corners
/// of the search region as negatives.
pub struct BoostingTracker {
    classifier: StrongClassifierDirectSelection,
    detector: Detector,
    tracked_patch: Rect,
    valid_roi: Rect,
    confidence: f32,
}

impl BoostingTracker {
    /// Seed the classifier with `ITERATION_INIT` interleaved rounds of
    /// corner-negative / patch-positive updates over a 2x search region.
    pub fn new<R: Rng>(
        image: &ImageRepresentation,
        init_patch: Rect,
        valid_roi: Rect,
        num_base_classifier: usize,
        rng: &mut R,
    ) -> Self {
        let num_weak_classifier = num_base_classifier * 10;
        let patch_size = init_patch.size();

        let mut classifier = StrongClassifierDirectSelection::new(
            num_base_classifier,
            num_weak_classifier,
            patch_size,
            true,
            ITERATION_INIT,
            rng,
        );

        let tracking_roi = search_region(init_patch, valid_roi, INIT_SEARCH_FACTOR);
        let patches =
            PatchesRegularScan::new(tracking_roi, valid_roi, patch_size, INIT_OVERLAP);

        debug!(
            "init boosting tracker: {} rounds over roi {:?}",
            ITERATION_INIT, tracking_roi
        );
        for _ in 0..ITERATION_INIT {
            classifier.update(image, patches.anchor_rect(Anchor::UpperLeft), -1, 1.0, rng);
            classifier.update(image, init_patch, 1, 1.0, rng);
            classifier.update(image, patches.anchor_rect(Anchor::UpperRight), -1, 1.0, rng);
            classifier.update(image, init_patch, 1, 1.0, rng);
            classifier.update(image, patches.anchor_rect(Anchor::LowerLeft), -1, 1.0, rng);
            classifier.update(image, init_patch, 1, 1.0, rng);
            classifier.update(image, patches.anchor_rect(Anchor::LowerRight), -1, 1.0, rng);
            classifier.update(image, init_patch, 1, 1.0, rng);
        }

        Self {
            classifier,
            detector: Detector::new(),
            tracked_patch: init_patch,
            valid_roi,
            confidence: -1.0,
        }
    }

    /// Re-localize in the current frame and run one online training round.
    /// Returns false (leaving all classifier state untouched) when no patch
    /// clears the detection margin.
    pub fn track<R: Rng>(
        &mut self,
        image: &ImageRepresentation,
        patches: &PatchesRegularScan,
        rng: &mut R,
    ) -> bool {
        self.detector
            .classify_smooth(&mut self.classifier, image, patches, 0.0);

        if self.detector.num_detections() == 0 {
            self.confidence = 0.0;
            debug!("tracking lost: no patch above margin");
            return false;
        }

        let best = self
            .detector
            .patch_idx_of_best_detection()
            .expect("detections imply a best patch");
        self.tracked_patch = patches.rect(best);
        self.confidence = self.detector.confidence_of_best_detection();

        self.classifier
            .update(image, patches.anchor_rect(Anchor::UpperLeft), -1, 1.0, rng);
        self.classifier.update(image, self.tracked_patch, 1, 1.0, rng);
        self.classifier
            .update(image, patches.anchor_rect(Anchor::UpperRight), -1, 1.0, rng);
        self.classifier.update(image, self.tracked_patch, 1, 1.0, rng);
        self.classifier
            .update(image, patches.anchor_rect(Anchor::LowerLeft), -1, 1.0, rng);
        self.classifier.update(image, self.tracked_patch, 1, 1.0, rng);
        self.classifier
            .update(image, patches.anchor_rect(Anchor::LowerRight), -1, 1.0, rng);
        self.classifier.update(image, self.tracked_patch, 1, 1.0, rng);

        true
    }

    /// Search region for the next frame: the tracked patch scaled by
    /// `search_factor` and clamped to the valid region.
    pub fn tracking_roi(&self, search_factor: f32) -> Rect {
        search_region(self.tracked_patch, self.valid_roi, search_factor)
    }

    /// Last confidence normalized by the ensemble's total boosting weight,
    /// 0.0 while no stage has learned anything.
    pub fn confidence(&self) -> f32 {
        let sum_alpha = self.classifier.sum_alpha(None);
        if sum_alpha > 0.0 {
            self.confidence / sum_alpha
        } else {
            0.0
        }
    }

    pub fn tracked_patch(&self) -> Rect {
        self.tracked_patch
    }

    pub fn tracked_patch_size(&self) -> Size {
        self.tracked_patch.size()
    }

    pub fn center(&self) -> Point2D {
        self.tracked_patch.center()
    }
}
