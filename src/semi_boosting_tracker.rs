use crate::boosting_tracker::search_region;
use crate::detector::Detector;
use crate::image::ImageRepresentation;
use crate::patches::{Anchor, Patches, PatchesRegularScan};
use crate::rect::{Point2D, Rect};
use crate::strong_classifier::{StrongClassifier, StrongClassifierStandardSemi};
use log::debug;
use rand::Rng;

/*------------------------------------------------------------------------------
 * SemiBoostingTracker
 *------------------------------------------------------------------------------*/

const NUM_WEAK_CLASSIFIER: usize = 100;
const ITERATION_INIT: usize = 50;
const INIT_OVERLAP: f32 = 0.99;
const INIT_SEARCH_FACTOR: f32 = 2.0;

/// Semi-supervised online-boosting tracker. A second ensemble is trained
/// only at initialization and then frozen; at steady state its normalized
/// score serves as the prior confidence that guides the online ensemble,
/// so no hard labels are injected after the first frame.
pub struct SemiBoostingTracker {
    classifier: StrongClassifierStandardSemi,
    classifier_off: StrongClassifierStandardSemi,
    detector: Detector,
    tracked_patch: Rect,
    valid_roi: Rect,
    confidence: f32,
    prior_confidence: f32,
}

impl SemiBoostingTracker {
    pub fn new<R: Rng>(
        image: &ImageRepresentation,
        init_patch: Rect,
        valid_roi: Rect,
        num_base_classifier: usize,
        rng: &mut R,
    ) -> Self {
        let patch_size = init_patch.size();

        let mut classifier_off = StrongClassifierStandardSemi::new(
            num_base_classifier,
            NUM_WEAK_CLASSIFIER,
            patch_size,
            true,
            ITERATION_INIT,
            rng,
        );
        let mut classifier = StrongClassifierStandardSemi::new(
            num_base_classifier,
            NUM_WEAK_CLASSIFIER,
            patch_size,
            true,
            ITERATION_INIT,
            rng,
        );

        let tracking_roi = search_region(init_patch, valid_roi, INIT_SEARCH_FACTOR);
        let patches = PatchesRegularScan::new(tracking_roi, valid_roi, patch_size, INIT_OVERLAP);

        debug!(
            "init semi-boosting tracker: {} rounds over roi {:?}",
            ITERATION_INIT, tracking_roi
        );
        for _ in 0..ITERATION_INIT {
            classifier.update_semi(image, patches.anchor_rect(Anchor::UpperLeft), -1.0, rng);
            classifier.update_semi(image, init_patch, 1.0, rng);
            classifier.update_semi(image, patches.anchor_rect(Anchor::UpperRight), -1.0, rng);
            classifier.update_semi(image, init_patch, 1.0, rng);
            classifier.update_semi(image, patches.anchor_rect(Anchor::LowerLeft), -1.0, rng);
            classifier.update_semi(image, init_patch, 1.0, rng);
            classifier.update_semi(image, patches.anchor_rect(Anchor::LowerRight), -1.0, rng);
            classifier.update_semi(image, init_patch, 1.0, rng);
        }

        // One-shot learning of the frozen prior.
        for _ in 0..ITERATION_INIT {
            classifier_off.update_semi(image, init_patch, 1.0, rng);
            classifier_off.update_semi(image, patches.anchor_rect(Anchor::UpperLeft), -1.0, rng);
            classifier_off.update_semi(image, init_patch, 1.0, rng);
            classifier_off.update_semi(image, patches.anchor_rect(Anchor::UpperRight), -1.0, rng);
            classifier_off.update_semi(image, init_patch, 1.0, rng);
            classifier_off.update_semi(image, patches.anchor_rect(Anchor::LowerLeft), -1.0, rng);
            classifier_off.update_semi(image, init_patch, 1.0, rng);
            classifier_off.update_semi(image, patches.anchor_rect(Anchor::LowerRight), -1.0, rng);
        }

        Self {
            classifier,
            classifier_off,
            detector: Detector::new(),
            tracked_patch: init_patch,
            valid_roi,
            confidence: -1.0,
            prior_confidence: -1.0,
        }
    }

    /// Re-localize and run one semi-supervised update round: each corner
    /// anchor and the tracked patch are scored through the frozen prior and
    /// fed back as soft examples. The tracked patch is re-updated once per
    /// corner.
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
            self.prior_confidence = 0.0;
            debug!("tracking lost: no patch above margin");
            return false;
        }

        let best = self
            .detector
            .patch_idx_of_best_detection()
            .expect("detections imply a best patch");
        self.tracked_patch = patches.rect(best);
        self.confidence = self.detector.confidence_of_best_detection();

        for anchor in [
            Anchor::UpperLeft,
            Anchor::LowerLeft,
            Anchor::UpperRight,
            Anchor::LowerRight,
        ] {
            let corner = patches.anchor_rect(anchor);
            let off = self.prior_of(image, corner);
            self.classifier.update_semi(image, corner, off, rng);

            self.prior_confidence = self.prior_of(image, self.tracked_patch);
            self.classifier
                .update_semi(image, self.tracked_patch, self.prior_confidence, rng);
        }

        true
    }

    /// Normalized score of the frozen ensemble for a region, 0.0 while the
    /// prior has no learned stage.
    fn prior_of(&mut self, image: &ImageRepresentation, roi: Rect) -> f32 {
        let sum_alpha = self.classifier_off.sum_alpha(None);
        if sum_alpha > 0.0 {
            self.classifier_off.eval(image, roi) / sum_alpha
        } else {
            0.0
        }
    }

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

    pub fn prior_confidence(&self) -> f32 {
        self.prior_confidence
    }

    pub fn tracked_patch(&self) -> Rect {
        self.tracked_patch
    }

    pub fn center(&self) -> Point2D {
        self.tracked_patch.center()
    }
}
