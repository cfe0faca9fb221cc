use crate::gauss::EstimatedGauss;
use crate::haar::FeatureHaar;
use crate::image::ImageRepresentation;
use crate::rect::{Rect, Size};
use rand::Rng;

/*------------------------------------------------------------------------------
 * ClassifierThreshold
 *------------------------------------------------------------------------------*/

/// Threshold decision rule over a scalar feature response: one Gaussian
/// model per class, threshold at the midpoint of the two means, parity
/// following their ordering.
#[derive(Debug, Clone, Default)]
pub struct ClassifierThreshold {
    pos_samples: EstimatedGauss,
    neg_samples: EstimatedGauss,
    threshold: f32,
    parity: i32,
}

impl ClassifierThreshold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distribution_mut(&mut self, target: i32) -> &mut EstimatedGauss {
        if target == 1 {
            &mut self.pos_samples
        } else {
            &mut self.neg_samples
        }
    }

    pub fn update(&mut self, value: f32, target: i32) {
        if target == 1 {
            self.pos_samples.update(value);
        } else {
            self.neg_samples.update(value);
        }

        self.threshold = (self.pos_samples.mean() + self.neg_samples.mean()) / 2.0;
        self.parity = if self.pos_samples.mean() > self.neg_samples.mean() {
            1
        } else {
            -1
        };
    }

    pub fn eval(&self, value: f32) -> i32 {
        if (self.parity as f32) * (value - self.threshold) > 0.0 {
            1
        } else {
            -1
        }
    }
}

/*------------------------------------------------------------------------------
 * WeakClassifierHaarFeature
 *------------------------------------------------------------------------------*/

/// A weak classifier: one randomized Haar feature plus a threshold rule,
/// with both class distributions seeded from the feature's template.
pub struct WeakClassifierHaarFeature {
    feature: FeatureHaar,
    classifier: ClassifierThreshold,
}

impl WeakClassifierHaarFeature {
    pub fn new<R: Rng>(patch_size: Size, rng: &mut R) -> Self {
        let feature = FeatureHaar::generate(patch_size, rng);
        let mut classifier = ClassifierThreshold::new();
        feature.initial_distribution(classifier.distribution_mut(-1));
        feature.initial_distribution(classifier.distribution_mut(1));
        Self {
            feature,
            classifier,
        }
    }

    /// Train on one labeled region; returns true when the post-update
    /// prediction disagrees with `target`. An invalid feature evaluation
    /// contributes no vote and no error.
    pub fn update(&mut self, image: &ImageRepresentation, roi: Rect, target: i32) -> bool {
        let value = match self.feature.eval(image, roi) {
            Some(value) => value,
            None => return false,
        };

        self.classifier.update(value, target);
        self.classifier.eval(value) != target
    }

    /// Vote in {-1, +1}, or 0 when the feature cannot evaluate the region.
    pub fn eval(&mut self, image: &ImageRepresentation, roi: Rect) -> i32 {
        match self.feature.eval(image, roi) {
            Some(value) => self.classifier.eval(value),
            None => 0,
        }
    }

    /// Raw feature response, 0.0 when invalid.
    pub fn value(&mut self, image: &ImageRepresentation, roi: Rect) -> f32 {
        self.feature.eval(image, roi).unwrap_or(0.0)
    }
}
