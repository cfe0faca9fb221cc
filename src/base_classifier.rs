use crate::image::ImageRepresentation;
use crate::rect::{Rect, Size};
use crate::weak_classifier::WeakClassifierHaarFeature;
use rand::Rng;

/*------------------------------------------------------------------------------
 * ClassifierPool
 *------------------------------------------------------------------------------*/

/// Arena of weak-classifier slots addressed by index. Replacement
/// reconstructs the value at an index; no slot identity leaks outside the
/// pool, so stages sharing it only ever hold indices.
pub struct ClassifierPool {
    slots: Vec<WeakClassifierHaarFeature>,
}

impl ClassifierPool {
    pub fn new<R: Rng>(num_slots: usize, patch_size: Size, rng: &mut R) -> Self {
        let slots = (0..num_slots)
            .map(|_| WeakClassifierHaarFeature::new(patch_size, rng))
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop the classifier at `index` and construct a fresh randomized one
    /// in its place.
    pub fn regenerate<R: Rng>(&mut self, index: usize, patch_size: Size, rng: &mut R) {
        self.slots[index] = WeakClassifierHaarFeature::new(patch_size, rng);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    fn slot_mut(&mut self, index: usize) -> &mut WeakClassifierHaarFeature {
        &mut self.slots[index]
    }
}

/*------------------------------------------------------------------------------
 * BaseClassifier
 *------------------------------------------------------------------------------*/

/// Per-stage feature selector: running correct/wrong importance weights for
/// every pool slot, the currently selected active slot, and the rotating
/// spare index used for feature exchange. The pool itself is passed into
/// each method so one physical pool can back several stages.
pub struct BaseClassifier {
    num_weak_classifier: usize,
    iteration_init: usize,
    selected_classifier: usize,
    idx_of_new_weak_classifier: usize,
    w_correct: Vec<f32>,
    w_wrong: Vec<f32>,
}

impl BaseClassifier {
    pub fn new(num_weak_classifier: usize, iteration_init: usize) -> Self {
        let num_all = num_weak_classifier + iteration_init;
        Self {
            num_weak_classifier,
            iteration_init,
            selected_classifier: 0,
            idx_of_new_weak_classifier: num_weak_classifier,
            w_correct: vec![1.0; num_all],
            w_wrong: vec![1.0; num_all],
        }
    }

    pub fn num_weak_classifier(&self) -> usize {
        self.num_weak_classifier
    }

    pub fn num_all_classifier(&self) -> usize {
        self.num_weak_classifier + self.iteration_init
    }

    pub fn selected_classifier(&self) -> usize {
        self.selected_classifier
    }

    pub fn idx_of_new_weak_classifier(&self) -> usize {
        self.idx_of_new_weak_classifier
    }

    pub fn set_w_correct(&mut self, index: usize, value: f32) {
        self.w_correct[index] = value;
    }

    pub fn set_w_wrong(&mut self, index: usize, value: f32) {
        self.w_wrong[index] = value;
    }

    /// Vote of the currently selected weak classifier.
    pub fn eval(&self, pool: &mut ClassifierPool, image: &ImageRepresentation, roi: Rect) -> i32 {
        pool.slot_mut(self.selected_classifier).eval(image, roi)
    }

    /// Raw feature response of `idx`, or of the selected classifier when
    /// `idx` is out of the active range.
    pub fn value(
        &self,
        pool: &mut ClassifierPool,
        image: &ImageRepresentation,
        roi: Rect,
        idx: Option<usize>,
    ) -> f32 {
        let idx = match idx {
            Some(idx) if idx < self.num_weak_classifier => idx,
            _ => self.selected_classifier,
        };
        pool.slot_mut(idx).value(image, roi)
    }

    /// Importance-weighted online bagging: draw a Poisson-distributed repeat
    /// count from `importance` (exponential-interarrival rejection, capped)
    /// and run every pool slot through that many updates, recording each
    /// slot's final error flag in `error_mask`.
    pub fn train<R: Rng>(
        &self,
        pool: &mut ClassifierPool,
        image: &ImageRepresentation,
        roi: Rect,
        target: i32,
        importance: f32,
        error_mask: &mut [bool],
        rng: &mut R,
    ) {
        const K_MAX: usize = 10;

        let mut a = 1.0f64;
        let mut k = 0usize;
        loop {
            let u: f64 = rng.gen();
            a *= u;
            if k > K_MAX || a < (-importance as f64).exp() {
                break;
            }
            k += 1;
        }

        for _ in 0..=k {
            for cur in 0..self.num_all_classifier() {
                error_mask[cur] = pool.slot_mut(cur).update(image, roi, target);
            }
        }
    }

    /// Evaluate every pool slot against a labeled region without training.
    pub fn error_mask(
        &self,
        pool: &mut ClassifierPool,
        image: &ImageRepresentation,
        roi: Rect,
        target: i32,
        error_mask: &mut [bool],
    ) {
        for cur in 0..self.num_all_classifier() {
            error_mask[cur] = pool.slot_mut(cur).eval(image, roi) != target;
        }
    }

    /// Smoothed running error of `idx` (the selected classifier by default).
    pub fn error(&self, idx: Option<usize>) -> f32 {
        let idx = idx.unwrap_or(self.selected_classifier);
        self.w_wrong[idx] / (self.w_wrong[idx] + self.w_correct[idx])
    }

    /// Fold one sample's error mask into the running weights, refresh the
    /// smoothed errors (entries already claimed via `f32::MAX` are skipped)
    /// and select the lowest-error active slot.
    pub fn select_best_classifier(
        &mut self,
        error_mask: &[bool],
        importance: f32,
        errors: &mut [f32],
    ) -> usize {
        let mut min_error = f32::MAX;
        let mut selected = self.selected_classifier;

        for cur in 0..self.num_all_classifier() {
            if error_mask[cur] {
                self.w_wrong[cur] += importance;
            } else {
                self.w_correct[cur] += importance;
            }

            if errors[cur] == f32::MAX {
                continue;
            }

            errors[cur] = self.w_wrong[cur] / (self.w_wrong[cur] + self.w_correct[cur]);

            if cur < self.num_weak_classifier && errors[cur] < min_error {
                min_error = errors[cur];
                selected = cur;
            }
        }

        self.selected_classifier = selected;
        selected
    }

    /// Refresh the smoothed errors for all slots, skipping claimed entries.
    pub fn errors(&self, errors: &mut [f32]) {
        for cur in 0..self.num_all_classifier() {
            if errors[cur] == f32::MAX {
                continue;
            }
            errors[cur] = self.w_wrong[cur] / (self.w_wrong[cur] + self.w_correct[cur]);
        }
    }

    /// Feature exchange: if the next spare slot in rotation outperforms the
    /// worst active slot (the selected one excepted), move the spare into
    /// that slot, reset the vacated statistics to 1/1 and regenerate a fresh
    /// randomized classifier there. Returns the replaced active index.
    pub fn replace_weakest_classifier<R: Rng>(
        &mut self,
        pool: &mut ClassifierPool,
        errors: &[f32],
        patch_size: Size,
        rng: &mut R,
    ) -> Option<usize> {
        let mut max_error = 0.0f32;
        let mut index = None;

        for cur in (0..self.num_weak_classifier).rev() {
            if cur == self.selected_classifier {
                continue;
            }
            if errors[cur] > max_error {
                max_error = errors[cur];
                index = Some(cur);
            }
        }
        let index = index?;

        self.idx_of_new_weak_classifier += 1;
        if self.idx_of_new_weak_classifier == self.num_all_classifier() {
            self.idx_of_new_weak_classifier = self.num_weak_classifier;
        }

        if max_error > errors[self.idx_of_new_weak_classifier] {
            let spare = self.idx_of_new_weak_classifier;
            pool.swap(index, spare);
            self.w_wrong[index] = self.w_wrong[spare];
            self.w_wrong[spare] = 1.0;
            self.w_correct[index] = self.w_correct[spare];
            self.w_correct[spare] = 1.0;

            pool.regenerate(spare, patch_size, rng);

            Some(index)
        } else {
            None
        }
    }

    /// Mirror a replacement performed on a shared pool into this stage's
    /// statistics: move the spare slot's weights onto the replaced index and
    /// reset the spare to 1/1.
    pub fn replace_classifier_statistic(&mut self, source: usize, target: usize) {
        debug_assert!(target < self.num_weak_classifier);
        debug_assert_ne!(target, self.selected_classifier);

        self.w_wrong[target] = self.w_wrong[source];
        self.w_wrong[source] = 1.0;
        self.w_correct[target] = self.w_correct[source];
        self.w_correct[source] = 1.0;
    }
}
