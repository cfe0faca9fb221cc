use crate::base_classifier::{BaseClassifier, ClassifierPool};
use crate::image::ImageRepresentation;
use crate::rect::{Rect, Size};
use rand::Rng;

/*------------------------------------------------------------------------------
 * StrongClassifier trait
 *------------------------------------------------------------------------------*/

/// Weighted ensemble vote over ordered feature selectors. Evaluation takes
/// `&mut self` because feature responses refresh a per-size scale cache.
pub trait StrongClassifier {
    fn num_base_classifier(&self) -> usize;

    /// Ensemble confidence `sum(alpha_i * vote_i)` for a region.
    fn eval(&mut self, image: &ImageRepresentation, roi: Rect) -> f32;

    /// Sum of boosting weights up to `to_base_classifier` (all stages when
    /// `None`).
    fn sum_alpha(&self, to_base_classifier: Option<usize>) -> f32;
}

fn sum_alpha_upto(alpha: &[f32], to_base_classifier: Option<usize>) -> f32 {
    let upto = to_base_classifier.unwrap_or(alpha.len()).min(alpha.len());
    alpha[..upto].iter().sum()
}

fn stage_alpha(error: f32) -> f32 {
    if error >= 0.5 {
        0.0
    } else {
        ((1.0 - error) / error).ln()
    }
}

/// Discrete-AdaBoost importance reweighting for the next stage.
fn reweight(importance: f32, error: f32, misclassified: bool) -> f32 {
    if misclassified {
        importance * ((1.0 - error) / error).sqrt()
    } else {
        importance * (error / (1.0 - error)).sqrt()
    }
}

/*------------------------------------------------------------------------------
 * StrongClassifierDirectSelection
 *------------------------------------------------------------------------------*/

/// All stages select from one shared physical feature pool. The pool is
/// trained once per update; stages then claim features greedily in order of
/// cumulative error, and feature exchange on the pool is mirrored into
/// every stage's statistics.
pub struct StrongClassifierDirectSelection {
    num_base_classifier: usize,
    num_all_weak_classifier: usize,
    patch_size: Size,
    use_feature_exchange: bool,
    selectors: Vec<BaseClassifier>,
    pool: ClassifierPool,
    alpha: Vec<f32>,
    error_mask: Vec<bool>,
    errors: Vec<f32>,
    sum_errors: Vec<f32>,
}

impl StrongClassifierDirectSelection {
    pub fn new<R: Rng>(
        num_base_classifier: usize,
        num_weak_classifier: usize,
        patch_size: Size,
        use_feature_exchange: bool,
        iteration_init: usize,
        rng: &mut R,
    ) -> Self {
        let num_all = num_weak_classifier + iteration_init;
        Self {
            num_base_classifier,
            num_all_weak_classifier: num_all,
            patch_size,
            use_feature_exchange,
            selectors: (0..num_base_classifier)
                .map(|_| BaseClassifier::new(num_weak_classifier, iteration_init))
                .collect(),
            pool: ClassifierPool::new(num_all, patch_size, rng),
            alpha: vec![0.0; num_base_classifier],
            error_mask: vec![false; num_all],
            errors: vec![0.0; num_all],
            sum_errors: vec![0.0; num_all],
        }
    }

    /// One supervised boosting round on a labeled region.
    pub fn update<R: Rng>(
        &mut self,
        image: &ImageRepresentation,
        roi: Rect,
        target: i32,
        importance: f32,
        rng: &mut R,
    ) {
        self.error_mask.fill(false);
        self.errors.fill(0.0);
        self.sum_errors.fill(0.0);

        // The shared pool is trained exactly once per round.
        self.selectors[0].train(
            &mut self.pool,
            image,
            roi,
            target,
            importance,
            &mut self.error_mask,
            rng,
        );

        let mut importance = importance;
        for cur in 0..self.num_base_classifier {
            let selected = self.selectors[cur].select_best_classifier(
                &self.error_mask,
                importance,
                &mut self.errors,
            );

            self.alpha[cur] = stage_alpha(self.errors[selected]);
            importance = reweight(importance, self.errors[selected], self.error_mask[selected]);

            for cur_weak in 0..self.num_all_weak_classifier {
                if self.errors[cur_weak] != f32::MAX && self.sum_errors[cur_weak] >= 0.0 {
                    self.sum_errors[cur_weak] += self.errors[cur_weak];
                }
            }

            // Claimed features are skipped by every later stage.
            self.sum_errors[selected] = -1.0;
            self.errors[selected] = f32::MAX;
        }

        if self.use_feature_exchange {
            let replaced = self.selectors[0].replace_weakest_classifier(
                &mut self.pool,
                &self.sum_errors,
                self.patch_size,
                rng,
            );
            if let Some(replaced) = replaced {
                let source = self.selectors[0].idx_of_new_weak_classifier();
                for cur in 1..self.num_base_classifier {
                    self.selectors[cur].replace_classifier_statistic(source, replaced);
                }
            }
        }
    }

    pub fn feature_value(
        &mut self,
        image: &ImageRepresentation,
        roi: Rect,
        base_classifier_idx: usize,
    ) -> f32 {
        self.selectors[base_classifier_idx].value(&mut self.pool, image, roi, None)
    }

    /// Product-form sample importance of a labeled region under the current
    /// ensemble.
    pub fn importance(
        &mut self,
        image: &ImageRepresentation,
        roi: Rect,
        target: i32,
        to_base_classifier: Option<usize>,
    ) -> f32 {
        let upto = to_base_classifier.unwrap_or(self.num_base_classifier);
        let mut importance = 1.0f32;
        for cur in 0..upto {
            let error = (self.selectors[cur].eval(&mut self.pool, image, roi)) != target;
            if error {
                importance /= 2.0 * self.selectors[cur].error(None);
            } else {
                importance /= 2.0 * (1.0 - self.selectors[cur].error(None));
            }
        }
        importance / upto as f32
    }

    pub fn reset_weight_distribution(&mut self) {
        for selector in &mut self.selectors {
            for cur in 0..selector.num_all_classifier() {
                selector.set_w_correct(cur, 1.0);
                selector.set_w_wrong(cur, 1.0);
            }
        }
    }
}

impl StrongClassifier for StrongClassifierDirectSelection {
    fn num_base_classifier(&self) -> usize {
        self.num_base_classifier
    }

    fn eval(&mut self, image: &ImageRepresentation, roi: Rect) -> f32 {
        let mut value = 0.0f32;
        for cur in 0..self.num_base_classifier {
            value +=
                self.selectors[cur].eval(&mut self.pool, image, roi) as f32 * self.alpha[cur];
        }
        value
    }

    fn sum_alpha(&self, to_base_classifier: Option<usize>) -> f32 {
        sum_alpha_upto(&self.alpha, to_base_classifier)
    }
}

/*------------------------------------------------------------------------------
 * StrongClassifierStandard
 *------------------------------------------------------------------------------*/

/// Every stage owns an independent feature pool; stages train, select and
/// exchange sequentially with importance propagated in between.
pub struct StrongClassifierStandard {
    num_base_classifier: usize,
    patch_size: Size,
    use_feature_exchange: bool,
    selectors: Vec<BaseClassifier>,
    pools: Vec<ClassifierPool>,
    alpha: Vec<f32>,
    error_mask: Vec<bool>,
    errors: Vec<f32>,
}

impl StrongClassifierStandard {
    pub fn new<R: Rng>(
        num_base_classifier: usize,
        num_weak_classifier: usize,
        patch_size: Size,
        use_feature_exchange: bool,
        iteration_init: usize,
        rng: &mut R,
    ) -> Self {
        let num_all = num_weak_classifier + iteration_init;
        Self {
            num_base_classifier,
            patch_size,
            use_feature_exchange,
            selectors: (0..num_base_classifier)
                .map(|_| BaseClassifier::new(num_weak_classifier, iteration_init))
                .collect(),
            pools: (0..num_base_classifier)
                .map(|_| ClassifierPool::new(num_all, patch_size, rng))
                .collect(),
            alpha: vec![0.0; num_base_classifier],
            error_mask: vec![false; num_all],
            errors: vec![0.0; num_all],
        }
    }

    /// One supervised boosting round on a labeled region.
    pub fn update<R: Rng>(
        &mut self,
        image: &ImageRepresentation,
        roi: Rect,
        target: i32,
        importance: f32,
        rng: &mut R,
    ) {
        let mut importance = importance;
        for cur in 0..self.num_base_classifier {
            self.error_mask.fill(false);
            self.errors.fill(0.0);

            self.selectors[cur].train(
                &mut self.pools[cur],
                image,
                roi,
                target,
                importance,
                &mut self.error_mask,
                rng,
            );
            let selected = self.selectors[cur].select_best_classifier(
                &self.error_mask,
                importance,
                &mut self.errors,
            );

            self.alpha[cur] = stage_alpha(self.errors[selected]);
            importance = reweight(importance, self.errors[selected], self.error_mask[selected]);

            if self.use_feature_exchange {
                self.selectors[cur].replace_weakest_classifier(
                    &mut self.pools[cur],
                    &self.errors,
                    self.patch_size,
                    rng,
                );
            }
        }
    }

    pub fn feature_value(
        &mut self,
        image: &ImageRepresentation,
        roi: Rect,
        base_classifier_idx: usize,
    ) -> f32 {
        self.selectors[base_classifier_idx].value(
            &mut self.pools[base_classifier_idx],
            image,
            roi,
            None,
        )
    }

    pub fn reset_weight_distribution(&mut self) {
        for selector in &mut self.selectors {
            for cur in 0..selector.num_all_classifier() {
                selector.set_w_correct(cur, 1.0);
                selector.set_w_wrong(cur, 1.0);
            }
        }
    }
}

impl StrongClassifier for StrongClassifierStandard {
    fn num_base_classifier(&self) -> usize {
        self.num_base_classifier
    }

    fn eval(&mut self, image: &ImageRepresentation, roi: Rect) -> f32 {
        let mut value = 0.0f32;
        for cur in 0..self.num_base_classifier {
            value +=
                self.selectors[cur].eval(&mut self.pools[cur], image, roi) as f32 * self.alpha[cur];
        }
        value
    }

    fn sum_alpha(&self, to_base_classifier: Option<usize>) -> f32 {
        sum_alpha_upto(&self.alpha, to_base_classifier)
    }
}

/*------------------------------------------------------------------------------
 * StrongClassifierStandardSemi
 *------------------------------------------------------------------------------*/

/// Semi-supervised variant of the standard classifier: instead of a ground
/// truth label, each stage derives a pseudo-label and pseudo-importance
/// from the disagreement between a prior confidence and the running
/// ensemble score.
pub struct StrongClassifierStandardSemi {
    num_base_classifier: usize,
    patch_size: Size,
    use_feature_exchange: bool,
    selectors: Vec<BaseClassifier>,
    pools: Vec<ClassifierPool>,
    alpha: Vec<f32>,
    error_mask: Vec<bool>,
    errors: Vec<f32>,
    pseudo_target: Vec<i32>,
    pseudo_lambda: Vec<f32>,
}

impl StrongClassifierStandardSemi {
    pub fn new<R: Rng>(
        num_base_classifier: usize,
        num_weak_classifier: usize,
        patch_size: Size,
        use_feature_exchange: bool,
        iteration_init: usize,
        rng: &mut R,
    ) -> Self {
        let num_all = num_weak_classifier + iteration_init;
        Self {
            num_base_classifier,
            patch_size,
            use_feature_exchange,
            selectors: (0..num_base_classifier)
                .map(|_| BaseClassifier::new(num_weak_classifier, iteration_init))
                .collect(),
            pools: (0..num_base_classifier)
                .map(|_| ClassifierPool::new(num_all, patch_size, rng))
                .collect(),
            alpha: vec![0.0; num_base_classifier],
            error_mask: vec![false; num_all],
            errors: vec![0.0; num_all],
            pseudo_target: vec![0; num_base_classifier],
            pseudo_lambda: vec![0.0; num_base_classifier],
        }
    }

    /// One semi-supervised boosting round. `prior_confidence` is typically
    /// the normalized score of an independently trained classifier; +1/-1
    /// recover near-supervised behavior during initialization.
    pub fn update_semi<R: Rng>(
        &mut self,
        image: &ImageRepresentation,
        roi: Rect,
        prior_confidence: f32,
        rng: &mut R,
    ) {
        const SCALE_FACTOR: f32 = 2.0;

        let mut value = 0.0f32;
        let mut running_alpha = 0.0f32;

        for cur in 0..self.num_base_classifier {
            self.error_mask.fill(false);
            self.errors.fill(0.0);

            // The denominator picks up the alphas already refreshed by the
            // earlier stages of this very round.
            let kvalue = if running_alpha > 0.0 {
                value / self.sum_alpha(None)
            } else {
                0.0
            };

            let combined_decision =
                (SCALE_FACTOR * prior_confidence).tanh() - (SCALE_FACTOR * kvalue).tanh();
            let target = if combined_decision >= 0.0 { 1 } else { -1 };
            let lambda = combined_decision.abs();

            self.pseudo_target[cur] = target;
            self.pseudo_lambda[cur] = lambda;

            self.selectors[cur].train(
                &mut self.pools[cur],
                image,
                roi,
                target,
                lambda,
                &mut self.error_mask,
                rng,
            );
            let selected = self.selectors[cur].select_best_classifier(
                &self.error_mask,
                lambda,
                &mut self.errors,
            );

            value +=
                self.selectors[cur].eval(&mut self.pools[cur], image, roi) as f32 * self.alpha[cur];
            running_alpha += self.alpha[cur];

            self.alpha[cur] = stage_alpha(self.errors[selected]);

            if self.use_feature_exchange {
                self.selectors[cur].replace_weakest_classifier(
                    &mut self.pools[cur],
                    &self.errors,
                    self.patch_size,
                    rng,
                );
            }
        }
    }

    /// Pseudo-labels chosen by each stage during the last update round.
    pub fn pseudo_targets(&self) -> &[i32] {
        &self.pseudo_target
    }

    /// Pseudo-importances chosen by each stage during the last update round.
    pub fn pseudo_lambdas(&self) -> &[f32] {
        &self.pseudo_lambda
    }

    pub fn reset_weight_distribution(&mut self) {
        for selector in &mut self.selectors {
            for cur in 0..selector.num_all_classifier() {
                selector.set_w_correct(cur, 1.0);
                selector.set_w_wrong(cur, 1.0);
            }
        }
    }
}

impl StrongClassifier for StrongClassifierStandardSemi {
    fn num_base_classifier(&self) -> usize {
        self.num_base_classifier
    }

    fn eval(&mut self, image: &ImageRepresentation, roi: Rect) -> f32 {
        let mut value = 0.0f32;
        for cur in 0..self.num_base_classifier {
            value +=
                self.selectors[cur].eval(&mut self.pools[cur], image, roi) as f32 * self.alpha[cur];
        }
        value
    }

    fn sum_alpha(&self, to_base_classifier: Option<usize>) -> f32 {
        sum_alpha_upto(&self.alpha, to_base_classifier)
    }
}
