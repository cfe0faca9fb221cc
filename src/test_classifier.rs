use crate::base_classifier::{BaseClassifier, ClassifierPool};
use crate::image::ImageRepresentation;
use crate::rect::{Rect, Size};
use crate::strong_classifier::{
    StrongClassifier, StrongClassifierDirectSelection, StrongClassifierStandard,
    StrongClassifierStandardSemi,
};
use nearly_eq::assert_nearly_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

const PATCH: Size = Size {
    height: 20,
    width: 20,
};

/// 30x60 frame: a high-contrast checkerboard at (5,5) and a flat gray
/// region at (5,35), both of patch size.
fn two_class_image() -> (ImageRepresentation, Rect, Rect) {
    let size = Size::new(30, 60);
    let mut image = vec![128u8; size.area() as usize];
    for row in 0..20 {
        for col in 0..20 {
            let dark = ((row / 5) + (col / 5)) % 2 == 0;
            image[((row + 5) * 60 + col + 5) as usize] = if dark { 0 } else { 255 };
        }
    }
    let rep = ImageRepresentation::new(&image, size);
    (rep, Rect::new(5, 5, 20, 20), Rect::new(5, 35, 20, 20))
}

#[test]
fn test_base_classifier_error_bounds() {
    let mut rng = StdRng::seed_from_u64(11);
    let base = BaseClassifier::new(10, 5);
    let mut pool = ClassifierPool::new(base.num_all_classifier(), PATCH, &mut rng);
    let (image, pos, neg) = two_class_image();

    let mut error_mask = vec![false; base.num_all_classifier()];
    for _ in 0..10 {
        base.train(&mut pool, &image, pos, 1, 1.0, &mut error_mask, &mut rng);
        base.train(&mut pool, &image, neg, -1, 1.0, &mut error_mask, &mut rng);
    }

    for cur in 0..base.num_all_classifier() {
        let error = base.error(Some(cur));
        assert!((0.0..=1.0).contains(&error));
    }
}

#[test]
fn test_select_best_classifier_picks_lowest_error() {
    let mut base = BaseClassifier::new(4, 2);

    // Slot 2 is clearly the best performer.
    base.set_w_correct(2, 20.0);
    base.set_w_wrong(2, 1.0);

    let error_mask = vec![false; base.num_all_classifier()];
    let mut errors = vec![0.0; base.num_all_classifier()];
    let selected = base.select_best_classifier(&error_mask, 1.0, &mut errors);

    assert_eq!(selected, 2);
    assert_eq!(base.selected_classifier(), 2);
    assert_nearly_eq!(errors[2], 1.0 / 22.0, 1e-5);
}

#[test]
fn test_select_best_classifier_skips_claimed_slots() {
    let mut base = BaseClassifier::new(4, 2);
    base.set_w_correct(2, 20.0);
    base.set_w_wrong(2, 1.0);
    base.set_w_correct(3, 10.0);
    base.set_w_wrong(3, 1.0);

    let error_mask = vec![false; base.num_all_classifier()];
    let mut errors = vec![0.0; base.num_all_classifier()];
    errors[2] = f32::MAX;
    let selected = base.select_best_classifier(&error_mask, 1.0, &mut errors);

    assert_eq!(selected, 3);
    assert_eq!(errors[2], f32::MAX);
}

#[test]
fn test_replace_weakest_classifier() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut base = BaseClassifier::new(4, 2);
    let mut pool = ClassifierPool::new(base.num_all_classifier(), PATCH, &mut rng);

    // Slot 1 is the weakest active slot; the spare in rotation (slot 5)
    // carries a lower error, so the exchange fires.
    let errors = [0.1, 0.8, 0.2, 0.3, 0.5, 0.5];
    base.set_w_correct(1, 1.0);
    base.set_w_wrong(1, 4.0);

    let replaced = base.replace_weakest_classifier(&mut pool, &errors, PATCH, &mut rng);

    assert_eq!(replaced, Some(1));
    assert_eq!(base.idx_of_new_weak_classifier(), 5);
    // The vacated spare statistics are reset to the uninformed prior.
    assert_nearly_eq!(base.error(Some(5)), 0.5);
}

#[test]
fn test_replace_weakest_never_replaces_selected() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut base = BaseClassifier::new(4, 2);
    let mut pool = ClassifierPool::new(base.num_all_classifier(), PATCH, &mut rng);

    // The selected slot carries the worst error but must survive.
    let error_mask = vec![false; base.num_all_classifier()];
    let mut errors = vec![0.0; base.num_all_classifier()];
    base.set_w_correct(0, 20.0);
    base.set_w_wrong(0, 1.0);
    base.select_best_classifier(&error_mask, 1.0, &mut errors);
    assert_eq!(base.selected_classifier(), 0);

    let errors = [0.9, 0.1, 0.1, 0.1, 0.05, 0.05];
    let replaced = base.replace_weakest_classifier(&mut pool, &errors, PATCH, &mut rng);
    assert_ne!(replaced, Some(0));
}

#[test]
fn test_replace_classifier_statistic() {
    let mut base = BaseClassifier::new(4, 2);
    base.set_w_correct(4, 7.0);
    base.set_w_wrong(4, 3.0);
    base.set_w_correct(2, 100.0);
    base.set_w_wrong(2, 100.0);

    base.replace_classifier_statistic(4, 2);
    assert_nearly_eq!(base.error(Some(2)), 0.3);
    assert_nearly_eq!(base.error(Some(4)), 0.5);
}

#[test]
fn test_direct_selection_separates_classes() {
    let mut rng = StdRng::seed_from_u64(21);
    let (image, pos, neg) = two_class_image();
    let mut classifier = StrongClassifierDirectSelection::new(5, 50, PATCH, true, 10, &mut rng);

    for _ in 0..30 {
        classifier.update(&image, neg, -1, 1.0, &mut rng);
        classifier.update(&image, pos, 1, 1.0, &mut rng);
    }

    assert!(classifier.sum_alpha(None) > 0.0);
    let pos_score = classifier.eval(&image, pos);
    let neg_score = classifier.eval(&image, neg);
    assert!(pos_score.is_finite() && neg_score.is_finite());
    assert!(pos_score > neg_score);
}

#[test]
fn test_direct_selection_partial_sum_alpha() {
    let mut rng = StdRng::seed_from_u64(22);
    let (image, pos, neg) = two_class_image();
    let mut classifier = StrongClassifierDirectSelection::new(4, 40, PATCH, false, 5, &mut rng);

    for _ in 0..10 {
        classifier.update(&image, pos, 1, 1.0, &mut rng);
        classifier.update(&image, neg, -1, 1.0, &mut rng);
    }

    let total = classifier.sum_alpha(None);
    let partial = classifier.sum_alpha(Some(2));
    assert!(partial <= total);
    assert_nearly_eq!(classifier.sum_alpha(Some(4)), total);
}

#[test]
fn test_standard_classifier_trains() {
    let mut rng = StdRng::seed_from_u64(31);
    let (image, pos, neg) = two_class_image();
    let mut classifier = StrongClassifierStandard::new(3, 20, PATCH, true, 5, &mut rng);

    for _ in 0..20 {
        classifier.update(&image, pos, 1, 1.0, &mut rng);
        classifier.update(&image, neg, -1, 1.0, &mut rng);
    }

    assert!(classifier.sum_alpha(None) >= 0.0);
    assert!(classifier.eval(&image, pos).is_finite());
}

#[test]
fn test_semi_pseudo_targets_follow_prior_on_fresh_ensemble() {
    let mut rng = StdRng::seed_from_u64(41);
    let (image, pos, neg) = two_class_image();
    let mut classifier = StrongClassifierStandardSemi::new(3, 20, PATCH, true, 5, &mut rng);

    // With zero accumulated alpha the combined decision reduces to the
    // prior alone.
    classifier.update_semi(&image, pos, 1.0, &mut rng);
    assert!(classifier.pseudo_targets().iter().all(|&t| t == 1));
    for &lambda in classifier.pseudo_lambdas() {
        assert_nearly_eq!(lambda, 2.0f32.tanh(), 1e-4);
    }

    let mut classifier = StrongClassifierStandardSemi::new(3, 20, PATCH, true, 5, &mut rng);
    classifier.update_semi(&image, neg, -1.0, &mut rng);
    assert!(classifier.pseudo_targets().iter().all(|&t| t == -1));
}

#[test]
fn test_semi_normalizes_score_per_stage() {
    let mut rng = StdRng::seed_from_u64(43);
    let (image, pos, neg) = two_class_image();
    let mut classifier = StrongClassifierStandardSemi::new(4, 30, PATCH, true, 5, &mut rng);

    for _ in 0..30 {
        classifier.update_semi(&image, neg, -1.0, &mut rng);
        classifier.update_semi(&image, pos, 1.0, &mut rng);
    }
    assert!(classifier.sum_alpha(None) > 0.0);

    // A further positive-prior round on a recognized region: stage 0 sees a
    // zero running score, so its pseudo-importance is the full tanh(2);
    // every later stage normalizes by the alphas as refreshed within the
    // round, and the positive running score shrinks its importance.
    classifier.update_semi(&image, pos, 1.0, &mut rng);
    let lambdas = classifier.pseudo_lambdas().to_vec();
    assert_nearly_eq!(lambdas[0], 2.0f32.tanh(), 1e-4);
    for &lambda in &lambdas[1..] {
        assert!(lambda <= lambdas[0] + 1e-4);
        assert!((0.0..=2.0).contains(&lambda));
    }
    assert!(classifier.pseudo_targets().iter().all(|&t| t == 1 || t == -1));
}

#[test]
fn test_reset_weight_distribution() {
    let mut rng = StdRng::seed_from_u64(51);
    let (image, pos, _) = two_class_image();
    let mut classifier = StrongClassifierDirectSelection::new(2, 10, PATCH, false, 2, &mut rng);
    classifier.update(&image, pos, 1, 1.0, &mut rng);
    classifier.reset_weight_distribution();
    // No panic and still evaluable afterwards.
    assert!(classifier.eval(&image, pos).is_finite());
}
