use crate::gauss::EstimatedGauss;
use crate::haar::FeatureHaar;
use crate::image::ImageRepresentation;
use crate::rect::{Rect, Size};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn gradient_image(size: Size) -> Vec<u8> {
    let mut image = vec![0u8; size.area() as usize];
    for row in 0..size.height {
        for col in 0..size.width {
            image[(row * size.width + col) as usize] = ((row * 5 + col * 3) % 256) as u8;
        }
    }
    image
}

#[test]
fn test_generated_features_evaluate_at_native_size() {
    let patch_size = Size::new(24, 24);
    let image_size = Size::new(40, 40);
    let image = gradient_image(image_size);
    let rep = ImageRepresentation::new(&image, image_size);
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let mut feature = FeatureHaar::generate(patch_size, &mut rng);
        let response = feature.eval(&rep, Rect::new(3, 5, 24, 24));
        assert!(response.is_some());
        assert!(response.unwrap().is_finite());
        assert_eq!(feature.response(), response.unwrap());
    }
}

#[test]
fn test_zero_response_on_uniform_patch() {
    // Bipartite and quad templates are zero-sum over a constant raster; the
    // ring is the only shape with a nonzero weight sum, and even its
    // normalized response stays bounded.
    let patch_size = Size::new(20, 20);
    let image_size = Size::new(30, 30);
    let image = vec![128u8; image_size.area() as usize];
    let rep = ImageRepresentation::new(&image, image_size);
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..100 {
        let mut feature = FeatureHaar::generate(patch_size, &mut rng);
        let response = feature
            .eval(&rep, Rect::new(0, 0, 20, 20))
            .expect("native size always rescales");
        assert!(response.abs() <= 8.0 * 128.0 + 1.0);
    }
}

#[test]
fn test_rescale_failure_is_sticky() {
    let patch_size = Size::new(20, 20);
    let image_size = Size::new(30, 30);
    let image = gradient_image(image_size);
    let rep = ImageRepresentation::new(&image, image_size);
    let mut rng = StdRng::seed_from_u64(3);

    let mut feature = FeatureHaar::generate(patch_size, &mut rng);

    // A 3x3 region shrinks every sub-rectangle below the minimum size.
    assert!(feature.eval(&rep, Rect::new(0, 0, 3, 3)).is_none());
    assert!(feature.eval(&rep, Rect::new(5, 5, 3, 3)).is_none());

    // Returning to the native size recovers the feature.
    assert!(feature.eval(&rep, Rect::new(0, 0, 20, 20)).is_some());
}

#[test]
fn test_initial_distribution_seeds_gauss() {
    let mut rng = StdRng::seed_from_u64(9);
    let feature = FeatureHaar::generate(Size::new(20, 20), &mut rng);

    let mut gauss = EstimatedGauss::new();
    feature.initial_distribution(&mut gauss);
    assert!(gauss.sigma() > 0.0);
    assert!(gauss.mean() <= 0.0);
}
