use crate::patches::{Anchor, Patches, PatchesRegularScan, PatchesRegularScaleScan};
use crate::rect::{Rect, Size};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_regular_scan_tiles_roi() {
    let roi = Rect::new(0, 0, 50, 50);
    let patches = PatchesRegularScan::new(roi, roi, Size::new(10, 10), 0.0);

    // Zero overlap: the 50x50 region tiles into a 5x5 grid.
    assert_eq!(patches.num(), 25);
    assert_eq!(patches.patch_grid(), Size::new(5, 5));

    assert_eq!(patches.rect(0), Rect::new(0, 0, 10, 10));
    assert_eq!(patches.rect(4), Rect::new(0, 40, 10, 10));
    assert_eq!(patches.rect(24), Rect::new(40, 40, 10, 10));

    for cur in 0..patches.num() {
        assert!(patches.rect(cur).is_valid(roi));
    }
}

#[test]
fn test_regular_scan_high_overlap() {
    let roi = Rect::new(0, 0, 30, 30);
    let patches = PatchesRegularScan::new(roi, roi, Size::new(10, 10), 0.99);

    // Step is floored at one pixel, so every offset is generated.
    assert_eq!(patches.num(), 21 * 21);
    assert_eq!(patches.rect(1), Rect::new(0, 1, 10, 10));
}

#[test]
fn test_regular_scan_anchors() {
    let roi = Rect::new(5, 5, 40, 60);
    let valid = Rect::new(0, 0, 100, 100);
    let patch_size = Size::new(10, 10);
    let patches = PatchesRegularScan::new(roi, valid, patch_size, 0.5);

    assert_eq!(patches.anchor_rect(Anchor::UpperLeft), Rect::new(5, 5, 10, 10));
    assert_eq!(
        patches.anchor_rect(Anchor::UpperRight),
        Rect::new(5, 55, 10, 10)
    );
    assert_eq!(
        patches.anchor_rect(Anchor::LowerLeft),
        Rect::new(35, 5, 10, 10)
    );
    assert_eq!(
        patches.anchor_rect(Anchor::LowerRight),
        Rect::new(35, 55, 10, 10)
    );
}

#[test]
fn test_regular_scan_clips_to_valid_region() {
    let requested = Rect::new(-5, 90, 30, 30);
    let valid = Rect::new(0, 0, 100, 100);
    let patches = PatchesRegularScan::new(requested, valid, Size::new(5, 5), 0.0);

    let roi = patches.roi();
    assert_eq!(roi.upper, 0);
    assert_eq!(roi.left + roi.width, 100);
    for cur in 0..patches.num() {
        assert!(patches.rect(cur).is_valid(valid));
    }
}

#[test]
fn test_oversized_patch_yields_empty_grid() {
    let roi = Rect::new(0, 0, 20, 20);
    let patches = PatchesRegularScan::new(roi, roi, Size::new(30, 30), 0.0);
    assert_eq!(patches.num(), 0);
    assert_eq!(patches.patch_grid(), Size::new(0, 0));
    assert!(patches.rect(0).is_invalid());

    // Oversized along one axis only.
    let patches = PatchesRegularScan::new(roi, roi, Size::new(30, 10), 0.0);
    assert_eq!(patches.num(), 0);
    assert_eq!(patches.patch_grid().height, 0);
}

#[test]
fn test_rect_out_of_range_is_invalid() {
    let roi = Rect::new(0, 0, 20, 20);
    let patches = PatchesRegularScan::new(roi, roi, Size::new(10, 10), 0.0);
    assert!(patches.rect(patches.num()).is_invalid());
}

#[test]
fn test_random_rect_is_member() {
    let roi = Rect::new(0, 0, 40, 40);
    let patches = PatchesRegularScan::new(roi, roi, Size::new(8, 8), 0.0);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let rect = patches.random_rect(&mut rng);
        assert!((0..patches.num()).any(|cur| patches.rect(cur) == rect));
    }
}

#[test]
fn test_scale_scan_generates_multiple_sizes() {
    let roi = Rect::new(0, 0, 100, 100);
    let patches =
        PatchesRegularScaleScan::new(roi, roi, Size::new(20, 20), 0.5, 1.0, 2.0, 1.25);

    assert!(patches.num() > 0);
    let mut sizes = Vec::new();
    for cur in 0..patches.num() {
        let size = patches.rect(cur).size();
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    assert!(sizes.len() > 1);

    // Only sized anchors are defined for the multi-scale sampler.
    assert!(patches.anchor_rect(Anchor::UpperLeft).is_invalid());
    assert_eq!(
        patches.anchor_rect_sized(Anchor::LowerRight, Size::new(20, 20)),
        Rect::new(80, 80, 20, 20)
    );
}
