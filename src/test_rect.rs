use crate::rect::{Point2D, Rect, Size};

#[test]
fn test_union() {
    let a = Rect::new(0, 0, 10, 10);
    let b = Rect::new(5, 5, 10, 20);
    let u = a.union(b);
    assert_eq!(u, Rect::new(0, 0, 15, 25));
    assert_eq!(a.union(a), a);
}

#[test]
fn test_scaled_clamps_origin() {
    let r = Rect::new(2, 2, 10, 10);
    let s = r.scaled(2.0);
    assert_eq!(s.upper, 0);
    assert_eq!(s.left, 0);
    assert_eq!(s.height, 20);
    assert_eq!(s.width, 20);

    let r = Rect::new(40, 40, 10, 10);
    let s = r.scaled(2.0);
    assert_eq!(s, Rect::new(35, 35, 20, 20));
}

#[test]
fn test_is_valid() {
    let roi = Rect::new(0, 0, 100, 100);
    assert!(Rect::new(0, 0, 100, 100).is_valid(roi));
    assert!(Rect::new(10, 10, 20, 20).is_valid(roi));
    assert!(!Rect::new(-1, 0, 20, 20).is_valid(roi));
    assert!(!Rect::new(90, 90, 20, 20).is_valid(roi));
}

#[test]
fn test_overlap() {
    let a = Rect::new(0, 0, 10, 10);
    assert_eq!(a.overlap(Rect::new(5, 5, 10, 10)), 25);
    assert_eq!(a.overlap(Rect::new(10, 10, 5, 5)), 0);
    assert_eq!(a.overlap(a), 100);
}

#[test]
fn test_point_arithmetic() {
    let r = Rect::new(5, 6, 10, 10);
    let p = Point2D::new(2, 3);
    assert_eq!(r + p, Rect::new(7, 9, 10, 10));
    assert_eq!((r + p) - p, r);
}

#[test]
fn test_conversions() {
    let size = Size::new(4, 8);
    assert_eq!(Rect::from(size), Rect::new(0, 0, 4, 8));
    assert_eq!(size.area(), 32);

    let r = Rect::new(3, 4, 5, 6);
    assert_eq!(Size::from(r), Size::new(5, 6));
    assert_eq!(Point2D::from(r), Point2D::new(3, 4));
    assert_eq!(r.center(), Point2D::new(5, 7));
}

#[test]
fn test_invalid_sentinel() {
    assert!(Rect::INVALID.is_invalid());
    assert!(!Rect::new(0, 0, 1, 1).is_invalid());
}
