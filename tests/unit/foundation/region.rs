use super::*;

fn rect(x: i32, y: i32, w: i32, h: i32) -> IntRect {
    IntRect::new(x, y, w, h)
}

#[test]
fn union_of_overlapping_rects_counts_shared_pixels_once() {
    let mut r = Region::from_rect(rect(0, 0, 10, 10));
    r.union_rect(rect(5, 5, 10, 10));
    assert_eq!(r.area(), 100 + 100 - 25);
    assert_eq!(r.bounds(), rect(0, 0, 15, 15));
    assert!(r.contains_rect(rect(12, 12, 3, 3)));
    assert!(!r.contains_rect(rect(12, 0, 3, 3)));
}

#[test]
fn subtract_punches_holes() {
    let mut r = Region::from_rect(rect(0, 0, 10, 10));
    r.subtract_rect(rect(2, 2, 3, 3));
    assert_eq!(r.area(), 91);
    assert!(!r.intersects_rect(rect(3, 3, 1, 1)));
    assert!(r.contains_rect(rect(0, 0, 10, 2)));
}

#[test]
fn adjacent_pieces_are_merged() {
    let mut r = Region::new();
    r.union_rect(rect(0, 0, 10, 5));
    r.union_rect(rect(0, 5, 10, 5));
    assert_eq!(r.rect_count(), 1);
    assert_eq!(r, Region::from_rect(rect(0, 0, 10, 10)));
}

#[test]
fn empty_rect_is_never_contained() {
    let r = Region::from_rect(rect(0, 0, 10, 10));
    assert!(!r.contains_rect(IntRect::default()));
    assert!(!Region::new().contains_rect(rect(0, 0, 1, 1)));
}

#[test]
fn equality_ignores_decomposition() {
    let mut a = Region::new();
    a.union_rect(rect(0, 0, 4, 4));
    a.union_rect(rect(4, 0, 4, 2));
    let mut b = Region::new();
    b.union_rect(rect(0, 0, 8, 2));
    b.union_rect(rect(0, 2, 4, 2));
    assert_eq!(a, b);
    b.union_rect(rect(100, 100, 1, 1));
    assert_ne!(a, b);
}

#[test]
fn intersect_keeps_overlap_only() {
    let mut a = Region::from_rect(rect(0, 0, 10, 10));
    a.union_rect(rect(20, 0, 10, 10));
    a.intersect_rect(rect(5, 0, 20, 5));
    assert_eq!(a.area(), 25 + 25);

    let mut b = Region::from_rect(rect(0, 0, 10, 10));
    b.intersect(&Region::from_rect(rect(8, 8, 10, 10)));
    assert_eq!(b, Region::from_rect(rect(8, 8, 2, 2)));
}
