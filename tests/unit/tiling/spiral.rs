use super::*;
use crate::foundation::core::IntSize;
use std::collections::BTreeSet;

fn tiling(max: i32, width: i32, height: i32) -> TilingData {
    TilingData::new(IntSize::new(max, max), IntSize::new(width, height), 0)
}

fn forward(t: &TilingData, consider: IntRect, ignore: IntRect, center: IntRect) -> Vec<TileIndex> {
    t.spiral_iter(consider, ignore, center).collect()
}

fn reverse(t: &TilingData, consider: IntRect, ignore: IntRect, center: IntRect) -> Vec<TileIndex> {
    t.reverse_spiral_iter(consider, ignore, center).collect()
}

#[test]
fn spiral_walks_around_the_center_tile() {
    let t = tiling(10, 30, 30);
    let full = IntRect::new(0, 0, 30, 30);
    let got = forward(&t, full, IntRect::default(), IntRect::new(10, 10, 10, 10));
    assert_eq!(
        got,
        vec![(2, 1), (2, 0), (1, 0), (0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]
    );
}

#[test]
fn reverse_spiral_ends_next_to_the_center() {
    let t = tiling(10, 30, 30);
    let full = IntRect::new(0, 0, 30, 30);
    let got = reverse(&t, full, IntRect::default(), IntRect::new(10, 10, 10, 10));
    assert_eq!(
        got,
        vec![(2, 2), (1, 2), (0, 2), (0, 1), (0, 0), (1, 0), (2, 0), (2, 1)]
    );
}

#[test]
fn spiral_visits_the_difference_minus_the_center() {
    let t = tiling(10, 100, 100);
    let consider = IntRect::new(15, 5, 70, 80);
    let ignore = IntRect::new(40, 40, 20, 20);
    let center = IntRect::new(25, 25, 1, 1);

    let spiral: Vec<TileIndex> = forward(&t, consider, ignore, center);
    let unique: BTreeSet<TileIndex> = spiral.iter().copied().collect();
    assert_eq!(unique.len(), spiral.len());

    let expected: BTreeSet<TileIndex> = t
        .difference_iter(consider, ignore)
        .filter(|&tile| tile != (2, 2))
        .collect();
    assert_eq!(unique, expected);
}

#[test]
fn spiral_yields_nothing_for_degenerate_input() {
    let t = tiling(10, 30, 30);
    let full = IntRect::new(0, 0, 30, 30);
    let center = IntRect::new(10, 10, 10, 10);

    let empty_tiling = tiling(10, 0, 0);
    assert!(forward(&empty_tiling, full, IntRect::default(), center).is_empty());
    assert!(reverse(&empty_tiling, full, IntRect::default(), center).is_empty());

    assert!(forward(&t, IntRect::default(), IntRect::default(), center).is_empty());
    assert!(forward(&t, full, full, center).is_empty());
    assert!(reverse(&t, full, IntRect::new(-5, -5, 50, 50), center).is_empty());
}

#[test]
fn empty_center_starts_from_the_top_left() {
    let t = tiling(10, 30, 30);
    let full = IntRect::new(0, 0, 30, 30);
    let got = forward(&t, full, IntRect::default(), IntRect::default());
    assert_eq!(got.len(), 9);
    assert_eq!(got[0], (0, 0));
}

#[test]
fn reverse_is_forward_reversed() {
    let t = tiling(10, 100, 80);
    let cases = [
        // consider, ignore, center
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::default(),
            IntRect::new(45, 35, 1, 1),
        ),
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::new(30, 20, 30, 30),
            IntRect::new(45, 35, 10, 10),
        ),
        (
            IntRect::new(10, 10, 50, 40),
            IntRect::new(0, 0, 25, 100),
            IntRect::new(90, 70, 5, 5),
        ),
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::default(),
            IntRect::default(),
        ),
        // Center entirely outside the tiling on each side.
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::new(20, 20, 10, 10),
            IntRect::new(-50, 30, 10, 10),
        ),
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::default(),
            IntRect::new(150, 30, 10, 10),
        ),
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::default(),
            IntRect::new(30, -70, 10, 10),
        ),
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::new(0, 0, 100, 10),
            IntRect::new(30, 200, 10, 10),
        ),
        // Center covering everything.
        (
            IntRect::new(0, 0, 100, 80),
            IntRect::default(),
            IntRect::new(-10, -10, 200, 200),
        ),
        // Ignore containing the center.
        (
            IntRect::new(20, 10, 60, 60),
            IntRect::new(30, 20, 40, 40),
            IntRect::new(45, 35, 1, 1),
        ),
    ];

    for (consider, ignore, center) in cases {
        let mut fwd = forward(&t, consider, ignore, center);
        let rev = reverse(&t, consider, ignore, center);
        fwd.reverse();
        assert_eq!(rev, fwd, "consider {consider:?} ignore {ignore:?} center {center:?}");
    }
}
