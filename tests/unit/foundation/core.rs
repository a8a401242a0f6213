use super::*;

#[test]
fn negative_sizes_clamp_to_empty() {
    let r = IntRect::new(5, 5, -3, 4);
    assert_eq!(r.width, 0);
    assert!(r.is_empty());
    assert_eq!(IntSize::new(-1, 7), IntSize::new(0, 7));
}

#[test]
fn empty_rects_never_intersect() {
    let a = IntRect::new(0, 0, 10, 10);
    assert!(!a.intersects(IntRect::new(5, 5, 0, 3)));
    assert!(a.intersects(IntRect::new(9, 9, 1, 1)));
    assert!(!a.intersects(IntRect::new(10, 0, 1, 1)));
}

#[test]
fn intersection_and_union_follow_bounds() {
    let a = IntRect::new(0, 0, 10, 10);
    let b = IntRect::new(5, 6, 10, 10);
    assert_eq!(a.intersection(b), IntRect::new(5, 6, 5, 4));
    assert_eq!(a.union_with(b), IntRect::new(0, 0, 15, 16));
    assert_eq!(a.union_with(IntRect::default()), a);
    assert_eq!(IntRect::default().union_with(b), b);
    assert_eq!(a.intersection(IntRect::new(20, 20, 1, 1)), IntRect::default());
}

#[test]
fn subtract_only_when_result_is_a_rect() {
    let mut a = IntRect::new(0, 0, 10, 10);
    a.subtract(IntRect::new(-5, -5, 10, 20));
    assert_eq!(a, IntRect::new(5, 0, 5, 10));

    let mut b = IntRect::new(0, 0, 10, 10);
    b.subtract(IntRect::new(2, 2, 2, 2));
    assert_eq!(b, IntRect::new(0, 0, 10, 10));

    let mut c = IntRect::new(0, 0, 10, 10);
    c.subtract(IntRect::new(-1, 6, 12, 10));
    assert_eq!(c, IntRect::new(0, 0, 10, 6));

    let mut d = IntRect::new(0, 0, 10, 10);
    d.subtract(IntRect::new(-1, -1, 12, 12));
    assert!(d.is_empty());
}

#[test]
fn inset_grows_with_negative_amounts() {
    let mut r = IntRect::new(10, 10, 5, 5);
    r.inset(-2, -3, -4, -5);
    assert_eq!(r, IntRect::new(8, 7, 11, 13));
    assert_eq!(
        IntRect::new(0, 0, 1, 1).outset(8000),
        IntRect::new(-8000, -8000, 16001, 16001)
    );
}

#[test]
fn difference_pieces_cover_exactly_the_remainder() {
    let a = IntRect::new(0, 0, 10, 10);
    let hole = IntRect::new(3, 4, 2, 2);
    let pieces: Vec<IntRect> = a.difference(hole).collect();
    let area: i64 = pieces.iter().map(|p| p.area()).sum();
    assert_eq!(area, 100 - 4);
    for (i, p) in pieces.iter().enumerate() {
        assert!(!p.intersects(hole));
        for q in &pieces[i + 1..] {
            assert!(!p.intersects(*q));
        }
    }
}

#[test]
fn scale_to_enclosing_and_enclosed_round_outward_and_inward() {
    let r = IntRect::new(1, 1, 3, 3);
    assert_eq!(r.scale_to_enclosing(0.5), IntRect::new(0, 0, 2, 2));
    assert_eq!(r.scale_to_enclosed(0.5), IntRect::new(1, 1, 1, 1));
    assert_eq!(r.scale_to_enclosing(2.0), IntRect::new(2, 2, 6, 6));
}

#[test]
fn premul_scales_channels_by_alpha() {
    assert_eq!(Color::rgba(255, 0, 0, 255).to_premul(), [255, 0, 0, 255]);
    assert_eq!(Color::rgba(255, 255, 0, 0).to_premul(), [0, 0, 0, 0]);
    assert_eq!(Color::rgba(255, 0, 0, 128).to_premul(), [128, 0, 0, 128]);
}
