use super::*;

#[test]
fn untouched_canvas_is_solid_transparent() {
    let c = AnalysisCanvas::new(10, 10);
    assert_eq!(c.color_if_solid(), Some(Color::TRANSPARENT));
    assert!(c.is_transparent());
    assert!(!c.has_text());
}

#[test]
fn full_cover_opaque_rect_is_solid() {
    let mut c = AnalysisCanvas::new(10, 10);
    c.draw_rect(Rect::new(-1.0, -1.0, 11.0, 11.0), &Paint::fill(Color::RED));
    assert_eq!(c.color_if_solid(), Some(Color::RED));

    c.draw_color(Color::WHITE, BlendMode::SrcOver);
    assert_eq!(c.color_if_solid(), Some(Color::WHITE));
}

#[test]
fn partial_cover_is_not_solid() {
    let mut c = AnalysisCanvas::new(10, 10);
    c.draw_rect(Rect::new(0.0, 0.0, 5.0, 10.0), &Paint::fill(Color::RED));
    assert_eq!(c.color_if_solid(), None);
}

#[test]
fn clipped_fill_is_not_solid_but_missed_draws_are_ignored() {
    let mut c = AnalysisCanvas::new(10, 10);
    c.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0), ClipOp::Intersect);
    c.draw_rect(Rect::new(6.0, 6.0, 9.0, 9.0), &Paint::fill(Color::RED));
    assert!(c.is_transparent());
    c.draw_color(Color::WHITE, BlendMode::Src);
    assert_eq!(c.color_if_solid(), None);
}

#[test]
fn translucent_over_transparent_stays_solid() {
    let mut c = AnalysisCanvas::new(4, 4);
    let half = Color::rgba(0, 0, 255, 128);
    c.draw_color(half, BlendMode::SrcOver);
    assert_eq!(c.color_if_solid(), Some(half));
    c.draw_color(half, BlendMode::SrcOver);
    assert_eq!(c.color_if_solid(), None);
}

#[test]
fn text_and_paths_break_solidity() {
    let mut c = AnalysisCanvas::new(10, 10);
    c.draw_text("x", Point::new(1.0, 9.0), 8.0, &Paint::fill(Color::BLACK));
    assert!(c.has_text());
    assert_eq!(c.color_if_solid(), None);

    let mut c = AnalysisCanvas::new(10, 10);
    let path = kurbo::Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
    c.draw_path(&path, &Paint::fill(Color::BLACK));
    assert_eq!(c.color_if_solid(), None);
}

#[test]
fn scaled_rect_covering_device_counts_as_full() {
    let mut c = AnalysisCanvas::new(20, 20);
    c.scale(2.0, 2.0);
    c.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::fill(Color::BLACK));
    assert_eq!(c.color_if_solid(), Some(Color::BLACK));
}
