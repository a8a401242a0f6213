use super::*;
use crate::canvas::PixelCanvas;

fn fill_painter(color: Color) -> impl FnMut(&mut PictureRecorder, IntRect, PaintingControl) {
    move |rec: &mut PictureRecorder, clip: IntRect, _control: PaintingControl| {
        rec.draw_rect(clip.to_kurbo(), &Paint::fill(color));
    }
}

fn star() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((50.0, 0.0));
    p.line_to((61.0, 35.0));
    p.line_to((98.0, 35.0));
    p.line_to((68.0, 57.0));
    p.line_to((79.0, 91.0));
    p.line_to((50.0, 70.0));
    p.line_to((21.0, 91.0));
    p.line_to((32.0, 57.0));
    p.line_to((2.0, 35.0));
    p.line_to((39.0, 35.0));
    p.close_path();
    p
}

#[test]
fn recording_captures_painter_ops() {
    let mut painter = fill_painter(Color::RED);
    let picture = Picture::record(
        IntRect::new(0, 0, 8, 8),
        &mut painter,
        RecordingMode::Normal,
        None,
    );
    assert_eq!(picture.layer_rect(), IntRect::new(0, 0, 8, 8));
    assert_eq!(picture.approximate_op_count(), 1);
    assert!(matches!(picture.ops()[0], DrawOp::DrawRect { .. }));
    assert!(picture.approximate_memory_usage() >= size_of::<DrawOp>());
    assert!(!picture.has_text());
}

#[test]
fn painting_control_follows_recording_mode() {
    let mut seen = Vec::new();
    let mut painter = |_: &mut PictureRecorder, _: IntRect, control: PaintingControl| {
        seen.push(control);
    };
    for mode in [
        RecordingMode::Normal,
        RecordingMode::PaintingDisabled,
        RecordingMode::CachingDisabled,
        RecordingMode::ConstructionDisabled,
    ] {
        Picture::record(IntRect::new(0, 0, 1, 1), &mut painter, mode, None);
    }
    assert_eq!(
        seen,
        vec![
            PaintingControl::PaintingBehaviorNormal,
            PaintingControl::DisplayListPaintingDisabled,
            PaintingControl::DisplayListCachingDisabled,
            PaintingControl::DisplayListConstructionDisabled,
        ]
    );
}

#[test]
fn raster_clips_to_layer_rect_and_skips_negated_region() {
    let mut painter = |rec: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
        // Deliberately overpaints its own rect.
        rec.draw_color(Color::RED, BlendMode::SrcOver);
    };
    let picture = Picture::record(
        IntRect::new(2, 2, 4, 4),
        &mut painter,
        RecordingMode::Normal,
        None,
    );

    let mut canvas = PixelCanvas::new(16, 16).unwrap();
    let negated = Region::from_rect(IntRect::new(4, 4, 12, 12));
    picture.raster(&mut canvas, &negated, 2.0);

    // Layer rect (2,2,4,4) at scale 2 lands on (4,4,8,8), all of which is negated.
    assert!(canvas.data().iter().all(|b| *b == 0));

    let mut canvas = PixelCanvas::new(16, 16).unwrap();
    picture.raster(&mut canvas, &Region::new(), 2.0);
    assert_eq!(canvas.color_at(4, 4), Some(Color::RED));
    assert_eq!(canvas.color_at(11, 11), Some(Color::RED));
    assert_eq!(canvas.color_at(12, 12), Some(Color::TRANSPARENT));
    assert_eq!(canvas.color_at(3, 3), Some(Color::TRANSPARENT));
    assert_eq!(canvas.clip_bounds(), IntRect::new(0, 0, 16, 16));
}

#[test]
fn many_concave_anti_aliased_paths_veto_gpu() {
    let star = star();
    let record = |count: usize, paint: Paint, path: BezPath| {
        let mut painter = move |rec: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
            for _ in 0..count {
                rec.draw_path(&path, &paint);
            }
        };
        Picture::record(
            IntRect::new(0, 0, 100, 100),
            &mut painter,
            RecordingMode::Normal,
            None,
        )
    };
    let aa = Paint::fill(Color::BLACK).anti_aliased();

    assert!(record(5, aa, star.clone()).is_suitable_for_gpu_rasterization());
    let vetoed = record(6, aa, star.clone());
    assert!(!vetoed.is_suitable_for_gpu_rasterization());
    assert!(vetoed.unsuitable_for_gpu_reason().is_some());

    assert!(record(6, Paint::fill(Color::BLACK), star).is_suitable_for_gpu_rasterization());
    let square = Rect::new(0.0, 0.0, 10.0, 10.0);
    let mut square_path = BezPath::new();
    square_path.move_to(square.origin());
    square_path.line_to((square.x1, square.y0));
    square_path.line_to((square.x1, square.y1));
    square_path.line_to((square.x0, square.y1));
    square_path.close_path();
    assert!(record(10, aa, square_path).is_suitable_for_gpu_rasterization());
}

#[test]
fn convexity_check() {
    assert!(!is_convex(&star()));
    let mut tri = BezPath::new();
    tri.move_to((0.0, 0.0));
    tri.line_to((4.0, 0.0));
    tri.line_to((0.0, 4.0));
    tri.close_path();
    assert!(is_convex(&tri));

    let mut two = tri.clone();
    two.move_to((10.0, 10.0));
    two.line_to((11.0, 10.0));
    assert!(!is_convex(&two));
}

#[test]
fn lazy_images_are_indexed_when_gathering() {
    let lazy = Arc::new(PixelRef::lazy(1, IntSize::new(50, 50), Color::WHITE));
    let eager = Arc::new(PixelRef::decoded(2, IntSize::new(50, 50), Color::WHITE));
    let mut painter = {
        let lazy = Arc::clone(&lazy);
        let eager = Arc::clone(&eager);
        move |rec: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
            rec.draw_image(&lazy, Rect::new(300.0, 10.0, 350.0, 60.0));
            rec.draw_image(&eager, Rect::new(0.0, 0.0, 50.0, 50.0));
        }
    };

    let layer = IntRect::new(0, 0, 512, 512);
    let gathered = Picture::record(
        layer,
        &mut painter,
        RecordingMode::Normal,
        Some(IntSize::new(256, 256)),
    );
    assert!(gathered.has_pixel_refs());
    let hits: Vec<_> = gathered.pixel_refs_in(layer).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].pixel_ref.id(), 1);
    assert_eq!(hits[0].layer_rect, IntRect::new(300, 10, 50, 50));
    assert_eq!(gathered.pixel_refs_in(IntRect::new(0, 0, 256, 256)).count(), 0);
    assert_eq!(gathered.pixel_refs_in(IntRect::new(340, 50, 1, 1)).count(), 1);

    let plain = Picture::record(layer, &mut painter, RecordingMode::Normal, None);
    assert!(!plain.has_pixel_refs());
    assert_eq!(plain.pixel_refs_in(layer).count(), 0);
}

#[test]
fn text_inside_clip_is_flagged() {
    let mut painter = |rec: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
        rec.draw_text("hi", Point::new(2.0, 12.0), 10.0, &Paint::fill(Color::BLACK));
    };
    let picture = Picture::record(
        IntRect::new(0, 0, 20, 20),
        &mut painter,
        RecordingMode::Normal,
        None,
    );
    assert!(picture.has_text());

    let outside = Picture::record(
        IntRect::new(100, 100, 20, 20),
        &mut painter,
        RecordingMode::Normal,
        None,
    );
    assert!(!outside.has_text());
}
