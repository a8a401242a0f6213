use super::*;
use crate::canvas::{Paint, PixelCanvas};
use crate::foundation::core::{BezPath, Rect};
use crate::picture::{PaintingControl, PictureRecorder};

const LAYER: IntSize = IntSize {
    width: 2000,
    height: 2000,
};

fn source() -> DisplayListRecordingSource {
    let mut source = DisplayListRecordingSource::new(IntSize::new(256, 256));
    source.set_pixel_record_distance(0);
    source
}

fn fill(color: Color) -> impl FnMut(&mut PictureRecorder, IntRect, PaintingControl) {
    move |recorder: &mut PictureRecorder, clip: IntRect, _: PaintingControl| {
        recorder.draw_rect(clip.to_kurbo(), &Paint::fill(color));
    }
}

fn update(
    source: &mut DisplayListRecordingSource,
    invalidation: &mut Region,
    visible: IntRect,
) -> bool {
    let mut painter = fill(Color::RED);
    source.update_and_expand_invalidation(
        &mut painter,
        invalidation,
        LAYER,
        visible,
        0,
        RecordingMode::Normal,
    )
}

#[test]
fn first_update_records_the_viewport() {
    let mut source = source();
    let mut invalidation = Region::new();
    assert!(update(&mut source, &mut invalidation, IntRect::new(0, 0, 100, 100)));

    assert_eq!(source.size(), LAYER);
    assert_eq!(source.recorded_viewport(), IntRect::new(0, 0, 100, 100));
    assert_eq!(invalidation, Region::from_rect(IntRect::new(0, 0, 100, 100)));
    let list = source.display_list().unwrap();
    assert_eq!(list.layer_rect(), IntRect::new(0, 0, 100, 100));
    // Most of the layer has no content yet.
    assert!(!source.is_solid_color());
}

#[test]
fn solid_only_when_the_recording_spans_the_layer() {
    let mut source = source();
    let mut painter = fill(Color::RED);
    let small = IntSize::new(100, 100);
    source.update_and_expand_invalidation(
        &mut painter,
        &mut Region::new(),
        small,
        IntRect::from_size(small),
        0,
        RecordingMode::Normal,
    );
    assert!(source.is_solid_color());
    assert_eq!(source.solid_color(), Color::RED);
    assert!(source.create_raster_source(true).is_solid_color());

    // Growing the layer past the viewport leaves unrecorded pixels.
    source.update_and_expand_invalidation(
        &mut painter,
        &mut Region::new(),
        IntSize::new(400, 100),
        IntRect::from_size(small),
        0,
        RecordingMode::Normal,
    );
    assert_eq!(source.recorded_viewport(), IntRect::from_size(small));
    assert!(!source.is_solid_color());
}

#[test]
fn small_scroll_keeps_the_recording() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(100, 100, 100, 100));
    let before = Arc::clone(source.display_list().unwrap());

    let mut invalidation = Region::new();
    assert!(!update(&mut source, &mut invalidation, IntRect::new(150, 150, 100, 100)));
    assert!(invalidation.is_empty());
    assert_eq!(source.recorded_viewport(), IntRect::new(100, 100, 100, 100));
    assert!(Arc::ptr_eq(source.display_list().unwrap(), &before));
}

#[test]
fn large_scroll_rerecords_and_invalidates_both_viewports() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(100, 100, 100, 100));

    let mut invalidation = Region::new();
    assert!(update(&mut source, &mut invalidation, IntRect::new(1000, 1000, 100, 100)));
    assert_eq!(source.recorded_viewport(), IntRect::new(1000, 1000, 100, 100));
    let mut expected = Region::from_rect(IntRect::new(1000, 1000, 100, 100));
    expected.union_rect(IntRect::new(100, 100, 100, 100));
    assert_eq!(invalidation, expected);
}

#[test]
fn reaching_a_layer_edge_rerecords() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(100, 100, 100, 100));

    let mut invalidation = Region::new();
    assert!(update(&mut source, &mut invalidation, IntRect::new(0, 100, 100, 100)));
    assert_eq!(source.recorded_viewport(), IntRect::new(0, 100, 100, 100));
    assert_eq!(invalidation, Region::from_rect(IntRect::new(0, 100, 200, 100)));

    // Already at the edge; a small move back is absorbed.
    assert!(!update(&mut source, &mut Region::new(), IntRect::new(20, 100, 100, 100)));
}

#[test]
fn invalidation_inside_viewport_rerecords() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(0, 0, 100, 100));
    let before = Arc::clone(source.display_list().unwrap());

    let mut outside = Region::from_rect(IntRect::new(500, 500, 10, 10));
    assert!(!update(&mut source, &mut outside, IntRect::new(0, 0, 100, 100)));
    assert!(Arc::ptr_eq(source.display_list().unwrap(), &before));

    let mut inside = Region::from_rect(IntRect::new(50, 50, 10, 10));
    assert!(update(&mut source, &mut inside, IntRect::new(0, 0, 100, 100)));
    assert_eq!(inside, Region::from_rect(IntRect::new(50, 50, 10, 10)));
    assert!(!Arc::ptr_eq(source.display_list().unwrap(), &before));
}

#[test]
fn resize_rerecords_even_without_new_area() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(0, 0, 100, 100));
    let mut painter = fill(Color::RED);
    let mut invalidation = Region::new();
    assert!(source.update_and_expand_invalidation(
        &mut painter,
        &mut invalidation,
        IntSize::new(50, 50),
        IntRect::new(0, 0, 100, 100),
        1,
        RecordingMode::Normal,
    ));
    assert_eq!(source.recorded_viewport(), IntRect::new(0, 0, 50, 50));
    let mut expected = Region::from_rect(IntRect::new(0, 0, 100, 100));
    expected.subtract_rect(IntRect::new(0, 0, 50, 50));
    assert_eq!(invalidation, expected);
}

#[test]
fn raster_source_covers_only_the_recorded_viewport() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(0, 0, 100, 100));
    let raster = source.create_raster_source(true);

    assert!(raster.has_recordings());
    assert!(raster.covers_rect(IntRect::new(0, 0, 50, 50), 1.0));
    assert!(raster.covers_rect(IntRect::new(0, 0, 50, 50), 0.5));
    assert!(!raster.covers_rect(IntRect::new(0, 0, 200, 200), 1.0));
    assert!(!raster.is_solid_color());
    assert!(raster.picture_memory_usage() > 0);
    assert!(!raster.create_clone_without_lcd_text().can_use_lcd_text());

    let empty = DisplayListRecordingSource::default().create_raster_source(true);
    assert!(!empty.has_recordings());
    assert!(!empty.covers_rect(IntRect::new(0, 0, 1, 1), 1.0));
    assert_eq!(empty.picture_memory_usage(), 0);
}

#[test]
fn playback_draws_the_list() {
    let mut source = source();
    let mut painter = |recorder: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
        recorder.draw_rect(Rect::new(0.0, 0.0, 20.0, 40.0), &Paint::fill(Color::RED));
        recorder.draw_rect(Rect::new(20.0, 0.0, 40.0, 40.0), &Paint::fill(Color::BLACK));
    };
    source.update_and_expand_invalidation(
        &mut painter,
        &mut Region::new(),
        IntSize::new(40, 40),
        IntRect::new(0, 0, 40, 40),
        0,
        RecordingMode::Normal,
    );
    assert!(!source.is_solid_color());
    let raster = source.create_raster_source(true);

    let mut canvas = PixelCanvas::new(20, 20).unwrap();
    let rect = IntRect::new(0, 0, 20, 20);
    raster.playback_to_canvas(&mut canvas, rect, rect, 0.5);
    assert_eq!(canvas.color_at(0, 0), Some(Color::RED));
    assert_eq!(canvas.color_at(9, 19), Some(Color::RED));
    assert_eq!(canvas.color_at(10, 0), Some(Color::BLACK));

    let analysis = raster.perform_solid_color_analysis(IntRect::new(10, 0, 10, 20), 0.5);
    assert_eq!(analysis.solid_color, Color::BLACK);
    assert!(analysis.is_solid_color);
}

#[test]
fn empty_bounds_drop_the_list() {
    let mut source = source();
    update(&mut source, &mut Region::new(), IntRect::new(0, 0, 100, 100));
    source.set_empty_bounds();
    assert_eq!(source.size(), IntSize::default());
    assert!(source.display_list().is_none());
    assert!(source.recorded_viewport().is_empty());
    assert!(!source.is_solid_color());
}

#[test]
fn gpu_veto_latches() {
    let mut source = source();
    let mut concave = |recorder: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((50.0, 25.0));
        path.line_to((100.0, 0.0));
        path.line_to((50.0, 100.0));
        path.close_path();
        for _ in 0..6 {
            recorder.draw_path(&path, &Paint::fill(Color::BLACK).anti_aliased());
        }
    };
    source.update_and_expand_invalidation(
        &mut concave,
        &mut Region::new(),
        LAYER,
        IntRect::new(0, 0, 100, 100),
        0,
        RecordingMode::Normal,
    );
    assert!(!source.is_suitable_for_gpu_rasterization());

    update(&mut source, &mut Region::from_rect(IntRect::new(0, 0, 10, 10)), IntRect::new(0, 0, 100, 100));
    assert!(!source.is_suitable_for_gpu_rasterization());
    assert!(!source.create_raster_source(true).is_suitable_for_gpu_rasterization());
}

#[test]
fn gathers_pixel_refs_from_the_list() {
    let lazy = Arc::new(PixelRef::lazy(3, IntSize::new(8, 8), Color::RED));
    let mut painter = {
        let lazy = Arc::clone(&lazy);
        move |recorder: &mut PictureRecorder, _: IntRect, _: PaintingControl| {
            recorder.draw_image(&lazy, Rect::new(60.0, 60.0, 80.0, 80.0));
        }
    };
    let mut source = source();
    source.set_gather_pixel_refs(true);
    source.update_and_expand_invalidation(
        &mut painter,
        &mut Region::new(),
        LAYER,
        IntRect::new(0, 0, 100, 100),
        0,
        RecordingMode::Normal,
    );
    let raster = source.create_raster_source(true);
    assert!(raster.gather_pixel_refs(IntRect::new(0, 0, 50, 50), 1.0).is_empty());
    let refs = raster.gather_pixel_refs(IntRect::new(0, 0, 50, 50), 0.5);
    assert_eq!(refs.len(), 1);
    assert!(Arc::ptr_eq(&refs[0], &lazy));
}
