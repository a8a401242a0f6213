use crate::canvas::{BlendMode, Canvas, ClipOp};
use crate::foundation::core::{Color, IntRect};
use crate::settings::DebugSettings;

/// What a raster source tells [`prepare_for_playback_to_canvas`] about itself.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackPreparation<'a> {
    /// Layer-space extent of the content, usually the layer size.
    pub source_rect: IntRect,
    pub contents_scale: f32,
    pub background_color: Color,
    /// False when the content promises to paint every pixel opaquely.
    pub requires_clear: bool,
    pub debug: &'a DebugSettings,
}

/// Get a canvas ready for content playback.
///
/// The canvas origin sits at the top-left of `canvas_bitmap_rect`; only `canvas_playback_rect`
/// is touched. A full update discards the old contents first. Transparent content is cleared
/// underneath; opaque content only gets the background painted into the strip between the last
/// fully covered content pixel and the canvas edge, which the recording itself never covers.
pub fn prepare_for_playback_to_canvas(
    canvas: &mut dyn Canvas,
    canvas_bitmap_rect: IntRect,
    canvas_playback_rect: IntRect,
    prep: &PlaybackPreparation<'_>,
) {
    let partial_update = canvas_bitmap_rect != canvas_playback_rect;
    if !partial_update {
        canvas.discard();
    }

    if prep.debug.clear_canvas_with_debug_color {
        // Anything left in this color was never painted.
        fill_playback_rect(
            canvas,
            canvas_bitmap_rect,
            canvas_playback_rect,
            partial_update,
            prep.debug.non_painted_fill_color,
            BlendMode::SrcOver,
        );
    }

    if prep.requires_clear {
        fill_playback_rect(
            canvas,
            canvas_bitmap_rect,
            canvas_playback_rect,
            partial_update,
            Color::TRANSPARENT,
            BlendMode::Clear,
        );
        return;
    }

    let content_rect = prep.source_rect.scale_to_enclosing(prep.contents_scale);

    // The last row and column may be only partly covered by content.
    let mut deflated_content_rect = content_rect;
    deflated_content_rect.inset(0, 0, 1, 1);
    deflated_content_rect.intersect(canvas_playback_rect);
    if deflated_content_rect.contains(canvas_playback_rect) {
        return;
    }

    let origin = (
        -f64::from(canvas_bitmap_rect.x),
        -f64::from(canvas_bitmap_rect.y),
    );

    if prep.debug.clear_canvas_with_debug_color {
        // Pixels outside the content bounds in this color belong to a tile that should have
        // been re-rastered when the layer grew.
        canvas.save();
        canvas.translate(origin.0, origin.1);
        canvas.clip_rect(content_rect.to_kurbo(), ClipOp::Difference);
        canvas.draw_color(prep.debug.missing_resize_invalidation_color, BlendMode::Src);
        canvas.restore();
    }

    // Stay inside the playback rect so edge pixels still valid from an earlier raster survive.
    let mut inflated_content_rect = content_rect;
    inflated_content_rect.inset(0, 0, -1, -1);
    inflated_content_rect.intersect(canvas_playback_rect);

    canvas.save();
    canvas.translate(origin.0, origin.1);
    canvas.clip_rect(inflated_content_rect.to_kurbo(), ClipOp::Replace);
    canvas.clip_rect(deflated_content_rect.to_kurbo(), ClipOp::Difference);
    canvas.draw_color(prep.background_color, BlendMode::Src);
    canvas.restore();
}

fn fill_playback_rect(
    canvas: &mut dyn Canvas,
    canvas_bitmap_rect: IntRect,
    canvas_playback_rect: IntRect,
    partial_update: bool,
    color: Color,
    mode: BlendMode,
) {
    if !partial_update {
        canvas.clear(color);
        return;
    }
    canvas.save();
    canvas.translate(
        -f64::from(canvas_bitmap_rect.x),
        -f64::from(canvas_bitmap_rect.y),
    );
    canvas.clip_rect(canvas_playback_rect.to_kurbo(), ClipOp::Intersect);
    canvas.draw_color(color, mode);
    canvas.restore();
}

#[cfg(test)]
#[path = "../../tests/unit/pile/helper.rs"]
mod tests;
