use crate::canvas::Canvas;
use crate::foundation::core::{Color, IntRect, IntSize};
use crate::foundation::region::Region;
use crate::picture::{ContentPainter, PixelRef, RecordingMode};
use std::fmt;
use std::sync::Arc;

/// Outcome of asking whether a content rect rasters to one flat color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SolidColorAnalysis {
    pub is_solid_color: bool,
    pub solid_color: Color,
}

impl SolidColorAnalysis {
    pub(crate) fn from_color(color: Option<Color>) -> Self {
        Self {
            is_solid_color: color.is_some(),
            solid_color: color.unwrap_or(Color::TRANSPARENT),
        }
    }
}

/// Whether recorded content may be rastered on the GPU.
///
/// Only ever moves from `Suitable` to `Unsuitable`; a source stays vetoed even after the offending
/// content is replaced, which saves rescanning every recording after each invalidation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum GpuRasterization {
    #[default]
    Suitable,
    Unsuitable { reason: &'static str },
}

impl GpuRasterization {
    pub fn is_suitable(self) -> bool {
        self == GpuRasterization::Suitable
    }

    /// Latch to unsuitable. Returns `true` only on the transition.
    pub(crate) fn veto(&mut self, reason: &'static str) -> bool {
        if !self.is_suitable() {
            return false;
        }
        *self = GpuRasterization::Unsuitable { reason };
        tracing::info!(reason, "content vetoed GPU rasterization");
        true
    }
}

/// Main-thread side of a layer: owns recordings and keeps them in sync with invalidations.
pub trait RecordingSource {
    /// Bring recordings in line with `layer_size`, `visible_layer_rect` and `invalidation`.
    ///
    /// On return `invalidation` also holds every area whose raster must be redone because a
    /// recording was dropped or replaced. Returns whether anything changed.
    fn update_and_expand_invalidation(
        &mut self,
        painter: &mut dyn ContentPainter,
        invalidation: &mut Region,
        layer_size: IntSize,
        visible_layer_rect: IntRect,
        frame_number: i32,
        recording_mode: RecordingMode,
    ) -> bool;

    /// Immutable snapshot suitable for playback on another thread.
    fn create_raster_source(&self, can_use_lcd_text: bool) -> Arc<dyn RasterSource>;

    fn size(&self) -> IntSize;

    /// Drop every recording and shrink to zero size.
    fn set_empty_bounds(&mut self);

    fn set_slow_down_raster_scale_factor(&mut self, factor: u32);

    fn set_gather_pixel_refs(&mut self, gather: bool);

    fn set_background_color(&mut self, color: Color);

    fn set_requires_clear(&mut self, requires_clear: bool);

    fn is_suitable_for_gpu_rasterization(&self) -> bool;

    fn set_unsuitable_for_gpu_rasterization(&mut self);
}

/// Thread-safe playback side of a layer.
///
/// `content_rect`s are in content space, i.e. layer space multiplied by `contents_scale`.
pub trait RasterSource: Send + Sync + fmt::Debug {
    /// Raster `canvas_playback_rect` into a canvas whose origin sits at the top-left of
    /// `canvas_bitmap_rect`. The canvas is prepared first (cleared, edges filled) as needed.
    fn playback_to_canvas(
        &self,
        canvas: &mut dyn Canvas,
        canvas_bitmap_rect: IntRect,
        canvas_playback_rect: IntRect,
        contents_scale: f32,
    );

    /// Raster into a canvas shared with other content; no clearing or edge filling.
    fn playback_to_shared_canvas(
        &self,
        canvas: &mut dyn Canvas,
        canvas_rect: IntRect,
        contents_scale: f32,
    );

    fn perform_solid_color_analysis(
        &self,
        content_rect: IntRect,
        contents_scale: f32,
    ) -> SolidColorAnalysis;

    /// Lazily decoded images that would be drawn into `content_rect`, each reported once per
    /// recording.
    fn gather_pixel_refs(&self, content_rect: IntRect, contents_scale: f32) -> Vec<Arc<PixelRef>>;

    /// Whether every layer pixel under `content_rect` has a recording to play back.
    fn covers_rect(&self, content_rect: IntRect, contents_scale: f32) -> bool;

    fn is_solid_color(&self) -> bool;

    fn solid_color(&self) -> Color;

    fn has_recordings(&self) -> bool;

    fn size(&self) -> IntSize;

    fn picture_memory_usage(&self) -> usize;

    fn can_use_lcd_text(&self) -> bool;

    fn create_clone_without_lcd_text(&self) -> Arc<dyn RasterSource>;

    fn is_suitable_for_gpu_rasterization(&self) -> bool;

    /// Debug dump of the snapshot state.
    fn as_value(&self) -> serde_json::Value;
}
