use crate::canvas::{AnalysisCanvas, Canvas, ClipOp};
use crate::foundation::core::{Color, IntRect, IntSize};
use crate::foundation::region::Region;
use crate::picture::{ContentPainter, Picture, PixelRef, RecordingMode};
use crate::pile::helper::{PlaybackPreparation, prepare_for_playback_to_canvas};
use crate::pile::recording::{GpuRasterization, RasterSource, RecordingSource, SolidColorAnalysis};
use crate::settings::{DebugSettings, PileSettings};
use std::sync::Arc;

/// Recording source that keeps one display list for the whole recorded viewport.
///
/// Small viewport moves are absorbed: the list is only re-recorded when the layer resizes, the
/// invalidation reaches the recorded viewport, or scrolling exposes enough new area.
#[derive(Clone, Debug)]
pub struct DisplayListRecordingSource {
    size: IntSize,
    recorded_viewport: IntRect,
    display_list: Option<Arc<Picture>>,
    pixel_record_distance: i32,
    min_rerecord_distance: i32,
    solid_color_op_limit: usize,
    grid_cell_size: IntSize,
    gather_pixel_refs: bool,
    requires_clear: bool,
    is_solid_color: bool,
    solid_color: Color,
    background_color: Color,
    gpu_rasterization: GpuRasterization,
    debug: DebugSettings,
}

impl Default for DisplayListRecordingSource {
    fn default() -> Self {
        Self::from_settings(&PileSettings::default())
    }
}

impl DisplayListRecordingSource {
    pub fn new(grid_cell_size: IntSize) -> Self {
        Self::from_settings(&PileSettings {
            tile_grid_size: grid_cell_size,
            ..PileSettings::default()
        })
    }

    pub fn from_settings(settings: &PileSettings) -> Self {
        Self {
            size: IntSize::default(),
            recorded_viewport: IntRect::default(),
            display_list: None,
            pixel_record_distance: settings.pixel_record_distance,
            min_rerecord_distance: settings.display_list_min_rerecord_distance,
            solid_color_op_limit: settings.solid_color_op_limit,
            grid_cell_size: settings.tile_grid_size,
            gather_pixel_refs: settings.gather_pixel_refs,
            requires_clear: true,
            is_solid_color: false,
            solid_color: Color::TRANSPARENT,
            background_color: Color::TRANSPARENT,
            gpu_rasterization: GpuRasterization::Suitable,
            debug: settings.debug.clone(),
        }
    }

    pub fn recorded_viewport(&self) -> IntRect {
        self.recorded_viewport
    }

    pub fn display_list(&self) -> Option<&Arc<Picture>> {
        self.display_list.as_ref()
    }

    pub fn is_solid_color(&self) -> bool {
        self.is_solid_color
    }

    pub fn solid_color(&self) -> Color {
        self.solid_color
    }

    pub fn set_pixel_record_distance(&mut self, distance: i32) {
        debug_assert!(distance >= 0);
        self.pixel_record_distance = distance;
    }

    pub fn clear(&mut self) {
        self.recorded_viewport = IntRect::default();
        self.display_list = None;
        self.is_solid_color = false;
    }

    /// Whether moving from the current recorded viewport to `candidate` is worth a re-record.
    ///
    /// Only meaningful while the layer size is unchanged.
    fn exposes_enough_new_area(&self, candidate: IntRect) -> bool {
        let current = self.recorded_viewport;
        if current.is_empty() && candidate.is_empty() {
            return false;
        }
        // First recording, or the layer became visible again.
        if current.is_empty() {
            return true;
        }

        if !current.outset(self.min_rerecord_distance).contains(candidate) {
            return true;
        }

        // Viewports are clipped to the layer, so newly reaching a layer edge means new area
        // along that edge that no further scroll in that direction could add to.
        let size = self.size;
        (candidate.x == 0 && current.x != 0)
            || (candidate.y == 0 && current.y != 0)
            || (candidate.right() == size.width && current.right() != size.width)
            || (candidate.bottom() == size.height && current.bottom() != size.height)
    }

    fn determine_if_solid_color(&mut self) {
        self.is_solid_color = false;
        self.solid_color = Color::TRANSPARENT;

        let Some(list) = &self.display_list else {
            return;
        };
        if list.approximate_op_count() > self.solid_color_op_limit {
            return;
        }
        if self.recorded_viewport.is_empty() {
            return;
        }
        // The layer outside the recorded viewport has no content, so a partial recording is
        // never solid.
        let mut canvas = AnalysisCanvas::new(self.size.width, self.size.height);
        list.raster(&mut canvas, &Region::new(), 1.0);
        if let Some(color) = canvas.color_if_solid() {
            self.is_solid_color = true;
            self.solid_color = color;
        }
    }
}

impl RecordingSource for DisplayListRecordingSource {
    #[tracing::instrument(level = "debug", skip(self, painter, invalidation))]
    fn update_and_expand_invalidation(
        &mut self,
        painter: &mut dyn ContentPainter,
        invalidation: &mut Region,
        layer_size: IntSize,
        visible_layer_rect: IntRect,
        frame_number: i32,
        recording_mode: RecordingMode,
    ) -> bool {
        let mut updated = false;
        if self.size != layer_size {
            self.size = layer_size;
            updated = true;
        }

        let candidate = visible_layer_rect
            .outset(self.pixel_record_distance)
            .intersection(IntRect::from_size(self.size));

        if updated || self.exposes_enough_new_area(candidate) {
            let old_viewport = self.recorded_viewport;
            self.recorded_viewport = candidate;

            let mut newly_exposed = Region::from_rect(self.recorded_viewport);
            newly_exposed.subtract_rect(old_viewport);
            invalidation.union(&newly_exposed);

            let mut no_longer_exposed = Region::from_rect(old_viewport);
            no_longer_exposed.subtract_rect(self.recorded_viewport);
            invalidation.union(&no_longer_exposed);

            updated = true;
        }

        if !updated && !invalidation.intersects_rect(self.recorded_viewport) {
            return false;
        }

        let pixel_ref_grid = self.gather_pixel_refs.then_some(self.grid_cell_size);
        let repeat_count = self.debug.slow_down_raster_scale_factor.max(1);
        let mut recorded = None;
        for _ in 0..repeat_count {
            recorded = Some(Picture::record(
                self.recorded_viewport,
                painter,
                recording_mode,
                pixel_ref_grid,
            ));
        }
        if let Some(reason) = recorded
            .as_ref()
            .and_then(|list| list.unsuitable_for_gpu_reason())
        {
            self.gpu_rasterization.veto(reason);
        }
        self.display_list = recorded;
        tracing::debug!(viewport = ?self.recorded_viewport, "recorded display list");

        self.determine_if_solid_color();
        true
    }

    fn create_raster_source(&self, can_use_lcd_text: bool) -> Arc<dyn RasterSource> {
        Arc::new(DisplayListRasterSource::from_recording(self, can_use_lcd_text))
    }

    fn size(&self) -> IntSize {
        self.size
    }

    fn set_empty_bounds(&mut self) {
        self.size = IntSize::default();
        self.clear();
    }

    fn set_slow_down_raster_scale_factor(&mut self, factor: u32) {
        self.debug.slow_down_raster_scale_factor = factor;
    }

    fn set_gather_pixel_refs(&mut self, gather: bool) {
        self.gather_pixel_refs = gather;
    }

    fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    fn set_requires_clear(&mut self, requires_clear: bool) {
        self.requires_clear = requires_clear;
    }

    fn is_suitable_for_gpu_rasterization(&self) -> bool {
        self.gpu_rasterization.is_suitable()
    }

    fn set_unsuitable_for_gpu_rasterization(&mut self) {
        self.gpu_rasterization.veto("forced unsuitable");
    }
}

/// Playback snapshot of a [`DisplayListRecordingSource`].
#[derive(Clone, Debug)]
pub struct DisplayListRasterSource {
    display_list: Option<Arc<Picture>>,
    size: IntSize,
    recorded_viewport: IntRect,
    background_color: Color,
    requires_clear: bool,
    can_use_lcd_text: bool,
    is_solid_color: bool,
    solid_color: Color,
    gpu_rasterization: GpuRasterization,
    debug: DebugSettings,
}

impl DisplayListRasterSource {
    pub fn from_recording(source: &DisplayListRecordingSource, can_use_lcd_text: bool) -> Self {
        Self {
            display_list: source.display_list.clone(),
            size: source.size,
            recorded_viewport: source.recorded_viewport,
            background_color: source.background_color,
            requires_clear: source.requires_clear,
            can_use_lcd_text,
            is_solid_color: source.is_solid_color,
            solid_color: source.solid_color,
            gpu_rasterization: source.gpu_rasterization,
            debug: source.debug.clone(),
        }
    }

    pub fn recorded_viewport(&self) -> IntRect {
        self.recorded_viewport
    }

    fn raster_common(
        &self,
        canvas: &mut dyn Canvas,
        canvas_bitmap_rect: IntRect,
        canvas_playback_rect: IntRect,
        contents_scale: f32,
    ) {
        canvas.save();
        canvas.translate(
            -f64::from(canvas_bitmap_rect.x),
            -f64::from(canvas_bitmap_rect.y),
        );
        let content_rect = IntRect::from_size(self.size)
            .scale_to_enclosing(contents_scale)
            .intersection(canvas_playback_rect);
        canvas.clip_rect(content_rect.to_kurbo(), ClipOp::Intersect);

        if let Some(list) = &self.display_list {
            let repeat_count = self.debug.slow_down_raster_scale_factor.max(1);
            for _ in 0..repeat_count {
                list.raster(canvas, &Region::new(), contents_scale);
            }
        }
        canvas.restore();
    }
}

impl RasterSource for DisplayListRasterSource {
    #[tracing::instrument(level = "trace", skip(self, canvas))]
    fn playback_to_canvas(
        &self,
        canvas: &mut dyn Canvas,
        canvas_bitmap_rect: IntRect,
        canvas_playback_rect: IntRect,
        contents_scale: f32,
    ) {
        prepare_for_playback_to_canvas(
            canvas,
            canvas_bitmap_rect,
            canvas_playback_rect,
            &PlaybackPreparation {
                source_rect: IntRect::from_size(self.size),
                contents_scale,
                background_color: self.background_color,
                requires_clear: self.requires_clear,
                debug: &self.debug,
            },
        );
        self.raster_common(canvas, canvas_bitmap_rect, canvas_playback_rect, contents_scale);
    }

    fn playback_to_shared_canvas(
        &self,
        canvas: &mut dyn Canvas,
        canvas_rect: IntRect,
        contents_scale: f32,
    ) {
        self.raster_common(canvas, canvas_rect, canvas_rect, contents_scale);
    }

    fn perform_solid_color_analysis(
        &self,
        content_rect: IntRect,
        contents_scale: f32,
    ) -> SolidColorAnalysis {
        let layer_rect = content_rect
            .scale_to_enclosing(1.0 / contents_scale)
            .intersection(IntRect::from_size(self.size));
        let mut canvas = AnalysisCanvas::new(layer_rect.width, layer_rect.height);
        self.raster_common(&mut canvas, layer_rect, layer_rect, 1.0);
        SolidColorAnalysis::from_color(canvas.color_if_solid())
    }

    fn gather_pixel_refs(&self, content_rect: IntRect, contents_scale: f32) -> Vec<Arc<PixelRef>> {
        let Some(list) = &self.display_list else {
            return Vec::new();
        };
        let layer_rect = content_rect.scale_to_enclosing(1.0 / contents_scale);
        list.pixel_refs_in(layer_rect)
            .map(|entry| Arc::clone(&entry.pixel_ref))
            .collect()
    }

    fn covers_rect(&self, content_rect: IntRect, contents_scale: f32) -> bool {
        if self.size.is_empty() {
            return false;
        }
        let layer_rect = content_rect
            .scale_to_enclosing(1.0 / contents_scale)
            .intersection(IntRect::from_size(self.size));
        self.recorded_viewport.contains(layer_rect)
    }

    fn is_solid_color(&self) -> bool {
        self.is_solid_color
    }

    fn solid_color(&self) -> Color {
        self.solid_color
    }

    fn has_recordings(&self) -> bool {
        self.display_list.is_some()
    }

    fn size(&self) -> IntSize {
        self.size
    }

    fn picture_memory_usage(&self) -> usize {
        self.display_list
            .as_ref()
            .map_or(0, |list| list.approximate_memory_usage())
    }

    fn can_use_lcd_text(&self) -> bool {
        self.can_use_lcd_text
    }

    fn create_clone_without_lcd_text(&self) -> Arc<dyn RasterSource> {
        Arc::new(Self {
            can_use_lcd_text: false,
            ..self.clone()
        })
    }

    fn is_suitable_for_gpu_rasterization(&self) -> bool {
        self.gpu_rasterization.is_suitable()
    }

    fn as_value(&self) -> serde_json::Value {
        serde_json::json!({
            "size": self.size,
            "recorded_viewport": self.recorded_viewport,
            "has_recordings": self.display_list.is_some(),
            "picture_memory_usage": self.picture_memory_usage(),
            "is_solid_color": self.is_solid_color,
            "solid_color": self.solid_color,
            "can_use_lcd_text": self.can_use_lcd_text,
            "gpu_rasterization": self.gpu_rasterization,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pile/display_list.rs"]
mod tests;
