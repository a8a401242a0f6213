use crate::foundation::core::{Color, IntSize};
use crate::foundation::error::{PileError, PileResult};

/// Options shared by recording sources and the raster sources they snapshot into.
///
/// Defaults match the tuning the compositor has always shipped with; none of the numbers are
/// derived, so they stay configurable rather than being baked in.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PileSettings {
    /// Margin around the visible rect that is kept recorded to absorb small scrolls.
    pub pixel_record_distance: i32,
    /// Minimum invalid-area / recorded-area ratio a cluster may drop to while growing.
    pub cluster_density_threshold: f32,
    /// Pictures with more ops than this skip solid color analysis.
    pub solid_color_op_limit: usize,
    /// Maximum picture footprint (including buffer pixels) per tile.
    pub base_picture_size: i32,
    /// Smallest scale content is expected to be rastered at.
    pub min_contents_scale: f32,
    /// Cell size of each picture's pixel-ref grid.
    pub tile_grid_size: IntSize,
    /// Record lazily decoded image references while painting.
    pub gather_pixel_refs: bool,
    /// Viewport skirt a display list recording may drift inside before re-recording.
    pub display_list_min_rerecord_distance: i32,
    /// Diagnostics knobs.
    pub debug: DebugSettings,
}

impl Default for PileSettings {
    fn default() -> Self {
        Self {
            pixel_record_distance: 8000,
            cluster_density_threshold: 0.5,
            solid_color_op_limit: 10,
            base_picture_size: 512,
            min_contents_scale: 0.0625,
            tile_grid_size: IntSize::new(256, 256),
            gather_pixel_refs: false,
            display_list_min_rerecord_distance: 512,
            debug: DebugSettings::default(),
        }
    }
}

impl PileSettings {
    /// Parse settings from JSON and validate them. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> PileResult<Self> {
        let settings: PileSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> PileResult<()> {
        if self.pixel_record_distance < 0 {
            return Err(PileError::validation(
                "pixel_record_distance must be >= 0",
            ));
        }
        if !(self.cluster_density_threshold > 0.0 && self.cluster_density_threshold <= 1.0) {
            return Err(PileError::validation(
                "cluster_density_threshold must be in (0, 1]",
            ));
        }
        if self.base_picture_size <= 0 {
            return Err(PileError::validation("base_picture_size must be > 0"));
        }
        if !(self.min_contents_scale > 0.0 && self.min_contents_scale.is_finite()) {
            return Err(PileError::validation("min_contents_scale must be > 0"));
        }
        if self.tile_grid_size.width <= 0 || self.tile_grid_size.height <= 0 {
            return Err(PileError::validation("tile_grid_size must be positive"));
        }
        if self.display_list_min_rerecord_distance < 0 {
            return Err(PileError::validation(
                "display_list_min_rerecord_distance must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Diagnostic playback behaviour. Off by default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Pre-fill rasters with a sentinel color so unpainted holes are visible.
    pub clear_canvas_with_debug_color: bool,
    /// Replay (and record) each picture this many times; 0 and 1 both mean once.
    pub slow_down_raster_scale_factor: u32,
    /// Sentinel for content pixels nothing painted.
    pub non_painted_fill_color: Color,
    /// Sentinel for pixels outside the content bounds after a resize.
    pub missing_resize_invalidation_color: Color,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            clear_canvas_with_debug_color: false,
            slow_down_raster_scale_factor: 0,
            non_painted_fill_color: Color::rgb(200, 225, 225),
            missing_resize_invalidation_color: Color::RED,
        }
    }
}

/// Options for [`crate::CompositorTimingHistory`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Samples retained per phase.
    pub duration_history_size: usize,
    /// Percentile reported by every duration estimate.
    pub estimation_percentile: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            duration_history_size: 60,
            estimation_percentile: 90.0,
        }
    }
}

impl TimingSettings {
    pub fn from_json_str(json: &str) -> PileResult<Self> {
        let settings: TimingSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> PileResult<()> {
        if self.duration_history_size == 0 {
            return Err(PileError::validation("duration_history_size must be > 0"));
        }
        if !(0.0..=100.0).contains(&self.estimation_percentile) {
            return Err(PileError::validation(
                "estimation_percentile must be in [0, 100]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
