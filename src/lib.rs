#![forbid(unsafe_code)]
//! Tiled layer recording and raster playback for a compositor.
//!
//! A layer's pixel extent is split into overlapping tiles ([`TilingData`]). A [`PicturePile`]
//! keeps one replayable [`Picture`] per tile in sync with the layer's invalidations and hands
//! immutable [`PicturePileImpl`] snapshots to raster threads, which play them back into any
//! [`Canvas`]. [`CompositorTimingHistory`] turns per-phase frame timings into the percentile
//! estimates a scheduler plans deadlines with.

pub mod canvas;
mod foundation;
pub mod picture;
pub mod pile;
pub mod scheduler;
pub mod settings;
pub mod tiling;

pub use canvas::{AnalysisCanvas, BlendMode, Canvas, ClipOp, Paint, PixelCanvas};
pub use foundation::core::{Affine, BezPath, Color, IntPoint, IntRect, IntSize, Point, Rect, Vec2};
pub use foundation::error::{PileError, PileResult};
pub use foundation::region::Region;
pub use picture::{
    ContentPainter, PaintingControl, Picture, PictureRecorder, PixelRef, RecordingMode,
};
pub use pile::{
    DisplayListRasterSource, DisplayListRecordingSource, PicturePile, PicturePileImpl,
    RasterSource, RecordingSource, SolidColorAnalysis,
};
pub use scheduler::{
    CompositorTimingHistory, RenderingStatsInstrumentation, RollingTimeDeltaHistory,
};
pub use settings::{DebugSettings, PileSettings, TimingSettings};
pub use tiling::{TileIndex, TilingData};
