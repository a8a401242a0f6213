//! Recording and playback of layer content.
//!
//! A [`RecordingSource`] lives on the main thread and keeps recordings in sync with the layer's
//! invalidations. [`RecordingSource::create_raster_source`] snapshots it into an immutable
//! [`RasterSource`] that any thread can play back.
//!
//! Two implementations exist: [`PicturePile`] records one picture per tile of a [`TilingData`]
//! grid (clustering adjacent invalid tiles into shared recordings), while
//! [`DisplayListRecordingSource`] records a single list for the whole recorded viewport.
//!
//! [`TilingData`]: crate::tiling::TilingData

pub(crate) mod cluster;
pub(crate) mod display_list;
pub(crate) mod helper;
pub(crate) mod picture_pile;
pub(crate) mod pile_impl;
pub(crate) mod recording;

pub use cluster::{TileClusters, cluster_tiles};
pub use display_list::{DisplayListRasterSource, DisplayListRecordingSource};
pub use helper::{PlaybackPreparation, prepare_for_playback_to_canvas};
pub use picture_pile::{PictureMap, PicturePile};
pub use pile_impl::{PicturePileImpl, PixelRefIterator};
pub use recording::{GpuRasterization, RasterSource, RecordingSource, SolidColorAnalysis};
