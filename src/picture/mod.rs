//! Recorded layer content: draw ops, image handles and the immutable pictures tiles share.

pub(crate) mod image;
pub(crate) mod op;
pub(crate) mod record;

pub use image::PixelRef;
pub use op::DrawOp;
pub use record::{
    ContentPainter, PaintingControl, Picture, PictureRecorder, PixelRefEntry, RecordingMode,
};
