use crate::foundation::core::{Color, IntSize};

/// Handle to image pixels drawn by recorded content.
///
/// Lazily decoded images are the ones worth prefetching before raster; their pixels are only
/// produced when a tile that draws them is played back. Content itself is not modelled: playback
/// paints the image's representative color over its destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct PixelRef {
    id: u64,
    size: IntSize,
    lazily_decoded: bool,
    color: Color,
}

impl PixelRef {
    /// An already decoded image.
    pub fn decoded(id: u64, size: IntSize, color: Color) -> Self {
        Self {
            id,
            size,
            lazily_decoded: false,
            color,
        }
    }

    /// An image decoded on first use.
    pub fn lazy(id: u64, size: IntSize, color: Color) -> Self {
        Self {
            id,
            size,
            lazily_decoded: true,
            color,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> IntSize {
        self.size
    }

    pub fn is_lazily_decoded(&self) -> bool {
        self.lazily_decoded
    }

    pub fn color(&self) -> Color {
        self.color
    }
}
