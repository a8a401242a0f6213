//! Tile-grid geometry: how a layer's pixel extent is split into overlapping fixed-size tiles, and
//! the orders in which those tiles can be visited.

pub(crate) mod data;
pub(crate) mod iter;
pub(crate) mod spiral;

pub use data::{TileIndex, TilingData};
pub use iter::{DifferenceIterator, TileIterator};
pub use spiral::{ReverseSpiralDifferenceIterator, SpiralDifferenceIterator};
