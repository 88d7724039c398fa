//! Edge snapping against monitors and other windows.

pub mod bands;
pub mod index;

pub use bands::{
    Bands, Corner, Edge, Intersections, Source, band, bands_for_rect, check_intersections,
    intersects, offset_for_intersecting_pair, offset_for_intersections, sources_for_rect,
};
pub use index::SnapIndex;
