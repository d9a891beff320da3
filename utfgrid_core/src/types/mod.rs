//! Contains types like extents, tile coordinates, zoom levels and the tile pyramid.

mod constants;
pub use constants::*;

mod geo_extent;
pub use geo_extent::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_descriptor;
pub use tile_descriptor::*;

mod tile_pyramid;
pub use tile_pyramid::*;

mod zoom_levels;
pub use zoom_levels::*;
