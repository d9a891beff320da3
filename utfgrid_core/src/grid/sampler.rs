//! Samples a tile on a regular grid by asking the map what lies under each pixel.

use super::{AttributeSet, Cell, CellGroup};
use crate::{GeoExtent, map::MapHandle};
use std::collections::BTreeSet;

/// Number of pixels per side of the sampling grid.
pub const GRID_SIZE: usize = 128;

/// Mercator extent of the pixel at `row`, `col` of a `size × size` grid over `tile`.
///
/// The tile is divided by `size - 1`, so the last row and column reach one
/// pixel past the tile's south and east edges.
#[must_use]
pub fn pixel_extent(tile: &GeoExtent, row: usize, col: usize, size: usize) -> GeoExtent {
	let steps = (size - 1) as f64;
	let cell_width = tile.width() / steps;
	let cell_height = tile.height() / steps;
	let x_min = tile.x_min() + col as f64 * cell_width;
	let y_max = tile.y_max() - row as f64 * cell_height;
	GeoExtent::new_unchecked(x_min, y_max - cell_height, x_min + cell_width, y_max)
}

/// Samples `tile` at [`GRID_SIZE`] × [`GRID_SIZE`] pixels, rows first.
///
/// Every pixel is identified against the map, filtered through `allowlist`
/// and grouped with all other pixels carrying the same attribute set.
#[must_use]
pub fn sample_tile(map: &dyn MapHandle, tile: &GeoExtent, allowlist: Option<&BTreeSet<String>>) -> CellGroup {
	sample_grid(map, tile, allowlist, GRID_SIZE)
}

/// Same as [`sample_tile`] with a custom grid size, which must be at least 2.
#[must_use]
pub fn sample_grid(map: &dyn MapHandle, tile: &GeoExtent, allowlist: Option<&BTreeSet<String>>, size: usize) -> CellGroup {
	debug_assert!(size >= 2);
	let mut group = CellGroup::new();
	for row in 0..size {
		for col in 0..size {
			let pixel = pixel_extent(tile, row, col, size);
			let set = AttributeSet::from_identify(map.identify_pixel(&pixel), allowlist);
			group.insert(set, Cell::new(row, col));
		}
	}
	group
}
