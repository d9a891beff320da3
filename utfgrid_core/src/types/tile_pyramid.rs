//! Enumerates the tiles that cover an extent at a set of zoom levels.
//!
//! Tiles follow the Google/OSM scheme: at level `L` the world is split into
//! `2^L × 2^L` tiles, row 0 is the northernmost row and column 0 the westernmost
//! column. Within a level tiles are visited column by column, and rows vary
//! fastest inside a column.

use crate::{GeoExtent, ORIGIN_SHIFT, TILE_SIZE, TileCoord, TileDescriptor, WORLD_SIZE, ZoomLevels};
use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// Meters per pixel at `level`.
#[must_use]
pub fn resolution(level: u8) -> f64 {
	WORLD_SIZE / f64::from(TILE_SIZE) / 2f64.powi(i32::from(level))
}

/// Edge length of a tile at `level`, in meters.
#[must_use]
pub fn tile_side(level: u8) -> f64 {
	resolution(level) * f64::from(TILE_SIZE)
}

/// Returns the tile containing the Mercator point `(x, y)` at `level`.
///
/// Points outside the world snap to the nearest border tile.
#[must_use]
pub fn meters_to_tile(level: u8, x: f64, y: f64) -> TileCoord {
	let res = resolution(level);
	let max = f64::from((1u32 << level) - 1);
	let size = f64::from(TILE_SIZE);
	let col = ((x + ORIGIN_SHIFT) / res / size).floor().clamp(0.0, max);
	let row = ((ORIGIN_SHIFT - y) / res / size).floor().clamp(0.0, max);
	TileCoord::new(row as u32, col as u32)
}

/// Returns the Mercator extent of the tile at `coord` and `level`.
#[must_use]
pub fn tile_extent(level: u8, coord: TileCoord) -> GeoExtent {
	let side = tile_side(level);
	let x_min = -ORIGIN_SHIFT + side * f64::from(coord.col);
	let y_max = ORIGIN_SHIFT - side * f64::from(coord.row);
	GeoExtent::new_unchecked(x_min, y_max - side, x_min + side, y_max)
}

/// Inclusive column and row bounds of the tiles covering an extent at one level.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
	pub level: u8,
	pub col_min: u32,
	pub col_max: u32,
	pub row_min: u32,
	pub row_max: u32,
}

impl LevelRange {
	#[must_use]
	pub fn cols(&self) -> u64 {
		u64::from(self.col_max - self.col_min) + 1
	}

	#[must_use]
	pub fn rows(&self) -> u64 {
		u64::from(self.row_max - self.row_min) + 1
	}

	#[must_use]
	pub fn count(&self) -> u64 {
		self.cols() * self.rows()
	}

	fn coord_at(&self, local: u64) -> TileCoord {
		// column-major: rows vary fastest
		let rows = self.rows();
		TileCoord::new(self.row_min + (local % rows) as u32, self.col_min + (local / rows) as u32)
	}
}

impl Debug for LevelRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{}: cols [{},{}] rows [{},{}] ({})",
			self.level,
			self.col_min,
			self.col_max,
			self.row_min,
			self.row_max,
			self.count()
		)
	}
}

/// The ordered set of tiles covering a (clamped) extent at several zoom levels.
///
/// Tiles can be enumerated with [`iter_descriptors`](TilePyramid::iter_descriptors)
/// or addressed by their position in the enumeration with
/// [`descriptor_at`](TilePyramid::descriptor_at), which lets several workers
/// share one pyramid through a single index cursor.
#[derive(Clone, PartialEq)]
pub struct TilePyramid {
	ranges: Vec<LevelRange>,
	offsets: Vec<u64>,
	total: u64,
}

impl TilePyramid {
	/// Tiles covering `extent` at every level in `levels`.
	///
	/// The extent is clamped to `[-π·R, π·R - 1]` on both axes first, so the
	/// easternmost and southernmost edges never spill into a non-existent tile.
	/// An extent lying completely outside the world yields an empty pyramid.
	#[must_use]
	pub fn new(levels: &ZoomLevels, extent: &GeoExtent) -> TilePyramid {
		TilePyramid::from_bounds(levels, extent.as_array())
	}

	/// The single tile per level containing the point `(x, y)`.
	///
	/// # Errors
	/// Returns an error if a coordinate is not finite.
	pub fn from_point(levels: &ZoomLevels, x: f64, y: f64) -> Result<TilePyramid> {
		ensure!(x.is_finite() && y.is_finite(), "point ({x}, {y}) must be finite");
		Ok(TilePyramid::from_bounds(levels, [x, y, x, y]))
	}

	fn from_bounds(levels: &ZoomLevels, [x_min, y_min, x_max, y_max]: [f64; 4]) -> TilePyramid {
		let upper = ORIGIN_SHIFT - 1.0;
		let x0 = x_min.max(-ORIGIN_SHIFT);
		let y0 = y_min.max(-ORIGIN_SHIFT);
		let x1 = x_max.min(upper);
		let y1 = y_max.min(upper);

		let mut ranges = Vec::new();
		if x0 <= x1 && y0 <= y1 {
			for level in levels.iter() {
				let top_left = meters_to_tile(level, x0, y1);
				let bottom_right = meters_to_tile(level, x1, y0);
				ranges.push(LevelRange {
					level,
					col_min: top_left.col,
					col_max: bottom_right.col,
					row_min: top_left.row,
					row_max: bottom_right.row,
				});
			}
		}

		let mut offsets = Vec::with_capacity(ranges.len());
		let mut total = 0;
		for range in &ranges {
			offsets.push(total);
			total += range.count();
		}

		TilePyramid { ranges, offsets, total }
	}

	/// Total number of tiles in the pyramid.
	#[must_use]
	pub fn count_tiles(&self) -> u64 {
		self.total
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.total == 0
	}

	/// Per-level tile ranges in the order the levels were given.
	#[must_use]
	pub fn level_ranges(&self) -> &[LevelRange] {
		&self.ranges
	}

	/// The tile at position `index` of the enumeration, or `None` past the end.
	#[must_use]
	pub fn descriptor_at(&self, index: u64) -> Option<TileDescriptor> {
		if index >= self.total {
			return None;
		}
		let position = self.offsets.partition_point(|start| *start <= index) - 1;
		let range = &self.ranges[position];
		let coord = range.coord_at(index - self.offsets[position]);
		Some(TileDescriptor::new(range.level, coord, tile_extent(range.level, coord)))
	}

	/// Iterates over all tiles: by level in the given order, then column, then row.
	pub fn iter_descriptors(&self) -> impl Iterator<Item = TileDescriptor> + '_ {
		(0..self.total).filter_map(|index| self.descriptor_at(index))
	}
}

impl Debug for TilePyramid {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_list().entries(self.ranges.iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use rstest::rstest;

	fn levels(text: &str) -> ZoomLevels {
		text.parse().unwrap()
	}

	fn assert_extent_eq(actual: &GeoExtent, expected: [f64; 4]) {
		for (a, e) in actual.as_array().iter().zip(expected.iter()) {
			assert_relative_eq!(*a, *e, epsilon = 1e-6);
		}
	}

	#[test]
	fn level_zero_covers_the_world() {
		let pyramid = TilePyramid::new(&levels("0"), &GeoExtent::world());
		assert_eq!(pyramid.count_tiles(), 1);
		let tile = pyramid.descriptor_at(0).unwrap();
		assert_eq!((tile.level, tile.row(), tile.col()), (0, 0, 0));
		assert_extent_eq(&tile.extent, [-ORIGIN_SHIFT, -ORIGIN_SHIFT, ORIGIN_SHIFT, ORIGIN_SHIFT]);
	}

	#[test]
	fn identical_inputs_give_identical_sequences() {
		let extent = GeoExtent::new(-2e6, -1e6, 3e6, 4e6).unwrap();
		let first: Vec<TileDescriptor> = TilePyramid::new(&levels("5,0-3"), &extent).iter_descriptors().collect();
		let second: Vec<TileDescriptor> = TilePyramid::new(&levels("5,0-3"), &extent).iter_descriptors().collect();
		assert!(first.len() > 10);
		assert_eq!(first, second);

		// restarting from any index continues the same sequence
		let pyramid = TilePyramid::new(&levels("5,0-3"), &extent);
		let resumed: Vec<TileDescriptor> = (7..pyramid.count_tiles()).filter_map(|i| pyramid.descriptor_at(i)).collect();
		assert_eq!(resumed, first[7..]);
	}

	#[test]
	fn level_one_is_column_major() {
		let pyramid = TilePyramid::new(&levels("1"), &GeoExtent::world());
		let order: Vec<(u32, u32)> = pyramid.iter_descriptors().map(|t| (t.col(), t.row())).collect();
		assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

		let first = pyramid.descriptor_at(0).unwrap();
		assert_extent_eq(&first.extent, [-ORIGIN_SHIFT, 0.0, 0.0, ORIGIN_SHIFT]);
		let last = pyramid.descriptor_at(3).unwrap();
		assert_extent_eq(&last.extent, [0.0, -ORIGIN_SHIFT, ORIGIN_SHIFT, 0.0]);
		assert!(pyramid.descriptor_at(4).is_none());
	}

	#[rstest]
	#[case("0", 1)]
	#[case("0-2", 1 + 4 + 16)]
	#[case("3,5", 64 + 1024)]
	fn world_tile_counts(#[case] text: &str, #[case] expected: u64) {
		let pyramid = TilePyramid::new(&levels(text), &GeoExtent::world());
		assert_eq!(pyramid.count_tiles(), expected);
		assert_eq!(pyramid.iter_descriptors().count() as u64, expected);
	}

	#[test]
	fn oversized_extent_is_clamped() -> Result<()> {
		let huge = GeoExtent::new(-1e9, -1e9, 1e9, 1e9)?;
		let clamped = TilePyramid::new(&levels("0-3"), &huge);
		let world = TilePyramid::new(&levels("0-3"), &GeoExtent::world());
		assert_eq!(clamped, world);
		Ok(())
	}

	#[test]
	fn extent_outside_world_is_empty() -> Result<()> {
		let east = GeoExtent::new(ORIGIN_SHIFT + 10.0, 0.0, ORIGIN_SHIFT + 20.0, 10.0)?;
		let pyramid = TilePyramid::new(&levels("0-2"), &east);
		assert!(pyramid.is_empty());
		assert!(pyramid.descriptor_at(0).is_none());
		Ok(())
	}

	#[test]
	fn single_point_yields_one_tile_per_level() -> Result<()> {
		let pyramid = TilePyramid::from_point(&levels("0-4"), 1000.0, 1000.0)?;
		assert_eq!(pyramid.count_tiles(), 5);
		for tile in pyramid.iter_descriptors() {
			assert_eq!(tile.col(), 1 << tile.level >> 1);
			assert_eq!(tile.row(), if tile.level == 0 { 0 } else { (1 << tile.level >> 1) - 1 });
		}
		Ok(())
	}

	#[test]
	fn tiles_cover_the_clamped_extent() -> Result<()> {
		let extent = GeoExtent::new(-2_000_000.0, 1_000_000.0, 3_500_000.0, 4_000_000.0)?;
		let pyramid = TilePyramid::new(&levels("4-6"), &extent);
		for range in pyramid.level_ranges() {
			let first = tile_extent(range.level, TileCoord::new(range.row_min, range.col_min));
			let last = tile_extent(range.level, TileCoord::new(range.row_max, range.col_max));
			assert!(first.x_min() <= extent.x_min() && first.y_max() >= extent.y_max());
			assert!(last.x_max() >= extent.x_max() && last.y_min() <= extent.y_min());
			// one tile less on any side would leave part of the extent uncovered
			assert!(first.x_max() > extent.x_min() && first.y_min() < extent.y_max());
			assert!(last.x_min() < extent.x_max() && last.y_max() > extent.y_min());
		}
		Ok(())
	}

	#[test]
	fn descriptor_at_matches_iteration() -> Result<()> {
		let extent = GeoExtent::new(-5e6, -5e6, 5e6, 5e6)?;
		let pyramid = TilePyramid::new(&levels("2,4,7"), &extent);
		let all: Vec<TileDescriptor> = pyramid.iter_descriptors().collect();
		assert_eq!(all.len() as u64, pyramid.count_tiles());
		let levels: Vec<u8> = all.iter().map(|t| t.level).collect();
		let mut sorted = levels.clone();
		sorted.sort_unstable();
		assert_eq!(levels, sorted);
		assert_eq!(pyramid.descriptor_at(17), Some(all[17]));
		Ok(())
	}

	#[rstest]
	#[case(0, 1)]
	#[case(1, 2)]
	#[case(10, 1024)]
	fn meters_to_tile_corners(#[case] level: u8, #[case] tiles: u32) {
		let top_left = meters_to_tile(level, -ORIGIN_SHIFT, ORIGIN_SHIFT);
		assert_eq!(top_left, TileCoord::new(0, 0));
		let bottom_right = meters_to_tile(level, ORIGIN_SHIFT - 1.0, -ORIGIN_SHIFT);
		assert_eq!(bottom_right, TileCoord::new(tiles - 1, tiles - 1));
	}

	#[test]
	fn one_degree_square_at_level_zero() -> Result<()> {
		let degree = WORLD_SIZE / 360.0;
		let extent = GeoExtent::new(0.0, 0.0, degree, degree)?;
		let tiles: Vec<TileDescriptor> = TilePyramid::new(&levels("0"), &extent).iter_descriptors().collect();
		assert_eq!(tiles.len(), 1);
		assert_eq!(tiles[0].coord, TileCoord::new(0, 0));
		Ok(())
	}

	#[test]
	fn clamped_tiles_stay_inside_the_level_grid() -> Result<()> {
		let extent = GeoExtent::new(-3e7, -3e7, 3e7, 1e7)?;
		for tile in TilePyramid::new(&levels("0-5"), &extent).iter_descriptors() {
			let max = 1u32 << tile.level;
			assert!(tile.col() < max && tile.row() < max, "{tile:?} outside the grid");
		}
		Ok(())
	}

	#[test]
	fn resolution_halves_per_level() {
		assert_relative_eq!(resolution(0), 156_543.033_928_041, epsilon = 1e-6);
		assert_relative_eq!(resolution(1) * 2.0, resolution(0));
		assert_relative_eq!(tile_side(0), WORLD_SIZE);
	}
}
