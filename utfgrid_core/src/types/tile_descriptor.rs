use crate::{GeoExtent, TileCoord};
use std::fmt::{self, Debug};

/// One unit of work: a tile at a zoom level together with its Mercator extent.
#[derive(Clone, Copy, PartialEq)]
pub struct TileDescriptor {
	pub level: u8,
	pub coord: TileCoord,
	pub extent: GeoExtent,
}

impl TileDescriptor {
	#[must_use]
	pub fn new(level: u8, coord: TileCoord, extent: GeoExtent) -> TileDescriptor {
		TileDescriptor { level, coord, extent }
	}

	#[must_use]
	pub fn row(&self) -> u32 {
		self.coord.row
	}

	#[must_use]
	pub fn col(&self) -> u32 {
		self.coord.col
	}
}

impl Debug for TileDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_fmt(format_args!(
			"Tile(level: {}, row: {}, col: {})",
			self.level, self.coord.row, self.coord.col
		))
	}
}
