use std::fmt::{self, Debug};

/// Position of a tile inside one zoom level.
///
/// Rows grow southwards from the north edge of the world, columns grow eastwards
/// from the west edge. Both are non-negative by construction.
#[derive(Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct TileCoord {
	pub row: u32,
	pub col: u32,
}

impl TileCoord {
	#[must_use]
	pub fn new(row: u32, col: u32) -> TileCoord {
		TileCoord { row, col }
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord(row: {}, col: {})", &self.row, &self.col))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_format() {
		assert_eq!(format!("{:?}", TileCoord::new(3, 7)), "TileCoord(row: 3, col: 7)");
	}

	#[test]
	fn ordering_is_row_major() {
		let mut coords = vec![TileCoord::new(1, 0), TileCoord::new(0, 1), TileCoord::new(0, 0)];
		coords.sort();
		assert_eq!(
			coords,
			vec![TileCoord::new(0, 0), TileCoord::new(0, 1), TileCoord::new(1, 0)]
		);
	}
}
