//! Encodes grouped grid cells as a UTFGrid document.
//!
//! Every distinct attribute set gets a key `"0"`, `"1"`, ... in first-seen
//! order. Key `i` sits at position `i + 1` of the `keys` list, position 0 being
//! the reserved empty key. Each grid cell holds the character encoding the
//! position of its key, so cells without data hold the encoding of 0 (a space).

use super::{AttributeSet, CellGroup, GRID_SIZE};
use anyhow::{Context, Result, ensure};
use serde::{Serialize, Serializer};

/// Highest number of distinct attribute sets a single tile can encode.
///
/// Key positions from 1 up to this value map onto consecutive `char`s that end
/// right below the surrogate range (U+D800), where [`encode_char`] stops.
pub const MAX_KEYS: usize = 0xD800 - 35;

/// Maps a key position to its grid character.
///
/// The value is shifted past the control range and skips `"` (34) and `\` (92),
/// which would need escaping inside JSON strings. Returns `None` for positions
/// that do not map onto a valid `char`.
#[must_use]
pub fn encode_char(value: usize) -> Option<char> {
	let mut code = u32::try_from(value).ok()?.checked_add(32)?;
	if code >= 34 {
		code += 1;
	}
	if code >= 92 {
		code += 1;
	}
	char::from_u32(code)
}

/// A tile in UTFGrid form, ready to be serialized.
///
/// Fields serialize in the order `grid`, `keys`, `data`; `data` keeps key order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodedTile {
	pub grid: Vec<String>,
	pub keys: Vec<String>,
	pub data: KeyData,
}

/// The `data` section: key string to attribute set, in key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyData(Vec<(String, AttributeSet)>);

impl KeyData {
	#[must_use]
	pub fn get(&self, key: &str) -> Option<&AttributeSet> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, set)| set)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSet)> {
		self.0.iter().map(|(k, set)| (k.as_str(), set))
	}
}

impl Serialize for KeyData {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_map(self.0.iter().map(|(k, set)| (k, set)))
	}
}

impl EncodedTile {
	/// Pretty-printed JSON with two-space indentation.
	pub fn to_json(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec_pretty(self)?)
	}
}

/// Encodes the cells of a [`GRID_SIZE`] × [`GRID_SIZE`] grid.
///
/// Returns `Ok(None)` when the group holds no attribute set, meaning the tile
/// has no data and must not be written.
pub fn encode_cells(cells: &CellGroup) -> Result<Option<EncodedTile>> {
	encode_grid(cells, GRID_SIZE)
}

/// Same as [`encode_cells`] for a grid of `size` × `size` cells.
pub fn encode_grid(cells: &CellGroup, size: usize) -> Result<Option<EncodedTile>> {
	if cells.is_empty() {
		return Ok(None);
	}
	ensure!(
		cells.len() <= MAX_KEYS,
		"tile has {} distinct attribute sets, at most {MAX_KEYS} can be encoded",
		cells.len()
	);

	let blank = encode_char(0).context("no code for the empty key")?;
	let mut buffer = vec![vec![blank; size]; size];
	let mut keys = vec![String::new()];
	let mut data = Vec::with_capacity(cells.len());

	for (index, (set, group)) in cells.iter().enumerate() {
		let code = encode_char(keys.len()).with_context(|| format!("no code for key position {}", keys.len()))?;
		let key = index.to_string();
		for cell in group {
			buffer[cell.row][cell.col] = code;
		}
		keys.push(key.clone());
		data.push((key, set.clone()));
	}

	let grid = buffer.into_iter().map(String::from_iter).collect();
	Ok(Some(EncodedTile {
		grid,
		keys,
		data: KeyData(data),
	}))
}
