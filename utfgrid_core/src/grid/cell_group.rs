use super::AttributeSet;
use std::collections::HashMap;

/// Position of a pixel inside the sampling grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
	pub row: usize,
	pub col: usize,
}

impl Cell {
	#[must_use]
	pub fn new(row: usize, col: usize) -> Cell {
		Cell { row, col }
	}
}

/// Cells grouped by identical attribute set.
///
/// Groups are kept in the order their set was first seen, which fixes the key
/// numbering of the encoded tile. Empty sets are never stored.
#[derive(Clone, Debug, Default)]
pub struct CellGroup {
	lookup: HashMap<AttributeSet, usize>,
	groups: Vec<(AttributeSet, Vec<Cell>)>,
}

impl CellGroup {
	#[must_use]
	pub fn new() -> CellGroup {
		CellGroup::default()
	}

	/// Adds `cell` to the group of `set`, opening a new group if needed.
	pub fn insert(&mut self, set: AttributeSet, cell: Cell) {
		if set.is_empty() {
			return;
		}
		if let Some(&position) = self.lookup.get(&set) {
			self.groups[position].1.push(cell);
		} else {
			self.lookup.insert(set.clone(), self.groups.len());
			self.groups.push((set, vec![cell]));
		}
	}

	/// Number of distinct attribute sets.
	#[must_use]
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	/// Iterates over the groups in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&AttributeSet, &[Cell])> {
		self.groups.iter().map(|(set, cells)| (set, cells.as_slice()))
	}
}
