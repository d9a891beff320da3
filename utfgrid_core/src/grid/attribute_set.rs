use super::AttributeValue;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The field/value pairs describing one grid cell.
///
/// Keys are unique and kept in ascending order, so two sets built from the same
/// pairs in any order are equal and hash identically. When a key is offered
/// more than once, the first value wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, AttributeValue>);

impl AttributeSet {
	#[must_use]
	pub fn new() -> AttributeSet {
		AttributeSet::default()
	}

	/// Builds the set for one pixel from identify results, in layer order.
	///
	/// Pairs whose value is the `NoData` marker are dropped, as are keys
	/// missing from `allowlist` when one is given. Duplicate keys keep the value
	/// seen first.
	pub fn from_identify<I>(pairs: I, allowlist: Option<&BTreeSet<String>>) -> AttributeSet
	where
		I: IntoIterator<Item = (String, AttributeValue)>,
	{
		let mut set = AttributeSet::new();
		for (key, value) in pairs {
			if value.is_no_data() {
				continue;
			}
			if allowlist.is_some_and(|allowed| !allowed.contains(&key)) {
				continue;
			}
			set.insert_first(key, value);
		}
		set
	}

	/// Inserts `value` unless `key` is already present. Returns `true` if inserted.
	pub fn insert_first(&mut self, key: impl Into<String>, value: AttributeValue) -> bool {
		use std::collections::btree_map::Entry;
		match self.0.entry(key.into()) {
			Entry::Vacant(entry) => {
				entry.insert(value);
				true
			}
			Entry::Occupied(_) => false,
		}
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&AttributeValue> {
		self.0.get(key)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the pairs in ascending key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for AttributeSet {
	fn from_iter<T: IntoIterator<Item = (K, AttributeValue)>>(iter: T) -> Self {
		let mut set = AttributeSet::new();
		for (key, value) in iter {
			set.insert_first(key, value);
		}
		set
	}
}
