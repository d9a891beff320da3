use super::ProjectionCode;
use crate::{GeoExtent, grid::AttributeValue};
use anyhow::Result;

/// One object an identify query found, with its attribute pairs in field order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdentifiedObject {
	pub properties: Vec<(String, AttributeValue)>,
}

impl IdentifiedObject {
	#[must_use]
	pub fn new(properties: Vec<(String, AttributeValue)>) -> IdentifiedObject {
		IdentifiedObject { properties }
	}
}

/// An opened map owned by a single worker.
///
/// Layers are indexed from the top of the drawing order. Invisible layers
/// and layers that do not support identify return no objects.
pub trait MapHandle {
	/// Projection code of the map's spatial reference.
	fn projection(&self) -> ProjectionCode;

	/// The extent covered by the map's data, in map coordinates.
	fn full_extent(&self) -> Result<GeoExtent>;

	fn layer_count(&self) -> usize;

	fn layer_name(&self, index: usize) -> String {
		format!("layer {index}")
	}

	/// Objects of layer `index` intersecting `extent`.
	fn identify_layer(&self, index: usize, extent: &GeoExtent) -> Result<Vec<IdentifiedObject>>;

	/// Attribute pairs of all layers at `extent`, topmost layer first.
	///
	/// A layer whose identify fails contributes nothing; the other layers are
	/// still queried.
	fn identify_pixel(&self, extent: &GeoExtent) -> Vec<(String, AttributeValue)> {
		let mut pairs = Vec::new();
		for index in 0..self.layer_count() {
			match self.identify_layer(index, extent) {
				Ok(objects) => {
					for object in objects {
						pairs.extend(object.properties);
					}
				}
				Err(err) => log::debug!("identify failed on {} at {extent:?}: {err:#}", self.layer_name(index)),
			}
		}
		pairs
	}
}

/// Opens map handles. Shared by all workers of a generation run.
pub trait MapOpener: Send + Sync {
	/// Opens a new, independent handle.
	fn open_map(&self) -> Result<Box<dyn MapHandle>>;
}
