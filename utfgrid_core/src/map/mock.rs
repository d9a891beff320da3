//! In-memory map for tests.
//!
//! A [`MockMap`] is a list of [`MockLayer`]s, each answering identify queries
//! through a closure. Clones share an identify call counter, so a test can
//! hand a [`MockMapOpener`] to the worker pool and afterwards check how many
//! queries were issued.

use super::{IdentifiedObject, MapHandle, MapOpener, ProjectionCode};
use crate::{GeoExtent, grid::AttributeValue};
use anyhow::{Result, bail};
use std::sync::{
	Arc,
	atomic::{AtomicU64, AtomicUsize, Ordering},
};

type IdentifyFn = dyn Fn(&GeoExtent) -> Result<Vec<IdentifiedObject>> + Send + Sync;

/// A layer answering identify queries with a closure.
#[derive(Clone)]
pub struct MockLayer {
	name: String,
	identify: Arc<IdentifyFn>,
}

impl MockLayer {
	pub fn new<F>(identify: F) -> MockLayer
	where
		F: Fn(&GeoExtent) -> Vec<IdentifiedObject> + Send + Sync + 'static,
	{
		MockLayer {
			name: String::from("mock"),
			identify: Arc::new(move |extent: &GeoExtent| Ok(identify(extent))),
		}
	}

	/// A layer that reports the same single object everywhere.
	#[must_use]
	pub fn constant(properties: &[(&str, AttributeValue)]) -> MockLayer {
		let object = IdentifiedObject::new(properties.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect());
		MockLayer::new(move |_| vec![object.clone()])
	}

	/// A layer whose identify always fails.
	#[must_use]
	pub fn failing(message: &str) -> MockLayer {
		let message = message.to_string();
		MockLayer {
			name: String::from("failing"),
			identify: Arc::new(move |_: &GeoExtent| -> Result<Vec<IdentifiedObject>> { bail!("{message}") }),
		}
	}

	#[must_use]
	pub fn with_name(mut self, name: &str) -> MockLayer {
		self.name = name.to_string();
		self
	}
}

/// An in-memory map made of [`MockLayer`]s.
#[derive(Clone)]
pub struct MockMap {
	projection: ProjectionCode,
	extent: GeoExtent,
	layers: Vec<MockLayer>,
	identify_calls: Arc<AtomicU64>,
}

impl MockMap {
	/// A Web Mercator map covering the whole world.
	#[must_use]
	pub fn new(layers: Vec<MockLayer>) -> MockMap {
		MockMap {
			projection: ProjectionCode::WEB_MERCATOR,
			extent: GeoExtent::world(),
			layers,
			identify_calls: Arc::new(AtomicU64::new(0)),
		}
	}

	#[must_use]
	pub fn with_projection(mut self, code: u32) -> MockMap {
		self.projection = ProjectionCode(code);
		self
	}

	#[must_use]
	pub fn with_extent(mut self, extent: GeoExtent) -> MockMap {
		self.extent = extent;
		self
	}

	/// Number of layer identify queries issued so far, across all clones.
	#[must_use]
	pub fn identify_calls(&self) -> u64 {
		self.identify_calls.load(Ordering::Relaxed)
	}
}

impl MapHandle for MockMap {
	fn projection(&self) -> ProjectionCode {
		self.projection
	}

	fn full_extent(&self) -> Result<GeoExtent> {
		Ok(self.extent)
	}

	fn layer_count(&self) -> usize {
		self.layers.len()
	}

	fn layer_name(&self, index: usize) -> String {
		self.layers.get(index).map_or_else(String::new, |layer| layer.name.clone())
	}

	fn identify_layer(&self, index: usize, extent: &GeoExtent) -> Result<Vec<IdentifiedObject>> {
		self.identify_calls.fetch_add(1, Ordering::Relaxed);
		match self.layers.get(index) {
			Some(layer) => (layer.identify)(extent),
			None => bail!("layer index {index} out of range"),
		}
	}
}

/// Opens clones of a [`MockMap`], optionally failing from the n-th open on.
pub struct MockMapOpener {
	map: MockMap,
	opened: AtomicUsize,
	fail_from: Option<usize>,
	projection_from: Option<(usize, u32)>,
}

impl MockMapOpener {
	#[must_use]
	pub fn new(map: MockMap) -> MockMapOpener {
		MockMapOpener {
			map,
			opened: AtomicUsize::new(0),
			fail_from: None,
			projection_from: None,
		}
	}

	/// Every open with a zero-based sequence number `>= n` fails.
	#[must_use]
	pub fn failing_from(mut self, n: usize) -> MockMapOpener {
		self.fail_from = Some(n);
		self
	}

	/// Every open with a sequence number `>= n` reports projection `code`.
	#[must_use]
	pub fn with_projection_from(mut self, n: usize, code: u32) -> MockMapOpener {
		self.projection_from = Some((n, code));
		self
	}

	/// Number of `open_map` calls so far.
	#[must_use]
	pub fn open_count(&self) -> usize {
		self.opened.load(Ordering::Relaxed)
	}
}

impl MapOpener for MockMapOpener {
	fn open_map(&self) -> Result<Box<dyn MapHandle>> {
		let sequence = self.opened.fetch_add(1, Ordering::Relaxed);
		if self.fail_from.is_some_and(|n| sequence >= n) {
			bail!("mock map could not be opened (open #{sequence})");
		}
		let mut map = self.map.clone();
		if let Some((n, code)) = self.projection_from
			&& sequence >= n
		{
			map = map.with_projection(code);
		}
		Ok(Box::new(map))
	}
}
