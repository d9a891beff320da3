//! Map documents: a YAML file listing the layers of a map.
//!
//! ```yaml
//! projection: 3857
//! extent: [-20000, -20000, 20000, 20000]
//! layers:
//!   - name: parcels
//!     type: vector
//!     path: parcels.geojson
//!     coordinates: wgs84
//!   - name: elevation
//!     type: raster
//!     path: dem.asc
//!     field: Elevation
//!     visible: false
//! ```
//!
//! Layers are listed topmost first. Relative paths are resolved against the
//! directory holding the document.

use super::{
	CoordinateSystem, DEFAULT_RASTER_FIELD, IdentifiedObject, MapHandle, MapOpener, ProjectionCode, RasterLayer,
	VectorLayer,
};
use crate::GeoExtent;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::{Path, PathBuf},
};
use utfgrid_derive::context;

fn default_visible() -> bool {
	true
}

fn default_field() -> String {
	DEFAULT_RASTER_FIELD.to_string()
}

/// The deserialized form of a map document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
	/// Spatial reference code of the map.
	#[serde(default)]
	pub projection: ProjectionCode,

	/// Overrides the extent computed from the layers.
	#[serde(default)]
	pub extent: Option<GeoExtent>,

	/// Layers, topmost first.
	pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerConfig {
	Vector {
		name: String,
		path: PathBuf,
		#[serde(default = "default_visible")]
		visible: bool,
		#[serde(default)]
		coordinates: CoordinateSystem,
	},
	Raster {
		name: String,
		path: PathBuf,
		#[serde(default = "default_visible")]
		visible: bool,
		#[serde(default = "default_field")]
		field: String,
	},
}

impl MapConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parses a document file and resolves layer paths relative to it.
	#[context("Failed to read map document {path:?}")]
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path)?;
		let mut config = MapConfig::from_reader(BufReader::new(file))?;
		config.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
		Ok(config)
	}

	pub fn resolve_paths(&mut self, base: &Path) {
		for layer in &mut self.layers {
			let path = match layer {
				LayerConfig::Vector { path, .. } | LayerConfig::Raster { path, .. } => path,
			};
			if path.is_relative() {
				*path = base.join(&*path);
			}
		}
	}
}

enum LayerSource {
	Vector(VectorLayer),
	Raster(RasterLayer),
}

struct MapLayer {
	name: String,
	visible: bool,
	source: LayerSource,
}

impl MapLayer {
	#[context("Failed to load layer {:?}", config)]
	fn load(config: &LayerConfig) -> Result<MapLayer> {
		Ok(match config {
			LayerConfig::Vector {
				name,
				path,
				visible,
				coordinates,
			} => MapLayer {
				name: name.clone(),
				visible: *visible,
				source: LayerSource::Vector(VectorLayer::open(path, *coordinates)?),
			},
			LayerConfig::Raster {
				name,
				path,
				visible,
				field,
			} => MapLayer {
				name: name.clone(),
				visible: *visible,
				source: LayerSource::Raster(RasterLayer::open(path, field)?),
			},
		})
	}

	fn bounds(&self) -> Option<[f64; 4]> {
		match &self.source {
			LayerSource::Vector(layer) => layer.bounds(),
			LayerSource::Raster(layer) => Some(layer.bounds()),
		}
	}
}

/// A loaded map document.
pub struct MapDocument {
	projection: ProjectionCode,
	extent: Option<GeoExtent>,
	layers: Vec<MapLayer>,
}

impl MapDocument {
	/// Loads every layer named by `config`.
	pub fn load(config: &MapConfig) -> Result<MapDocument> {
		let layers = config.layers.iter().map(MapLayer::load).collect::<Result<Vec<_>>>()?;
		log::debug!("loaded map with {} layers", layers.len());
		Ok(MapDocument {
			projection: config.projection,
			extent: config.extent,
			layers,
		})
	}

	#[context("Failed to open map {path:?}")]
	pub fn open(path: &Path) -> Result<MapDocument> {
		MapDocument::load(&MapConfig::from_path(path)?)
	}

	/// Returns `true` if layer `index` takes part in identify queries.
	#[must_use]
	pub fn layer_visible(&self, index: usize) -> bool {
		self.layers.get(index).is_some_and(|layer| layer.visible)
	}
}

impl MapHandle for MapDocument {
	fn projection(&self) -> ProjectionCode {
		self.projection
	}

	fn full_extent(&self) -> Result<GeoExtent> {
		if let Some(extent) = self.extent {
			return Ok(extent);
		}
		let bounds = self
			.layers
			.iter()
			.filter_map(MapLayer::bounds)
			.reduce(|a, b| [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])])
			.context("map has no data to derive an extent from")?;
		GeoExtent::try_from(bounds).context("map extent is degenerate, set an explicit extent")
	}

	fn layer_count(&self) -> usize {
		self.layers.len()
	}

	fn layer_name(&self, index: usize) -> String {
		self.layers.get(index).map_or_else(String::new, |layer| layer.name.clone())
	}

	fn identify_layer(&self, index: usize, extent: &GeoExtent) -> Result<Vec<IdentifiedObject>> {
		let layer = self.layers.get(index).with_context(|| format!("layer index {index} out of range"))?;
		if !layer.visible {
			return Ok(Vec::new());
		}
		Ok(match &layer.source {
			LayerSource::Vector(vector) => vector.identify(extent),
			LayerSource::Raster(raster) => raster.identify(extent),
		})
	}
}

/// Opens a map document from disk, once per worker.
#[derive(Clone, Debug)]
pub struct MapDocumentOpener {
	path: PathBuf,
}

impl MapDocumentOpener {
	#[must_use]
	pub fn new(path: &Path) -> MapDocumentOpener {
		MapDocumentOpener { path: path.to_path_buf() }
	}
}

impl MapOpener for MapDocumentOpener {
	fn open_map(&self) -> Result<Box<dyn MapHandle>> {
		Ok(Box::new(MapDocument::open(&self.path)?))
	}
}
