//! GeoJSON vector layers with an R-tree over feature bounding boxes.

use super::IdentifiedObject;
use crate::{EARTH_RADIUS, GeoExtent, MAX_LAT, MAX_LON, grid::AttributeValue};
use anyhow::{Context, Result, bail, ensure};
use geo::{
	BoundingRect, Coord, Geometry, GeometryCollection, Intersects, LineString, MultiLineString, MultiPoint, MultiPolygon,
	Point, Polygon, Rect,
};
use rstar::{AABB, RTree, RTreeObject};
use serde::Deserialize;
use serde_json::Value;
use std::{fs::File, io::BufReader, path::Path};
use utfgrid_derive::context;

/// Coordinate system of the positions stored in a GeoJSON file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
	/// Web Mercator meters, used as-is.
	#[default]
	Mercator,
	/// Longitude/latitude in degrees, projected to Web Mercator on load.
	Wgs84,
}

impl CoordinateSystem {
	fn project(self, x: f64, y: f64) -> Coord<f64> {
		match self {
			CoordinateSystem::Mercator => Coord { x, y },
			CoordinateSystem::Wgs84 => {
				let lon = x.clamp(-MAX_LON, MAX_LON);
				let lat = y.clamp(-MAX_LAT, MAX_LAT);
				Coord {
					x: EARTH_RADIUS * lon.to_radians(),
					y: EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
				}
			}
		}
	}
}

#[derive(Clone, Debug)]
struct VectorFeature {
	geometry: Geometry<f64>,
	properties: Vec<(String, AttributeValue)>,
}

/// Bounding box of one feature, stored in the R-tree.
#[derive(Clone, Debug)]
struct FeatureEnvelope {
	index: usize,
	min: [f64; 2],
	max: [f64; 2],
}

impl RTreeObject for FeatureEnvelope {
	type Envelope = AABB<[f64; 2]>;

	fn envelope(&self) -> Self::Envelope {
		AABB::from_corners(self.min, self.max)
	}
}

/// Features of a GeoJSON document, queryable by rectangle.
pub struct VectorLayer {
	features: Vec<VectorFeature>,
	index: RTree<FeatureEnvelope>,
	bounds: Option<[f64; 4]>,
}

impl VectorLayer {
	#[context("Failed to read GeoJSON file {path:?}")]
	pub fn open(path: &Path, coordinates: CoordinateSystem) -> Result<VectorLayer> {
		let file = File::open(path)?;
		let value: Value = serde_json::from_reader(BufReader::new(file))?;
		VectorLayer::from_geojson(&value, coordinates)
	}

	/// Builds the layer from a `FeatureCollection`, a single `Feature` or a bare geometry.
	///
	/// Features without geometry are skipped.
	pub fn from_geojson(value: &Value, coordinates: CoordinateSystem) -> Result<VectorLayer> {
		let mut features = Vec::new();
		match value["type"].as_str() {
			Some("FeatureCollection") => {
				let list = value["features"].as_array().context("FeatureCollection without \"features\" array")?;
				for (position, feature) in list.iter().enumerate() {
					let parsed = parse_feature(feature, coordinates).with_context(|| format!("invalid feature #{position}"))?;
					features.extend(parsed);
				}
			}
			Some("Feature") => features.extend(parse_feature(value, coordinates)?),
			Some(_) => features.push(VectorFeature {
				geometry: parse_geometry(value, coordinates)?,
				properties: Vec::new(),
			}),
			None => bail!("GeoJSON object has no \"type\""),
		}
		Ok(VectorLayer::new(features))
	}

	fn new(features: Vec<VectorFeature>) -> VectorLayer {
		let mut bounds: Option<[f64; 4]> = None;
		let mut envelopes = Vec::with_capacity(features.len());
		for (index, feature) in features.iter().enumerate() {
			let Some(rect) = feature.geometry.bounding_rect() else {
				continue;
			};
			let (min, max) = (rect.min(), rect.max());
			envelopes.push(FeatureEnvelope {
				index,
				min: [min.x, min.y],
				max: [max.x, max.y],
			});
			bounds = Some(match bounds {
				None => [min.x, min.y, max.x, max.y],
				Some(b) => [b[0].min(min.x), b[1].min(min.y), b[2].max(max.x), b[3].max(max.y)],
			});
		}
		VectorLayer {
			features,
			index: RTree::bulk_load(envelopes),
			bounds,
		}
	}

	#[must_use]
	pub fn feature_count(&self) -> usize {
		self.features.len()
	}

	/// `[x_min, y_min, x_max, y_max]` of all features, if any has coordinates.
	///
	/// The box may be degenerate, e.g. for a layer holding a single point.
	#[must_use]
	pub fn bounds(&self) -> Option<[f64; 4]> {
		self.bounds
	}

	/// Features intersecting `extent`, in document order.
	#[must_use]
	pub fn identify(&self, extent: &GeoExtent) -> Vec<IdentifiedObject> {
		let [x_min, y_min, x_max, y_max] = extent.as_array();
		let envelope = AABB::from_corners([x_min, y_min], [x_max, y_max]);
		let rect = Rect::new(Coord { x: x_min, y: y_min }, Coord { x: x_max, y: y_max });

		let mut hits: Vec<usize> = self
			.index
			.locate_in_envelope_intersecting(&envelope)
			.map(|entry| entry.index)
			.filter(|index| self.features[*index].geometry.intersects(&rect))
			.collect();
		hits.sort_unstable();

		hits
			.into_iter()
			.map(|index| IdentifiedObject::new(self.features[index].properties.clone()))
			.collect()
	}
}

fn parse_feature(value: &Value, coordinates: CoordinateSystem) -> Result<Option<VectorFeature>> {
	ensure!(value["type"].as_str() == Some("Feature"), "expected a Feature object");
	let geometry = &value["geometry"];
	if geometry.is_null() {
		return Ok(None);
	}
	let properties = match &value["properties"] {
		Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), AttributeValue::from_json(v))).collect(),
		Value::Null => Vec::new(),
		other => bail!("feature properties must be an object, got {other}"),
	};
	Ok(Some(VectorFeature {
		geometry: parse_geometry(geometry, coordinates)?,
		properties,
	}))
}

fn parse_geometry(value: &Value, cs: CoordinateSystem) -> Result<Geometry<f64>> {
	let kind = value["type"].as_str().context("geometry has no \"type\"")?;
	if kind == "GeometryCollection" {
		let parts = value["geometries"].as_array().context("GeometryCollection without \"geometries\"")?;
		let geometries = parts.iter().map(|part| parse_geometry(part, cs)).collect::<Result<Vec<_>>>()?;
		return Ok(Geometry::GeometryCollection(GeometryCollection(geometries)));
	}

	let coords = &value["coordinates"];
	Ok(match kind {
		"Point" => Geometry::Point(Point(parse_position(coords, cs)?)),
		"MultiPoint" => Geometry::MultiPoint(MultiPoint(
			parse_positions(coords, cs)?.into_iter().map(Point).collect(),
		)),
		"LineString" => Geometry::LineString(LineString(parse_positions(coords, cs)?)),
		"MultiLineString" => Geometry::MultiLineString(MultiLineString(
			as_array(coords)?
				.iter()
				.map(|line| Ok(LineString(parse_positions(line, cs)?)))
				.collect::<Result<Vec<_>>>()?,
		)),
		"Polygon" => Geometry::Polygon(parse_polygon(coords, cs)?),
		"MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
			as_array(coords)?
				.iter()
				.map(|polygon| parse_polygon(polygon, cs))
				.collect::<Result<Vec<_>>>()?,
		)),
		other => bail!("unsupported geometry type {other:?}"),
	})
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
	value.as_array().with_context(|| format!("expected an array, got {value}"))
}

fn parse_position(value: &Value, cs: CoordinateSystem) -> Result<Coord<f64>> {
	let position = as_array(value)?;
	ensure!(position.len() >= 2, "position needs at least two numbers, got {value}");
	let x = position[0].as_f64().context("x must be a number")?;
	let y = position[1].as_f64().context("y must be a number")?;
	Ok(cs.project(x, y))
}

fn parse_positions(value: &Value, cs: CoordinateSystem) -> Result<Vec<Coord<f64>>> {
	as_array(value)?.iter().map(|p| parse_position(p, cs)).collect()
}

fn parse_polygon(value: &Value, cs: CoordinateSystem) -> Result<Polygon<f64>> {
	let mut rings = as_array(value)?
		.iter()
		.map(|ring| Ok(LineString(parse_positions(ring, cs)?)))
		.collect::<Result<Vec<_>>>()?;
	ensure!(!rings.is_empty(), "polygon without exterior ring");
	let exterior = rings.remove(0);
	// Polygon::new closes open rings
	Ok(Polygon::new(exterior, rings))
}
