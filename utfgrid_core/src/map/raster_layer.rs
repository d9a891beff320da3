//! Raster layers read from ESRI ASCII grid files.
//!
//! ```text
//! ncols        4
//! nrows        2
//! xllcorner    0.0
//! yllcorner    0.0
//! cellsize     10.0
//! NODATA_value -9999
//! 1 2 3 -9999
//! 5 6 7 8
//! ```
//!
//! Rows are listed from north to south. `xllcenter`/`yllcenter` may replace the
//! corner keys, and `NODATA_value` is optional.

use super::IdentifiedObject;
use crate::{
	GeoExtent,
	grid::{AttributeValue, NO_DATA},
};
use anyhow::{Context, Result, bail, ensure};
use std::{fs, path::Path};
use utfgrid_derive::context;

/// Field name raster identify results are reported under by default.
pub const DEFAULT_RASTER_FIELD: &str = "Pixel Value";

/// A grid of cell values in map coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterLayer {
	field: String,
	columns: usize,
	rows: usize,
	x_min: f64,
	y_max: f64,
	cell_size: f64,
	no_data: Option<String>,
	values: Vec<String>,
}

impl RasterLayer {
	#[context("Failed to read ASCII grid {path:?}")]
	pub fn open(path: &Path, field: &str) -> Result<RasterLayer> {
		let text = fs::read_to_string(path)?;
		RasterLayer::parse(&text, field)
	}

	/// Parses the text of an ESRI ASCII grid. Cell values are kept as written.
	pub fn parse(text: &str, field: &str) -> Result<RasterLayer> {
		let mut tokens = text.split_whitespace().peekable();

		let mut columns = None;
		let mut rows = None;
		let mut x_corner = None;
		let mut y_corner = None;
		let mut x_center = None;
		let mut y_center = None;
		let mut cell_size = None;
		let mut no_data = None;

		while let Some(key) = tokens.next_if(|token| token.starts_with(|c: char| c.is_ascii_alphabetic())) {
			let value = tokens.next().with_context(|| format!("header {key:?} has no value"))?;
			let number = || value.parse::<f64>().with_context(|| format!("header {key:?} has invalid value {value:?}"));
			match key.to_ascii_lowercase().as_str() {
				"ncols" => columns = Some(value.parse::<usize>().context("ncols must be a positive integer")?),
				"nrows" => rows = Some(value.parse::<usize>().context("nrows must be a positive integer")?),
				"xllcorner" => x_corner = Some(number()?),
				"yllcorner" => y_corner = Some(number()?),
				"xllcenter" => x_center = Some(number()?),
				"yllcenter" => y_center = Some(number()?),
				"cellsize" => cell_size = Some(number()?),
				"nodata_value" => no_data = Some(value.to_string()),
				other => bail!("unknown header {other:?}"),
			}
		}

		let columns = columns.context("missing header ncols")?;
		let rows = rows.context("missing header nrows")?;
		let cell_size = cell_size.context("missing header cellsize")?;
		ensure!(columns > 0 && rows > 0, "grid must have at least one cell");
		ensure!(cell_size > 0.0 && cell_size.is_finite(), "cellsize must be positive");

		let half = cell_size / 2.0;
		let x_min = match (x_corner, x_center) {
			(Some(x), _) => x,
			(None, Some(x)) => x - half,
			(None, None) => bail!("missing header xllcorner or xllcenter"),
		};
		let y_min = match (y_corner, y_center) {
			(Some(y), _) => y,
			(None, Some(y)) => y - half,
			(None, None) => bail!("missing header yllcorner or yllcenter"),
		};

		let cell_count = columns
			.checked_mul(rows)
			.with_context(|| format!("grid of {columns} × {rows} cells is too large"))?;
		let values: Vec<String> = tokens.map(str::to_string).collect();
		ensure!(
			values.len() == cell_count,
			"expected {cell_count} cell values ({columns} × {rows}), found {}",
			values.len()
		);

		let y_max = y_min + rows as f64 * cell_size;

		Ok(RasterLayer {
			field: field.to_string(),
			columns,
			rows,
			x_min,
			y_max,
			cell_size,
			no_data,
			values,
		})
	}

	/// `[x_min, y_min, x_max, y_max]` of the grid.
	#[must_use]
	pub fn bounds(&self) -> [f64; 4] {
		[
			self.x_min,
			self.y_max - self.rows as f64 * self.cell_size,
			self.x_min + self.columns as f64 * self.cell_size,
			self.y_max,
		]
	}

	fn is_no_data(&self, value: &str) -> bool {
		let Some(no_data) = &self.no_data else {
			return false;
		};
		match (value.parse::<f64>(), no_data.parse::<f64>()) {
			(Ok(a), Ok(b)) => a == b,
			_ => value == no_data,
		}
	}

	/// The cell under the center of `extent`, or nothing outside the grid.
	#[must_use]
	pub fn identify(&self, extent: &GeoExtent) -> Vec<IdentifiedObject> {
		let [x, y] = extent.center();
		let col = ((x - self.x_min) / self.cell_size).floor();
		let row = ((self.y_max - y) / self.cell_size).floor();
		if col < 0.0 || row < 0.0 || col >= self.columns as f64 || row >= self.rows as f64 {
			return Vec::new();
		}

		let value = &self.values[row as usize * self.columns + col as usize];
		let value = if self.is_no_data(value) {
			AttributeValue::from(NO_DATA)
		} else {
			AttributeValue::from(value.as_str())
		};
		vec![IdentifiedObject::new(vec![(self.field.clone(), value)])]
	}
}
