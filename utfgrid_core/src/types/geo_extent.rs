use crate::ORIGIN_SHIFT;
use anyhow::{Result, ensure};
use serde::Deserialize;
use std::{fmt::Debug, str::FromStr};
use utfgrid_derive::context;

/// An axis-aligned rectangle in Web Mercator meters.
///
/// The extent is immutable once built. Its fields are private so every instance
/// upholds `x_min < x_max` and `y_min < y_max` with finite coordinates.
///
/// # Examples
/// ```
/// use utfgrid_core::GeoExtent;
///
/// let extent = GeoExtent::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(extent.width(), 20.0);
/// assert!(GeoExtent::new(10.0, -5.0, -10.0, 5.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "[f64; 4]")]
pub struct GeoExtent {
	x_min: f64,
	y_min: f64,
	x_max: f64,
	y_max: f64,
}

impl GeoExtent {
	/// Creates a new extent from `x_min, y_min, x_max, y_max`.
	///
	/// # Errors
	/// Returns an error if a coordinate is not finite or if the rectangle is empty.
	#[must_use = "GeoExtent::new returns a Result; handle the error or unwrap"]
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoExtent> {
		GeoExtent {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// Builds an extent whose validity is guaranteed by the caller's arithmetic.
	pub(crate) fn new_unchecked(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> GeoExtent {
		debug_assert!(x_min < x_max && y_min < y_max);
		GeoExtent {
			x_min,
			y_min,
			x_max,
			y_max,
		}
	}

	/// The extent covering the whole Web Mercator world.
	#[must_use]
	pub fn world() -> GeoExtent {
		GeoExtent::new_unchecked(-ORIGIN_SHIFT, -ORIGIN_SHIFT, ORIGIN_SHIFT, ORIGIN_SHIFT)
	}

	#[must_use]
	pub fn x_min(&self) -> f64 {
		self.x_min
	}

	#[must_use]
	pub fn y_min(&self) -> f64 {
		self.y_min
	}

	#[must_use]
	pub fn x_max(&self) -> f64 {
		self.x_max
	}

	#[must_use]
	pub fn y_max(&self) -> f64 {
		self.y_max
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	#[must_use]
	pub fn center(&self) -> [f64; 2] {
		[
			f64::midpoint(self.x_min, self.x_max),
			f64::midpoint(self.y_min, self.y_max),
		]
	}

	/// Returns `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Returns `true` if both rectangles share at least one point, edges included.
	#[must_use]
	pub fn intersects(&self, other: &GeoExtent) -> bool {
		self.x_min <= other.x_max && other.x_min <= self.x_max && self.y_min <= other.y_max && other.y_min <= self.y_max
	}

	/// Returns the smallest extent containing both `self` and `other`.
	#[must_use]
	pub fn union(&self, other: &GeoExtent) -> GeoExtent {
		GeoExtent::new_unchecked(
			self.x_min.min(other.x_min),
			self.y_min.min(other.y_min),
			self.x_max.max(other.x_max),
			self.y_max.max(other.y_max),
		)
	}

	fn checked(self) -> Result<Self> {
		ensure!(
			self.as_array().iter().all(|v| v.is_finite()),
			"coordinates must be finite, got {self:?}"
		);
		ensure!(
			self.x_min < self.x_max,
			"x_min ({}) must be smaller than x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min < self.y_max,
			"y_min ({}) must be smaller than y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}
}

impl Debug for GeoExtent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoExtent({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl TryFrom<[f64; 4]> for GeoExtent {
	type Error = anyhow::Error;

	fn try_from(input: [f64; 4]) -> Result<Self> {
		GeoExtent::new(input[0], input[1], input[2], input[3])
	}
}

impl TryFrom<Vec<f64>> for GeoExtent {
	type Error = anyhow::Error;

	#[context("Failed to convert {input:?} to GeoExtent")]
	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 4,
			"GeoExtent must have 4 elements (x_min, y_min, x_max, y_max)"
		);
		GeoExtent::new(input[0], input[1], input[2], input[3])
	}
}

impl FromStr for GeoExtent {
	type Err = anyhow::Error;

	/// Parses `"x_min,y_min,x_max,y_max"`, as passed on the command line.
	#[context("Failed to parse extent {text:?}")]
	fn from_str(text: &str) -> Result<Self> {
		let values = text
			.split(',')
			.map(|part| part.trim().parse::<f64>())
			.collect::<Result<Vec<f64>, _>>()?;
		GeoExtent::try_from(values)
	}
}
