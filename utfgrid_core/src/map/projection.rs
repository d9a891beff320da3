use super::MapHandle;
use anyhow::{Result, ensure};
use serde::Deserialize;
use std::fmt::{self, Display};

/// EPSG and ESRI factory codes that denote spherical Web Mercator.
pub const WEB_MERCATOR_CODES: [u32; 5] = [3857, 3785, 900_913, 102_100, 102_113];

/// A spatial reference factory code, e.g. `3857`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ProjectionCode(pub u32);

impl ProjectionCode {
	pub const WEB_MERCATOR: ProjectionCode = ProjectionCode(3857);

	#[must_use]
	pub fn is_web_mercator(&self) -> bool {
		WEB_MERCATOR_CODES.contains(&self.0)
	}
}

impl Default for ProjectionCode {
	fn default() -> Self {
		ProjectionCode::WEB_MERCATOR
	}
}

impl Display for ProjectionCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Fails unless `map` is in Web Mercator.
pub fn ensure_web_mercator(map: &dyn MapHandle) -> Result<()> {
	let projection = map.projection();
	ensure!(
		projection.is_web_mercator(),
		"map projection {projection} is not Web Mercator (expected one of {WEB_MERCATOR_CODES:?})"
	);
	Ok(())
}
