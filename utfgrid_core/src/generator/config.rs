use crate::{GeoExtent, ZoomLevels, output::TileCompression};
use anyhow::{Result, ensure};
use std::{
	collections::BTreeSet,
	path::{Path, PathBuf},
};

/// Settings of one generation run. Read-only once the pool starts.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
	/// Root directory of the tile tree.
	pub destination: PathBuf,
	pub compression: TileCompression,
	/// Rewrite tiles that already exist instead of skipping them.
	pub overwrite: bool,
	/// When set, only these attribute names are kept.
	pub fields: Option<BTreeSet<String>>,
	/// Number of worker threads.
	pub workers: usize,
	pub levels: ZoomLevels,
	/// Replaces the map's full extent.
	pub extent: Option<GeoExtent>,
	/// Draw a progress bar on stderr.
	pub progress: bool,
}

impl GenerationConfig {
	/// Defaults: uncompressed, no overwrite, all fields, one worker per
	/// processor, levels 0 to 19, the map's own extent, no progress bar.
	#[must_use]
	pub fn new(destination: &Path) -> GenerationConfig {
		GenerationConfig {
			destination: destination.to_path_buf(),
			compression: TileCompression::Uncompressed,
			overwrite: false,
			fields: None,
			workers: num_cpus::get(),
			levels: ZoomLevels::default(),
			extent: None,
			progress: false,
		}
	}

	/// Validates settings that cannot be enforced by their types.
	pub fn check(&self) -> Result<()> {
		ensure!(self.workers > 0, "worker count must be at least 1");
		ensure!(
			self.fields.as_ref().is_none_or(|fields| !fields.is_empty()),
			"field allowlist is empty"
		);
		ensure!(
			!self.destination.as_os_str().is_empty(),
			"destination path is empty"
		);
		Ok(())
	}
}

/// Splits a comma separated field list, dropping blanks.
#[must_use]
pub fn parse_field_list(text: &str) -> BTreeSet<String> {
	text
		.split(',')
		.map(str::trim)
		.filter(|field| !field.is_empty())
		.map(str::to_string)
		.collect()
}
