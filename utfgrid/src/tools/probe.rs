use anyhow::Result;
use std::{fmt::Write, path::PathBuf};
use utfgrid_core::{
	GeoExtent, TilePyramid, ZoomLevels,
	map::{MapDocument, MapHandle},
};
use utfgrid_derive::context;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// map document (YAML) to inspect
	#[arg(required = true)]
	map: PathBuf,

	/// zoom levels to count tiles for
	#[arg(long, short, value_name = "LEVELS", default_value = "0-19")]
	levels: ZoomLevels,

	/// count tiles inside this extent instead of the map's extent
	#[arg(long, short, value_name = "xmin,ymin,xmax,ymax", allow_hyphen_values = true)]
	extent: Option<GeoExtent>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let map = MapDocument::open(&arguments.map)?;
	print!("{}", describe(&map, &arguments.levels, arguments.extent)?);
	Ok(())
}

#[context("Failed to describe map")]
fn describe(map: &MapDocument, levels: &ZoomLevels, extent: Option<GeoExtent>) -> Result<String> {
	let projection = map.projection();
	let extent = match extent {
		Some(extent) => extent,
		None => map.full_extent()?,
	};

	let mut text = String::new();
	let kind = if projection.is_web_mercator() {
		"Web Mercator"
	} else {
		"not Web Mercator"
	};
	writeln!(text, "projection: {projection} ({kind})")?;
	writeln!(text, "extent: {:?}", extent.as_array())?;

	writeln!(text, "layers:")?;
	for index in 0..map.layer_count() {
		let hidden = if map.layer_visible(index) { "" } else { " (hidden)" };
		writeln!(text, "  {index}: {}{hidden}", map.layer_name(index))?;
	}

	let pyramid = TilePyramid::new(levels, &extent);
	writeln!(text, "tiles:")?;
	for range in pyramid.level_ranges() {
		writeln!(
			text,
			"  level {:>2}: {} (cols {}-{}, rows {}-{})",
			range.level,
			range.count(),
			range.col_min,
			range.col_max,
			range.row_min,
			range.row_max
		)?;
	}
	writeln!(text, "  total: {}", pyramid.count_tiles())?;

	Ok(text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{tests::run_command, tools::fixtures::map_document};
	use assert_fs::TempDir;
	use pretty_assertions::assert_eq;

	#[test]
	fn describes_map() -> Result<()> {
		let dir = TempDir::new()?;
		let map = MapDocument::open(&map_document(&dir, 3857))?;
		let text = describe(&map, &"0-2".parse()?, None)?;
		assert_eq!(
			text,
			[
				"projection: 3857 (Web Mercator)",
				"extent: [1000000.0, 1000000.0, 3000000.0, 3000000.0]",
				"layers:",
				"  0: squares",
				"tiles:",
				"  level  0: 1 (cols 0-0, rows 0-0)",
				"  level  1: 1 (cols 1-1, rows 0-0)",
				"  level  2: 1 (cols 2-2, rows 1-1)",
				"  total: 3",
				""
			]
			.join("\n")
		);
		Ok(())
	}

	#[test]
	fn probe_command() -> Result<()> {
		let dir = TempDir::new()?;
		let map = map_document(&dir, 102_100);
		run_command(vec!["utfgrid", "probe", map.to_str().unwrap(), "-l", "0-3"])?;
		Ok(())
	}
}
