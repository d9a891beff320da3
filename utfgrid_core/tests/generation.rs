//! End-to-end generation runs against mock maps.
//!
//! These tests drive [`generate`] through a temporary destination and check the
//! resulting tile tree, the report and the number of identify calls.

use anyhow::Result;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};
use utfgrid_core::{
	GeoExtent, ZoomLevels,
	generator::{GenerationConfig, generate},
	grid::AttributeValue,
	map::{IdentifiedObject, MockLayer, MockMap, MockMapOpener},
	output::{TileCompression, decompress_gzip},
};

fn config(dest: &Path, levels: &str) -> GenerationConfig {
	let mut config = GenerationConfig::new(dest);
	config.levels = levels.parse::<ZoomLevels>().unwrap();
	config.workers = 3;
	config
}

/// Reads every file below `root`, keyed by its relative path.
fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
	fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
		for entry in fs::read_dir(dir).unwrap() {
			let path = entry.unwrap().path();
			if path.is_dir() {
				walk(root, &path, files);
			} else {
				files.insert(path.strip_prefix(root).unwrap().to_path_buf(), fs::read(&path).unwrap());
			}
		}
	}
	let mut files = BTreeMap::new();
	if root.exists() {
		walk(root, root, &mut files);
	}
	files
}

fn read_tile(path: &Path) -> Value {
	serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn second_run_skips_everything() -> Result<()> {
	let dir = TempDir::new()?;
	let map = MockMap::new(vec![MockLayer::constant(&[("name", "world".into())])]);
	let opener = MockMapOpener::new(map.clone());
	let config = config(dir.path(), "0-1");

	let first = generate(&opener, &config)?;
	assert_eq!(first.written, 5);
	assert_eq!(map.identify_calls(), 5 * 128 * 128);
	let tree = read_tree(dir.path());
	assert_eq!(tree.len(), 5);

	let second = generate(&opener, &config)?;
	assert_eq!(second.skipped, 5);
	assert_eq!(second.written, 0);
	assert_eq!(map.identify_calls(), 5 * 128 * 128);
	assert_eq!(read_tree(dir.path()), tree);
	Ok(())
}

#[test]
fn overwrite_renders_again() -> Result<()> {
	let dir = TempDir::new()?;
	let map = MockMap::new(vec![MockLayer::constant(&[("name", "world".into())])]);
	let opener = MockMapOpener::new(map.clone());
	let mut config = config(dir.path(), "0");

	generate(&opener, &config)?;
	config.overwrite = true;
	let report = generate(&opener, &config)?;
	assert_eq!(report.written, 1);
	assert_eq!(map.identify_calls(), 2 * 128 * 128);
	Ok(())
}

#[test]
fn empty_tiles_are_not_written() -> Result<()> {
	let dir = TempDir::new()?;
	let opener = MockMapOpener::new(MockMap::new(vec![MockLayer::new(|_: &GeoExtent| Vec::new())]));
	let report = generate(&opener, &config(dir.path(), "0-2"))?;

	assert_eq!(report.tiles, 21);
	assert_eq!(report.empty, 21);
	assert!(report.is_success());
	assert!(read_tree(dir.path()).is_empty());
	Ok(())
}

#[test]
fn layers_merge_topmost_first() -> Result<()> {
	let dir = TempDir::new()?;
	let top = MockLayer::constant(&[("a", "1".into()), ("b", "2".into())]);
	let bottom = MockLayer::constant(&[("a", "9".into()), ("c", "3".into())]);
	let opener = MockMapOpener::new(MockMap::new(vec![top, bottom]));
	generate(&opener, &config(dir.path(), "0"))?;

	let tile = read_tile(&dir.path().join("0/0/0.grid.json"));
	assert_eq!(tile["keys"], json!(["", "0"]));
	assert_eq!(tile["data"], json!({"0": {"a": "1", "b": "2", "c": "3"}}));
	let row = "!".repeat(128);
	assert!(tile["grid"].as_array().unwrap().iter().all(|r| r == &json!(row)));
	Ok(())
}

#[test]
fn allowlist_filters_fields() -> Result<()> {
	let dir = TempDir::new()?;
	let top = MockLayer::constant(&[("a", "1".into()), ("b", "2".into())]);
	let bottom = MockLayer::constant(&[("a", "9".into()), ("c", "3".into())]);
	let opener = MockMapOpener::new(MockMap::new(vec![top, bottom]));
	let mut config = config(dir.path(), "0");
	config.fields = Some(["c".to_string()].into());
	generate(&opener, &config)?;

	let tile = read_tile(&dir.path().join("0/0/0.grid.json"));
	assert_eq!(tile["data"], json!({"0": {"c": "3"}}));
	Ok(())
}

#[test]
fn no_data_and_failing_layers() -> Result<()> {
	let dir = TempDir::new()?;
	let layers = vec![
		MockLayer::failing("layer is broken"),
		MockLayer::constant(&[("Pixel Value", "NoData".into()), ("kind", "sea".into())]),
	];
	let opener = MockMapOpener::new(MockMap::new(layers));
	let report = generate(&opener, &config(dir.path(), "0"))?;

	assert_eq!(report.written, 1);
	let tile = read_tile(&dir.path().join("0/0/0.grid.json"));
	assert_eq!(tile["data"], json!({"0": {"kind": "sea"}}));
	Ok(())
}

#[test]
fn distinct_attribute_sets_get_their_own_keys() -> Result<()> {
	let dir = TempDir::new()?;
	// west and east halves of the world carry different values
	let layer = MockLayer::new(|extent: &GeoExtent| {
		let side = if extent.center()[0] < 0.0 { "west" } else { "east" };
		vec![IdentifiedObject::new(vec![("side".to_string(), AttributeValue::from(side))])]
	});
	let opener = MockMapOpener::new(MockMap::new(vec![layer]));
	generate(&opener, &config(dir.path(), "0"))?;

	let tile = read_tile(&dir.path().join("0/0/0.grid.json"));
	assert_eq!(tile["keys"], json!(["", "0", "1"]));
	assert_eq!(tile["data"], json!({"0": {"side": "west"}, "1": {"side": "east"}}));
	let first_row = tile["grid"][0].as_str().unwrap().to_string();
	assert_eq!(first_row.chars().next(), Some('!'));
	assert_eq!(first_row.chars().last(), Some('#'));
	Ok(())
}

#[test]
fn gzip_tiles() -> Result<()> {
	let dir = TempDir::new()?;
	let opener = MockMapOpener::new(MockMap::new(vec![MockLayer::constant(&[("id", 1i64.into())])]));
	let mut config = config(dir.path(), "1");
	config.compression = TileCompression::Gzip;
	generate(&opener, &config)?;

	let tree = read_tree(dir.path());
	assert_eq!(tree.len(), 4);
	for (path, bytes) in tree {
		assert!(path.to_string_lossy().ends_with(".grid.json.gz"), "{path:?}");
		let tile: Value = serde_json::from_slice(&decompress_gzip(&bytes)?)?;
		assert_eq!(tile["data"], json!({"0": {"id": 1}}));
	}
	Ok(())
}

#[test]
fn extent_beyond_world_is_clamped() -> Result<()> {
	let dir = TempDir::new()?;
	let opener = MockMapOpener::new(MockMap::new(vec![MockLayer::constant(&[("a", "1".into())])]));
	let mut config = config(dir.path(), "2");
	config.extent = Some(GeoExtent::new(-3e7, -3e7, 3e7, 3e7)?);
	let report = generate(&opener, &config)?;

	assert_eq!(report.tiles, 16);
	assert_eq!(report.written, 16);
	for path in read_tree(dir.path()).keys() {
		let parts: Vec<String> = path.iter().map(|p| p.to_string_lossy().into_owned()).collect();
		let col: u32 = parts[1].parse()?;
		let row: u32 = parts[2].trim_end_matches(".grid.json").parse()?;
		assert!(col < 4 && row < 4, "{path:?}");
	}
	Ok(())
}

#[test]
fn failed_tiles_are_counted() -> Result<()> {
	let dir = TempDir::new()?;
	// a plain file where the level 1 directory belongs
	fs::write(dir.path().join("1"), b"")?;
	let opener = MockMapOpener::new(MockMap::new(vec![MockLayer::constant(&[("a", "1".into())])]));
	let report = generate(&opener, &config(dir.path(), "0-1"))?;

	assert_eq!(report.written, 1);
	assert_eq!(report.failed, 4);
	assert!(!report.is_success());
	assert!(dir.path().join("0/0/0.grid.json").is_file());
	Ok(())
}

#[test]
fn wrong_projection_fails_before_any_work() {
	let dir = TempDir::new().unwrap();
	let map = MockMap::new(vec![MockLayer::constant(&[("a", "1".into())])]).with_projection(4326);
	let opener = MockMapOpener::new(map.clone());
	let err = generate(&opener, &config(dir.path(), "0-3")).unwrap_err();

	assert!(format!("{err:#}").contains("map projection 4326 is not Web Mercator"));
	assert_eq!(opener.open_count(), 1);
	assert_eq!(map.identify_calls(), 0);
	assert!(read_tree(dir.path()).is_empty());
}

#[test]
fn worker_projection_mismatch_cancels_run() {
	let dir = TempDir::new().unwrap();
	let map = MockMap::new(vec![MockLayer::constant(&[("a", "1".into())])]);
	let opener = MockMapOpener::new(map.clone()).with_projection_from(1, 4326);
	let err = generate(&opener, &config(dir.path(), "0-3")).unwrap_err();

	assert!(format!("{err:#}").contains("is not Web Mercator"));
	assert_eq!(map.identify_calls(), 0);
	assert!(read_tree(dir.path()).is_empty());
}

#[test]
fn explicit_extent_limits_tiles() -> Result<()> {
	let dir = TempDir::new()?;
	let map = MockMap::new(vec![MockLayer::constant(&[("a", "1".into())])]);
	let opener = MockMapOpener::new(map.clone());
	let mut config = config(dir.path(), "4");
	config.extent = Some(GeoExtent::new(-1000.0, -1000.0, 1000.0, 1000.0)?);
	let report = generate(&opener, &config)?;

	// the extent straddles the origin, so it touches four tiles
	assert_eq!(report.tiles, 4);
	assert_eq!(map.identify_calls(), 4 * 128 * 128);
	for (col, row) in [(7, 7), (7, 8), (8, 7), (8, 8)] {
		assert!(dir.path().join(format!("4/{col}/{row}.grid.json")).is_file());
	}
	Ok(())
}
