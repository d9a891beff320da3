//! Writes encoded tiles to `{root}/{level}/{col}/{row}.grid.json[.gz]`.
//!
//! Files are written to a temporary file next to their final path and renamed
//! into place, so a tile file that exists is always complete.

use super::TileCompression;
use crate::{TileDescriptor, grid::EncodedTile};
use anyhow::{Context, Result};
use std::{
	fs,
	io::Write,
	path::{Path, PathBuf},
};
use tempfile::Builder;
use utfgrid_derive::context;

const TILE_SUFFIX: &str = ".grid.json";

/// Stores encoded tiles below a root directory.
#[derive(Clone, Debug)]
pub struct TileWriter {
	root: PathBuf,
	compression: TileCompression,
	overwrite: bool,
}

impl TileWriter {
	#[must_use]
	pub fn new(root: &Path, compression: TileCompression, overwrite: bool) -> TileWriter {
		TileWriter {
			root: root.to_path_buf(),
			compression,
			overwrite,
		}
	}

	#[must_use]
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Final path of `tile`.
	#[must_use]
	pub fn tile_path(&self, tile: &TileDescriptor) -> PathBuf {
		self
			.root
			.join(tile.level.to_string())
			.join(tile.col().to_string())
			.join(format!("{}{TILE_SUFFIX}{}", tile.row(), self.compression.extension()))
	}

	/// Returns `false` if the tile is already present and must be kept.
	#[must_use]
	pub fn needs_writing(&self, tile: &TileDescriptor) -> bool {
		self.overwrite || !self.tile_path(tile).exists()
	}

	/// Serializes, compresses and atomically stores `encoded`.
	///
	/// On failure the temporary file is removed and the final path is untouched.
	#[context("Failed to write {:?}", tile)]
	pub fn write(&self, tile: &TileDescriptor, encoded: &EncodedTile) -> Result<PathBuf> {
		let path = self.tile_path(tile);
		let directory = path.parent().context("tile path has no parent directory")?;
		fs::create_dir_all(directory).with_context(|| format!("Failed to create directory {directory:?}"))?;

		let bytes = self.compression.compress(&encoded.to_json()?)?;

		let mut file = Builder::new().prefix(".tile-").suffix(".tmp").tempfile_in(directory)?;
		file.write_all(&bytes)?;
		file.flush()?;
		set_readable(file.path())?;
		file.persist(&path).map_err(|err| err.error)?;

		log::trace!("wrote {} bytes to {path:?}", bytes.len());
		Ok(path)
	}
}

/// Temporary files are created owner-only; tiles should be world-readable.
#[cfg(unix)]
fn set_readable(path: &Path) -> Result<()> {
	use std::os::unix::fs::PermissionsExt;
	fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
	Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn set_readable(_path: &Path) -> Result<()> {
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		TileCoord,
		grid::{AttributeSet, AttributeValue, Cell, CellGroup, encode_grid},
		tile_extent,
	};
	use assert_fs::TempDir;

	fn tile(level: u8, row: u32, col: u32) -> TileDescriptor {
		let coord = TileCoord::new(row, col);
		TileDescriptor::new(level, coord, tile_extent(level, coord))
	}

	fn encoded() -> EncodedTile {
		let mut cells = CellGroup::new();
		let set: AttributeSet = [("name", AttributeValue::from("x"))].into_iter().collect();
		cells.insert(set, Cell::new(0, 0));
		encode_grid(&cells, 2).unwrap().unwrap()
	}

	#[test]
	fn path_layout() {
		let writer = TileWriter::new(Path::new("/out"), TileCompression::Uncompressed, false);
		assert_eq!(writer.tile_path(&tile(3, 5, 2)), PathBuf::from("/out/3/2/5.grid.json"));

		let writer = TileWriter::new(Path::new("/out"), TileCompression::Gzip, false);
		assert_eq!(writer.tile_path(&tile(3, 5, 2)), PathBuf::from("/out/3/2/5.grid.json.gz"));
	}

	#[test]
	fn write_creates_directories_and_leaves_no_temp_files() -> Result<()> {
		let dir = TempDir::new()?;
		let writer = TileWriter::new(dir.path(), TileCompression::Uncompressed, false);
		let tile = tile(1, 0, 1);
		assert!(writer.needs_writing(&tile));

		let path = writer.write(&tile, &encoded())?;
		assert_eq!(path, dir.path().join("1/1/0.grid.json"));
		let content = fs::read_to_string(&path)?;
		assert!(content.starts_with("{\n  \"grid\": ["));
		assert!(!content.starts_with('\u{feff}'));

		let entries: Vec<_> = fs::read_dir(dir.path().join("1/1"))?.collect::<Result<_, _>>()?;
		assert_eq!(entries.len(), 1);
		assert!(!writer.needs_writing(&tile));
		Ok(())
	}

	#[test]
	fn overwrite_flag_controls_needs_writing() -> Result<()> {
		let dir = TempDir::new()?;
		let tile = tile(0, 0, 0);
		TileWriter::new(dir.path(), TileCompression::Uncompressed, false).write(&tile, &encoded())?;
		assert!(!TileWriter::new(dir.path(), TileCompression::Uncompressed, false).needs_writing(&tile));
		assert!(TileWriter::new(dir.path(), TileCompression::Uncompressed, true).needs_writing(&tile));
		// a gzip run does not see the uncompressed file
		assert!(TileWriter::new(dir.path(), TileCompression::Gzip, false).needs_writing(&tile));
		Ok(())
	}

	#[test]
	fn gzip_output_decompresses_to_json() -> Result<()> {
		let dir = TempDir::new()?;
		let writer = TileWriter::new(dir.path(), TileCompression::Gzip, false);
		let path = writer.write(&tile(2, 1, 3), &encoded())?;
		let bytes = TileCompression::Gzip.decompress(&fs::read(path)?)?;
		assert_eq!(bytes, encoded().to_json()?);
		Ok(())
	}

	#[test]
	fn failed_write_leaves_no_file() -> Result<()> {
		let dir = TempDir::new()?;
		// a plain file where the level directory should be
		fs::write(dir.path().join("4"), b"blocker")?;
		let writer = TileWriter::new(dir.path(), TileCompression::Uncompressed, false);
		let tile = tile(4, 0, 0);
		let err = writer.write(&tile, &encoded()).unwrap_err();
		assert!(err.to_string().starts_with("Failed to write Tile(level: 4"));
		assert!(!writer.tile_path(&tile).exists());
		Ok(())
	}
}
