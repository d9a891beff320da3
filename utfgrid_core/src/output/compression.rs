//! Compression applied to tile files.
//!
//! ```
//! use utfgrid_core::output::TileCompression;
//!
//! assert_eq!(TileCompression::Uncompressed.extension(), "");
//! assert_eq!(TileCompression::Gzip.extension(), ".gz");
//! ```

use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use flate2::bufread::{GzDecoder, GzEncoder};
use std::{fmt::Display, io::Read};
use utfgrid_derive::context;

/// Compression of written tile files.
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileCompression {
	#[default]
	#[cfg_attr(feature = "cli", value(name = "none"))]
	Uncompressed,
	Gzip,
}

impl TileCompression {
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			TileCompression::Uncompressed => "none",
			TileCompression::Gzip => "gzip",
		}
	}

	/// Suffix appended to the tile file name.
	#[must_use]
	pub fn extension(&self) -> &str {
		match self {
			TileCompression::Uncompressed => "",
			TileCompression::Gzip => ".gz",
		}
	}

	/// Compresses `data`. Uncompressed returns a copy.
	pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
		match self {
			TileCompression::Uncompressed => Ok(data.to_vec()),
			TileCompression::Gzip => compress_gzip(data),
		}
	}

	/// Reverses [`compress`](Self::compress).
	pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
		match self {
			TileCompression::Uncompressed => Ok(data.to_vec()),
			TileCompression::Gzip => decompress_gzip(data),
		}
	}
}

impl Display for TileCompression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Compresses data using Gzip with the highest compression level.
#[context("Compressing {} bytes using Gzip", data.len())]
pub fn compress_gzip(data: &[u8]) -> Result<Vec<u8>> {
	let mut encoder = GzEncoder::new(data, flate2::Compression::best());
	let mut compressed = Vec::new();
	encoder
		.read_to_end(&mut compressed)
		.context("Failed to compress data using Gzip")?;
	Ok(compressed)
}

#[context("Decompressing {} bytes using Gzip", data.len())]
pub fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder
		.read_to_end(&mut decompressed)
		.context("Failed to decompress data using Gzip")?;
	Ok(decompressed)
}
