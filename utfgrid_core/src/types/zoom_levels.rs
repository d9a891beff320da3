//! The ordered set of zoom levels a generation run covers.

use crate::MAX_ZOOM_LEVEL;
use anyhow::{Context, Result, bail, ensure};
use std::{
	fmt::{self, Debug, Display},
	str::FromStr,
};
use utfgrid_derive::context;

/// Zoom levels in the order they were given, without duplicates.
///
/// Parsed from comma separated lists that may contain inclusive ranges,
/// e.g. `"0-4,8,10-12"`. The default covers levels 0 through 19.
#[derive(Clone, PartialEq, Eq)]
pub struct ZoomLevels(Vec<u8>);

impl ZoomLevels {
	/// Builds the level set from arbitrary values, dropping repeated levels.
	///
	/// # Errors
	/// Returns an error if the set is empty or a level exceeds the supported maximum.
	pub fn new(levels: impl IntoIterator<Item = u8>) -> Result<ZoomLevels> {
		let mut unique: Vec<u8> = Vec::new();
		for level in levels {
			ensure!(
				level <= MAX_ZOOM_LEVEL,
				"zoom level {level} exceeds the maximum of {MAX_ZOOM_LEVEL}"
			);
			if !unique.contains(&level) {
				unique.push(level);
			}
		}
		ensure!(!unique.is_empty(), "at least one zoom level is required");
		Ok(ZoomLevels(unique))
	}

	/// All levels from `min` to `max`, both inclusive.
	pub fn range(min: u8, max: u8) -> Result<ZoomLevels> {
		ensure!(min <= max, "zoom range {min}-{max} is reversed");
		ZoomLevels::new(min..=max)
	}

	pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
		self.0.iter().copied()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}
}

impl Default for ZoomLevels {
	fn default() -> Self {
		ZoomLevels((0..=19).collect())
	}
}

impl FromStr for ZoomLevels {
	type Err = anyhow::Error;

	#[context("Failed to parse zoom levels {text:?}")]
	fn from_str(text: &str) -> Result<Self> {
		fn parse_level(part: &str) -> Result<u8> {
			part
				.trim()
				.parse::<u8>()
				.with_context(|| format!("{part:?} is not a valid zoom level"))
		}

		let mut levels = Vec::new();
		for part in text.split(',') {
			if part.trim().is_empty() {
				bail!("empty entry in level list");
			}
			match part.split_once('-') {
				Some((min, max)) => {
					let (min, max) = (parse_level(min)?, parse_level(max)?);
					ensure!(min <= max, "zoom range {min}-{max} is reversed");
					levels.extend(min..=max);
				}
				None => levels.push(parse_level(part)?),
			}
		}
		ZoomLevels::new(levels)
	}
}

impl Display for ZoomLevels {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// collapse consecutive runs into ranges: 0,1,2,5 -> "0-2,5"
		let mut parts: Vec<String> = Vec::new();
		let mut iter = self.0.iter().copied().peekable();
		while let Some(start) = iter.next() {
			let mut end = start;
			while iter.peek() == Some(&(end + 1)) {
				end += 1;
				iter.next();
			}
			if start == end {
				parts.push(start.to_string());
			} else {
				parts.push(format!("{start}-{end}"));
			}
		}
		f.write_str(&parts.join(","))
	}
}

impl Debug for ZoomLevels {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ZoomLevels({self})")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("0", vec![0])]
	#[case("0,1,2", vec![0, 1, 2])]
	#[case("3-5", vec![3, 4, 5])]
	#[case("12, 0-2 ,5", vec![12, 0, 1, 2, 5])]
	#[case("4,4,3-4", vec![4, 3])]
	#[case("30", vec![30])]
	fn parse_valid(#[case] input: &str, #[case] expected: Vec<u8>) -> Result<()> {
		let levels: ZoomLevels = input.parse()?;
		assert_eq!(levels.as_slice(), expected.as_slice());
		Ok(())
	}

	#[rstest]
	#[case("")]
	#[case("1,,2")]
	#[case("31")]
	#[case("5-3")]
	#[case("a")]
	#[case("-1")]
	fn parse_invalid(#[case] input: &str) {
		assert!(input.parse::<ZoomLevels>().is_err(), "{input:?} should be rejected");
	}

	#[test]
	fn default_covers_0_to_19() {
		let levels = ZoomLevels::default();
		assert_eq!(levels.len(), 20);
		assert_eq!(levels.iter().next(), Some(0));
		assert_eq!(levels.iter().last(), Some(19));
	}

	#[test]
	fn display_collapses_runs() -> Result<()> {
		let levels: ZoomLevels = "0,1,2,5,7-8".parse()?;
		assert_eq!(levels.to_string(), "0-2,5,7-8");
		assert_eq!(format!("{levels:?}"), "ZoomLevels(0-2,5,7-8)");
		Ok(())
	}

	#[test]
	fn range_constructor() -> Result<()> {
		assert_eq!(ZoomLevels::range(2, 4)?.as_slice(), &[2, 3, 4]);
		assert!(ZoomLevels::range(4, 2).is_err());
		Ok(())
	}
}
