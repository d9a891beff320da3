pub mod generate;
pub mod probe;

#[cfg(test)]
pub mod fixtures {
	use assert_fs::{TempDir, prelude::*};
	use std::path::PathBuf;

	/// A 2000 km square in Web Mercator meters, north-east of the origin.
	pub const SQUARE: &str = r#"{"type":"FeatureCollection","features":[
		{"type":"Feature","properties":{"name":"square","id":7},
		 "geometry":{"type":"Polygon","coordinates":[[[1e6,1e6],[3e6,1e6],[3e6,3e6],[1e6,3e6],[1e6,1e6]]]}}
	]}"#;

	/// Writes a map document with one vector layer and returns its path.
	pub fn map_document(dir: &TempDir, projection: u32) -> PathBuf {
		dir.child("square.geojson").write_str(SQUARE).unwrap();
		let map = dir.child("map.yaml");
		map
			.write_str(&format!(
				"projection: {projection}\nlayers:\n  - name: squares\n    type: vector\n    path: square.geojson\n"
			))
			.unwrap();
		map.path().to_path_buf()
	}
}
