//! Spherical Web Mercator constants used by the tile math.

use std::f64::consts::PI;

/// Earth radius of the spherical Web Mercator projection, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Distance from the projection origin to the world edge (`π·R`), in meters.
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

/// Earth circumference at the equator (`2·π·R`), in meters.
pub const WORLD_SIZE: f64 = 2.0 * PI * EARTH_RADIUS;

/// Width and height of a rendered map tile, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level the pyramid math supports.
pub const MAX_ZOOM_LEVEL: u8 = 30;

/// Maximum latitude in degrees representable in Web Mercator.
pub const MAX_LAT: f64 = 85.051_128_779_806_59;

/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;
