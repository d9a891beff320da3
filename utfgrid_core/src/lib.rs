//! Core of the UTFGrid generator.
//!
//! - [`types`]: extents, tile coordinates, zoom levels and the tile pyramid math.
//! - [`grid`]: attribute sets, the 128×128 grid sampler and the UTFGrid encoder.
//! - [`map`]: the identify capability consumed by the sampler, plus a YAML map document backend.
//! - [`output`]: tile paths, compression and atomic tile writes.
//! - [`generator`]: configuration, the shared tile queue and the worker pool.
//! - [`progress`]: the terminal progress bar drawn during a run.

pub mod generator;

pub mod grid;

pub mod map;

pub mod output;

pub mod progress;

pub mod types;
pub use types::*;
