//! The map capability the sampler queries, and a map document backend.
//!
//! A [`MapOpener`] is shared by all workers and opens one [`MapHandle`] per
//! worker. Handles are never shared between threads.

mod document;
pub use document::*;

mod handle;
pub use handle::*;

mod mock;
pub use mock::*;

mod projection;
pub use projection::*;

mod raster_layer;
pub use raster_layer::*;

mod vector_layer;
pub use vector_layer::*;
