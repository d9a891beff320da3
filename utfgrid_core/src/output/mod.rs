//! Where and how encoded tiles are stored.

mod compression;
pub use compression::*;

mod writer;
pub use writer::*;
