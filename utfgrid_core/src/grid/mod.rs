//! Sampling a tile into groups of identical attribute sets and encoding the
//! groups as a UTFGrid document.

mod attribute_set;
pub use attribute_set::*;

mod attribute_value;
pub use attribute_value::*;

mod cell_group;
pub use cell_group::*;

mod encoder;
pub use encoder::*;

mod sampler;
pub use sampler::*;
