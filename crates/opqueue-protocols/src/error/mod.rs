//! Error types for the OpQueue protocol layer.

mod executor;
mod registry;
mod tool;

pub use executor::*;
pub use registry::*;
pub use tool::*;
