//! Tool protocol definitions.
//!
//! Tools are the named capabilities a registry-backed executor routes
//! queued operations to.

mod context;
mod definition;
mod result;
mod traits;

pub use context::*;
pub use definition::*;
pub use result::*;
pub use traits::*;
