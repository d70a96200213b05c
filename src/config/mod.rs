//! Service configuration: typed settings and loading from the environment.

mod loader;
mod types;

pub use loader::*;
pub use types::*;
