//! HTTP handlers for listing search, single-listing lookup, market insights, and health.

pub mod health;
pub mod insights;
pub mod properties;
pub use health::*;
pub use insights::*;
pub use properties::*;
