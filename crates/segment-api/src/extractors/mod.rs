//! Axum extractors for request handling
//!
//! Custom extractors for validated bodies and typed path parameters.

mod path;
mod validated;

pub use path::{SegmentNamePath, UserIdPath};
pub use validated::ValidatedJson;
