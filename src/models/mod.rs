//! Data models for the directory API.
//!
//! - [`primitives`] - Identifier newtypes
//! - [`resource`] - Resource descriptors and list parameters

pub mod primitives;
pub mod resource;

pub use primitives::*;
pub use resource::*;
