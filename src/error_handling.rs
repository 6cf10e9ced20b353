//! Error taxonomy for every layer of the service.

pub mod types;

pub use types::*;
