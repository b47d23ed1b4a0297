//! Common types used across the engine.

pub mod id;

pub use id::*;
