//! # Core Module
//!
//! Small shared utilities used throughout the engine. Currently this is the
//! thread-safe resource wrapper that chunk volumes live behind.

mod shared;

pub use shared::Shared;
