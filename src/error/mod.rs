//! Error handling for leakscope
//!
//! Error types, the crate-wide result alias and helpers for attaching context
//! to errors.

pub mod context;
pub mod types;

pub use context::{OptionExt, ResultExt};
pub use types::{ErrorSeverity, LeakscopeError, Result};
