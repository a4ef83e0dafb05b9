//! Utility helpers

pub mod paths;

pub use paths::{default_binary_path, executable_arg, is_c_source, to_indirection_path};
