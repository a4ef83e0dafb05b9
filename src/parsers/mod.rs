//! Parsers for external tool output

pub mod valgrind;

pub use valgrind::{parse, parse_with_policy, ValgrindParser};
