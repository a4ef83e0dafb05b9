//! Error context utilities for leakscope
//!
//! Helpers for attaching context to errors at the point they are raised.

use crate::error::{LeakscopeError, Result};
use std::path::Path;

/// Extension trait for Result to add context to errors
pub trait ResultExt<T, E> {
    /// Add context to an error with a custom message
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;

    /// Add file context to an error
    fn with_file_context<P: AsRef<Path>>(self, path: P) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + 'static,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|err| LeakscopeError::Config {
            message: format!("{}: {}", context(), err),
        })
    }

    fn with_file_context<P: AsRef<Path>>(self, path: P) -> Result<T> {
        self.map_err(|err| {
            let io_err = (&err as &(dyn std::error::Error + 'static)).downcast_ref::<std::io::Error>();
            match io_err.map(|e| e.kind()) {
                Some(std::io::ErrorKind::NotFound) => LeakscopeError::SourceNotFound {
                    path: path.as_ref().to_path_buf(),
                },
                Some(kind) => LeakscopeError::io_error(std::io::Error::new(
                    kind,
                    format!("{}: {}", path.as_ref().display(), err),
                )),
                None => LeakscopeError::execution_error(
                    path.as_ref().display().to_string(),
                    err.to_string(),
                ),
            }
        })
    }
}

/// Extension trait for Option to convert to Result with a custom error
pub trait OptionExt<T> {
    /// Convert Option to Result with a custom error message
    fn ok_or_error<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> LeakscopeError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_error<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> LeakscopeError,
    {
        self.ok_or_else(err_fn)
    }
}
