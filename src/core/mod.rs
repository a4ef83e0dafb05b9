//! Core functionality: locating the tools, running them, and the session state

pub mod exec;
pub mod locator;
pub mod runner;
pub mod session;

pub use locator::{InvocationStrategy, ToolLocator};
pub use runner::ProcessRunner;
pub use session::{AppState, RunGuard, Session, SharedState};
