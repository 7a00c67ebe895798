//! llm-perf harness facade.

#[cfg(feature = "cli")]
pub mod cli;
pub mod pipeline;
pub mod session;

#[cfg(feature = "cli")]
pub use cli::*;
pub use pipeline::*;
pub use session::*;
