//! Command-line surface of `fspurge`.
//!
//! - [`args`]: the clap argument model and how it layers over a config file.
//! - [`env`]: process environment (`DRY_RUN`, effective uid), target
//!   validation and run log placement.
//! - [`runner`]: one invocation end to end, and its exit status.

pub mod args;
pub mod env;
pub mod runner;

pub use args::PurgeArgs;
pub use env::Environment;
pub use runner::{exit_code, run};
