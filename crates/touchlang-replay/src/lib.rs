#![forbid(unsafe_code)]

//! Replay recorded touch traces through a TouchLang session.
//!
//! The binary reads a JSON-lines trace (see [`trace`]), runs it against a
//! [`touchlang_runtime::Session`] with the offline responder on a virtual
//! clock (see [`replay`]), and prints the resulting transcript.

pub mod cli;
pub mod error;
pub mod replay;
pub mod trace;

pub use cli::{Cli, run, run_from_env};
pub use error::{ReplayError, Result};
pub use replay::{ReplayOptions, Transcript};
