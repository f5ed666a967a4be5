//! CLI support for sqlpath
//!
//! Provides programmatic access to the `sqlpath` command so other tools can
//! embed it without shelling out.

mod convert;
mod run;

pub use convert::{parse_input, parse_json, parse_variable};
pub use run::{Operation, RunOptions, RunOutput, execute, execute_check};

use std::io;

use thiserror::Error;

/// Errors that stop a CLI run.
///
/// Per-item evaluation errors are not here; they come back as
/// [`RunOutput::Error`] so the remaining items still run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Statement did not compile
    #[error("{0}")]
    Compile(#[from] crate::CompileError),

    /// Input, variable or default was not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// `--var` without `=`
    #[error("invalid variable binding '{0}', expected NAME=JSON")]
    Variable(String),

    #[error("no input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}
