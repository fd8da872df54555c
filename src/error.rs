//! Error types for the Glaive library.
//!
//! All fallible operations in Glaive return [`Result`], whose error type is
//! the [`GlaiveError`] enum. Compile-time problems (unresolvable feature
//! names, invalid parameters, cyclic references) are reported through these
//! errors; programming errors such as binding-protocol violations assert
//! instead of returning.
//!
//! # Examples
//!
//! ```
//! use glaive::error::{GlaiveError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(GlaiveError::compile("unknown feature name"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use anyhow;
use thiserror::Error;

/// The main error type for Glaive operations.
#[derive(Error, Debug)]
pub enum GlaiveError {
    /// Feature graph compilation errors (unknown names, bad parameters,
    /// cyclic references).
    #[error("Compile error: {0}")]
    Compile(String),

    /// Feature name syntax errors.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation invoked in the wrong state (e.g. compiling twice).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with GlaiveError.
pub type Result<T> = std::result::Result<T, GlaiveError>;

impl GlaiveError {
    /// Create a new compile error.
    pub fn compile<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Compile(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Parse(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        GlaiveError::InvalidOperation(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Other(msg.into())
    }
}
